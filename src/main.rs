use anyhow::Context;
use clap::Parser;
use halo_site::config::cli::Command;
use halo_site::domain::catalog::{format_usd, pre_order_savings_cents, LIST_PRICE_CENTS};
use halo_site::domain::model::PurchaseSelection;
use halo_site::utils::{logger, validation::Validate};
use halo_site::{
    AnimatedBackground, Checkout, CliConfig, CommunityLoader, DrawList, FrameLoop, HostReachability,
    HttpOrderGateway, LoadStatus, RestCommunityService, RingColor, RingSize, RingViewer, SiteConfig,
    SiteError, TokioDelay, Viewport, VitalsSimulator,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();
    let config = SiteConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose, &config.logging);
    } else {
        logger::init_cli_logger(cli.verbose, &config.logging);
    }

    tracing::info!("Starting halo-site");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let outcome = match cli.command {
        Command::Community { limit } => run_community(&config, limit).await,
        Command::Particles {
            width,
            height,
            color,
            duration_ms,
        } => run_particles(&config, Viewport::new(width, height), color, duration_ms).await,
        Command::Vitals { seconds } => run_vitals(seconds).await,
        Command::Order { color, size } => run_order(&config, color, size).await,
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.severity().exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run_community(config: &SiteConfig, limit: Option<usize>) -> Result<(), SiteError> {
    let mut settings = config.community.loader_settings();
    if let Some(limit) = limit {
        settings.post_limit = limit;
    }

    let service = Arc::new(RestCommunityService::new(&config.service));
    let network = Arc::new(HostReachability::for_url(config.service.url()));
    let mut loader = CommunityLoader::new(service, network, Arc::new(TokioDelay), settings);
    let mut updates = loader.subscribe();

    loader.mount();
    let snapshot = updates
        .wait_for(|snapshot| snapshot.is_settled())
        .await
        .map_err(|_| SiteError::ConfigError {
            message: "community loader stopped unexpectedly".to_string(),
        })?
        .clone();
    loader.teardown();

    match snapshot.status {
        LoadStatus::Ready => {
            let counters = snapshot.counters;
            println!("👥 Active members: {}", counters.active_members);
            println!("🧵 Topics created: {}", counters.topics_created);
            println!("📝 Posts this week: {}", counters.posts_this_week);
            println!();

            if snapshot.has_no_discussions() {
                println!("No discussions yet. Be the first to start a topic!");
            }
            let now = chrono::Utc::now();
            for post in &snapshot.posts {
                println!("{} · {}", post.author.name, post.relative_age(now));
                println!("  {}", post.content);
                println!("  ♥ {}  💬 {}", post.likes, post.replies);
            }
        }
        _ => {
            let message = snapshot.error_message().unwrap_or("Community content is unavailable.");
            println!("⚠️ {}", message);
            if let Some(error) = &snapshot.last_error {
                tracing::warn!("Community panel error: {}", error);
            }
        }
    }

    Ok(())
}

async fn run_particles(
    config: &SiteConfig,
    viewport: Viewport,
    color: RingColor,
    duration_ms: u64,
) -> Result<(), SiteError> {
    let mut background = AnimatedBackground::new(DrawList::default());
    background.mount(viewport, color.theme());
    let background = Arc::new(Mutex::new(background));

    let mut viewer = RingViewer::new(color);
    let frame_loop = FrameLoop::start(Arc::clone(&background), config.background.frame_rate);
    let elapsed = Duration::from_millis(duration_ms);
    tokio::time::sleep(elapsed).await;
    viewer.advance(elapsed);
    frame_loop.stop();

    let background = background
        .lock()
        .map_err(|_| SiteError::ConfigError {
            message: "particle background lock poisoned".to_string(),
        })?;
    let surface = background.surface();
    println!("🎨 Theme: {} ({})", color, color.theme());
    println!("🖼️ Viewport: {}x{}", viewport.width, viewport.height);
    println!("✨ Particles per frame: {}", viewport.particle_budget());
    println!("🎞️ Frames drawn: {} ({} surface clears)", background.frames(), surface.clears());
    println!("⚪ Circles drawn: {}", surface.total_fills());
    println!("👀 Visible in last frame: {}", surface.visible_fills());
    println!("💍 Ring rotation: {:.2} rad", viewer.rotation());
    Ok(())
}

async fn run_vitals(seconds: u64) -> Result<(), SiteError> {
    let mut simulator = VitalsSimulator::start();
    let mut readings = simulator.subscribe();
    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);

    let first = simulator.current();
    println!("❤️ {} bpm  😌 stress {}", first.heart_rate, first.stress);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = readings.changed() => {
                if changed.is_err() {
                    break;
                }
                let reading = *readings.borrow_and_update();
                println!("❤️ {} bpm  😌 stress {}", reading.heart_rate, reading.stress);
            }
        }
    }

    simulator.stop();
    Ok(())
}

async fn run_order(config: &SiteConfig, color: RingColor, size: Option<RingSize>) -> Result<(), SiteError> {
    let endpoint = config.require_order_endpoint()?;

    let mut selection = PurchaseSelection::new(color);
    if let Some(size) = size {
        selection = selection.with_size(size);
    }

    let checkout = Checkout::new(HttpOrderGateway::new(endpoint));
    let receipt = checkout.place_order(&selection).await?;

    println!("✅ Order created: {}", receipt.order_id);
    println!(
        "💳 Amount: {} (list price {}, you save {})",
        format_usd(receipt.amount),
        format_usd(LIST_PRICE_CENTS),
        format_usd(pre_order_savings_cents())
    );
    Ok(())
}
