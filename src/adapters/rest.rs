use crate::config::ServiceConfig;
use crate::domain::model::Post;
use crate::domain::ports::CommunityService;
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;

const REST_PREFIX: &str = "rest/v1";
const POST_COLUMNS: &str = "id,content,created_at,likes,replies,user:users(name,avatar_url)";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Community service backed by a PostgREST-style HTTP API.
#[derive(Debug, Clone)]
pub struct RestCommunityService {
    client: Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl RestCommunityService {
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            base_url: config.url().map(|url| url.trim_end_matches('/').to_string()),
            api_key: config.key().map(str::to_string),
        }
    }

    fn request(&self, method: Method, table: &str) -> Result<RequestBuilder> {
        let base_url = self
            .base_url
            .as_deref()
            .ok_or_else(|| SiteError::MissingConfigError {
                field: "service.url".to_string(),
            })?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SiteError::MissingConfigError {
                field: "service.key".to_string(),
            })?;

        let url = format!("{}/{}/{}", base_url, REST_PREFIX, table);
        tracing::debug!("Making {} request to: {}", method, url);

        Ok(self
            .client
            .request(method, url)
            .header("apikey", api_key)
            .bearer_auth(api_key))
    }

    async fn send(builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("Service response status: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<ErrorBody> = serde_json::from_str(&body).ok();
        let (code, message) = match parsed {
            Some(error) => (error.code, error.message.unwrap_or_else(|| body.clone())),
            None => (None, body),
        };

        Err(SiteError::ServiceStatusError {
            status: status.as_u16(),
            code,
            message: if message.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                message
            },
        })
    }

    /// 以 HEAD + `Prefer: count=exact` 取得筆數，總數在 Content-Range 中
    async fn count(&self, table: &str, select: &str, filters: &[(&str, String)]) -> Result<u64> {
        let builder = self
            .request(Method::HEAD, table)?
            .query(&[("select", select)])
            .query(filters)
            .header("Prefer", "count=exact");
        let response = Self::send(builder).await?;

        let header = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| SiteError::ResponseFormatError {
                message: format!("count of '{}' returned no Content-Range header", table),
            })?;

        parse_content_range(header).ok_or_else(|| SiteError::ResponseFormatError {
            message: format!("unreadable Content-Range '{}'", header),
        })
    }
}

/// Total from `0-9/42` or `*/42`.
pub fn parse_content_range(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl CommunityService for RestCommunityService {
    fn is_configured(&self) -> bool {
        self.base_url.as_deref().is_some_and(|url| !url.is_empty())
            && self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    async fn probe(&self) -> Result<()> {
        let builder = self
            .request(Method::GET, "posts")?
            .query(&[("select", "id"), ("limit", "1")]);
        Self::send(builder).await?;
        Ok(())
    }

    async fn recent_posts(&self, limit: usize) -> Result<Vec<Post>> {
        let builder = self.request(Method::GET, "posts")?.query(&[
            ("select", POST_COLUMNS.to_string()),
            ("order", "created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ]);
        let posts: Vec<Post> = Self::send(builder).await?.json().await?;
        tracing::debug!("Fetched {} posts", posts.len());
        Ok(posts)
    }

    async fn count_members(&self) -> Result<u64> {
        self.count("users", "id", &[]).await
    }

    async fn count_topics(&self) -> Result<u64> {
        self.count("posts", "id", &[]).await
    }

    async fn count_posts_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let filter = format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Secs, true));
        self.count("posts", "created_at", &[("created_at", filter)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use httpmock::Method::HEAD;

    fn service_for(server: &MockServer) -> RestCommunityService {
        RestCommunityService::new(&ServiceConfig::new(Some(server.base_url()), Some("anon-key".to_string())))
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-0/42"), Some(42));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn test_unconfigured_service() {
        let service = RestCommunityService::new(&ServiceConfig::new(Some("https://example.com".to_string()), None));
        assert!(!service.is_configured());
        assert!(matches!(
            service.request(Method::GET, "posts"),
            Err(SiteError::MissingConfigError { .. })
        ));
    }

    #[tokio::test]
    async fn test_probe_sends_key_headers() {
        let server = MockServer::start();
        let probe_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/posts")
                .query_param("select", "id")
                .query_param("limit", "1")
                .header("apikey", "anon-key")
                .header("Authorization", "Bearer anon-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([{ "id": 1 }]));
        });

        service_for(&server).probe().await.unwrap();
        probe_mock.assert();
    }

    #[tokio::test]
    async fn test_error_body_is_decoded() {
        let server = MockServer::start();
        let probe_mock = server.mock(|when, then| {
            when.method(GET).path("/rest/v1/posts");
            then.status(404)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "code": "42P01",
                    "message": "relation \"public.posts\" does not exist"
                }));
        });

        let err = service_for(&server).probe().await.unwrap_err();

        probe_mock.assert();
        match err {
            SiteError::ServiceStatusError { status, code, message } => {
                assert_eq!(status, 404);
                assert_eq!(code.as_deref(), Some("42P01"));
                assert!(message.contains("does not exist"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recent_posts_query_and_decoding() {
        let server = MockServer::start();
        let posts_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/posts")
                .query_param("select", POST_COLUMNS)
                .query_param("order", "created_at.desc")
                .query_param("limit", "3");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {
                        "id": 2,
                        "content": "Has anyone figured out how to optimize battery life?",
                        "created_at": "2026-10-16T07:00:00+00:00",
                        "likes": 18,
                        "replies": 12,
                        "user": { "name": "Sarah Chen", "avatar_url": "https://example.com/sarah.jpg" }
                    },
                    {
                        "id": 1,
                        "content": "Just got my HALO ring today.",
                        "created_at": "2026-10-16T05:00:00+00:00",
                        "likes": 24,
                        "replies": 5,
                        "user": { "name": "Alex Johnson" }
                    }
                ]));
        });

        let posts = service_for(&server).recent_posts(3).await.unwrap();

        posts_mock.assert();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].author.name, "Sarah Chen");
        assert!(posts[0].created_at > posts[1].created_at);
        assert_eq!(posts[1].author.avatar_url, None);
    }

    #[tokio::test]
    async fn test_counts_read_content_range() {
        let server = MockServer::start();
        let members_mock = server.mock(|when, then| {
            when.method(HEAD)
                .path("/rest/v1/users")
                .header("Prefer", "count=exact");
            then.status(200).header("Content-Range", "0-0/12458");
        });
        let weekly_mock = server.mock(|when, then| {
            when.method(HEAD)
                .path("/rest/v1/posts")
                .query_param("select", "created_at")
                .query_param_exists("created_at");
            then.status(200).header("Content-Range", "*/684");
        });

        let service = service_for(&server);
        assert_eq!(service.count_members().await.unwrap(), 12_458);
        assert_eq!(
            service.count_posts_since(Utc::now() - chrono::Duration::days(7)).await.unwrap(),
            684
        );

        members_mock.assert();
        weekly_mock.assert();
    }

    #[tokio::test]
    async fn test_missing_content_range_is_format_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/rest/v1/posts");
            then.status(200);
        });

        let err = service_for(&server).count_topics().await.unwrap_err();
        assert!(matches!(err, SiteError::ResponseFormatError { .. }));
    }
}
