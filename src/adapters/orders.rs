use crate::domain::model::{OrderReceipt, OrderRequest};
use crate::domain::ports::OrderGateway;
use crate::utils::error::{Result, SiteError};
use async_trait::async_trait;
use reqwest::Client;

/// Posts order requests to the payment collaborator endpoint.
#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    client: Client,
    endpoint: String,
}

impl HttpOrderGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt> {
        tracing::debug!("Creating order at {}: {:?}", self.endpoint, request);
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(SiteError::OrderRejected { message });
        }

        let body = response.text().await?;
        let receipt: OrderReceipt = serde_json::from_str(&body)?;
        tracing::info!("🧾 Order {} created", receipt.order_id);
        Ok(receipt)
    }
}
