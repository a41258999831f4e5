use crate::domain::catalog::PRE_ORDER_PRICE_CENTS;
use crate::domain::model::{OrderReceipt, OrderRequest, PurchaseSelection};
use crate::domain::ports::OrderGateway;
use crate::utils::error::{Result, SiteError};

/// Order initiation for the purchase panel. The checkout overlay itself is
/// handed the returned receipt and lives outside this crate.
pub struct Checkout<G: OrderGateway> {
    gateway: G,
    amount: u64,
}

impl<G: OrderGateway> Checkout<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            amount: PRE_ORDER_PRICE_CENTS,
        }
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub async fn place_order(&self, selection: &PurchaseSelection) -> Result<OrderReceipt> {
        let size = selection.size.ok_or(SiteError::SizeNotSelected)?;
        let request = OrderRequest {
            amount: self.amount,
            color: selection.color,
            size,
        };

        tracing::info!(
            "🛒 Creating order: {} {} for {} cents",
            selection.color.display_name(),
            size,
            self.amount
        );
        let receipt = self.gateway.create_order(&request).await?;
        tracing::info!("✅ Order {} created", receipt.order_id);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{RingColor, RingSize};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGateway {
        requests: Mutex<Vec<OrderRequest>>,
    }

    #[async_trait]
    impl OrderGateway for RecordingGateway {
        async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(OrderReceipt {
                order_id: "order_123".to_string(),
                amount: request.amount,
            })
        }
    }

    #[tokio::test]
    async fn test_missing_size_sends_nothing() {
        let checkout = Checkout::new(RecordingGateway::default());

        let err = checkout
            .place_order(&PurchaseSelection::new(RingColor::Green))
            .await
            .unwrap_err();

        assert!(matches!(err, SiteError::SizeNotSelected));
        assert!(checkout.gateway.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_carries_selection_and_price() {
        let checkout = Checkout::new(RecordingGateway::default());
        let selection = PurchaseSelection::new(RingColor::Blue).with_size(RingSize::new(9).unwrap());

        let receipt = checkout.place_order(&selection).await.unwrap();

        assert_eq!(receipt.order_id, "order_123");
        assert_eq!(receipt.amount, PRE_ORDER_PRICE_CENTS);
        let requests = checkout.gateway.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].color, RingColor::Blue);
        assert_eq!(requests[0].size.us(), 9);
    }
}
