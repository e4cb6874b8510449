//! Fire-and-forget order notifications via an HTTP messaging gateway.

use imprint_core::models::{Order, PrintMode};
use imprint_core::Config;

/// Sends a new-order summary to the operator's messaging gateway.
/// No-op if the gateway is not configured.
#[derive(Clone)]
pub struct OrderNotifier {
    client: reqwest::Client,
    gateway_url: String,
    token: String,
    target: String,
}

impl OrderNotifier {
    /// Create the notifier from config. Returns `None` when the gateway URL,
    /// token, or target is not configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        let gateway_url = config.notify_gateway_url.clone()?;
        let token = config.notify_token.clone()?;
        let target = config.notify_target.clone()?;

        tracing::info!(gateway = %gateway_url, "Order notifier initialized");
        Some(Self {
            client: reqwest::Client::new(),
            gateway_url,
            token,
            target,
        })
    }

    /// Send the notification on a detached task. There is no ordering
    /// guarantee relative to the confirmation response, and delivery failure
    /// never affects the order outcome.
    pub fn notify_detached(&self, order: &Order) {
        let notifier = self.clone();
        let message = format_order_message(order);
        let order_id = order.order_id.clone();

        tokio::spawn(async move {
            match notifier.send(&message).await {
                Ok(()) => {
                    tracing::info!(order_id = %order_id, "Order notification sent");
                }
                Err(e) => {
                    tracing::warn!(error = %e, order_id = %order_id, "Order notification failed");
                }
            }
        });
    }

    async fn send(&self, message: &str) -> Result<(), anyhow::Error> {
        let response = self
            .client
            .post(&self.gateway_url)
            .header("Authorization", &self.token)
            .json(&serde_json::json!({
                "target": self.target,
                "message": message,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("notification gateway returned {}", response.status());
        }
        Ok(())
    }
}

fn format_order_message(order: &Order) -> String {
    let print_mode = match order.print_mode {
        PrintMode::Grayscale => "ALL GRAYSCALE",
        PrintMode::Color => "Normal",
    };
    format!(
        "New order awaiting payment verification\n\n\
         Order ID: {}\n\
         Customer: {} ({})\n\
         Pickup location: {}\n\
         Print mode: {}\n\n\
         Color pages: {}\n\
         Grayscale pages: {}\n\
         Copies: {}\n\
         Total: {}\n\
         Payment method: {}\n\n\
         File: {}",
        order.order_id,
        order.customer_name,
        order.customer_phone,
        order.pickup_location,
        print_mode,
        order.color_pages,
        order.bw_pages,
        order.copies,
        order.gross_amount,
        order.payment_method,
        order.original_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use imprint_core::models::OrderStatus;

    fn sample_order() -> Order {
        Order {
            order_id: "ORD-42".to_string(),
            customer_name: "Bob".to_string(),
            customer_phone: "555-0199".to_string(),
            transaction_time: Utc::now(),
            payment_method: "transfer".to_string(),
            status: OrderStatus::PendingVerification,
            gross_amount: 15_000,
            color_pages: 0,
            bw_pages: 12,
            copies: 1,
            color_page_range: "".to_string(),
            grayscale_page_range: "1-12".to_string(),
            original_name: "notes.pdf".to_string(),
            file_path: "orders/2026-08-06/ORD-42-notes.pdf".to_string(),
            proof_path: "proofs/2026-08-06/ORD-42-proof.png".to_string(),
            pickup_location: "North Branch".to_string(),
            print_mode: PrintMode::Grayscale,
        }
    }

    #[test]
    fn message_includes_order_fields() {
        let message = format_order_message(&sample_order());
        assert!(message.contains("ORD-42"));
        assert!(message.contains("Bob"));
        assert!(message.contains("North Branch"));
        assert!(message.contains("ALL GRAYSCALE"));
        assert!(message.contains("notes.pdf"));
    }
}
