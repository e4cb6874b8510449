use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a confirmed order.
///
/// The pipeline itself only ever produces `PendingVerification`; every other
/// transition is an administrative action. Unknown strings set by operators
/// survive round-trips through the `Other` fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    PendingVerification,
    Processing,
    ReadyForPickup,
    Completed,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::PendingVerification => "pending_verification",
            OrderStatus::Processing => "processing",
            OrderStatus::ReadyForPickup => "ready_for_pickup",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending_verification" => OrderStatus::PendingVerification,
            "processing" => OrderStatus::Processing,
            "ready_for_pickup" => OrderStatus::ReadyForPickup,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing mode chosen at confirmation time.
///
/// `Grayscale` forces every analyzed color page to be billed as grayscale;
/// the override is applied when the order is confirmed, never at analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    Color,
    Grayscale,
}

impl PrintMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrintMode::Color => "color",
            PrintMode::Grayscale => "grayscale",
        }
    }

    /// Parse a form/database value. Anything other than "grayscale" is the
    /// normal color mode, matching the confirmation form's default.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("grayscale") {
            PrintMode::Grayscale
        } else {
            PrintMode::Color
        }
    }
}

impl std::fmt::Display for PrintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permanent record of a confirmed order.
///
/// `file_path` and `proof_path` are storage keys relative to the artifact
/// root; they are resolved through the artifact store whenever the files are
/// read or deleted.
#[derive(Debug, Clone)]
pub struct Order {
    pub order_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub transaction_time: DateTime<Utc>,
    pub payment_method: String,
    pub status: OrderStatus,
    pub gross_amount: i64,
    pub color_pages: i32,
    pub bw_pages: i32,
    pub copies: i32,
    pub color_page_range: String,
    pub grayscale_page_range: String,
    pub original_name: String,
    pub file_path: String,
    pub proof_path: String,
    pub pickup_location: String,
    pub print_mode: PrintMode,
}

/// Customer-facing confirmation summary.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: String,
    pub customer_name: String,
    pub color_pages: i32,
    pub bw_pages: i32,
    pub copies: i32,
    pub gross_amount: i64,
    pub transaction_time: DateTime<Utc>,
    pub original_name: String,
    pub status: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            order_id: order.order_id,
            customer_name: order.customer_name,
            color_pages: order.color_pages,
            bw_pages: order.bw_pages,
            copies: order.copies,
            gross_amount: order.gross_amount,
            transaction_time: order.transaction_time,
            original_name: order.original_name,
            status: order.status.as_str().to_string(),
        }
    }
}

/// Full order view for the administrative surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderAdminResponse {
    pub order_id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub transaction_time: DateTime<Utc>,
    pub payment_method: String,
    pub status: String,
    pub gross_amount: i64,
    pub color_pages: i32,
    pub bw_pages: i32,
    pub copies: i32,
    pub color_page_range: String,
    pub grayscale_page_range: String,
    pub original_name: String,
    pub file_path: String,
    pub proof_path: String,
    pub pickup_location: String,
    pub print_mode: String,
}

impl From<Order> for OrderAdminResponse {
    fn from(order: Order) -> Self {
        OrderAdminResponse {
            order_id: order.order_id,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            transaction_time: order.transaction_time,
            payment_method: order.payment_method,
            status: order.status.as_str().to_string(),
            gross_amount: order.gross_amount,
            color_pages: order.color_pages,
            bw_pages: order.bw_pages,
            copies: order.copies,
            color_page_range: order.color_page_range,
            grayscale_page_range: order.grayscale_page_range,
            original_name: order.original_name,
            file_path: order.file_path,
            proof_path: order.proof_path,
            pickup_location: order.pickup_location,
            print_mode: order.print_mode.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_round_trips_known_values() {
        for s in [
            "pending_verification",
            "processing",
            "ready_for_pickup",
            "completed",
            "cancelled",
        ] {
            let status = OrderStatus::from(s.to_string());
            assert_eq!(status.as_str(), s);
            assert!(!matches!(status, OrderStatus::Other(_)));
        }
    }

    #[test]
    fn order_status_preserves_unknown_values() {
        let status = OrderStatus::from("waiting_on_paper".to_string());
        assert_eq!(status, OrderStatus::Other("waiting_on_paper".to_string()));
        assert_eq!(status.as_str(), "waiting_on_paper");
    }

    #[test]
    fn print_mode_parse_defaults_to_color() {
        assert_eq!(PrintMode::parse("grayscale"), PrintMode::Grayscale);
        assert_eq!(PrintMode::parse("GRAYSCALE"), PrintMode::Grayscale);
        assert_eq!(PrintMode::parse("color"), PrintMode::Color);
        assert_eq!(PrintMode::parse(""), PrintMode::Color);
        assert_eq!(PrintMode::parse("anything"), PrintMode::Color);
    }

    #[test]
    fn order_response_from_order() {
        let order = Order {
            order_id: "ORD-123".to_string(),
            customer_name: "Alice".to_string(),
            customer_phone: "555-0100".to_string(),
            transaction_time: Utc::now(),
            payment_method: "transfer".to_string(),
            status: OrderStatus::PendingVerification,
            gross_amount: 12_000,
            color_pages: 3,
            bw_pages: 7,
            copies: 2,
            color_page_range: "1-3".to_string(),
            grayscale_page_range: "4-10".to_string(),
            original_name: "thesis.pdf".to_string(),
            file_path: "orders/2026-08-06/ORD-123-thesis.pdf".to_string(),
            proof_path: "proofs/2026-08-06/ORD-123-proof.jpg".to_string(),
            pickup_location: "Main Branch".to_string(),
            print_mode: PrintMode::Color,
        };

        let response = OrderResponse::from(order);
        assert_eq!(response.order_id, "ORD-123");
        assert_eq!(response.color_pages, 3);
        assert_eq!(response.bw_pages, 7);
        assert_eq!(response.status, "pending_verification");
    }
}
