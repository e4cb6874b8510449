//! Order confirmation endpoint.
//!
//! Confirmation is fail-closed on the database insert and fail-open on the
//! notification: the success response depends on the record existing, never
//! on the notifier.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use chrono::Utc;
use imprint_core::models::{Order, OrderResponse, OrderStatus, PrintMode};
use imprint_core::{sanitize_filename, AppError};
use std::collections::HashMap;
use std::sync::Arc;

/// Multipart form fields for a confirmation, before validation.
#[derive(Debug, Default)]
struct ConfirmForm {
    fields: HashMap<String, String>,
    proof: Option<(Vec<u8>, String)>,
}

async fn parse_confirm_form(mut multipart: Multipart) -> Result<ConfirmForm, AppError> {
    let mut form = ConfirmForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if name == "proof" {
            let filename = field
                .file_name()
                .map(|s: &str| s.to_string())
                .unwrap_or_else(|| "proof.jpg".to_string());
            let data = field.bytes().await.map_err(|e| {
                AppError::InvalidInput(format!("Failed to read proof image: {}", e))
            })?;
            form.proof = Some((data.to_vec(), filename));
        } else if !name.is_empty() {
            let value = field.text().await.map_err(|e| {
                AppError::InvalidInput(format!("Failed to read field '{}': {}", name, e))
            })?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

impl ConfirmForm {
    fn required(&self, name: &str, message: &str) -> Result<String, AppError> {
        match self.fields.get(name).map(|s| s.trim()) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(AppError::InvalidInput(message.to_string())),
        }
    }

    fn parse_i32(&self, name: &str) -> Result<i32, AppError> {
        self.required(name, &format!("Missing field '{}'", name))?
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("Field '{}' must be a number", name)))
    }
}

/// Order ids become part of filenames and URL paths; restrict them to a safe
/// charset instead of sanitizing after the fact.
fn validate_order_id(order_id: &str) -> Result<(), AppError> {
    let valid = !order_id.is_empty()
        && order_id.len() <= 64
        && !order_id.contains("..")
        && order_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(
            "Order id may only contain letters, digits, '-', '_' and '.'".to_string(),
        ))
    }
}

/// Parse a human-entered amount ("Rp 12.000", "12000") into a whole number.
fn parse_gross_amount(raw: &str) -> Result<i64, AppError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(AppError::InvalidInput(
            "Field 'gross_amount' must contain an amount".to_string(),
        ));
    }
    digits
        .parse()
        .map_err(|_| AppError::InvalidInput("Field 'gross_amount' is out of range".to_string()))
}

/// Apply the confirmation-time billing override: grayscale mode re-bills
/// every analyzed color page as grayscale.
fn apply_print_mode(print_mode: PrintMode, color_pages: i32, bw_pages: i32) -> (i32, i32) {
    match print_mode {
        PrintMode::Grayscale => (0, bw_pages + color_pages),
        PrintMode::Color => (color_pages, bw_pages),
    }
}

fn proof_extension(filename: &str) -> String {
    let ext: String = filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_lowercase();
    if ext.is_empty() {
        "jpg".to_string()
    } else {
        ext
    }
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "orders",
    responses(
        (status = 200, description = "Order confirmed", body = OrderResponse),
        (status = 400, description = "Missing proof, pickup location, or expired staging handle", body = ErrorResponse),
        (status = 500, description = "Order could not be persisted", body = ErrorResponse)
    )
)]
pub async fn confirm_order(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<OrderResponse>, HttpAppError> {
    let mut form = parse_confirm_form(multipart).await?;

    let (proof_data, proof_filename) = form
        .proof
        .take()
        .ok_or_else(|| AppError::InvalidInput("Payment proof is required".to_string()))?;
    let pickup_location = form.required("pickup_location", "Pickup location is required")?;
    let order_id = form.required("order_id", "Missing field 'order_id'")?;
    validate_order_id(&order_id)?;
    let staging_handle = form.required("staging_handle", "Missing field 'staging_handle'")?;

    let customer_name = form.required("customer_name", "Missing field 'customer_name'")?;
    let customer_phone = form.required("customer_phone", "Missing field 'customer_phone'")?;
    let payment_method = form.required("payment_method", "Missing field 'payment_method'")?;
    let gross_amount =
        parse_gross_amount(&form.required("gross_amount", "Missing field 'gross_amount'")?)?;
    let analyzed_color_pages = form.parse_i32("color_pages")?;
    let analyzed_bw_pages = form.parse_i32("bw_pages")?;
    let copies = form.parse_i32("copies")?;

    // Round-tripped by the client from the analyze response; re-sanitized
    // because it becomes part of the final filename.
    let original_name = sanitize_filename(
        &form.required("original_name", "Missing field 'original_name'")?,
    )?;

    let print_mode = PrintMode::parse(form.fields.get("print_mode").map_or("", |s| s.as_str()));

    // Billing override: applied at confirmation, not analysis.
    let (color_pages, bw_pages) =
        apply_print_mode(print_mode, analyzed_color_pages, analyzed_bw_pages);

    let proof_path = state
        .artifacts
        .store_proof(&proof_data, &proof_extension(&proof_filename), &order_id)
        .await?;

    // Moves the staged document; fails loudly when the handle has expired or
    // was already promoted, so no record is written with a dangling path.
    let file_path = state
        .artifacts
        .promote(&staging_handle, &order_id, &original_name)
        .await?;

    let order = Order {
        order_id,
        customer_name,
        customer_phone,
        transaction_time: Utc::now(),
        payment_method,
        status: OrderStatus::PendingVerification,
        gross_amount,
        color_pages,
        bw_pages,
        copies,
        color_page_range: form
            .fields
            .get("color_page_range")
            .cloned()
            .unwrap_or_default(),
        grayscale_page_range: form
            .fields
            .get("grayscale_page_range")
            .cloned()
            .unwrap_or_default(),
        original_name,
        file_path,
        proof_path,
        pickup_location,
        print_mode,
    };

    state.orders.insert(&order).await?;

    if let Some(notifier) = &state.notifier {
        notifier.notify_detached(&order);
    }

    Ok(Json(OrderResponse::from(order)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_charset_is_enforced() {
        assert!(validate_order_id("ORD-2026_08.1").is_ok());
        assert!(validate_order_id("").is_err());
        assert!(validate_order_id("../etc").is_err());
        assert!(validate_order_id("a..b").is_err());
        assert!(validate_order_id("id with spaces").is_err());
        assert!(validate_order_id(&"x".repeat(65)).is_err());
    }

    #[test]
    fn gross_amount_strips_formatting() {
        assert_eq!(parse_gross_amount("Rp 12.000").unwrap(), 12_000);
        assert_eq!(parse_gross_amount("12000").unwrap(), 12_000);
        assert!(parse_gross_amount("free").is_err());
    }

    #[test]
    fn grayscale_mode_rebills_all_pages_as_grayscale() {
        assert_eq!(apply_print_mode(PrintMode::Grayscale, 3, 7), (0, 10));
        assert_eq!(apply_print_mode(PrintMode::Grayscale, 0, 5), (0, 5));
    }

    #[test]
    fn color_mode_keeps_analyzed_counts() {
        assert_eq!(apply_print_mode(PrintMode::Color, 3, 7), (3, 7));
    }

    #[test]
    fn proof_extension_falls_back_to_jpg() {
        assert_eq!(proof_extension("receipt.PNG"), "png");
        assert_eq!(proof_extension("receipt"), "jpg");
        assert_eq!(proof_extension("weird.!@#"), "jpg");
    }
}
