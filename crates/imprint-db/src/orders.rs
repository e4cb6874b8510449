use chrono::{DateTime, Utc};
use sqlx::PgPool;

use imprint_core::models::{Order, OrderStatus, PrintMode};
use imprint_core::AppError;

/// Database row for an order; converted to the domain model on read.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    customer_name: String,
    customer_phone: String,
    transaction_time: DateTime<Utc>,
    payment_method: String,
    status: String,
    gross_amount: i64,
    color_pages: i32,
    bw_pages: i32,
    copies: i32,
    color_page_range: String,
    grayscale_page_range: String,
    original_name: String,
    file_path: String,
    proof_path: String,
    pickup_location: String,
    print_mode: String,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            order_id: row.order_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            transaction_time: row.transaction_time,
            payment_method: row.payment_method,
            status: OrderStatus::from(row.status),
            gross_amount: row.gross_amount,
            color_pages: row.color_pages,
            bw_pages: row.bw_pages,
            copies: row.copies,
            color_page_range: row.color_page_range,
            grayscale_page_range: row.grayscale_page_range,
            original_name: row.original_name,
            file_path: row.file_path,
            proof_path: row.proof_path,
            pickup_location: row.pickup_location,
            print_mode: PrintMode::parse(&row.print_mode),
        }
    }
}

/// File keys belonging to one order, fetched ahead of bulk deletion.
#[derive(Debug, sqlx::FromRow)]
pub struct OrderFiles {
    pub order_id: String,
    pub file_path: String,
    pub proof_path: String,
}

const SELECT_ORDER: &str = "SELECT order_id, customer_name, customer_phone, transaction_time, \
     payment_method, status, gross_amount, color_pages, bw_pages, copies, \
     color_page_range, grayscale_page_range, original_name, file_path, \
     proof_path, pickup_location, print_mode FROM orders";

/// Repository for the orders table.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a confirmed order. Exactly one record may exist per order id;
    /// a duplicate surfaces as a client error, not a server failure.
    pub async fn insert(&self, order: &Order) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO orders (order_id, customer_name, customer_phone, transaction_time, \
             payment_method, status, gross_amount, color_pages, bw_pages, copies, \
             color_page_range, grayscale_page_range, original_name, file_path, \
             proof_path, pickup_location, print_mode) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(&order.order_id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(order.transaction_time)
        .bind(&order.payment_method)
        .bind(order.status.as_str())
        .bind(order.gross_amount)
        .bind(order.color_pages)
        .bind(order.bw_pages)
        .bind(order.copies)
        .bind(&order.color_page_range)
        .bind(&order.grayscale_page_range)
        .bind(&order.original_name)
        .bind(&order.file_path)
        .bind(&order.proof_path)
        .bind(&order.pickup_location)
        .bind(order.print_mode.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::InvalidInput(format!("Order {} already exists", order.order_id))
            }
            _ => AppError::Database(e),
        })?;

        tracing::info!(order_id = %order.order_id, "Order record created");
        Ok(())
    }

    /// List orders, newest transaction first, optionally filtered by pickup
    /// location.
    pub async fn list(&self, pickup_location: Option<&str>) -> Result<Vec<Order>, AppError> {
        let rows: Vec<OrderRow> = match pickup_location {
            Some(location) => {
                sqlx::query_as(&format!(
                    "{} WHERE pickup_location = $1 ORDER BY transaction_time DESC",
                    SELECT_ORDER
                ))
                .bind(location)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("{} ORDER BY transaction_time DESC", SELECT_ORDER))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Order::from).collect())
    }

    /// Fetch one order by id.
    pub async fn get(&self, order_id: &str) -> Result<Option<Order>, AppError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("{} WHERE order_id = $1", SELECT_ORDER))
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Order::from))
    }

    /// Update the status field of one order. Returns the number of rows
    /// touched (zero when the order does not exist).
    pub async fn update_status(
        &self,
        order_id: &str,
        status: &OrderStatus,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE order_id = $2")
            .bind(status.as_str())
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Fetch the file keys for a set of orders ahead of bulk deletion.
    pub async fn file_paths(&self, order_ids: &[String]) -> Result<Vec<OrderFiles>, AppError> {
        let rows: Vec<OrderFiles> = sqlx::query_as(
            "SELECT order_id, file_path, proof_path FROM orders WHERE order_id = ANY($1)",
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete a set of orders by id. Returns the number of records removed.
    pub async fn delete_many(&self, order_ids: &[String]) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE order_id = ANY($1)")
            .bind(order_ids)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            requested = order_ids.len(),
            deleted = result.rows_affected(),
            "Bulk-deleted order records"
        );
        Ok(result.rows_affected())
    }
}
