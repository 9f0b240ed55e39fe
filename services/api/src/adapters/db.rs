//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `SessionStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use doc_insight_core::domain::{Payment, PaymentStatus, Session};
use doc_insight_core::ports::{PortError, PortResult, SessionStore};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SessionStore` port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    session_token: String,
    source_document: Option<String>,
    report_text: Option<String>,
    payment_id: Option<Uuid>,
}

impl SessionRecord {
    fn to_domain(self) -> Session {
        Session {
            id: self.id,
            session_token: self.session_token,
            source_document: self.source_document,
            report_text: self.report_text,
            payment_id: self.payment_id,
        }
    }
}

#[derive(FromRow)]
struct PaymentRecord {
    id: Uuid,
    order_reference: String,
    session_id: Uuid,
    status: String,
}

impl PaymentRecord {
    fn to_domain(self) -> PortResult<Payment> {
        let status = PaymentStatus::parse(&self.status).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown payment status '{}'", self.status))
        })?;
        Ok(Payment {
            id: self.id,
            order_reference: self.order_reference,
            session_id: self.session_id,
            status,
        })
    }
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for PgStore {
    async fn find_session_by_token(&self, token: &str) -> PortResult<Option<Session>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, session_token, source_document, report_text, payment_id \
             FROM sessions WHERE session_token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(SessionRecord::to_domain))
    }

    async fn session_token_exists(&self, token: &str) -> PortResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM sessions WHERE session_token = $1)",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(exists)
    }

    async fn create_session(&self, token: &str) -> PortResult<Session> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "INSERT INTO sessions (id, session_token) VALUES ($1, $2) \
             RETURNING id, session_token, source_document, report_text, payment_id",
        )
        .bind(Uuid::new_v4())
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_source_document(
        &self,
        session_id: Uuid,
        source_base64: &str,
    ) -> PortResult<()> {
        // A new upload invalidates both the report and the payment link.
        sqlx::query(
            "UPDATE sessions SET source_document = $1, report_text = NULL, payment_id = NULL \
             WHERE id = $2",
        )
        .bind(source_base64)
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn set_report_text(&self, session_id: Uuid, report_text: &str) -> PortResult<()> {
        sqlx::query("UPDATE sessions SET report_text = $1 WHERE id = $2")
            .bind(report_text)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn set_payment_link(&self, session_id: Uuid, payment_id: Uuid) -> PortResult<()> {
        sqlx::query("UPDATE sessions SET payment_id = $1 WHERE id = $2")
            .bind(payment_id)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn get_payment(&self, payment_id: Uuid) -> PortResult<Payment> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            "SELECT id, order_reference, session_id, status FROM payments WHERE id = $1",
        )
        .bind(payment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Payment {} not found", payment_id))
            }
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn find_payment_by_reference(
        &self,
        order_reference: &str,
    ) -> PortResult<Option<Payment>> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            "SELECT id, order_reference, session_id, status FROM payments \
             WHERE order_reference = $1",
        )
        .bind(order_reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(PaymentRecord::to_domain).transpose()
    }

    async fn payment_reference_exists(&self, order_reference: &str) -> PortResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM payments WHERE order_reference = $1)",
        )
        .bind(order_reference)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(exists)
    }

    async fn create_payment(
        &self,
        session_id: Uuid,
        order_reference: &str,
    ) -> PortResult<Payment> {
        let record = sqlx::query_as::<_, PaymentRecord>(
            "INSERT INTO payments (id, order_reference, session_id, status) \
             VALUES ($1, $2, $3, 'WAIT') \
             RETURNING id, order_reference, session_id, status",
        )
        .bind(Uuid::new_v4())
        .bind(order_reference)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn set_payment_status(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> PortResult<()> {
        sqlx::query("UPDATE payments SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(payment_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
