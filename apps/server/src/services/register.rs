//! Register session lifecycle: open, close, reconcile.
//!
//! ## Lifecycle
//! ```text
//! open ──► sell, sell, ... ──► close
//!                 │
//!                 └─ reconcile (open session, or latest closed one)
//! ```
//!
//! Reconciliation only records the hand-counted drawer amount and notes; it
//! never adjusts balances. A closed session's balances are frozen because no
//! code path writes them once `is_open = 0`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use caixa_core::register::discrepancy;
use caixa_core::validation::{validate_amount_cents, validate_operator_name};
use caixa_core::{CoreError, Money, RegisterSession};
use caixa_db::repository::session::generate_session_id;
use caixa_db::{Database, DbError};

use crate::error::ApiError;

/// Request body for opening the register.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRegisterRequest {
    pub operator_name: String,
    pub opening_balance_cents: i64,
}

/// Request body for reconciling the register.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileRequest {
    pub physical_balance_cents: i64,
    pub notes: Option<String>,
}

/// Reconciliation outcome: the session plus the computed discrepancy.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileResponse {
    pub session: RegisterSession,
    /// physical − expected; negative means the drawer is short.
    pub discrepancy_cents: i64,
}

/// Register session workflows.
#[derive(Clone)]
pub struct RegisterService {
    db: Database,
}

impl RegisterService {
    pub fn new(db: Database) -> Self {
        RegisterService { db }
    }

    /// Opens a register session.
    ///
    /// All three balances start at the opening amount. Fails with 409 when
    /// this store already has an open session.
    pub async fn open(
        &self,
        store_id: &str,
        request: OpenRegisterRequest,
    ) -> Result<RegisterSession, ApiError> {
        validate_operator_name(&request.operator_name)?;
        validate_amount_cents("opening_balance_cents", request.opening_balance_cents)?;

        let session = RegisterSession {
            id: generate_session_id(),
            store_id: store_id.to_string(),
            is_open: true,
            operator_name: request.operator_name.trim().to_string(),
            opening_balance_cents: request.opening_balance_cents,
            current_balance_cents: request.opening_balance_cents,
            expected_balance_cents: request.opening_balance_cents,
            physical_balance_cents: None,
            reconciliation_notes: None,
            opened_at: Utc::now(),
            closed_at: None,
        };

        match self.db.sessions().insert_open(&session).await {
            Ok(()) => {}
            // The partial unique index caught a concurrent (or earlier) open
            Err(DbError::UniqueViolation { .. }) => {
                return Err(CoreError::SessionAlreadyOpen.into());
            }
            Err(other) => return Err(other.into()),
        }

        info!(
            store_id = %store_id,
            session_id = %session.id,
            operator = %session.operator_name,
            opening_balance = %Money::from_cents(session.opening_balance_cents),
            "register opened"
        );

        Ok(session)
    }

    /// Closes the open register session.
    ///
    /// Fails with `SessionNotFound` when no session is open (closing is a
    /// lookup that misses, unlike a sale, which is an operation that needs
    /// the register open). The closed row keeps its final balances; a later
    /// open creates a fresh session.
    pub async fn close(&self, store_id: &str) -> Result<RegisterSession, ApiError> {
        let closed = self
            .db
            .sessions()
            .close_open(store_id, Utc::now())
            .await?
            .ok_or(CoreError::SessionNotFound)?;

        info!(
            store_id = %store_id,
            session_id = %closed.id,
            final_balance = %Money::from_cents(closed.current_balance_cents),
            "register closed"
        );

        Ok(closed)
    }

    /// Records a reconciliation against the open session, or the most
    /// recently opened one when the register is closed.
    pub async fn reconcile(
        &self,
        store_id: &str,
        request: ReconcileRequest,
    ) -> Result<ReconcileResponse, ApiError> {
        validate_amount_cents("physical_balance_cents", request.physical_balance_cents)?;

        let sessions = self.db.sessions();
        let target = match sessions.find_open(store_id).await? {
            Some(open) => open,
            None => sessions
                .find_latest(store_id)
                .await?
                .ok_or(CoreError::SessionNotFound)?,
        };

        sessions
            .set_reconciliation(
                &target.id,
                request.physical_balance_cents,
                request.notes.as_deref(),
            )
            .await?;

        let session = sessions.get_by_id(&target.id).await?;
        let diff = discrepancy(
            Money::from_cents(request.physical_balance_cents),
            Money::from_cents(session.expected_balance_cents),
        );

        info!(
            store_id = %store_id,
            session_id = %session.id,
            discrepancy = %diff,
            "register reconciled"
        );

        Ok(ReconcileResponse {
            session,
            discrepancy_cents: diff.cents(),
        })
    }

    /// Returns the currently open session, or `None` when the register is
    /// closed.
    pub async fn current(&self, store_id: &str) -> Result<Option<RegisterSession>, ApiError> {
        Ok(self.db.sessions().find_open(store_id).await?)
    }
}
