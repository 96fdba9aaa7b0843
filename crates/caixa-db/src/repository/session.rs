//! # Register Session Repository
//!
//! Database operations for register sessions.
//!
//! ## Session Rows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Register Session Lifecycle                      │
//! │                                                                 │
//! │  1. OPEN                                                        │
//! │     └── insert_open() → row with is_open=1                      │
//! │         (partial unique index rejects a second open row)        │
//! │                                                                 │
//! │  2. ACCUMULATE                                                  │
//! │     └── credit_balances_in() per finalized sale                 │
//! │         (atomic additive update, guarded by is_open=1)          │
//! │                                                                 │
//! │  3. CLOSE                                                       │
//! │     └── close_open() → is_open=0, closed_at set,                │
//! │         balances frozen                                         │
//! │                                                                 │
//! │  4. RECONCILE (either state)                                    │
//! │     └── set_reconciliation() → physical balance + notes only    │
//! │                                                                 │
//! │  Rows are never deleted; history is append-only.                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caixa_core::RegisterSession;

const SESSION_COLUMNS: &str = "id, store_id, is_open, operator_name, \
     opening_balance_cents, current_balance_cents, expected_balance_cents, \
     physical_balance_cents, reconciliation_notes, opened_at, closed_at";

/// Repository for register-session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Inserts a freshly opened session.
    ///
    /// The `idx_register_sessions_one_open` partial unique index makes this
    /// fail with `DbError::UniqueViolation` when the store already has an
    /// open session, even under concurrent open() calls.
    pub async fn insert_open(&self, session: &RegisterSession) -> DbResult<()> {
        debug!(
            id = %session.id,
            store_id = %session.store_id,
            operator = %session.operator_name,
            "opening register session"
        );

        sqlx::query(
            r#"
            INSERT INTO register_sessions (
                id, store_id, is_open, operator_name,
                opening_balance_cents, current_balance_cents, expected_balance_cents,
                physical_balance_cents, reconciliation_notes,
                opened_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&session.id)
        .bind(&session.store_id)
        .bind(session.is_open)
        .bind(&session.operator_name)
        .bind(session.opening_balance_cents)
        .bind(session.current_balance_cents)
        .bind(session.expected_balance_cents)
        .bind(session.physical_balance_cents)
        .bind(&session.reconciliation_notes)
        .bind(session.opened_at)
        .bind(session.closed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<RegisterSession> {
        let session = sqlx::query_as::<_, RegisterSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("RegisterSession", id))?;

        Ok(session)
    }

    /// Returns the store's open session, if any.
    pub async fn find_open(&self, store_id: &str) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions \
             WHERE store_id = ?1 AND is_open = 1"
        ))
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Returns the store's most recently opened session, open or closed.
    /// This is the reconciliation target when no session is open.
    pub async fn find_latest(&self, store_id: &str) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions \
             WHERE store_id = ?1 ORDER BY opened_at DESC LIMIT 1"
        ))
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Closes the store's open session, freezing its balances.
    ///
    /// Returns the closed session, or `None` when no session was open.
    pub async fn close_open(
        &self,
        store_id: &str,
        closed_at: DateTime<Utc>,
    ) -> DbResult<Option<RegisterSession>> {
        debug!(store_id = %store_id, "closing register session");

        let id: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE register_sessions
            SET is_open = 0, closed_at = ?2
            WHERE store_id = ?1 AND is_open = 1
            RETURNING id
            "#,
        )
        .bind(store_id)
        .bind(closed_at)
        .fetch_optional(&self.pool)
        .await?;

        match id {
            Some(id) => Ok(Some(self.get_by_id(&id).await?)),
            None => Ok(None),
        }
    }

    /// Records the hand-counted balance and notes on a session.
    ///
    /// Only `physical_balance_cents` and `reconciliation_notes` are written;
    /// the expected balance is deliberately untouched (discrepancies are
    /// reported, not corrected).
    pub async fn set_reconciliation(
        &self,
        session_id: &str,
        physical_balance_cents: i64,
        notes: Option<&str>,
    ) -> DbResult<()> {
        debug!(session_id = %session_id, physical = %physical_balance_cents, "reconciling session");

        let result = sqlx::query(
            r#"
            UPDATE register_sessions
            SET physical_balance_cents = ?2, reconciliation_notes = ?3
            WHERE id = ?1
            "#,
        )
        .bind(session_id)
        .bind(physical_balance_cents)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("RegisterSession", session_id));
        }

        Ok(())
    }

    /// Returns the open session inside a caller-owned transaction.
    ///
    /// Used by the sale commit path so the session resolved is the same one
    /// the balance credit lands on.
    pub async fn find_open_in(
        conn: &mut SqliteConnection,
        store_id: &str,
    ) -> DbResult<Option<RegisterSession>> {
        let session = sqlx::query_as::<_, RegisterSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions \
             WHERE store_id = ?1 AND is_open = 1"
        ))
        .bind(store_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(session)
    }

    /// Credits a finalized sale's total to the session balances.
    ///
    /// Additive single-statement update: safe under concurrent application
    /// because increments commute and never read-modify-write in Rust. The
    /// `is_open = 1` guard means a session closed mid-flight rejects the
    /// credit (returns `false`), and the caller rolls the sale back.
    pub async fn credit_balances_in(
        conn: &mut SqliteConnection,
        session_id: &str,
        amount_cents: i64,
    ) -> DbResult<bool> {
        debug!(session_id = %session_id, amount = %amount_cents, "crediting session balances");

        let result = sqlx::query(
            r#"
            UPDATE register_sessions
            SET current_balance_cents = current_balance_cents + ?2,
                expected_balance_cents = expected_balance_cents + ?2
            WHERE id = ?1 AND is_open = 1
            "#,
        )
        .bind(session_id)
        .bind(amount_cents)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Helper to generate a new session ID.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn open_session(store_id: &str, opening_cents: i64) -> RegisterSession {
        RegisterSession {
            id: generate_session_id(),
            store_id: store_id.to_string(),
            is_open: true,
            operator_name: "Maria".to_string(),
            opening_balance_cents: opening_cents,
            current_balance_cents: opening_cents,
            expected_balance_cents: opening_cents,
            physical_balance_cents: None,
            reconciliation_notes: None,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_open() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();

        assert!(repo.find_open("store-1").await.unwrap().is_none());

        let session = open_session("store-1", 20_000);
        repo.insert_open(&session).await.unwrap();

        let found = repo.find_open("store-1").await.unwrap().unwrap();
        assert_eq!(found.id, session.id);
        assert_eq!(found.current_balance_cents, 20_000);
        assert_eq!(found.expected_balance_cents, 20_000);
        assert!(found.is_open);
    }

    #[tokio::test]
    async fn test_second_open_session_rejected_by_index() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();

        repo.insert_open(&open_session("store-1", 10_000))
            .await
            .unwrap();
        let err = repo
            .insert_open(&open_session("store-1", 5_000))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // A different store is unaffected
        repo.insert_open(&open_session("store-2", 5_000))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_close_open_freezes_and_allows_reopen() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();

        let first = open_session("store-1", 10_000);
        repo.insert_open(&first).await.unwrap();

        let closed = repo
            .close_open("store-1", Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(closed.id, first.id);
        assert!(!closed.is_open);
        assert!(closed.closed_at.is_some());

        // Nothing open now
        assert!(repo.close_open("store-1", Utc::now()).await.unwrap().is_none());

        // Reopen creates a distinct row; the closed one survives
        let second = open_session("store-1", 7_500);
        repo.insert_open(&second).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(repo.get_by_id(&first.id).await.unwrap().is_open, false);
    }

    #[tokio::test]
    async fn test_credit_balances_requires_open_session() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();

        let session = open_session("store-1", 1_000);
        repo.insert_open(&session).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        let ok = SessionRepository::credit_balances_in(&mut *tx, &session.id, 2_500)
            .await
            .unwrap();
        assert!(ok);
        tx.commit().await.unwrap();

        let found = repo.get_by_id(&session.id).await.unwrap();
        assert_eq!(found.current_balance_cents, 3_500);
        assert_eq!(found.expected_balance_cents, 3_500);

        // After close the guard rejects credits
        repo.close_open("store-1", Utc::now()).await.unwrap();
        let mut tx = db.begin().await.unwrap();
        let ok = SessionRepository::credit_balances_in(&mut *tx, &session.id, 99)
            .await
            .unwrap();
        assert!(!ok);
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_reconciliation_leaves_expected_untouched() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();

        let session = open_session("store-1", 30_000);
        repo.insert_open(&session).await.unwrap();
        repo.close_open("store-1", Utc::now()).await.unwrap();

        repo.set_reconciliation(&session.id, 29_850, Some("falta troco"))
            .await
            .unwrap();

        let found = repo.get_by_id(&session.id).await.unwrap();
        assert_eq!(found.physical_balance_cents, Some(29_850));
        assert_eq!(found.reconciliation_notes.as_deref(), Some("falta troco"));
        // Expected balance untouched by reconciliation
        assert_eq!(found.expected_balance_cents, 30_000);
    }

    #[tokio::test]
    async fn test_find_latest_prefers_most_recent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();

        let mut first = open_session("store-1", 1_000);
        first.opened_at = Utc::now() - chrono::Duration::hours(2);
        repo.insert_open(&first).await.unwrap();
        repo.close_open("store-1", Utc::now()).await.unwrap();

        let second = open_session("store-1", 2_000);
        repo.insert_open(&second).await.unwrap();
        repo.close_open("store-1", Utc::now()).await.unwrap();

        let latest = repo.find_latest("store-1").await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }
}
