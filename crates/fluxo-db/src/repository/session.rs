//! # Session Repository
//!
//! Stores cash drawer sessions. A partial unique index keeps at most one
//! OPEN row, mirroring the in-memory rule.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use fluxo_core::{CashSession, Money};

#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Every session, oldest first.
    pub async fn load_all(&self) -> DbResult<Vec<CashSession>> {
        let rows = sqlx::query(
            r#"
            SELECT id, opened_at, closed_at, initial_amount_cents, counted_amount_cents, status
            FROM cash_sessions
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let sessions = rows.iter().map(session_from_row).collect::<DbResult<Vec<_>>>()?;
        debug!(count = sessions.len(), "Loaded cash sessions");
        Ok(sessions)
    }

    /// The open session, if one is stored.
    pub async fn find_open(&self) -> DbResult<Option<CashSession>> {
        let row = sqlx::query(
            r#"
            SELECT id, opened_at, closed_at, initial_amount_cents, counted_amount_cents, status
            FROM cash_sessions
            WHERE status = 'OPEN'
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    pub async fn replace_all(&self, sessions: &[CashSession]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Self::replace_in(&mut tx, sessions).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    pub async fn replace_in(conn: &mut SqliteConnection, sessions: &[CashSession]) -> DbResult<()> {
        sqlx::query("DELETE FROM cash_sessions").execute(&mut *conn).await?;

        for (position, session) in sessions.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cash_sessions (
                    id, position, opened_at, closed_at,
                    initial_amount_cents, counted_amount_cents, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&session.id)
            .bind(position as i64)
            .bind(session.opened_at)
            .bind(session.closed_at)
            .bind(session.initial_amount.cents())
            .bind(session.counted_amount.map(|m| m.cents()))
            .bind(session.status)
            .execute(&mut *conn)
            .await?;
        }

        debug!(count = sessions.len(), "Replaced cash sessions");
        Ok(())
    }
}

fn session_from_row(row: &SqliteRow) -> DbResult<CashSession> {
    let counted: Option<i64> = row.try_get("counted_amount_cents")?;
    Ok(CashSession {
        id: row.try_get("id")?,
        opened_at: row.try_get("opened_at")?,
        closed_at: row.try_get("closed_at")?,
        initial_amount: Money::from_cents(row.try_get("initial_amount_cents")?),
        counted_amount: counted.map(Money::from_cents),
        status: row.try_get("status")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{Duration, Utc};
    use fluxo_core::SessionStatus;

    fn session(id: &str, status: SessionStatus) -> CashSession {
        let opened_at = Utc::now();
        let closed = status == SessionStatus::Closed;
        CashSession {
            id: id.to_string(),
            opened_at,
            closed_at: closed.then(|| opened_at + Duration::hours(8)),
            initial_amount: Money::from_units(100),
            counted_amount: closed.then(|| Money::from_cents(12_345)),
            status,
        }
    }

    #[tokio::test]
    async fn test_round_trip_and_find_open() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.sessions();
        let list = vec![session("s-1", SessionStatus::Closed), session("s-2", SessionStatus::Open)];

        repo.replace_all(&list).await.unwrap();
        assert_eq!(repo.load_all().await.unwrap(), list);
        assert_eq!(repo.find_open().await.unwrap().map(|s| s.id), Some("s-2".to_string()));
    }

    #[tokio::test]
    async fn test_second_open_session_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .sessions()
            .replace_all(&[session("s-1", SessionStatus::Open), session("s-2", SessionStatus::Open)])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(db.sessions().load_all().await.unwrap().is_empty());
    }
}
