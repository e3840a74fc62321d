//! # Cash Session Manager
//!
//! Tracks the open→close cycles of the physical cash drawer.
//!
//! ## State Machine
//! ```text
//!            open(initial)                 close(counted)
//!   (none) ───────────────► OPEN ─────────────────────────► CLOSED
//!                             │
//!                             └─► ledger: INCOME / CASH / initial
//!                                 "Abertura de Caixa" (opening float)
//! ```
//!
//! At most one session is OPEN at any time. A CLOSED session is final.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ledger::TransactionLedger;
use crate::money::Money;
use crate::types::{CashSession, PaymentMethod, SessionStatus, Transaction, TransactionDraft, TransactionKind};
use crate::validation::validate_non_negative;
use crate::OPENING_FLOAT_DESCRIPTION;

/// Result of opening the drawer: the session and its opening-float entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionOpening {
    pub session: CashSession,
    pub float_transaction: Transaction,
}

/// Every cash session, oldest first.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Vec<CashSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        SessionManager::default()
    }

    /// Rebuilds the manager from persisted sessions.
    ///
    /// Refuses state with more than one OPEN session or duplicate ids.
    pub fn from_sessions(sessions: Vec<CashSession>) -> CoreResult<Self> {
        let mut ids = HashSet::with_capacity(sessions.len());
        for session in &sessions {
            if !ids.insert(session.id.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "session id".to_string(),
                    value: session.id.clone(),
                }
                .into());
            }
        }

        let open: Vec<&CashSession> = sessions.iter().filter(|s| s.is_open()).collect();
        if open.len() > 1 {
            warn!(open = open.len(), "Loaded state has more than one open session");
            return Err(CoreError::AlreadyOpen {
                session_id: open[1].id.clone(),
            });
        }

        Ok(SessionManager { sessions })
    }

    /// Opens a new session and records the opening float in the ledger.
    ///
    /// ## Errors
    /// - `AlreadyOpen` when a session is already open
    /// - `Validation` when `initial` is negative
    pub fn open(
        &mut self,
        initial: Money,
        ledger: &mut TransactionLedger,
        at: DateTime<Utc>,
    ) -> CoreResult<SessionOpening> {
        validate_non_negative("initial amount", initial)?;
        if let Some(current) = self.current() {
            return Err(CoreError::AlreadyOpen {
                session_id: current.id.clone(),
            });
        }

        let mut draft = TransactionDraft::new(
            TransactionKind::Income,
            OPENING_FLOAT_DESCRIPTION,
            initial,
            PaymentMethod::Cash,
        );
        draft.opening_float = true;
        let float_transaction = ledger.record(draft, at)?;

        let session = CashSession {
            id: Uuid::new_v4().to_string(),
            opened_at: at,
            closed_at: None,
            initial_amount: initial,
            counted_amount: None,
            status: SessionStatus::Open,
        };

        info!(session_id = %session.id, initial = %initial, "Opened cash session");
        self.sessions.push(session.clone());

        Ok(SessionOpening {
            session,
            float_transaction,
        })
    }

    /// Closes the open session with the counted cash.
    ///
    /// `closed_at` never precedes `opened_at`, even if the clock stepped back.
    pub fn close(&mut self, counted: Money, at: DateTime<Utc>) -> CoreResult<CashSession> {
        validate_non_negative("counted amount", counted)?;
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.is_open())
            .ok_or(CoreError::NoOpenSession)?;

        session.closed_at = Some(at.max(session.opened_at));
        session.counted_amount = Some(counted);
        session.status = SessionStatus::Closed;

        info!(session_id = %session.id, counted = %counted, "Closed cash session");
        Ok(session.clone())
    }

    /// The open session, if any.
    pub fn current(&self) -> Option<&CashSession> {
        self.sessions.iter().find(|s| s.is_open())
    }

    /// Like [`current`](Self::current), failing with `NoOpenSession`.
    pub fn require_open(&self) -> CoreResult<&CashSession> {
        self.current().ok_or(CoreError::NoOpenSession)
    }

    pub fn get(&self, id: &str) -> Option<&CashSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn sessions(&self) -> &[CashSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_open_records_opening_float() {
        let mut sessions = SessionManager::new();
        let mut ledger = TransactionLedger::new();
        let now = Utc::now();

        let opening = sessions.open(Money::from_cents(10_000), &mut ledger, now).unwrap();

        assert!(opening.session.is_open());
        assert_eq!(opening.session.opened_at, now);
        assert!(opening.float_transaction.is_opening_float());
        assert_eq!(opening.float_transaction.kind, TransactionKind::Income);
        assert_eq!(opening.float_transaction.payment_method, PaymentMethod::Cash);
        assert_eq!(opening.float_transaction.description, OPENING_FLOAT_DESCRIPTION);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_second_open_is_rejected() {
        let mut sessions = SessionManager::new();
        let mut ledger = TransactionLedger::new();
        let first = sessions.open(Money::zero(), &mut ledger, Utc::now()).unwrap();

        let err = sessions.open(Money::from_cents(500), &mut ledger, Utc::now()).unwrap_err();
        match err {
            CoreError::AlreadyOpen { session_id } => assert_eq!(session_id, first.session.id),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sessions.len(), 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_negative_float_rejected() {
        let mut sessions = SessionManager::new();
        let mut ledger = TransactionLedger::new();
        assert!(sessions.open(Money::from_cents(-1), &mut ledger, Utc::now()).is_err());
        assert!(sessions.is_empty());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_close_without_open_session() {
        let mut sessions = SessionManager::new();
        assert!(matches!(
            sessions.close(Money::zero(), Utc::now()),
            Err(CoreError::NoOpenSession)
        ));
    }

    #[test]
    fn test_close_is_final_and_allows_reopen() {
        let mut sessions = SessionManager::new();
        let mut ledger = TransactionLedger::new();
        let opened_at = Utc::now();
        sessions.open(Money::from_cents(5_000), &mut ledger, opened_at).unwrap();

        let closed = sessions
            .close(Money::from_cents(4_900), opened_at + Duration::hours(8))
            .unwrap();
        assert_eq!(closed.status, SessionStatus::Closed);
        assert_eq!(closed.counted_amount, Some(Money::from_cents(4_900)));
        assert!(sessions.current().is_none());

        sessions.open(Money::zero(), &mut ledger, Utc::now()).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions.get(&closed.id).unwrap().status, SessionStatus::Closed);
    }

    #[test]
    fn test_close_never_precedes_open() {
        let mut sessions = SessionManager::new();
        let mut ledger = TransactionLedger::new();
        let opened_at = Utc::now();
        sessions.open(Money::zero(), &mut ledger, opened_at).unwrap();

        let closed = sessions.close(Money::zero(), opened_at - Duration::minutes(5)).unwrap();
        assert_eq!(closed.closed_at, Some(opened_at));
    }

    #[test]
    fn test_from_sessions_rejects_two_open() {
        let session = CashSession {
            id: "s-1".to_string(),
            opened_at: Utc::now(),
            closed_at: None,
            initial_amount: Money::zero(),
            counted_amount: None,
            status: SessionStatus::Open,
        };
        let mut second = session.clone();
        second.id = "s-2".to_string();

        assert!(SessionManager::from_sessions(vec![session.clone()]).is_ok());
        assert!(SessionManager::from_sessions(vec![session, second]).is_err());
    }
}
