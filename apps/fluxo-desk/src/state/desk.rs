//! # Desk State
//!
//! The shared [`CashDesk`] plus the database it is persisted to.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  mutate(|desk| desk.ring_sale(req))                                     │
//! │                                                                         │
//! │  1. lock Mutex<CashDesk>           (other commands wait here)           │
//! │  2. clone into a working copy                                           │
//! │  3. run the operation on the copy  ──► CoreError: copy dropped          │
//! │  4. save_snapshot(copy)            ──► DbError:   copy dropped          │
//! │  5. swap the copy in, release lock                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Memory and disk therefore never disagree: an operation that fails to
//! persist leaves no trace in either.

use tokio::sync::Mutex;
use tracing::debug;

use crate::config::DeskConfig;
use crate::error::ApiResult;
use fluxo_core::{CashDesk, CoreResult};
use fluxo_db::Database;

#[derive(Debug)]
pub struct DeskState {
    desk: Mutex<CashDesk>,
    db: Database,
    config: DeskConfig,
}

impl DeskState {
    /// Loads the stored snapshot into a fresh desk.
    pub async fn load(db: Database, config: DeskConfig) -> ApiResult<Self> {
        let snapshot = db.load_snapshot().await?;
        let desk = CashDesk::from_snapshot(snapshot)?.with_currency(config.currency_format());
        Ok(DeskState::new(desk, db, config))
    }

    pub fn new(desk: CashDesk, db: Database, config: DeskConfig) -> Self {
        DeskState {
            desk: Mutex::new(desk),
            db,
            config,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// Runs a read-only closure under the lock.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let balance = state.read(|desk| desk.drawer_balance()).await;
    /// ```
    pub async fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CashDesk) -> R,
    {
        let desk = self.desk.lock().await;
        f(&desk)
    }

    /// Runs a mutating operation and persists the result before releasing
    /// the lock.
    pub async fn mutate<F, T>(&self, f: F) -> ApiResult<T>
    where
        F: FnOnce(&mut CashDesk) -> CoreResult<T>,
    {
        let mut desk = self.desk.lock().await;

        let mut working = desk.clone();
        let output = f(&mut working)?;
        self.db.save_snapshot(&working.snapshot()).await?;

        *desk = working;
        debug!("Desk state persisted");
        Ok(output)
    }
}
