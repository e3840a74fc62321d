//! # Fluxo Desk Library
//!
//! Host layer for the cash desk: configuration, logging, shared state and
//! the command functions a UI calls.
//!
//! ## Module Organization
//! ```text
//! fluxo_desk_lib/
//! ├── lib.rs          ◄─── You are here (boot sequence)
//! ├── config.rs       ◄─── desk.toml + FLUXO_* overrides
//! ├── error.rs        ◄─── ApiError returned by commands
//! ├── state/
//! │   ├── desk.rs     ◄─── Mutex<CashDesk> + Database
//! │   └── cart.rs     ◄─── Ticket being assembled
//! └── commands/
//!     ├── register.rs ◄─── Drawer, expenses, income, cancel
//!     ├── sale.rs     ◄─── Cart and checkout
//!     ├── inventory.rs◄─── Products and stock receipts
//!     └── reports.rs  ◄─── Summaries, export, advisory, import
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use config::{default_config_path, DeskConfig};
use error::ApiResult;
use fluxo_db::{Database, DbConfig};
use state::{CartState, DeskState};

/// Everything a UI needs to serve commands.
#[derive(Debug)]
pub struct DeskApp {
    pub desk: DeskState,
    pub cart: CartState,
}

/// Boots the desk.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging                                                  │
/// │     • tracing-subscriber with env filter (RUST_LOG overrides)           │
/// │                                                                         │
/// │  2. Load Configuration                                                  │
/// │     • desk.toml in the platform config dir, FLUXO_* overrides           │
/// │                                                                         │
/// │  3. Connect to Database                                                 │
/// │     • FLUXO_DB_PATH / [database].path / platform data dir               │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │                                                                         │
/// │  4. Load Snapshot                                                       │
/// │     • products, ledger, sessions into the CashDesk                      │
/// │                                                                         │
/// │  5. Log Status                                                          │
/// │     • open session and drawer balance                                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ApiResult<DeskApp> {
    init_tracing();
    info!("Starting Fluxo desk");

    let config_path = default_config_path()?;
    let config = DeskConfig::load_or_default(&config_path)?;
    info!(store = %config.store.name, "Configuration loaded");

    let db_path = config.database_path()?;
    info!(?db_path, "Database path determined");
    let db = Database::new(DbConfig::new(db_path).max_connections(config.database.max_connections)).await?;
    info!("Database connected and migrations applied");

    let desk = DeskState::load(db, config).await?;
    log_status(&desk).await;

    Ok(DeskApp {
        desk,
        cart: CartState::new(),
    })
}

async fn log_status(state: &DeskState) {
    let (products, transactions, session, balance) = state
        .read(|desk| {
            (
                desk.stock().len(),
                desk.ledger().len(),
                desk.current_session().map(|s| s.id.clone()),
                desk.drawer_balance().format(desk.currency()),
            )
        })
        .await;

    match session {
        Some(session_id) => info!(
            products,
            transactions,
            %session_id,
            %balance,
            "Desk ready, drawer open"
        ),
        None => info!(products, transactions, "Desk ready, drawer closed"),
    }
}

/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=fluxo=trace` - Trace for fluxo crates only
/// - Default: `info,fluxo=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fluxo=debug,sqlx=warn"));

    // A second init (tests, embedding hosts) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .try_init();
}
