//! # Fluxo Desk Entry Point
//!
//! Boots the desk and reports its state. A UI embeds `fluxo_desk_lib`
//! and calls the command functions directly; this binary checks that
//! the configuration, database and stored state load cleanly.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match fluxo_desk_lib::run().await {
        Ok(app) => {
            let status = fluxo_desk_lib::commands::register::register_status(&app.desk).await;
            println!(
                "{}: {} ({})",
                status.store_name,
                if status.session.is_some() { "caixa aberto" } else { "caixa fechado" },
                status.balance_display
            );
            app.desk.database().close().await;
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("fluxo-desk: {}", err);
            ExitCode::FAILURE
        }
    }
}
