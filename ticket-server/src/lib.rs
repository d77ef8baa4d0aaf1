//! Ticket Server - HTTP front end of the receipt printer core
//!
//! # Architecture
//!
//! - **Printer service** (`services`): detect, connect, print and preview
//!   through [`ticket_printer`]
//! - **Store** (`store`): business and ticket configuration plus sales, in
//!   a JSON file
//! - **HTTP API** (`api`): thin axum routes over the printer service
//!
//! # Module layout
//!
//! ```text
//! ticket-server/src/
//! ├── core/          # config, state, server, errors
//! ├── services/      # printer facade
//! ├── store/         # store collaborator
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # error envelope, logger
//! ```

pub mod api;
pub mod core;
pub mod services;
pub mod store;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

pub use utils::logger::init_logger_with_file;

/// Load `.env`, prepare the log directory and start the logger
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty());

    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }

    init_logger_with_file(Some(&log_level), log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
  _____ _      _        _
 |_   _(_) ___| | _____| |_
   | | | |/ __| |/ / _ \ __|
   | | | | (__|   <  __/ |_
   |_| |_|\___|_|\_\___|\__|
    "#
    );
}
