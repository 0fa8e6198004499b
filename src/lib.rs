//! plugup
//!
//! In-place plugin updater: checks a GitHub repository for a newer
//! published release and installs it by extracting the release archive
//! over the plugin's installation directory.
//!
//! # Architecture
//!
//! - **Update Module**: HTTP transport, releases API client, asset
//!   fetcher, ZIP extraction, and the orchestrator tying them together
//! - **Config Module**: `.pluguprc` key/value configuration
//! - **Logging Module**: file-based tracing output with retention cleanup
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use plugup::config::Config;
//! use plugup::update::{HttpClient, Updater};
//!
//! let config = Config::load().expect("Failed to load config");
//! let client = HttpClient::new(&config.user_agent, Some(config.timeout())).expect("empty user agent");
//! let transport = Arc::new(client);
//! let mut updater = Updater::new(config.update_options(), transport);
//! // updater.check(), then updater.upgrade() on confirmation...
//! ```

// Clippy configuration - allow common patterns
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod logging;
pub mod update;

// Re-export main types
pub use config::Config;
pub use update::{
    HttpClient, Transport, UpdateCheck, UpdateError, UpdateOptions, UpdatePhase, Updater,
};
