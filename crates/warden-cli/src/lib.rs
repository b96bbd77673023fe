//! # Warden CLI
//!
//! Bootstrap and demo-data seeding, shared by the `warden-cli` binary and by
//! the server when it starts on the in-memory store.
//!
//! ```ignore
//! use warden_cli::seeder::{bootstrap, BootstrapConfig};
//!
//! let report = bootstrap(store.as_ref(), &BootstrapConfig::from_env()).await?;
//! ```

pub mod seeder;
