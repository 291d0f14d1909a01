//! # Axum Helpers
//!
//! Small utilities shared by the HTTP surfaces of the workspace.
//!
//! ## Modules
//!
//! - **[`shutdown`]**: process-wide cancellation signal wired to SIGINT/SIGTERM
//! - **[`server`]**: listener bootstrap with graceful shutdown
//! - **[`health`]**: liveness and readiness probes
//! - **[`errors`]**: JSON fallback handlers
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::{ShutdownCoordinator, create_app, not_found, probe_router};
//! use core_config::server::ServerConfig;
//!
//! let shutdown = ShutdownCoordinator::new();
//! let router = Router::new().merge(probe_router("")).fallback(not_found);
//! create_app(router, &ServerConfig::default(), shutdown).await?;
//! ```

pub mod errors;
pub mod health;
pub mod server;
pub mod shutdown;

pub use errors::{MessageResponse, not_found};
pub use health::{ProbeResponse, liveness_handler, probe_router, readiness_handler};
pub use server::{create_app, serve};
pub use shutdown::ShutdownCoordinator;
