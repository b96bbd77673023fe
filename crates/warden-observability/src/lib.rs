//! Warden observability.
//!
//! - [`logging`]: tracing subscriber setup and per-request logging
//! - [`metrics`]: Prometheus recorder, HTTP metrics and RBAC counters
//!
//! Metrics can be switched off at runtime with `OBSERVABILITY_ENABLED=false`;
//! logging is always on.
//!
//! ```no_run
//! use warden_observability::{init_metrics, init_tracing};
//!
//! #[tokio::main]
//! async fn main() {
//!     init_tracing();
//!     let _handle = init_metrics();
//! }
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_tracing, logging_middleware};
pub use metrics::{
    init_metrics, is_observability_enabled, metrics_app, metrics_middleware,
    track_login_failure, track_login_success, track_mutation, track_protected_rejection,
};
pub use metrics_exporter_prometheus::PrometheusHandle;
