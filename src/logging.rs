//! Logging aliases for the recovery engine
//!
//! The engine emits structured `tracing` events and never installs a
//! subscriber; the host application decides where they go.

pub use tracing::{debug as log_debug, error as log_error, info as log_info, warn as log_warn};
