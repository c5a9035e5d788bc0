//! User-facing message templates.
//!
//! Total over [`ErrorKind`]: every kind has a template, and `network` has two
//! variants depending on reachability.

use crate::core_types::{ErrorKind, RecoveryStrategy};

pub const NO_CONNECTION_MESSAGE: &str =
    "No internet connection. Please check your network settings and try again.";
pub const SERVER_UNREACHABLE_MESSAGE: &str =
    "Unable to reach the server. Please try again in a moment.";

/// Compose the message shown to the user for an error of `kind`.
pub fn compose_message(kind: ErrorKind, network_reachable: bool) -> String {
    let template = match kind {
        ErrorKind::Network if network_reachable => SERVER_UNREACHABLE_MESSAGE,
        ErrorKind::Network => NO_CONNECTION_MESSAGE,
        ErrorKind::FontLoading => {
            "Some fonts failed to load. The app will continue with system fonts."
        }
        ErrorKind::Storage => {
            "Unable to access local storage. Your changes may not be saved."
        }
        ErrorKind::Authentication => {
            "Your session could not be verified. Please sign in again or continue as a guest."
        }
        ErrorKind::Permissions => {
            "Permission required. Please enable the required permissions in your device settings."
        }
        ErrorKind::Initialization => "The app failed to start properly. Please try again.",
        ErrorKind::Critical => "A critical error occurred. Please restart the app.",
        ErrorKind::Unknown => "Something went wrong. Please try again.",
    };
    template.to_string()
}

/// Static guidance for strategies that have no automated recovery.
pub fn strategy_guidance(strategy: RecoveryStrategy) -> Option<&'static str> {
    match strategy {
        RecoveryStrategy::Manual => Some(
            "Open your device settings, grant the requested permissions, then return to the app.",
        ),
        RecoveryStrategy::Reload => Some("Close the app completely and open it again."),
        RecoveryStrategy::Retry
        | RecoveryStrategy::RetryWithFallback
        | RecoveryStrategy::FallbackOnly
        | RecoveryStrategy::GuestMode => None,
    }
}
