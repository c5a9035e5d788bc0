//! Network reachability input.
//!
//! The engine does not probe the network. An external monitor pushes
//! [`NetworkStatus`] updates and the engine polls the latest value when it
//! classifies an error.

use crate::logging::log_debug;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub is_connected: bool,
    pub is_internet_reachable: bool,
}

impl NetworkStatus {
    pub const ONLINE: NetworkStatus = NetworkStatus {
        is_connected: true,
        is_internet_reachable: true,
    };

    pub const OFFLINE: NetworkStatus = NetworkStatus {
        is_connected: false,
        is_internet_reachable: false,
    };

    pub fn is_reachable(&self) -> bool {
        self.is_connected && self.is_internet_reachable
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::ONLINE
    }
}

/// Source of the current reachability signal.
pub trait NetworkStatusProvider: Send + Sync {
    fn current(&self) -> NetworkStatus;

    fn is_reachable(&self) -> bool {
        self.current().is_reachable()
    }
}

/// Fixed status, for hosts without a monitor and for tests.
impl NetworkStatusProvider for NetworkStatus {
    fn current(&self) -> NetworkStatus {
        *self
    }
}

/// Latest-value cell fed by a platform reachability listener.
#[derive(Debug)]
pub struct NetworkMonitor {
    sender: watch::Sender<NetworkStatus>,
}

impl NetworkMonitor {
    pub fn new(initial: NetworkStatus) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Push a new status from the platform listener.
    pub fn update(&self, status: NetworkStatus) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
        if changed {
            log_debug!(
                is_connected = status.is_connected,
                is_internet_reachable = status.is_internet_reachable,
                "Network status changed"
            );
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.sender.subscribe()
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(NetworkStatus::default())
    }
}

impl NetworkStatusProvider for NetworkMonitor {
    fn current(&self) -> NetworkStatus {
        *self.sender.borrow()
    }
}
