// region:    --- Imports
use crate::error::BackendError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// endregion: --- Imports

/// Codes reported by the backend for temporary connectivity problems
const TRANSIENT_CODES: [&str; 4] = [
    "unavailable",
    "deadline-exceeded",
    "cancelled",
    "network-request-failed",
];

/// Message fragments that indicate a connectivity problem
const TRANSIENT_FRAGMENTS: [&str; 5] = [
    "network",
    "connection",
    "failed to fetch",
    "internet",
    "timeout",
];

// region:    --- Network Status
/// Shared connectivity indicator. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct NetworkStatus {
    online: Arc<AtomicBool>,
}

impl NetworkStatus {
    pub fn online() -> Self {
        Self {
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::online()
    }
}
// endregion: --- Network Status

/// Whether `err` means the backend connection itself is gone (socket error or closed pool).
/// The retrier marks the shared `NetworkStatus` offline when it sees one.
pub fn is_disconnect(err: &BackendError) -> bool {
    matches!(
        err,
        BackendError::Database(sqlx::Error::Io(_) | sqlx::Error::PoolClosed)
    ) || err.code() == Some("network-request-failed")
}

/// Whether `err` is a transient connectivity failure worth retrying.
pub fn is_connection_error(err: &BackendError, network: &NetworkStatus) -> bool {
    if !network.is_online() {
        return true;
    }

    if let Some(code) = err.code() {
        if TRANSIENT_CODES
            .iter()
            .any(|transient| code.eq_ignore_ascii_case(transient))
        {
            return true;
        }
    }

    let message = err.to_string().to_lowercase();
    TRANSIENT_FRAGMENTS
        .iter()
        .any(|fragment| message.contains(fragment))
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn classify(code: &str, message: &str) -> bool {
        is_connection_error(&BackendError::status(code, message), &NetworkStatus::online())
    }

    #[test]
    fn transient_codes_are_retryable() {
        assert!(classify("unavailable", "service down"));
        assert!(classify("DEADLINE-EXCEEDED", "too slow"));
        assert!(classify("cancelled", "aborted by transport"));
        assert!(classify("network-request-failed", ""));
    }

    #[test]
    fn connectivity_messages_are_retryable() {
        assert!(classify("unknown", "Network error while reading"));
        assert!(classify("unknown", "lost CONNECTION to backend"));
        assert!(classify("unknown", "TypeError: Failed to fetch"));
        assert!(classify("unknown", "no internet"));
        assert!(classify("unknown", "request Timeout"));
    }

    #[test]
    fn application_errors_are_not_retryable() {
        assert!(!classify("permission-denied", "Missing or insufficient permissions."));
        assert!(!classify("failed-precondition", "The query requires an index."));
        assert!(!is_connection_error(
            &BackendError::NotFound {
                collection: "users".to_string(),
                id: "u1".to_string(),
            },
            &NetworkStatus::online()
        ));
    }

    #[test]
    fn offline_makes_everything_transient() {
        let network = NetworkStatus::online();
        let clone = network.clone();
        clone.set_online(false);
        assert!(is_connection_error(
            &BackendError::status("permission-denied", "denied"),
            &network
        ));
    }

    #[test]
    fn only_lost_connections_count_as_disconnects() {
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(is_disconnect(&BackendError::Database(sqlx::Error::Io(reset))));
        assert!(is_disconnect(&BackendError::Database(sqlx::Error::PoolClosed)));
        assert!(is_disconnect(&BackendError::status("network-request-failed", "")));
        assert!(!is_disconnect(&BackendError::Database(sqlx::Error::PoolTimedOut)));
        assert!(!is_disconnect(&BackendError::status("unavailable", "busy")));
    }

    #[test]
    fn pool_timeouts_are_transient() {
        assert!(is_connection_error(
            &BackendError::Database(sqlx::Error::PoolTimedOut),
            &NetworkStatus::online()
        ));
    }
}
// endregion: --- Tests
