use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide "is the store reachable" flag.
///
/// Cloning shares the flag. Request handling only reads it; the value is
/// written by the startup connection attempt and by the liveness monitor.
#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    connected: Arc<AtomicBool>,
}

impl ConnectionStatus {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(connected)),
        }
    }

    /// A status that reports the store as reachable
    pub fn connected() -> Self {
        Self::new(true)
    }

    /// A status that reports the store as unreachable
    pub fn disconnected() -> Self {
        Self::new(false)
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Human-readable state name for health endpoints
    pub fn describe(&self) -> &'static str {
        if self.is_connected() {
            "connected"
        } else {
            "disconnected"
        }
    }

    /// Store a new value and return the previous one.
    pub(crate) fn mark(&self, connected: bool) -> bool {
        self.connected.swap(connected, Ordering::AcqRel)
    }
}

impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::disconnected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let status = ConnectionStatus::disconnected();
        let observer = status.clone();

        assert!(!observer.is_connected());
        let previous = status.mark(true);

        assert!(!previous);
        assert!(observer.is_connected());
        assert_eq!(observer.describe(), "connected");
    }

    #[test]
    fn test_default_is_disconnected() {
        let status = ConnectionStatus::default();
        assert!(!status.is_connected());
        assert_eq!(status.describe(), "disconnected");
    }
}
