//! Host side effects: clipboard and active-query changes.
//!
//! The core never talks to a UI directly. Callers pass a [`Host`] and get a
//! plain `bool` back; host errors are logged and go no further.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

use crate::error::HostError;

/// Side-effect sink provided by whoever embeds the generator.
pub trait Host: Send + Sync {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), HostError>;
    fn change_query(&self, query: &str) -> Result<(), HostError>;
}

/// Copy `text`, reporting success as a boolean.
pub fn safe_copy(host: &dyn Host, text: &str) -> bool {
    match host.copy_to_clipboard(text) {
        Ok(()) => true,
        Err(e) => {
            warn!("Copy failed: {}", e);
            false
        }
    }
}

/// Change the active query, reporting success as a boolean.
pub fn safe_change_query(host: &dyn Host, query: &str) -> bool {
    match host.change_query(query) {
        Ok(()) => true,
        Err(e) => {
            warn!("Query change failed: {}", e);
            false
        }
    }
}

/// Host for terminal sessions: "copying" prints the value on stdout, and
/// query changes are queued for the session loop to run next.
#[derive(Debug, Default)]
pub struct TerminalHost {
    pending: Mutex<Option<String>>,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The queued query, if an action asked for one
    pub fn take_pending_query(&self) -> Option<String> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Host for TerminalHost {
    fn copy_to_clipboard(&self, text: &str) -> Result<(), HostError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{text}")?;
        stdout.flush()?;
        Ok(())
    }

    fn change_query(&self, query: &str) -> Result<(), HostError> {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(query.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OfflineHost;

    impl Host for OfflineHost {
        fn copy_to_clipboard(&self, _text: &str) -> Result<(), HostError> {
            Err(HostError::Clipboard("no display".to_string()))
        }

        fn change_query(&self, _query: &str) -> Result<(), HostError> {
            Err(HostError::QueryChange("host closed".to_string()))
        }
    }

    #[test]
    fn test_failures_become_false() {
        assert!(!safe_copy(&OfflineHost, "x"));
        assert!(!safe_change_query(&OfflineHost, "rd pin "));
    }

    #[test]
    fn test_terminal_host_queues_query() {
        let host = TerminalHost::new();
        assert!(safe_change_query(&host, "rd pin "));
        assert_eq!(host.take_pending_query().as_deref(), Some("rd pin "));
        assert!(host.take_pending_query().is_none());
    }
}
