//! Validate-then-persist handling of a single status update.
//!
//! A request moves through four steps and stops at the first failure:
//!
//! 1. **Secret check** - the configured secret must occur somewhere in the body
//! 2. **Ensure exists** - the status cell is created empty if absent, and must be readable
//! 3. **Writability** - the status cell must accept writes
//! 4. **Write** - the whole body replaces the cell's contents
//!
//! Every failure is recorded once in the diagnostic log. Nothing is retried.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::{ConfigError, WebhookConfig};
use crate::diagnostics::{DiagnosticLog, FileDiagnosticLog};
use crate::error::UpdateError;
use crate::store::{FileStatusStore, StatusStore};

/// Result of an accepted update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Updated {
    /// Number of bytes now held by the status cell
    pub bytes: usize,
}

/// Byte-exact, case-sensitive substring search.
///
/// Returns whether `secret` occurs anywhere in `body`, a match at offset 0
/// included. An empty secret matches every body.
pub fn contains_secret(body: &[u8], secret: &[u8]) -> bool {
    if secret.is_empty() {
        return true;
    }
    body.windows(secret.len()).any(|window| window == secret)
}

/// Render a body for a single diagnostic line.
///
/// Control characters are escaped (`\n`, `\r`, `\t`, `\u{..}`) so a
/// rejected body never splits its log entry across lines. Everything else,
/// quotes included, is kept as submitted.
pub fn single_line(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut rendered = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            rendered.extend(c.escape_default());
        } else {
            rendered.push(c);
        }
    }
    rendered
}

pub struct StatusUpdater {
    secret: Vec<u8>,
    store: Arc<dyn StatusStore>,
    log: Arc<dyn DiagnosticLog>,
}

impl StatusUpdater {
    pub fn new(
        secret: impl Into<Vec<u8>>,
        store: Arc<dyn StatusStore>,
        log: Arc<dyn DiagnosticLog>,
    ) -> Self {
        Self {
            secret: secret.into(),
            store,
            log,
        }
    }

    /// Build a file-backed updater from webhook configuration.
    pub fn from_config(config: &WebhookConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        let tz = config.tz()?;
        let store = FileStatusStore::new(&config.status_file);
        let log = FileDiagnosticLog::new(config.log_file(), tz, clock);

        tracing::info!(
            status_file = %store.path().display(),
            log_file = %log.path().display(),
            timezone = %tz,
            "Status updater configured"
        );

        Ok(Self::new(
            config.secret.as_bytes(),
            Arc::new(store),
            Arc::new(log),
        ))
    }

    /// Validate `body` and, if accepted, make it the new status.
    ///
    /// On error the status cell is left as it was and exactly one line has
    /// been appended to the diagnostic log.
    pub fn handle(&self, body: &[u8]) -> Result<Updated, UpdateError> {
        let result = self.apply(body);
        if let Err(err) = &result {
            self.record_failure(err);
        }
        result
    }

    /// Append `err` to the diagnostic log.
    pub fn record_failure(&self, err: &UpdateError) {
        tracing::warn!(error = %err, "Status update rejected");
        self.log.record(&err.to_string());
    }

    fn apply(&self, body: &[u8]) -> Result<Updated, UpdateError> {
        if !contains_secret(body, &self.secret) {
            return Err(UpdateError::SecretMissing {
                body: single_line(body),
            });
        }

        if let Err(e) = self.store.ensure_exists() {
            tracing::debug!(error = %e, "Failed to create status file");
            return Err(UpdateError::FileUnavailable);
        }

        let access = self.store.access();
        if !access.exists || !access.readable {
            return Err(UpdateError::FileUnavailable);
        }
        if !access.writable {
            return Err(UpdateError::FileNotWritable);
        }

        self.store.replace(body)?;

        tracing::info!(bytes = body.len(), "Status updated");
        Ok(Updated { bytes: body.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::diagnostics::MemoryDiagnosticLog;
    use crate::store::MemoryStatusStore;
    use chrono::{TimeZone, Utc};

    const SECRET: &str = "123456789";

    type Fixture = (StatusUpdater, Arc<MemoryStatusStore>, Arc<MemoryDiagnosticLog>);

    fn fixture(store: MemoryStatusStore) -> Fixture {
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 5, 4, 6, 7, 8).unwrap(),
        ));
        let store = Arc::new(store);
        let log = Arc::new(MemoryDiagnosticLog::new(chrono_tz::Europe::Berlin, clock));
        let updater = StatusUpdater::new(SECRET, store.clone(), log.clone());
        (updater, store, log)
    }

    #[test]
    fn test_contains_secret_positions() {
        assert!(contains_secret(b"123456789", b"123456789"));
        assert!(contains_secret(b"123456789:home", b"123456789"));
        assert!(contains_secret(b"home:123456789", b"123456789"));
        assert!(contains_secret(b"{\"s\":\"123456789\"}", b"123456789"));
        assert!(!contains_secret(b"home", b"123456789"));
        assert!(!contains_secret(b"12345678", b"123456789"));
        assert!(!contains_secret(b"", b"123456789"));
    }

    #[test]
    fn test_contains_secret_is_case_sensitive() {
        assert!(!contains_secret(b"HOME:SECRET", b"secret"));
        assert!(contains_secret(b"home:secret", b"secret"));
    }

    #[test]
    fn test_contains_secret_empty_secret() {
        assert!(contains_secret(b"anything", b""));
        assert!(contains_secret(b"", b""));
    }

    #[test]
    fn test_valid_body_is_written() {
        let (updater, store, log) = fixture(MemoryStatusStore::with_contents("away:123456789"));

        let updated = updater.handle(b"home:123456789").unwrap();

        assert_eq!(updated, Updated { bytes: 14 });
        assert_eq!(store.load().unwrap(), Some(b"home:123456789".to_vec()));
        assert!(log.lines().is_empty());
    }

    #[test]
    fn test_secret_at_offset_zero_is_accepted() {
        let (updater, store, log) = fixture(MemoryStatusStore::new());

        updater.handle(b"123456789 away").unwrap();

        assert_eq!(store.load().unwrap(), Some(b"123456789 away".to_vec()));
        assert!(log.lines().is_empty());
    }

    #[test]
    fn test_missing_secret_leaves_status_and_logs_once() {
        let (updater, store, log) = fixture(MemoryStatusStore::with_contents("away:123456789"));

        let err = updater.handle(b"home").unwrap_err();

        assert!(matches!(err, UpdateError::SecretMissing { .. }));
        assert_eq!(store.load().unwrap(), Some(b"away:123456789".to_vec()));
        assert_eq!(
            log.lines(),
            vec![
                "[2024-05-04 08:07:08] Submitted body home does not contain secret. -> Exit"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_single_line_escapes_control_characters() {
        assert_eq!(single_line(b"home"), "home");
        assert_eq!(single_line(b"home\naway"), "home\\naway");
        assert_eq!(single_line(b"a\r\nb\tc"), "a\\r\\nb\\tc");
        assert_eq!(single_line(b"{\"s\":\"x\"}"), "{\"s\":\"x\"}");
        assert_eq!(single_line(&[0x1b, b'x']), "\\u{1b}x");
    }

    #[test]
    fn test_multi_line_body_logs_one_line() {
        let (updater, _store, log) = fixture(MemoryStatusStore::new());

        updater.handle(b"home\naway\n").unwrap_err();

        assert_eq!(
            log.lines(),
            vec![concat!(
                "[2024-05-04 08:07:08] Submitted body home\\naway\\n ",
                "does not contain secret. -> Exit"
            )
            .to_string()]
        );
    }

    #[test]
    fn test_write_failure_is_unexpected_and_logged_once() {
        let store = MemoryStatusStore::with_contents("away");
        store.set_replace_error(Some(std::io::ErrorKind::WriteZero));
        let (updater, store, log) = fixture(store);

        let err = updater.handle(b"home:123456789").unwrap_err();

        assert!(matches!(err, UpdateError::Unexpected(_)));
        assert_eq!(err.to_string(), "status cell write failed");
        assert_eq!(store.load().unwrap(), Some(b"away".to_vec()));
        assert_eq!(
            log.lines(),
            vec!["[2024-05-04 08:07:08] status cell write failed".to_string()]
        );
    }

    #[test]
    fn test_missing_secret_does_not_create_file() {
        let (updater, store, _log) = fixture(MemoryStatusStore::new());

        updater.handle(b"home").unwrap_err();

        assert!(!store.access().exists);
    }

    #[test]
    fn test_repeated_body_overwrites() {
        let (updater, store, _log) = fixture(MemoryStatusStore::new());

        for _ in 0..3 {
            updater.handle(b"home:123456789").unwrap();
        }

        assert_eq!(store.load().unwrap(), Some(b"home:123456789".to_vec()));
    }

    #[test]
    fn test_shorter_body_replaces_longer_one() {
        let (updater, store, _log) = fixture(MemoryStatusStore::new());

        updater.handle(b"away for the weekend:123456789").unwrap();
        updater.handle(b"123456789").unwrap();

        assert_eq!(store.load().unwrap(), Some(b"123456789".to_vec()));
    }

    #[test]
    fn test_absent_cell_is_created_and_written() {
        let (updater, store, _log) = fixture(MemoryStatusStore::new());

        updater.handle(b"home:123456789").unwrap();

        assert_eq!(store.load().unwrap(), Some(b"home:123456789".to_vec()));
    }

    #[test]
    fn test_creation_failure_is_unavailable() {
        let store = MemoryStatusStore::new();
        store.set_creatable(false);
        let (updater, store, log) = fixture(store);

        let err = updater.handle(b"home:123456789").unwrap_err();

        assert!(matches!(err, UpdateError::FileUnavailable));
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(
            log.lines(),
            vec!["[2024-05-04 08:07:08] Status File does not exist or is not readable!".to_string()]
        );
    }

    #[test]
    fn test_unreadable_cell_is_unavailable() {
        let store = MemoryStatusStore::with_contents("away");
        store.set_readable(false);
        let (updater, store, log) = fixture(store);

        let err = updater.handle(b"home:123456789").unwrap_err();

        assert!(matches!(err, UpdateError::FileUnavailable));
        assert_eq!(store.load().unwrap(), Some(b"away".to_vec()));
        assert_eq!(log.lines().len(), 1);
    }

    #[test]
    fn test_read_only_cell_is_not_writable() {
        let store = MemoryStatusStore::with_contents("away");
        store.set_writable(false);
        let (updater, store, log) = fixture(store);

        let err = updater.handle(b"home:123456789").unwrap_err();

        assert!(matches!(err, UpdateError::FileNotWritable));
        assert_eq!(store.load().unwrap(), Some(b"away".to_vec()));
        assert_eq!(
            log.lines(),
            vec!["[2024-05-04 08:07:08] Status File is not writable!".to_string()]
        );
    }

    #[test]
    fn test_non_utf8_body_is_stored_verbatim() {
        let (updater, store, _log) = fixture(MemoryStatusStore::new());
        let body = [0xff, 0xfe, b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9'];

        updater.handle(&body).unwrap();

        assert_eq!(store.load().unwrap(), Some(body.to_vec()));
    }
}
