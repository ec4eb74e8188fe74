//! Tag session controller.
//!
//! A [`TagSession`] mediates every call to the [`NfcProvider`] for exactly one
//! read or write at a time:
//!
//! 1. cancel whatever the provider still holds (errors ignored),
//! 2. wait for the previous session to finish releasing,
//! 3. request the `Ndef` technology (writes retry up to the configured limit,
//!    unless the request was cancelled),
//! 4. read or write,
//! 5. release the technology, whatever happened in 3 and 4.
//!
//! A session that a cancel or a newer session superseded reports
//! [`SessionOutcome::Cancelled`] instead of its failure and leaves the state
//! alone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use tokio::sync::Mutex as AsyncMutex;

use crate::config::SessionConfig;
use crate::error::{NfcProviderError, NoDataReason, SessionError, TagKitError};
use crate::ndef::{encode_message, is_type, uri_record, UriRecord, RTD_URI, TNF_WELL_KNOWN};
use crate::provider::{NfcProvider, NfcTech};

mod state;

pub use state::{Mode, SessionOutcome, SessionState};

/// Owns the NFC radio hold for one logical operation at a time.
#[derive(uniffi::Object)]
pub struct TagSession {
    provider: Arc<dyn NfcProvider>,
    config: SessionConfig,
    state: Mutex<SessionState>,
    /// Bumped by every new session and every cancel.
    generation: AtomicU64,
    /// Held for the whole acquire/operate/release sequence.
    gate: AsyncMutex<()>,
}

#[uniffi::export(async_runtime = "tokio")]
impl TagSession {
    /// Creates a session controller over `provider`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `config` fails validation.
    #[uniffi::constructor]
    pub fn new(
        provider: Arc<dyn NfcProvider>,
        config: Option<SessionConfig>,
    ) -> Result<Self, TagKitError> {
        let config = config.unwrap_or_default();
        config.validate()?;
        Ok(Self {
            provider,
            config,
            state: Mutex::new(SessionState::Idle),
            generation: AtomicU64::new(0),
            gate: AsyncMutex::new(()),
        })
    }

    /// Reads the URI stored on the next presented tag.
    ///
    /// The technology is requested once. Fails with `AcquisitionFailed`,
    /// `NoDataOnTag` for tags without a leading URI record, or
    /// `UnknownIoFailure` when the provider fails to return the tag.
    pub async fn begin_read(&self) -> SessionOutcome {
        self.run(Operation::Read, 1).await
    }

    /// Writes `url`, normalized, to the next presented tag.
    ///
    /// Fails with `AcquisitionFailed` once every attempt failed (the write is
    /// never issued), `EncodingFailed` for malformed URLs, or `WriteFailed`
    /// when the provider rejects the write.
    pub async fn begin_write(&self, url: String) -> SessionOutcome {
        let uri = self.config.normalize_url(&url);
        self.run(Operation::Write(&uri), self.config.max_write_attempts)
            .await
    }

    /// Releases any technology hold and returns to `Idle`.
    ///
    /// Does not wait for an in-flight session; that session observes the
    /// cancelled request and finishes with [`SessionOutcome::Cancelled`]
    /// without touching the state.
    pub async fn cancel(&self) {
        {
            let mut state = self.lock_state();
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = SessionState::Idle;
        }
        self.release_quietly().await;
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.lock_state()
    }
}

impl TagSession {
    async fn run(&self, operation: Operation<'_>, attempts: u32) -> SessionOutcome {
        let mode = operation.mode();
        let generation = {
            let _state = self.lock_state();
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        // Frees the radio from an earlier session, which then drops the gate.
        self.release_quietly().await;
        let _gate = self.gate.lock().await;

        if !self.update_state(generation, SessionState::AwaitingTag) {
            log::info!("{mode} session cancelled before it started");
            return SessionOutcome::Cancelled;
        }
        log::info!("starting {mode} session");

        let result = match self.acquire(generation, attempts).await {
            Ok(()) => {
                self.update_state(generation, SessionState::InProgress);
                match operation {
                    Operation::Read => self.read_held_tag().await,
                    Operation::Write(uri) => self.write_held_tag(uri).await,
                }
            }
            Err(err) => Err(err),
        };

        self.release_quietly().await;

        let finished = if result.is_ok() {
            SessionState::Success
        } else {
            SessionState::Failed
        };
        let current = self.update_state(generation, finished);
        match result {
            Ok(uri) => {
                log::info!("{mode} session succeeded: {uri}");
                SessionOutcome::from_result(mode, Ok(uri))
            }
            Err(err) if !current => {
                log::info!("{mode} session cancelled: {err}");
                SessionOutcome::Cancelled
            }
            Err(err) => {
                log::warn!("{mode} session failed: {err}");
                SessionOutcome::from_result(mode, Err(err))
            }
        }
    }

    async fn acquire(&self, generation: u64, attempts: u32) -> Result<(), SessionError> {
        let backoff = ConstantBuilder::default()
            .with_delay(Duration::ZERO)
            .with_max_times(attempts.saturating_sub(1) as usize);

        (|| async {
            match self.provider.request_technology(NfcTech::Ndef).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(NfcProviderError::Busy(
                    "technology request refused".to_string(),
                )),
                Err(err) => Err(err),
            }
        })
        .retry(backoff)
        .when(|err: &NfcProviderError| {
            !matches!(err, NfcProviderError::UserCancelled) && self.is_current(generation)
        })
        .notify(|err: &NfcProviderError, _| {
            log::debug!("technology request failed, retrying: {err}");
        })
        .await
        .map_err(|err| {
            log::error!("technology request failed after {attempts} attempt(s): {err}");
            SessionError::AcquisitionFailed { attempts }
        })
    }

    async fn read_held_tag(&self) -> Result<String, SessionError> {
        let tag = self.provider.get_tag().await.map_err(|err| {
            SessionError::UnknownIoFailure {
                error: err.to_string(),
            }
        })?;

        let record = tag
            .and_then(|tag| tag.ndef_message)
            .and_then(|message| message.into_iter().next())
            .ok_or(SessionError::NoDataOnTag {
                reason: NoDataReason::EmptyOrUnsupportedTag,
            })?;

        if !is_type(&record, TNF_WELL_KNOWN, RTD_URI) {
            return Err(SessionError::NoDataOnTag {
                reason: NoDataReason::NoUriRecord,
            });
        }

        UriRecord::from_payload(&record.payload)
            .map(|uri| uri.uri())
            .map_err(|err| SessionError::UnknownIoFailure {
                error: err.to_string(),
            })
    }

    async fn write_held_tag(&self, uri: &str) -> Result<String, SessionError> {
        let bytes = encode_uri_message(&self.config.default_scheme, uri)?;
        self.provider
            .write_ndef_message(bytes)
            .await
            .map_err(|err| SessionError::WriteFailed {
                error: err.to_string(),
            })?;
        Ok(uri.to_string())
    }

    async fn release_quietly(&self) {
        if let Err(err) = self.provider.cancel_technology_request().await {
            log::debug!("ignoring technology release error: {err}");
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Moves to `state` unless a cancel or a newer session superseded `generation`.
    fn update_state(&self, generation: u64, state: SessionState) -> bool {
        let mut current = self.lock_state();
        if !self.is_current(generation) {
            return false;
        }
        *current = state;
        true
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Clone, Copy)]
enum Operation<'a> {
    Read,
    Write(&'a str),
}

impl Operation<'_> {
    const fn mode(self) -> Mode {
        match self {
            Self::Read => Mode::Read,
            Self::Write(_) => Mode::Write,
        }
    }
}

/// Encodes a normalized URL as a one-record NDEF message.
fn encode_uri_message(scheme: &str, uri: &str) -> Result<Vec<u8>, SessionError> {
    let target = uri.strip_prefix(scheme).unwrap_or(uri);
    if target.is_empty() {
        return Err(SessionError::EncodingFailed {
            error: "url has nothing after the scheme".to_string(),
        });
    }
    if target.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(SessionError::EncodingFailed {
            error: format!("url contains whitespace or control characters: {uri:?}"),
        });
    }

    encode_message(&[uri_record(uri)]).map_err(|err| SessionError::EncodingFailed {
        error: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndef::decode_message;

    #[test]
    fn test_encode_uri_message() {
        let bytes = encode_uri_message("https://", "https://example.com").unwrap();
        let records = decode_message(&bytes).unwrap();

        assert_eq!(records, vec![uri_record("https://example.com")]);
    }

    #[test]
    fn test_encode_rejects_bare_scheme() {
        let err = encode_uri_message("https://", "https://").unwrap_err();
        assert!(matches!(err, SessionError::EncodingFailed { .. }));
    }

    #[test]
    fn test_encode_rejects_whitespace() {
        let err = encode_uri_message("https://", "https://exa mple.com").unwrap_err();
        assert!(matches!(err, SessionError::EncodingFailed { .. }));
    }
}
