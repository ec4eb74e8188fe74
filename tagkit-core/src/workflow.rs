//! The read/write screen: two buttons, one prompt, one tag session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::availability::{probe, NfcAvailability};
use crate::config::SessionConfig;
use crate::error::{NfcProviderError, NoDataReason, SessionError, TagKitError};
use crate::prompt::{PromptCoordinator, PromptObserver, Visibility};
use crate::provider::NfcProvider;
use crate::session::{Mode, SessionOutcome, SessionState, TagSession};

const ACQUISITION_FAILED_MESSAGE: &str =
    "Failed to initiate NFC tech request. Please try again.";
const WRITE_ERROR_MESSAGE: &str = "An error occurred while writing to the NFC tag.";

/// Shows user-facing messages, the equivalent of an alert dialog.
#[uniffi::export(with_foreign)]
pub trait Notifier: Send + Sync {
    /// Presents `message`, with an optional `title`.
    fn notify(&self, title: Option<String>, message: String);
}

/// A message for the user about a finished session.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct Notification {
    /// Dialog title, if any.
    pub title: Option<String>,
    /// Dialog body.
    pub message: String,
}

impl Notification {
    fn titled(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: Some(title.to_string()),
            message: message.into(),
        }
    }

    fn untitled(message: impl Into<String>) -> Self {
        Self {
            title: None,
            message: message.into(),
        }
    }
}

/// Picks the message shown after a `mode` session ended with `outcome`.
///
/// Successful reads and unexpected read failures show nothing; the read URL is
/// surfaced through [`NfcWorkflow::hint_text`] instead. Cancelled sessions show
/// nothing either.
#[must_use]
pub fn notification_for(mode: Mode, outcome: &SessionOutcome) -> Option<Notification> {
    let error = match outcome {
        SessionOutcome::Read { .. } | SessionOutcome::Cancelled => return None,
        SessionOutcome::Written { uri } => {
            return Some(Notification::titled(
                "Success",
                format!("URL {uri} written to NFC tag!"),
            ))
        }
        SessionOutcome::Failed { error } => error,
    };

    match error {
        SessionError::AcquisitionFailed { .. } => {
            Some(Notification::titled("Error", ACQUISITION_FAILED_MESSAGE))
        }
        SessionError::NoDataOnTag {
            reason: NoDataReason::EmptyOrUnsupportedTag,
        } => Some(Notification::untitled("Unsupported or empty NFC tag.")),
        SessionError::NoDataOnTag {
            reason: NoDataReason::NoUriRecord,
        } => Some(Notification::untitled("No URL found on this tag.")),
        SessionError::EncodingFailed { .. } => {
            Some(Notification::untitled("Failed to encode URL for NFC tag."))
        }
        SessionError::UnknownIoFailure { .. } if mode == Mode::Read => None,
        SessionError::WriteFailed { .. } | SessionError::UnknownIoFailure { .. } => {
            Some(Notification::titled("Write Error", WRITE_ERROR_MESSAGE))
        }
    }
}

#[derive(Debug)]
struct WorkflowState {
    is_writing: bool,
    write_url: String,
    detected_url: Option<String>,
}

/// Drives the prompt and the tag session from the screen's button presses.
#[derive(uniffi::Object)]
pub struct NfcWorkflow {
    provider: Arc<dyn NfcProvider>,
    session: TagSession,
    prompt: PromptCoordinator,
    notifier: Option<Arc<dyn Notifier>>,
    state: Mutex<WorkflowState>,
}

#[uniffi::export(async_runtime = "tokio")]
impl NfcWorkflow {
    /// Creates the workflow over `provider`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `config` fails validation.
    #[uniffi::constructor]
    pub fn new(
        provider: Arc<dyn NfcProvider>,
        config: Option<SessionConfig>,
        prompt_observer: Option<Arc<dyn PromptObserver>>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Result<Self, TagKitError> {
        let config = config.unwrap_or_default();
        let session = TagSession::new(Arc::clone(&provider), Some(config.clone()))?;
        let write_url = config.default_write_url.clone();
        Ok(Self {
            provider,
            session,
            prompt: PromptCoordinator::new(config, prompt_observer),
            notifier,
            state: Mutex::new(WorkflowState {
                is_writing: false,
                write_url,
                detected_url: None,
            }),
        })
    }

    /// Checks that NFC is supported and enabled, starting the stack.
    pub async fn check_availability(&self) -> NfcAvailability {
        probe(self.provider.as_ref()).await
    }

    /// Opens the system NFC settings.
    ///
    /// # Errors
    ///
    /// Forwards the provider error.
    pub async fn open_nfc_settings(&self) -> Result<(), NfcProviderError> {
        self.provider.go_to_nfc_settings().await
    }

    /// "Read" button: shows the prompt, reads one tag, hides the prompt.
    ///
    /// A read cancelled by [`NfcWorkflow::cancel`] or a newer session reports
    /// nothing.
    pub async fn read_url_from_tag(&self) -> SessionOutcome {
        let detected = {
            let mut state = self.lock();
            state.is_writing = false;
            state.detected_url.clone()
        };
        self.prompt.show(Mode::Read, detected);

        let outcome = self.session.begin_read().await;
        if let SessionOutcome::Read { uri } = &outcome {
            self.lock().detected_url = Some(uri.clone());
        }
        if let SessionOutcome::Failed {
            error: SessionError::UnknownIoFailure { error },
        } = &outcome
        {
            log::warn!("error reading nfc tag: {error}");
        }

        // A cancelled read already had its prompt closed, or handed it to a newer session.
        if outcome != SessionOutcome::Cancelled {
            self.report(Mode::Read, &outcome);
            self.prompt.hide();
        }
        outcome
    }

    /// "Write" button: arms write mode and shows the prompt with the current URL.
    ///
    /// Returns `false`, doing nothing, while write mode is already armed.
    pub fn start_write(&self) -> bool {
        let write_url = {
            let mut state = self.lock();
            if state.is_writing {
                return false;
            }
            state.is_writing = true;
            state.write_url.clone()
        };
        self.prompt.show(Mode::Write, Some(write_url));
        true
    }

    /// Forwards an edit of the URL field; returns the normalized text.
    pub fn on_input_change(&self, text: String) -> String {
        self.prompt.on_input_change(text)
    }

    /// "Update" button: commits the edited URL and writes it to the next tag.
    ///
    /// The prompt stays open after the write; only "Cancel" closes it. A write
    /// superseded by "Cancel" or a second "Update" reports nothing and leaves
    /// write mode as it is.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the prompt is not open in write mode.
    pub async fn confirm_write(&self) -> Result<SessionOutcome, TagKitError> {
        let committed = self.prompt.on_confirm()?;
        self.lock().write_url.clone_from(&committed);

        let outcome = self.session.begin_write(committed).await;
        if let SessionOutcome::Failed {
            error: SessionError::AcquisitionFailed { .. },
        } = &outcome
        {
            self.lock().is_writing = false;
        }

        self.report(Mode::Write, &outcome);
        Ok(outcome)
    }

    /// "Cancel" button: closes the prompt, leaves write mode and releases the radio.
    pub async fn cancel(&self) {
        self.prompt.on_cancel();
        self.lock().is_writing = false;
        self.session.cancel().await;
    }

    /// Title line of the prompt.
    #[must_use]
    pub fn hint_text(&self) -> String {
        let state = self.lock();
        if state.is_writing {
            format!("Writing URL: {}", state.write_url)
        } else {
            format!(
                "NFC Tag URL Detected: {}",
                state.detected_url.as_deref().unwrap_or("No URL detected")
            )
        }
    }

    /// Body line of the prompt.
    #[must_use]
    pub fn display_url(&self) -> String {
        let state = self.lock();
        if state.is_writing {
            "Current URL to Write:".to_string()
        } else {
            state
                .detected_url
                .clone()
                .unwrap_or_else(|| "No URL detected yet".to_string())
        }
    }

    /// Whether write mode is armed.
    #[must_use]
    pub fn is_writing(&self) -> bool {
        self.lock().is_writing
    }

    /// URL committed for the next write.
    #[must_use]
    pub fn write_url(&self) -> String {
        self.lock().write_url.clone()
    }

    /// URL read by the last successful read.
    #[must_use]
    pub fn detected_url(&self) -> Option<String> {
        self.lock().detected_url.clone()
    }

    /// Text being edited in the prompt.
    #[must_use]
    pub fn pending_url(&self) -> String {
        self.prompt.pending_url()
    }

    /// Whether the prompt is on screen.
    #[must_use]
    pub fn prompt_visibility(&self) -> Visibility {
        self.prompt.visibility()
    }

    /// State of the underlying tag session.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }
}

impl NfcWorkflow {
    fn report(&self, mode: Mode, outcome: &SessionOutcome) {
        let Some(notification) = notification_for(mode, outcome) else {
            return;
        };
        if let Some(notifier) = &self.notifier {
            notifier.notify(notification.title, notification.message);
        } else {
            log::info!("{}", notification.message);
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorkflowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
