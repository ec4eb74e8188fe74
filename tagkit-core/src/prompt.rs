//! Modal prompt shown while a tag session runs.
//!
//! The coordinator keeps the text being edited (the pending URL) apart from the
//! URL that a write actually uses. The pending URL only becomes the committed
//! URL through [`PromptCoordinator::on_confirm`], so typing never changes an
//! active write.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strum::Display;

use crate::config::SessionConfig;
use crate::error::TagKitError;
use crate::session::Mode;

/// Receives prompt changes so the host UI can redraw.
///
/// Callbacks run after the coordinator released its internal lock, so they may
/// call back into the coordinator.
#[uniffi::export(with_foreign)]
pub trait PromptObserver: Send + Sync {
    /// The prompt was shown (`true`) or hidden (`false`).
    fn on_visibility_changed(&self, visible: bool);

    /// The pending URL changed after normalization.
    fn on_pending_url_changed(&self, url: String);

    /// The user confirmed `url` for writing. The prompt stays visible.
    fn on_ready_to_write(&self, url: String);

    /// The user dismissed the prompt. Any NFC hold must be released.
    fn on_cancel(&self);
}

/// Whether the prompt is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum Visibility {
    /// Not shown.
    #[default]
    Hidden,
    /// Shown.
    Visible,
}

#[derive(Debug)]
struct PromptState {
    visibility: Visibility,
    mode: Mode,
    pending_url: String,
}

/// Modal state machine for the read/write prompt.
#[derive(uniffi::Object)]
pub struct PromptCoordinator {
    config: SessionConfig,
    observer: Option<Arc<dyn PromptObserver>>,
    state: Mutex<PromptState>,
}

#[uniffi::export]
impl PromptCoordinator {
    /// Creates a hidden prompt in read mode.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(config: SessionConfig, observer: Option<Arc<dyn PromptObserver>>) -> Self {
        Self {
            config,
            observer,
            state: Mutex::new(PromptState {
                visibility: Visibility::Hidden,
                mode: Mode::Read,
                pending_url: String::new(),
            }),
        }
    }

    /// Shows the prompt for `mode`.
    ///
    /// In write mode the pending URL is seeded with `current_url`.
    pub fn show(&self, mode: Mode, current_url: Option<String>) {
        let became_visible = {
            let mut state = self.lock();
            state.mode = mode;
            if mode == Mode::Write {
                state.pending_url = current_url.unwrap_or_default();
            }
            let was_hidden = state.visibility == Visibility::Hidden;
            state.visibility = Visibility::Visible;
            was_hidden
        };

        log::debug!("prompt shown in {mode} mode");
        if became_visible {
            self.notify(|observer| observer.on_visibility_changed(true));
        }
    }

    /// Stores the edited text, normalized, as the pending URL and returns it.
    #[allow(clippy::needless_pass_by_value)]
    pub fn on_input_change(&self, text: String) -> String {
        let normalized = self.config.normalize_url(&text);
        self.lock().pending_url.clone_from(&normalized);
        self.notify(|observer| observer.on_pending_url_changed(normalized.clone()));
        normalized
    }

    /// Commits the pending URL for writing and returns it.
    ///
    /// The prompt stays visible so the user can present the tag.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless the prompt is visible in write mode.
    pub fn on_confirm(&self) -> Result<String, TagKitError> {
        let committed = {
            let state = self.lock();
            if state.visibility != Visibility::Visible || state.mode != Mode::Write {
                return Err(TagKitError::InvalidInput {
                    error: format!(
                        "cannot confirm a {} prompt in {} mode",
                        state.visibility, state.mode
                    ),
                });
            }
            self.config.normalize_url(&state.pending_url)
        };

        log::debug!("prompt confirmed {committed}");
        self.notify(|observer| observer.on_ready_to_write(committed.clone()));
        Ok(committed)
    }

    /// Hides the prompt at the user's request and signals cancellation.
    ///
    /// Returns `false` if the prompt was already hidden.
    pub fn on_cancel(&self) -> bool {
        if !self.set_hidden() {
            return false;
        }
        log::debug!("prompt cancelled");
        self.notify(|observer| {
            observer.on_visibility_changed(false);
            observer.on_cancel();
        });
        true
    }

    /// Hides the prompt without signalling cancellation.
    pub fn hide(&self) {
        if self.set_hidden() {
            self.notify(|observer| observer.on_visibility_changed(false));
        }
    }

    /// Current visibility.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.lock().visibility
    }

    /// Mode the prompt was last shown in.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.lock().mode
    }

    /// Text being edited, not yet committed.
    #[must_use]
    pub fn pending_url(&self) -> String {
        self.lock().pending_url.clone()
    }
}

impl PromptCoordinator {
    /// Whether the prompt is on screen.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility() == Visibility::Visible
    }

    fn set_hidden(&self) -> bool {
        let mut state = self.lock();
        let was_visible = state.visibility == Visibility::Visible;
        state.visibility = Visibility::Hidden;
        was_visible
    }

    fn notify(&self, f: impl FnOnce(&dyn PromptObserver)) {
        if let Some(observer) = &self.observer {
            f(observer.as_ref());
        }
    }

    fn lock(&self) -> MutexGuard<'_, PromptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
