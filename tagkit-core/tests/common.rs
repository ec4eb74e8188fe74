#![allow(dead_code, missing_docs)]

//! Common test utilities shared across integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tagkit_core::ndef::{uri_record, NdefRecord};
use tagkit_core::{
    NfcProvider, NfcProviderError, NfcTech, Notifier, PromptObserver, TagInfo,
};
use tokio::sync::Notify;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    IsSupported,
    IsEnabled,
    Start,
    RequestTechnology(NfcTech),
    Cancel,
    GetTag,
    Write(Vec<u8>),
    GoToSettings,
}

/// In-memory NFC provider driven by a script.
///
/// Technology requests succeed unless results were queued with
/// [`ScriptedProvider::queue_requests`].
pub struct ScriptedProvider {
    calls: Mutex<Vec<Call>>,
    request_results: Mutex<VecDeque<Result<bool, NfcProviderError>>>,
    tag: Mutex<Option<TagInfo>>,
    get_tag_error: Mutex<Option<String>>,
    write_error: Mutex<Option<String>>,
    cancel_fails: AtomicBool,
    supported: AtomicBool,
    enabled: AtomicBool,
    hold_next_request: AtomicBool,
    request_started: Notify,
    cancelled: Notify,
}

impl ScriptedProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            request_results: Mutex::new(VecDeque::new()),
            tag: Mutex::new(None),
            get_tag_error: Mutex::new(None),
            write_error: Mutex::new(None),
            cancel_fails: AtomicBool::new(false),
            supported: AtomicBool::new(true),
            enabled: AtomicBool::new(true),
            hold_next_request: AtomicBool::new(false),
            request_started: Notify::new(),
            cancelled: Notify::new(),
        })
    }

    pub fn with_uri_tag(url: &str) -> Arc<Self> {
        let provider = Self::new();
        provider.set_tag(Some(uri_tag(url)));
        provider
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Write(bytes) => Some(bytes),
                _ => None,
            })
            .collect()
    }

    pub fn queue_requests(&self, results: Vec<Result<bool, NfcProviderError>>) {
        self.request_results.lock().unwrap().extend(results);
    }

    pub fn set_tag(&self, tag: Option<TagInfo>) {
        *self.tag.lock().unwrap() = tag;
    }

    pub fn fail_get_tag(&self, error: &str) {
        *self.get_tag_error.lock().unwrap() = Some(error.to_string());
    }

    pub fn fail_writes(&self, error: &str) {
        *self.write_error.lock().unwrap() = Some(error.to_string());
    }

    pub fn fail_cancels(&self) {
        self.cancel_fails.store(true, Ordering::SeqCst);
    }

    pub fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::SeqCst);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// The next technology request waits until a cancel, then fails.
    pub fn hold_next_request(&self) {
        self.hold_next_request.store(true, Ordering::SeqCst);
    }

    /// Resolves once a held request is waiting for the tag.
    pub async fn request_started(&self) {
        self.request_started.notified().await;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl NfcProvider for ScriptedProvider {
    async fn is_supported(&self) -> Result<bool, NfcProviderError> {
        self.record(Call::IsSupported);
        Ok(self.supported.load(Ordering::SeqCst))
    }

    async fn is_enabled(&self) -> Result<bool, NfcProviderError> {
        self.record(Call::IsEnabled);
        Ok(self.enabled.load(Ordering::SeqCst))
    }

    async fn start(&self) -> Result<(), NfcProviderError> {
        self.record(Call::Start);
        Ok(())
    }

    async fn request_technology(&self, tech: NfcTech) -> Result<bool, NfcProviderError> {
        self.record(Call::RequestTechnology(tech));
        if self.hold_next_request.swap(false, Ordering::SeqCst) {
            let cancelled = self.cancelled.notified();
            self.request_started.notify_one();
            cancelled.await;
            return Err(NfcProviderError::UserCancelled);
        }
        self.request_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(true))
    }

    async fn cancel_technology_request(&self) -> Result<(), NfcProviderError> {
        self.record(Call::Cancel);
        self.cancelled.notify_waiters();
        if self.cancel_fails.load(Ordering::SeqCst) {
            return Err(NfcProviderError::Io("no technology held".to_string()));
        }
        Ok(())
    }

    async fn get_tag(&self) -> Result<Option<TagInfo>, NfcProviderError> {
        self.record(Call::GetTag);
        if let Some(error) = self.get_tag_error.lock().unwrap().clone() {
            return Err(NfcProviderError::Io(error));
        }
        Ok(self.tag.lock().unwrap().clone())
    }

    async fn write_ndef_message(&self, bytes: Vec<u8>) -> Result<(), NfcProviderError> {
        self.record(Call::Write(bytes));
        if let Some(error) = self.write_error.lock().unwrap().clone() {
            return Err(NfcProviderError::NotWritable(error));
        }
        Ok(())
    }

    async fn go_to_nfc_settings(&self) -> Result<(), NfcProviderError> {
        self.record(Call::GoToSettings);
        Ok(())
    }
}

pub fn uri_tag(url: &str) -> TagInfo {
    tag_with_records(vec![uri_record(url)])
}

pub fn tag_with_records(records: Vec<NdefRecord>) -> TagInfo {
    TagInfo {
        id: Some("04A224B2C35E80".to_string()),
        tech_types: vec!["android.nfc.tech.Ndef".to_string()],
        ndef_message: Some(records),
        max_size: Some(137),
        is_writable: Some(true),
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<(Option<String>, String)>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<(Option<String>, String)> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: Option<String>, message: String) {
        self.notifications.lock().unwrap().push((title, message));
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl PromptObserver for RecordingObserver {
    fn on_visibility_changed(&self, visible: bool) {
        self.push(format!("visible:{visible}"));
    }

    fn on_pending_url_changed(&self, url: String) {
        self.push(format!("pending:{url}"));
    }

    fn on_ready_to_write(&self, url: String) {
        self.push(format!("ready:{url}"));
    }

    fn on_cancel(&self) {
        self.push("cancel".to_string());
    }
}
