use std::sync::Arc;

use strum::Display;

use crate::provider::NfcProvider;

/// Whether the device can run tag sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum NfcAvailability {
    /// The device has no NFC radio, or it could not be queried.
    Unsupported,
    /// NFC is switched off in the system settings.
    Disabled,
    /// NFC is started and enabled.
    Ready,
}

/// Probes the radio: support first, then starts the stack and checks it is enabled.
#[uniffi::export(async_runtime = "tokio")]
#[allow(clippy::needless_pass_by_value)]
pub async fn check_availability(provider: Arc<dyn NfcProvider>) -> NfcAvailability {
    probe(provider.as_ref()).await
}

pub(crate) async fn probe(provider: &dyn NfcProvider) -> NfcAvailability {
    match provider.is_supported().await {
        Ok(true) => {}
        Ok(false) => return NfcAvailability::Unsupported,
        Err(err) => {
            log::warn!("failed to query nfc support: {err}");
            return NfcAvailability::Unsupported;
        }
    }

    if let Err(err) = provider.start().await {
        log::warn!("failed to start nfc: {err}");
        return NfcAvailability::Unsupported;
    }

    match provider.is_enabled().await {
        Ok(true) => NfcAvailability::Ready,
        Ok(false) => NfcAvailability::Disabled,
        Err(err) => {
            log::warn!("failed to query nfc state: {err}");
            NfcAvailability::Disabled
        }
    }
}
