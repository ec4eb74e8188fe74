//! Platform interface for the NFC radio.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::NfcProviderError;
use crate::ndef::NdefRecord;

/// Result type for provider calls.
pub type ProviderResult<T> = Result<T, NfcProviderError>;

/// Tag technologies that can be requested from the platform.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
    uniffi::Enum,
)]
pub enum NfcTech {
    /// NDEF formatted tags. The only technology the tag session requests.
    Ndef,
    /// ISO 14443-3A.
    NfcA,
    /// ISO 14443-3B.
    NfcB,
    /// JIS 6319-4 (`FeliCa`).
    NfcF,
    /// ISO 15693.
    NfcV,
    /// ISO 14443-4.
    IsoDep,
    /// MIFARE Classic.
    MifareClassic,
    /// MIFARE Ultralight.
    MifareUltralight,
    /// MIFARE family on iOS.
    MifareIos,
    /// ISO 15693 on iOS.
    Iso15693Ios,
    /// `FeliCa` on iOS.
    FelicaIos,
    /// Tags that can be NDEF formatted.
    NdefFormatable,
}

/// A tag as reported by the platform once a technology is held.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, uniffi::Record)]
pub struct TagInfo {
    /// Tag identifier, usually the hex encoded UID.
    pub id: Option<String>,
    /// Technologies reported by the platform.
    #[serde(default)]
    pub tech_types: Vec<String>,
    /// Cached NDEF message, `None` for tags without NDEF content.
    pub ndef_message: Option<Vec<NdefRecord>>,
    /// Maximum NDEF message size in bytes.
    pub max_size: Option<u32>,
    /// Whether the tag accepts writes.
    pub is_writable: Option<bool>,
}

/// NFC capability provider implemented by the host platform.
///
/// Implementations wrap the platform NFC stack (Core NFC, `android.nfc`, or a
/// bridge such as `react-native-nfc-manager`). Only one technology request may
/// be outstanding at a time; [`NfcProvider::cancel_technology_request`] must be
/// safe to call when nothing is held.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait NfcProvider: Send + Sync {
    /// Whether the device has an NFC radio.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot be queried.
    async fn is_supported(&self) -> ProviderResult<bool>;

    /// Whether NFC is switched on in the system settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot be queried.
    async fn is_enabled(&self) -> ProviderResult<bool>;

    /// Initializes the platform NFC stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the stack cannot be started.
    async fn start(&self) -> ProviderResult<()>;

    /// Requests exclusive access to `tech`, waiting until a tag is presented.
    ///
    /// Returns `false` when the request was refused without an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is cancelled.
    async fn request_technology(&self, tech: NfcTech) -> ProviderResult<bool>;

    /// Cancels an outstanding technology request or releases the held technology.
    ///
    /// # Errors
    ///
    /// May return an error when nothing is held. Callers ignore it.
    async fn cancel_technology_request(&self) -> ProviderResult<()>;

    /// Returns the tag currently held, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag cannot be read.
    async fn get_tag(&self) -> ProviderResult<Option<TagInfo>>;

    /// Writes an encoded NDEF message to the held tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn write_ndef_message(&self, bytes: Vec<u8>) -> ProviderResult<()>;

    /// Opens the system NFC settings screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be opened.
    async fn go_to_nfc_settings(&self) -> ProviderResult<()>;
}
