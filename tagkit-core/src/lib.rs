//! `TagKit` reads and writes URLs on NFC tags from a mobile app.
//!
//! The host platform implements [`NfcProvider`] on top of its NFC stack; this
//! crate runs the session around it: acquiring the radio (with bounded retries
//! for writes), encoding and decoding NDEF URI records, classifying failures,
//! and keeping the prompt state that the UI renders.
//!
//! ```rust,ignore
//! let workflow = NfcWorkflow::new(provider, None, Some(prompt_observer), Some(notifier))?;
//! if workflow.check_availability().await == NfcAvailability::Ready {
//!     workflow.start_write();
//!     workflow.on_input_change("example.org".to_string());
//!     let outcome = workflow.confirm_write().await?;
//! }
//! ```
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod availability;
pub use availability::*;

mod config;
pub use config::*;

mod error;
pub use error::*;

/// Forwarding of log records to the host app.
pub mod logger;

/// NDEF message and URI record codec.
pub mod ndef;

mod prompt;
pub use prompt::*;

mod provider;
pub use provider::*;

mod session;
pub use session::*;

mod workflow;
pub use workflow::*;

uniffi::setup_scaffolding!("tagkit_core");
