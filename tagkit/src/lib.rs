//! Mobile bindings for `TagKit`.
//!
//! Everything lives in [`tagkit_core`]; this crate is the library the Swift and
//! Kotlin packages link against.

pub use tagkit_core::*;
