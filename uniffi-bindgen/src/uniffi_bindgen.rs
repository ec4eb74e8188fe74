//! Generates the Swift and Kotlin bindings for `tagkit`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
