//! # msense-vscode - Editor Config Integration
//!
//! Owns VSCode's `c_cpp_properties.json`: loading it without disturbing
//! anything the user wrote, rewriting one named configuration entry, and
//! saving it atomically. Also hosts the update pipeline that ties
//! [`msense_build`] extraction to the document edit.
//!
//! ## Public API
//!
//! ### Document (`document`)
//! - [`PropertiesDoc`] - The parsed config file, edited in place
//! - [`default_properties_path()`] - `<program>/.vscode/c_cpp_properties.json`
//! - [`DEFAULT_ENTRY`] / [`GENERATED_ENTRY`] - The `"Mbed"` / `"MbedGenerated"` names
//!
//! ### Pipeline (`merge`)
//! - [`sync_entry()`] - Locate, extract, merge into an existing entry, write
//! - [`generate_entry()`] - Same, but (re)clones the entry from a base first
//! - [`UpdateSummary`] - What a successful run changed

pub mod document;
pub mod merge;

// Public API re-exports
pub use document::{
    default_properties_path, PropertiesDoc, DEFAULT_ENTRY, GENERATED_ENTRY, PROPERTIES_FILE,
    VSCODE_DIR,
};
pub use merge::{generate_entry, sync_entry, UpdateSummary};
