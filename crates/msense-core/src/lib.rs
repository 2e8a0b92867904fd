//! # msense-core - Core Domain Types
//!
//! Foundation crate for mbed-sense. Provides the compile-flag model, path
//! normalization, toolchain dialects, error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, thiserror, tracing, tracing-subscriber, dunce).
//!
//! ## Public API
//!
//! ### Compile Flags (`flags`)
//! - [`CompileFlags`] - Deduplicated include paths and defines, first-seen order
//! - [`scan_compiler_args()`] - Walk compiler arguments for `-I`-family and `-D` flags
//! - [`split_command_line()`] - Quote-aware splitting of recorded command strings
//!
//! ### Toolchains (`toolchain`)
//! - [`ToolchainKind`] - GCC_ARM or ARM, with per-kind include-flag dialects
//!
//! ### Paths (`paths`)
//! - [`absolutize()`] - Resolve a path against a working directory and normalize it
//! - [`normalize()`] - Lexical `.`/`..`/separator cleanup, no filesystem access
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum, one variant per pipeline failure
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use msense_core::prelude::*;
//! ```

pub mod error;
pub mod flags;
pub mod logging;
pub mod paths;
pub mod prelude;
pub mod toolchain;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use flags::{sanitize_define, scan_compiler_args, split_command_line, CompileFlags};
pub use paths::{absolutize, normalize};
pub use toolchain::ToolchainKind;
