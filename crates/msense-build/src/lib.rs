//! # msense-build - Build Artifact Integration
//!
//! Locates the CMake-generated metadata of an Mbed build and extracts the
//! include paths and preprocessor defines the compiler was actually given.
//!
//! Depends on [`msense_core`] for the flag model and error handling.
//!
//! ## Public API
//!
//! ### Artifact Location (`locate`)
//! - [`locate_artifacts()`] - Validate a build dir and pick the flag source
//! - [`BuildArtifacts`] - Validated build dir, chosen source, toolchain
//! - [`FlagSource`] - Compile database or ninja build file
//! - [`cmake_build_dir()`] - The `cmake_build/<TARGET>/<profile>/<TOOLCHAIN>` layout
//!
//! ### Extraction (`extract`, `compile_db`, `ninja`)
//! - [`extract_flags()`] - One deduplicated [`CompileFlags`] set from the source
//! - [`CompileCommand`] - A compile database entry (both argument forms)
//! - [`NinjaFlagLines`] - Raw `DEFINES`/`INCLUDES` values from build.ninja

pub mod compile_db;
pub mod extract;
pub mod locate;
pub mod ninja;

// Public API re-exports
pub use compile_db::{load_compile_db, CompileCommand};
pub use extract::extract_flags;
pub use locate::{
    cmake_build_dir, locate_artifacts, BuildArtifacts, FlagSource, CMAKE_BUILD_ROOT,
    CMAKE_CACHE_FILE, COMPILE_DB_FILE, MBED_CMAKE_CONF_FILE, NINJA_BUILD_FILE,
};
pub use ninja::{scan_build_file, NinjaFlagLines};

use msense_core::prelude::*;
use std::path::Path;

/// Largest artifact the extractor will parse. Build files beyond this are
/// almost certainly corrupt, and refusing them bounds memory use.
pub const MAX_ARTIFACT_SIZE: u64 = 64 * 1024 * 1024;

/// Read a build artifact into memory, refusing oversized files.
pub(crate) fn read_artifact(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| Error::flag_extraction(path, format!("cannot read metadata: {e}")))?;
    if metadata.len() > MAX_ARTIFACT_SIZE {
        return Err(Error::flag_extraction(
            path,
            format!(
                "file is {} bytes, over the {} MiB limit",
                metadata.len(),
                MAX_ARTIFACT_SIZE / (1024 * 1024)
            ),
        ));
    }
    std::fs::read_to_string(path).map_err(|e| Error::flag_extraction(path, e.to_string()))
}
