//! The update pipeline
//!
//! Locate, extract, load, merge, write: strictly in that order, aborting on
//! the first error. The editor config is only touched in the final step, so
//! any failure leaves it exactly as it was.

use std::path::Path;
use tracing::info;

use msense_build::{extract_flags, locate_artifacts};
use msense_core::prelude::*;
use msense_core::{sanitize_define, CompileFlags};

use crate::document::PropertiesDoc;

/// What a successful run changed, for the CLI's report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Name of the updated configuration entry
    pub entry: String,
    /// Number of include paths written
    pub include_paths: usize,
    /// Number of defines written
    pub defines: usize,
}

/// Update the named entry of `conf_path` from the build artifacts in
/// `build_dir`.
///
/// `extra_defines` are user-supplied `NAME[=VALUE]` strings appended after
/// extraction; one that names an already-extracted macro overrides it.
/// The entry must already exist; this never creates one.
pub fn sync_entry(
    build_dir: &Path,
    conf_path: &Path,
    entry_name: &str,
    extra_defines: &[String],
) -> Result<UpdateSummary> {
    let (flags, mut doc) = prepare(build_dir, conf_path, extra_defines)?;

    info!("Merging flags into entry {entry_name:?}");
    doc.apply_flags(entry_name, &flags)?;

    info!("Writing {}", conf_path.display());
    doc.save()?;

    Ok(summary(entry_name, &flags))
}

/// Like [`sync_entry`], but first (re)creates `entry_name` as a clone of
/// `base_name`, so users can keep hand edits in the base entry and let the
/// tool own the generated one.
pub fn generate_entry(
    build_dir: &Path,
    conf_path: &Path,
    base_name: &str,
    entry_name: &str,
    extra_defines: &[String],
) -> Result<UpdateSummary> {
    let (flags, mut doc) = prepare(build_dir, conf_path, extra_defines)?;

    info!("Generating entry {entry_name:?} from {base_name:?}");
    doc.clone_entry(base_name, entry_name)?;
    doc.apply_flags(entry_name, &flags)?;

    info!("Writing {}", conf_path.display());
    doc.save()?;

    Ok(summary(entry_name, &flags))
}

/// The shared read-only front of both pipelines: locate, extract, load.
fn prepare(
    build_dir: &Path,
    conf_path: &Path,
    extra_defines: &[String],
) -> Result<(CompileFlags, PropertiesDoc)> {
    info!("Locating build artifacts in {}", build_dir.display());
    let artifacts = locate_artifacts(build_dir)?;

    info!(
        "Extracting compile flags from {}",
        artifacts.source.path().display()
    );
    let mut flags = extract_flags(&artifacts)?;
    apply_extra_defines(&mut flags, extra_defines);

    info!("Loading {}", conf_path.display());
    let doc = PropertiesDoc::load(conf_path)?;

    Ok((flags, doc))
}

fn apply_extra_defines(flags: &mut CompileFlags, extra_defines: &[String]) {
    for raw in extra_defines {
        if let Some(define) = sanitize_define(raw) {
            flags.override_define(define);
        }
    }
}

fn summary(entry_name: &str, flags: &CompileFlags) -> UpdateSummary {
    UpdateSummary {
        entry: entry_name.to_string(),
        include_paths: flags.include_paths().len(),
        defines: flags.defines().len(),
    }
}
