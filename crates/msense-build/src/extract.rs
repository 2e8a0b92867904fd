//! Flag extraction
//!
//! Turns a located flag source into one deduplicated [`CompileFlags`] set.
//! Compile database entries resolve relative paths against their own
//! recorded directory; ninja variable values resolve against the build
//! directory itself.

use std::path::Path;

use msense_core::prelude::*;
use msense_core::{scan_compiler_args, split_command_line, CompileFlags, ToolchainKind};

use crate::locate::{BuildArtifacts, FlagSource};
use crate::{compile_db, ninja};

/// Extract include paths and defines from the located artifact.
///
/// A parsable artifact that yields no flags is not an error; the caller
/// gets an empty set and a warning is logged.
pub fn extract_flags(artifacts: &BuildArtifacts) -> Result<CompileFlags> {
    let flags = match &artifacts.source {
        FlagSource::CompileDb(path) => from_compile_db(path, artifacts.toolchain)?,
        FlagSource::NinjaBuild(path) => {
            from_ninja(path, &artifacts.build_dir, artifacts.toolchain)?
        }
    };

    if flags.is_empty() {
        warn!(
            "No include paths or defines found in {}",
            artifacts.source.path().display()
        );
    } else {
        debug!(
            "Extracted {} include paths and {} defines",
            flags.include_paths().len(),
            flags.defines().len()
        );
    }
    Ok(flags)
}

fn from_compile_db(path: &Path, toolchain: ToolchainKind) -> Result<CompileFlags> {
    let commands = compile_db::load_compile_db(path)?;
    let mut flags = CompileFlags::new();
    let mut scanned = 0usize;

    for command in &commands {
        if !command.is_c_cpp_unit() {
            trace!("Skipping non-C/C++ entry {}", command.file.display());
            continue;
        }
        let args = command.args();
        scan_compiler_args(&args, &command.directory, toolchain, &mut flags);
        scanned += 1;
    }

    debug!("Scanned {scanned} of {} compile commands", commands.len());
    Ok(flags)
}

fn from_ninja(path: &Path, build_dir: &Path, toolchain: ToolchainKind) -> Result<CompileFlags> {
    let lines = ninja::scan_build_file(path)?;
    let mut flags = CompileFlags::new();

    for value in &lines.includes {
        let args = split_command_line(value);
        scan_compiler_args(&args, build_dir, toolchain, &mut flags);
    }
    for value in &lines.defines {
        let args = split_command_line(value);
        scan_compiler_args(&args, build_dir, toolchain, &mut flags);
    }
    Ok(flags)
}
