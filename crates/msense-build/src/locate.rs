//! Build artifact discovery
//!
//! Finds the CMake-generated files inside an Mbed build directory that
//! record the actual compiler invocations. The compile database is the
//! richest source and wins whenever it exists; the textual ninja build
//! file is the fallback. The toolchain is detected from the build
//! directory's own markers so flag scanning can use the right dialect.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, trace};

use msense_core::prelude::*;
use msense_core::ToolchainKind;

/// Compile database emitted by `CMAKE_EXPORT_COMPILE_COMMANDS`
pub const COMPILE_DB_FILE: &str = "compile_commands.json";

/// Build file emitted by the CMake Ninja generator
pub const NINJA_BUILD_FILE: &str = "build.ninja";

/// Mbed configuration written by `mbed-tools configure`
pub const MBED_CMAKE_CONF_FILE: &str = "mbed_config.cmake";

/// CMake cache, present after the first configure step
pub const CMAKE_CACHE_FILE: &str = "CMakeCache.txt";

/// Root directory `mbed-tools configure` creates under the program dir
pub const CMAKE_BUILD_ROOT: &str = "cmake_build";

/// Flag-bearing artifact chosen for extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagSource {
    /// `compile_commands.json` (preferred: per-file working directories)
    CompileDb(PathBuf),
    /// `build.ninja` (fallback: per-build `DEFINES`/`INCLUDES` variables)
    NinjaBuild(PathBuf),
}

impl FlagSource {
    pub fn path(&self) -> &Path {
        match self {
            FlagSource::CompileDb(path) => path,
            FlagSource::NinjaBuild(path) => path,
        }
    }
}

/// Everything extraction needs to know about a validated build directory
#[derive(Debug, Clone)]
pub struct BuildArtifacts {
    /// The validated build directory itself
    pub build_dir: PathBuf,
    /// The artifact flags will be read from
    pub source: FlagSource,
    /// Toolchain detected from the directory's markers
    pub toolchain: ToolchainKind,
}

/// Derive the build directory layout `mbed-tools configure` produces:
/// `<program>/cmake_build/<TARGET>/<profile>/<TOOLCHAIN>`.
pub fn cmake_build_dir(
    program_dir: &Path,
    target: &str,
    profile: &str,
    toolchain: ToolchainKind,
) -> PathBuf {
    program_dir
        .join(CMAKE_BUILD_ROOT)
        .join(target)
        .join(profile)
        .join(toolchain.dir_name())
}

/// Validate a build directory and pick the flag source.
///
/// Fails with [`Error::BuildDirInvalid`] when the directory is missing, is
/// not a directory, or holds neither a compile database nor a ninja build
/// file. When both artifacts exist the compile database wins.
pub fn locate_artifacts(build_dir: &Path) -> Result<BuildArtifacts> {
    if !build_dir.exists() {
        return Err(Error::build_dir_invalid(
            build_dir,
            "directory does not exist; run 'mbed-tools configure' first",
        ));
    }
    if !build_dir.is_dir() {
        return Err(Error::build_dir_invalid(build_dir, "not a directory"));
    }

    let compile_db = build_dir.join(COMPILE_DB_FILE);
    let ninja_file = build_dir.join(NINJA_BUILD_FILE);

    let source = if compile_db.is_file() {
        FlagSource::CompileDb(compile_db)
    } else if ninja_file.is_file() {
        FlagSource::NinjaBuild(ninja_file)
    } else {
        return Err(Error::build_dir_invalid(
            build_dir,
            format!(
                "neither {COMPILE_DB_FILE} nor {NINJA_BUILD_FILE} found; \
                 run 'mbed-tools configure' and generate the build files first"
            ),
        ));
    };

    let toolchain = detect_toolchain(build_dir);
    debug!(
        "Located {} in {} (toolchain {})",
        source.path().display(),
        build_dir.display(),
        toolchain
    );

    Ok(BuildArtifacts {
        build_dir: build_dir.to_path_buf(),
        source,
        toolchain,
    })
}

/// Detect the toolchain from the build directory's markers.
///
/// `mbed_config.cmake` names it outright; the CMake cache's compiler entry
/// is the second-best witness. Without either, GCC_ARM is assumed.
fn detect_toolchain(build_dir: &Path) -> ToolchainKind {
    if let Some(kind) = toolchain_in_mbed_config(&build_dir.join(MBED_CMAKE_CONF_FILE)) {
        trace!("Toolchain {kind} from {MBED_CMAKE_CONF_FILE}");
        return kind;
    }
    if let Some(kind) = toolchain_in_cmake_cache(&build_dir.join(CMAKE_CACHE_FILE)) {
        trace!("Toolchain {kind} from {CMAKE_CACHE_FILE}");
        return kind;
    }
    debug!("No toolchain marker in {}, assuming GCC_ARM", build_dir.display());
    ToolchainKind::GccArm
}

/// Matches `set(MBED_TOOLCHAIN "GCC_ARM" ...)` in mbed_config.cmake
static MBED_TOOLCHAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"set\(MBED_TOOLCHAIN\s+"([^"]+)""#).expect("Invalid toolchain regex")
});

fn toolchain_in_mbed_config(path: &Path) -> Option<ToolchainKind> {
    let content = fs::read_to_string(path).ok()?;
    parse_mbed_toolchain(&content)
}

fn parse_mbed_toolchain(content: &str) -> Option<ToolchainKind> {
    let captured = MBED_TOOLCHAIN_REGEX.captures(content)?;
    captured[1].parse().ok()
}

fn toolchain_in_cmake_cache(path: &Path) -> Option<ToolchainKind> {
    let content = fs::read_to_string(path).ok()?;
    parse_cache_compiler(&content)
}

/// Scan CMakeCache.txt for the `CMAKE_C_COMPILER:<type>=<path>` entry.
fn parse_cache_compiler(content: &str) -> Option<ToolchainKind> {
    for line in content.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with("CMAKE_C_COMPILER:") {
            continue;
        }
        if let Some((_, value)) = trimmed.split_once('=') {
            return ToolchainKind::from_compiler(value.trim());
        }
    }
    None
}
