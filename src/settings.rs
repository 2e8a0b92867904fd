//! Settings parser for .msense.toml
//!
//! `msense configure` records the build coordinates here so later runs can
//! derive the CMake build directory without flags. The file lives at the
//! program root, next to `mbed-tools`' own `.mbed` marker.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use msense_build::cmake_build_dir;
use msense_core::prelude::*;
use msense_core::ToolchainKind;

/// Settings file name, relative to the program root
pub const SETTINGS_FILE: &str = ".msense.toml";

/// Mbed build profile, one of the three `mbed-tools` knows about.
///
/// The lowercase form doubles as the directory segment in
/// `cmake_build/<TARGET>/<profile>/<TOOLCHAIN>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    Debug,
    #[default]
    Develop,
    Release,
}

impl BuildProfile {
    pub fn dir_name(&self) -> &'static str {
        match self {
            BuildProfile::Debug => "debug",
            BuildProfile::Develop => "develop",
            BuildProfile::Release => "release",
        }
    }
}

impl std::fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// Recorded build coordinates (.msense.toml)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolSettings {
    /// Mbed target name, e.g. `DISCO_L072CZ_LRWAN1`
    pub mbed_target: String,

    /// Build profile the artifacts were generated for
    #[serde(default)]
    pub profile: BuildProfile,

    /// Toolchain the artifacts were generated for
    #[serde(default)]
    pub toolchain: ToolchainKind,

    /// Editor config file to update, when not the default
    /// `.vscode/c_cpp_properties.json` under the program root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf_file: Option<PathBuf>,
}

impl ToolSettings {
    /// The build directory these settings describe:
    /// `<program>/cmake_build/<TARGET>/<profile>/<TOOLCHAIN>`.
    pub fn build_dir(&self, program_dir: &Path) -> PathBuf {
        cmake_build_dir(
            program_dir,
            &self.mbed_target,
            self.profile.dir_name(),
            self.toolchain,
        )
    }
}

/// Path of the settings file under a program root.
pub fn settings_path(program_dir: &Path) -> PathBuf {
    program_dir.join(SETTINGS_FILE)
}

/// Load settings from `<program>/.msense.toml`.
///
/// Unlike preference files there is no useful default here: without a
/// recorded target the build directory cannot be derived, so a missing or
/// unparsable file is an error that names the fix.
pub fn load_settings(program_dir: &Path) -> Result<ToolSettings> {
    let path = settings_path(program_dir);

    if !path.exists() {
        return Err(Error::settings(format!(
            "no {} in {}; run 'msense configure' first, or pass --build-dir",
            SETTINGS_FILE,
            program_dir.display()
        )));
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::settings(format!("failed to read {}: {}", path.display(), e)))?;

    let settings: ToolSettings = toml::from_str(&content)
        .map_err(|e| Error::settings(format!("failed to parse {}: {}", path.display(), e)))?;

    debug!("Loaded settings from {:?}", path);
    Ok(settings)
}

/// Save settings to `<program>/.msense.toml`.
///
/// Uses atomic write (temp file + rename) for safety.
pub fn save_settings(program_dir: &Path, settings: &ToolSettings) -> Result<()> {
    let path = settings_path(program_dir);
    let temp_path = program_dir.join(format!("{SETTINGS_FILE}.tmp"));

    let content = toml::to_string_pretty(settings)
        .map_err(|e| Error::settings(format!("failed to serialize settings: {}", e)))?;
    let full_content = format!("{}{}", settings_header(), content);

    std::fs::write(&temp_path, &full_content)
        .map_err(|e| Error::settings(format!("failed to write temp file: {}", e)))?;
    std::fs::rename(&temp_path, &path)
        .map_err(|e| Error::settings(format!("failed to rename temp file: {}", e)))?;

    info!("Saved settings to {:?}", path);
    Ok(())
}

fn settings_header() -> String {
    r#"# mbed-sense build coordinates
# Generated by 'msense configure'

"#
    .to_string()
}
