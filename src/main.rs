//! msense - keeps VSCode C/C++ IntelliSense in sync with an Mbed CMake build
//!
//! This is the binary entry point. Flag extraction and config editing live
//! in the workspace crates; this file parses arguments, fills in defaults,
//! and reports outcomes.

mod settings;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use msense_build::{extract_flags, locate_artifacts, MBED_CMAKE_CONF_FILE};
use msense_core::paths::absolutize;
use msense_core::prelude::*;
use msense_core::ToolchainKind;
use msense_vscode::{
    default_properties_path, PropertiesDoc, UpdateSummary, DEFAULT_ENTRY, GENERATED_ENTRY,
};

use settings::{load_settings, save_settings, settings_path, BuildProfile, ToolSettings};

/// Keep VSCode C/C++ IntelliSense in sync with an Mbed CMake build.
#[derive(Parser, Debug)]
#[command(name = "msense", version)]
#[command(about = "Update c_cpp_properties.json from Mbed build metadata")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Update one config entry from the build's include paths and defines.
    Update(UpdateArgs),
    /// Clone a base entry, then update the clone and leave the base alone.
    Generate(GenerateArgs),
    /// Record build coordinates so later runs need no flags.
    Configure(ConfigureArgs),
    /// Print the extracted flags without touching any config file.
    Show(ShowArgs),
}

/// Arguments for the `msense update` subcommand.
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// CMake build directory (default: derived from .msense.toml).
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Config file to update (default: <program-dir>/.vscode/c_cpp_properties.json).
    #[arg(long, value_name = "FILE")]
    pub conf: Option<PathBuf>,

    /// Configuration entry to rewrite. Must already exist.
    #[arg(long, default_value = DEFAULT_ENTRY)]
    pub entry: String,

    /// Mbed program root (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub program_dir: Option<PathBuf>,

    /// File of extra NAME[=VALUE] defines, one per line.
    #[arg(long, value_name = "FILE")]
    pub extra_defines: Option<PathBuf>,
}

/// Arguments for the `msense generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// CMake build directory (default: derived from .msense.toml).
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Config file to update (default: <program-dir>/.vscode/c_cpp_properties.json).
    #[arg(long, value_name = "FILE")]
    pub conf: Option<PathBuf>,

    /// Entry to copy settings from. Must already exist.
    #[arg(long, default_value = DEFAULT_ENTRY)]
    pub base: String,

    /// Entry to (re)generate from the base.
    #[arg(long, default_value = GENERATED_ENTRY)]
    pub entry: String,

    /// Mbed program root (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub program_dir: Option<PathBuf>,

    /// File of extra NAME[=VALUE] defines, one per line.
    #[arg(long, value_name = "FILE")]
    pub extra_defines: Option<PathBuf>,
}

/// Arguments for the `msense configure` subcommand.
#[derive(Parser, Debug)]
pub struct ConfigureArgs {
    /// Mbed target the build directory was configured for.
    #[arg(value_name = "MBED_TARGET")]
    pub mbed_target: String,

    /// Toolchain used for the build (GCC_ARM or ARM).
    #[arg(long, default_value_t = ToolchainKind::GccArm)]
    pub toolchain: ToolchainKind,

    /// Build profile used for the build.
    #[arg(long, value_enum, default_value_t = BuildProfile::Develop)]
    pub profile: BuildProfile,

    /// Config file to record (default: <program-dir>/.vscode/c_cpp_properties.json).
    #[arg(long, value_name = "FILE")]
    pub conf: Option<PathBuf>,

    /// Mbed program root (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub program_dir: Option<PathBuf>,
}

/// Arguments for the `msense show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// CMake build directory (default: derived from .msense.toml).
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Mbed program root (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub program_dir: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    msense_core::logging::init(cli.verbose);

    let result = match cli.command {
        Command::Update(ref args) => run_update(args),
        Command::Generate(ref args) => run_generate(args),
        Command::Configure(ref args) => run_configure(args),
        Command::Show(ref args) => run_show(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
    Ok(())
}

fn run_update(args: &UpdateArgs) -> Result<()> {
    let program_dir = resolve_program_dir(args.program_dir.as_deref())?;
    let build_dir = resolve_build_dir(args.build_dir.as_deref(), &program_dir)?;
    let conf_path = resolve_conf_path(args.conf.as_deref(), &program_dir)?;
    let extra = read_extra_defines(args.extra_defines.as_deref())?;

    let summary = msense_vscode::sync_entry(&build_dir, &conf_path, &args.entry, &extra)?;
    report(&summary, &conf_path);
    Ok(())
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    let program_dir = resolve_program_dir(args.program_dir.as_deref())?;
    let build_dir = resolve_build_dir(args.build_dir.as_deref(), &program_dir)?;
    let conf_path = resolve_conf_path(args.conf.as_deref(), &program_dir)?;
    let extra = read_extra_defines(args.extra_defines.as_deref())?;

    let summary =
        msense_vscode::generate_entry(&build_dir, &conf_path, &args.base, &args.entry, &extra)?;
    report(&summary, &conf_path);
    Ok(())
}

fn run_configure(args: &ConfigureArgs) -> Result<()> {
    let program_dir = resolve_program_dir(args.program_dir.as_deref())?;
    let cwd = std::env::current_dir()?;

    let conf_path = match args.conf.as_deref() {
        Some(path) => absolutize(path, &cwd),
        None => default_properties_path(&program_dir),
    };

    let tool_settings = ToolSettings {
        mbed_target: args.mbed_target.clone(),
        profile: args.profile,
        toolchain: args.toolchain,
        // Only record a conf path the user chose; the default stays implicit
        // so moving the program directory does not strand it.
        conf_file: args.conf.as_ref().map(|_| conf_path.clone()),
    };

    let build_dir = tool_settings.build_dir(&program_dir);
    check_build_dir(&build_dir)?;
    check_conf_file(&conf_path)?;

    save_settings(&program_dir, &tool_settings)?;
    println!(
        "Recorded {} for build directory {}",
        settings_path(&program_dir).display(),
        build_dir.display()
    );
    Ok(())
}

fn run_show(args: &ShowArgs) -> Result<()> {
    let program_dir = resolve_program_dir(args.program_dir.as_deref())?;
    let build_dir = resolve_build_dir(args.build_dir.as_deref(), &program_dir)?;

    let artifacts = locate_artifacts(&build_dir)?;
    let flags = extract_flags(&artifacts)?;

    println!("Toolchain:   {}", artifacts.toolchain);
    println!("Flag source: {}", artifacts.source.path().display());
    println!("Include paths ({}):", flags.include_paths().len());
    for path in flags.include_paths() {
        println!("    {}", path.display());
    }
    println!("Defines ({}):", flags.defines().len());
    for define in flags.defines() {
        println!("    {define}");
    }
    Ok(())
}

/// The program root every relative default hangs off: `--program-dir`
/// resolved against the CWD, or the CWD itself.
fn resolve_program_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match explicit {
        Some(dir) => absolutize(dir, &cwd),
        None => cwd,
    })
}

/// An explicit `--build-dir` wins; otherwise the directory is derived from
/// the recorded settings. Failing both is an error that names the fix.
fn resolve_build_dir(explicit: Option<&Path>, program_dir: &Path) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        let cwd = std::env::current_dir()?;
        return Ok(absolutize(dir, &cwd));
    }

    let tool_settings = load_settings(program_dir)?;
    let dir = tool_settings.build_dir(program_dir);
    debug!("Derived build directory {}", dir.display());
    Ok(dir)
}

/// An explicit `--conf` wins, then a path recorded by `msense configure`,
/// then the default `.vscode/c_cpp_properties.json` under the program root.
fn resolve_conf_path(explicit: Option<&Path>, program_dir: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let cwd = std::env::current_dir()?;
        return Ok(absolutize(path, &cwd));
    }
    if let Some(recorded) = recorded_conf_file(program_dir) {
        return Ok(absolutize(&recorded, program_dir));
    }
    Ok(default_properties_path(program_dir))
}

/// The conf path recorded in `.msense.toml`, if there is one. A broken
/// settings file is only warned about here: the caller may not need the
/// settings at all when every flag was given explicitly.
fn recorded_conf_file(program_dir: &Path) -> Option<PathBuf> {
    if !settings_path(program_dir).exists() {
        return None;
    }
    match load_settings(program_dir) {
        Ok(tool_settings) => tool_settings.conf_file,
        Err(e) => {
            warn!("Ignoring settings file: {e}");
            None
        }
    }
}

/// Read extra `NAME[=VALUE]` defines from a file, one per line. Blank
/// lines and `#` comments are skipped.
fn read_extra_defines(path: Option<&Path>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::settings(format!("failed to read {}: {}", path.display(), e)))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Confirm `mbed-tools configure` produced this directory. Build files
/// may legitimately be missing until the user runs CMake, so their
/// absence is a note rather than an error here.
fn check_build_dir(build_dir: &Path) -> Result<()> {
    if !build_dir.is_dir() {
        return Err(Error::build_dir_invalid(
            build_dir,
            "directory does not exist; run 'mbed-tools configure' for this target first",
        ));
    }
    if !build_dir.join(MBED_CMAKE_CONF_FILE).is_file() {
        return Err(Error::build_dir_invalid(
            build_dir,
            format!(
                "{MBED_CMAKE_CONF_FILE} is missing; run 'mbed-tools configure' for this target first"
            ),
        ));
    }
    if let Err(e) = locate_artifacts(build_dir) {
        debug!("{e}");
        eprintln!(
            "note: no build files in {} yet; generate them (cmake with -GNinja) before 'msense update'",
            build_dir.display()
        );
    }
    Ok(())
}

/// Confirm the config file loads. A missing default entry is worth a
/// warning, but the entry to update is chosen at update time, so it is
/// not an error yet.
fn check_conf_file(conf_path: &Path) -> Result<()> {
    let doc = PropertiesDoc::load(conf_path)?;
    if !doc.has_entry(DEFAULT_ENTRY) {
        warn!(
            "No {:?} entry in {}; 'msense update' will need --entry, or add one",
            DEFAULT_ENTRY,
            conf_path.display()
        );
    }
    Ok(())
}

fn report(summary: &UpdateSummary, conf_path: &Path) {
    println!(
        "Updated entry {:?} in {} ({} include paths, {} defines)",
        summary.entry,
        conf_path.display(),
        summary.include_paths,
        summary.defines
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_update_defaults() {
        let cli = Cli::parse_from(["msense", "update"]);
        match cli.command {
            Command::Update(args) => {
                assert!(args.build_dir.is_none());
                assert!(args.conf.is_none());
                assert_eq!(args.entry, "Mbed");
                assert!(args.program_dir.is_none());
                assert!(args.extra_defines.is_none());
            }
            _ => panic!("expected Update command"),
        }
    }

    #[test]
    fn parse_update_with_args() {
        let cli = Cli::parse_from([
            "msense",
            "update",
            "--build-dir",
            "/proj/build",
            "--conf",
            "conf/props.json",
            "--entry",
            "Custom",
            "--extra-defines",
            "defines.txt",
        ]);
        match cli.command {
            Command::Update(args) => {
                assert_eq!(args.build_dir.as_deref(), Some(Path::new("/proj/build")));
                assert_eq!(args.conf.as_deref(), Some(Path::new("conf/props.json")));
                assert_eq!(args.entry, "Custom");
                assert_eq!(
                    args.extra_defines.as_deref(),
                    Some(Path::new("defines.txt"))
                );
            }
            _ => panic!("expected Update command"),
        }
    }

    #[test]
    fn parse_generate_defaults() {
        let cli = Cli::parse_from(["msense", "generate"]);
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.base, "Mbed");
                assert_eq!(args.entry, "MbedGenerated");
            }
            _ => panic!("expected Generate command"),
        }
    }

    #[test]
    fn parse_configure_defaults() {
        let cli = Cli::parse_from(["msense", "configure", "NUCLEO_F401RE"]);
        match cli.command {
            Command::Configure(args) => {
                assert_eq!(args.mbed_target, "NUCLEO_F401RE");
                assert_eq!(args.toolchain, ToolchainKind::GccArm);
                assert_eq!(args.profile, BuildProfile::Develop);
                assert!(args.conf.is_none());
            }
            _ => panic!("expected Configure command"),
        }
    }

    #[test]
    fn parse_configure_with_args() {
        let cli = Cli::parse_from([
            "msense",
            "configure",
            "DISCO_L072CZ_LRWAN1",
            "--toolchain",
            "ARM",
            "--profile",
            "release",
        ]);
        match cli.command {
            Command::Configure(args) => {
                assert_eq!(args.mbed_target, "DISCO_L072CZ_LRWAN1");
                assert_eq!(args.toolchain, ToolchainKind::Arm);
                assert_eq!(args.profile, BuildProfile::Release);
            }
            _ => panic!("expected Configure command"),
        }
    }

    #[test]
    fn parse_verbosity_count() {
        let cli = Cli::parse_from(["msense", "-vv", "show"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Show(_)));
    }

    #[test]
    fn extra_defines_file_skips_blanks_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("defines.txt");
        std::fs::write(&file, "FOO\n\n# toolchain quirks\nBAR=1\n  BAZ  \n").unwrap();

        let defines = read_extra_defines(Some(&file)).unwrap();
        assert_eq!(defines, vec!["FOO", "BAR=1", "BAZ"]);
    }

    #[test]
    fn extra_defines_file_must_exist() {
        let err = read_extra_defines(Some(Path::new("/no/such/defines.txt"))).unwrap_err();
        assert!(matches!(err, Error::Settings { .. }));
    }

    #[test]
    fn conf_path_prefers_recorded_settings() {
        let dir = tempfile::tempdir().unwrap();
        let tool_settings = ToolSettings {
            mbed_target: "NUCLEO_F401RE".to_string(),
            profile: BuildProfile::Develop,
            toolchain: ToolchainKind::GccArm,
            conf_file: Some(PathBuf::from("/elsewhere/props.json")),
        };
        save_settings(dir.path(), &tool_settings).unwrap();

        let conf = resolve_conf_path(None, dir.path()).unwrap();
        assert_eq!(conf, PathBuf::from("/elsewhere/props.json"));
    }

    #[test]
    fn conf_path_defaults_without_settings() {
        let dir = tempfile::tempdir().unwrap();

        let conf = resolve_conf_path(None, dir.path()).unwrap();
        assert_eq!(conf, dir.path().join(".vscode/c_cpp_properties.json"));
    }

    #[test]
    fn build_dir_derivation_needs_settings() {
        let dir = tempfile::tempdir().unwrap();

        let err = resolve_build_dir(None, dir.path()).unwrap_err();
        assert!(matches!(err, Error::Settings { .. }));
    }

    #[test]
    fn build_dir_derived_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let tool_settings = ToolSettings {
            mbed_target: "NUCLEO_F401RE".to_string(),
            profile: BuildProfile::Debug,
            toolchain: ToolchainKind::GccArm,
            conf_file: None,
        };
        save_settings(dir.path(), &tool_settings).unwrap();

        let build_dir = resolve_build_dir(None, dir.path()).unwrap();
        assert_eq!(
            build_dir,
            dir.path().join("cmake_build/NUCLEO_F401RE/debug/GCC_ARM")
        );
    }
}
