mod logging;

use clap::{Args, Parser, Subcommand};
use cxxbind_config::BindConfig;
use cxxbind_driver::Driver;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "cxxbind")]
#[command(author, version, about = "Generate pybind11 bindings from C++ headers")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Configuration file (defaults to ./cxxbind.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the extension module source
    Generate {
        /// Python module name; overrides `module.name`
        module: Option<String>,

        /// Headers to bind; override `module.headers`
        headers: Vec<PathBuf>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the structural model of a header
    Dump {
        /// Header to parse
        header: PathBuf,

        /// Output format
        #[arg(long, default_value = "debug")]
        format: DumpFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum DumpFormat {
    /// Rust debug representation
    Debug,
    /// Pretty-printed JSON
    Json,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    logging::init_logging(cli.global.verbose, cli.global.quiet)?;

    let config = load_config(cli.global.config.as_deref())?;
    if let Some(text) = execute(cli.command, config)? {
        print!("{text}");
    }

    Ok(())
}

/// Run one command. Returns what belongs on stdout, if anything.
fn execute(command: Commands, config: BindConfig) -> Result<Option<String>> {
    match command {
        Commands::Generate {
            module,
            headers,
            output,
        } => {
            let driver = Driver::with_config(apply_overrides(config, module, headers))?;
            debug!(
                hooks = ?driver.hooks().names(),
                strict = driver.config().strict,
                "driver ready"
            );
            let source = driver.generate_configured()?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &source).map_err(|e| {
                        miette::miette!("Failed to write {}: {}", path.display(), e)
                    })?;
                    info!(output = %path.display(), "wrote module");
                    Ok(None)
                }
                None => Ok(Some(source)),
            }
        }

        Commands::Dump { header, format } => {
            let driver = Driver::with_config(config)?;
            let model = driver.parse_header(&header)?;

            let text = match format {
                DumpFormat::Debug => format!("{:#?}\n", model),
                DumpFormat::Json => {
                    let json = serde_json::to_string_pretty(&model).into_diagnostic()?;
                    format!("{json}\n")
                }
            };
            Ok(Some(text))
        }
    }
}

/// An explicit `--config`, else `cxxbind.toml` in the working directory, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<BindConfig> {
    if let Some(path) = explicit {
        debug!(config = %path.display(), "loading configuration");
        return BindConfig::from_file(path)
            .map_err(|e| miette::miette!("Failed to load {}: {}", path.display(), e));
    }

    let cwd = std::env::current_dir().into_diagnostic()?;
    let discovered = BindConfig::discover(&cwd).into_diagnostic()?;
    if discovered.is_some() {
        debug!(dir = %cwd.display(), "using discovered configuration");
    }
    Ok(discovered.unwrap_or_default())
}

/// Command-line module name and headers win over the configuration.
fn apply_overrides(
    mut config: BindConfig,
    module: Option<String>,
    headers: Vec<PathBuf>,
) -> BindConfig {
    if let Some(module) = module {
        config.module.name = Some(module);
    }
    if !headers.is_empty() {
        config.module.headers = headers;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;
    use std::io::Write;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "cxxbind", "-vv", "generate", "wpilib", "CANTalon.h", "PDP.h", "-o", "out.cpp",
        ])
        .unwrap();

        assert_eq!(cli.global.verbose, 2);
        match cli.command {
            Commands::Generate {
                module,
                headers,
                output,
            } => {
                assert_eq!(module.as_deref(), Some("wpilib"));
                assert_eq!(headers, [PathBuf::from("CANTalon.h"), PathBuf::from("PDP.h")]);
                assert_eq!(output, Some(PathBuf::from("out.cpp")));
            }
            Commands::Dump { .. } => panic!("expected generate"),
        }
    }

    #[test]
    fn test_parse_dump_json() {
        let cli = Cli::try_parse_from(["cxxbind", "dump", "Sensor.h", "--format", "json", "-q"])
            .unwrap();
        assert!(cli.global.quiet);
        match cli.command {
            Commands::Dump { header, format } => {
                assert_eq!(header, PathBuf::from("Sensor.h"));
                assert_eq!(format, DumpFormat::Json);
            }
            Commands::Generate { .. } => panic!("expected dump"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["cxxbind", "-v", "-q", "dump", "a.h"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = BindConfig::default();
        config.module.name = Some("from_file".to_string());
        config.module.headers = vec![PathBuf::from("a.h")];

        let kept = apply_overrides(config.clone(), None, Vec::new());
        assert_eq!(kept, config);

        let replaced =
            apply_overrides(config, Some("cli".to_string()), vec![PathBuf::from("b.h")]);
        assert_eq!(replaced.module.name.as_deref(), Some("cli"));
        assert_eq!(replaced.module.headers, [PathBuf::from("b.h")]);
    }

    #[test]
    fn test_load_explicit_config() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[module]\nname = \"wpilib\"").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.module.name.as_deref(), Some("wpilib"));
    }

    #[test]
    fn test_load_bad_hook_name() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[hooks]\norder = [\"rename\"]").unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("rename"));
    }

    const GEARBOX_H: &str = r#"
enum Gear { kLow, kHigh };

class Gearbox {
public:
    CTR_Code GetRatio(double &ratio);
    void Shift(Gear gear);
};
"#;

    #[test]
    fn test_generate_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("Gearbox.h");
        std::fs::write(&header, GEARBOX_H).unwrap();
        let output = dir.path().join("drive.cpp");

        let cli = Cli::try_parse_from([
            OsStr::new("cxxbind"),
            OsStr::new("generate"),
            OsStr::new("drive"),
            header.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
        ])
        .unwrap();

        let stdout = execute(cli.command, BindConfig::default()).unwrap();
        assert!(stdout.is_none());

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("PYBIND11_PLUGIN(drive) {\n"));
        assert!(written.contains("    py::enum_<Gear>(m, \"Gear\")\n"));
        let get_ratio = [
            "      .def(\"GetRatio\", [](Gearbox &__inst) {",
            "        double ratio;",
            "        auto __ret = __inst.GetRatio(ratio);",
            "        CheckCTRCode(__ret);",
            "        return ratio;",
            "      })",
        ]
        .join("\n");
        assert!(written.contains(&get_ratio));
        assert!(written.contains("      .def(\"Shift\", &Gearbox::Shift);\n"));
    }

    #[test]
    fn test_generate_uses_configured_module() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("Gearbox.h");
        std::fs::write(&header, GEARBOX_H).unwrap();

        let mut config = BindConfig::default();
        config.module.name = Some("drive".to_string());
        config.module.headers = vec![header];

        let command = Commands::Generate {
            module: None,
            headers: Vec::new(),
            output: None,
        };
        let stdout = execute(command, config).unwrap().unwrap();
        assert!(stdout.starts_with("\n#include <pybind11/pybind11.h>\n"));
        assert!(stdout.contains("py::module m(\"drive\");"));
    }

    #[test]
    fn test_generate_without_module_name_fails() {
        let command = Commands::Generate {
            module: None,
            headers: vec![PathBuf::from("Gearbox.h")],
            output: None,
        };
        let err = execute(command, BindConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No module name"));
    }

    #[test]
    fn test_dump_json() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("Gearbox.h");
        std::fs::write(&header, GEARBOX_H).unwrap();

        let command = Commands::Dump {
            header,
            format: DumpFormat::Json,
        };
        let stdout = execute(command, BindConfig::default()).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();

        assert_eq!(json["enums"][0]["name"], "Gear");
        let gearbox = &json["classes"]["Gearbox"];
        assert_eq!(gearbox["methods"][0]["name"], "GetRatio");
        assert_eq!(gearbox["methods"][0]["params"][0]["is_reference"], true);
        assert_eq!(gearbox["methods"][1]["params"][0]["enum_name"], "Gear");
    }

    #[test]
    fn test_dump_debug() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("Gearbox.h");
        std::fs::write(&header, GEARBOX_H).unwrap();

        let command = Commands::Dump {
            header,
            format: DumpFormat::Debug,
        };
        let stdout = execute(command, BindConfig::default()).unwrap().unwrap();
        assert!(stdout.starts_with("HeaderModel {"));
        assert!(stdout.contains("\"GetRatio\""));
    }
}
