//! laconic CLI - inspect and convert Laconic configuration files
//!
//! Usage:
//!   laconic check app.laconf
//!   laconic get app.laconf database/$port
//!   laconic dump app.laconf --format json
//!   laconic tokens app.laconf

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use laconic_core::{render, tokenize, Configuration};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const EXIT_FAILURE: u8 = 1;
const EXIT_LOAD_FAILURE: u8 = 2;

/// laconic - Laconic configuration tree tool
#[derive(Debug, Parser)]
#[command(name = "laconic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check that files lex and parse (includes are expanded)
    Check {
        /// Configuration file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the value at a path
    Get {
        /// Configuration file
        file: PathBuf,

        /// Path to the node (e.g., database/$port)
        path: String,

        /// Print the raw value without expanding variables
        #[arg(long)]
        verbatim: bool,

        /// Value to print if the node doesn't exist
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Export the configuration tree
    Dump {
        /// Configuration file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = DumpFormat::Laconic)]
        format: DumpFormat,

        /// Keep variables unexpanded
        #[arg(long)]
        verbatim: bool,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the token stream as JSON
    Tokens {
        /// Configuration file
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
    Laconic,
    Json,
    Yaml,
}

/// Run the CLI with the process arguments
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let code = execute(cli, &mut io::stdout().lock(), &mut io::stderr().lock());
    ExitCode::from(code)
}

/// Run the CLI with explicit arguments and output streams, returning the exit code
pub fn run_with<I, T>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => execute(cli, out, err),
        Err(e) => report_usage(&e, err).unwrap_or(EXIT_FAILURE),
    }
}

/// Print a usage error (or `--help` / `--version` output)
fn report_usage(e: &clap::Error, err: &mut dyn Write) -> io::Result<u8> {
    write!(err, "{}", e)?;
    Ok(if e.use_stderr() { EXIT_LOAD_FAILURE } else { 0 })
}

fn execute(cli: Cli, out: &mut dyn Write, err: &mut dyn Write) -> u8 {
    let result = match cli.command {
        Commands::Check { files } => cmd_check(&files, out, err),
        Commands::Get {
            file,
            path,
            verbatim,
            default,
        } => cmd_get(&file, &path, verbatim, default, out, err),
        Commands::Dump {
            file,
            format,
            verbatim,
            output,
        } => cmd_dump(&file, format, verbatim, output, out, err),
        Commands::Tokens { file } => cmd_tokens(&file, out, err),
    };

    // Output streams going away (e.g. a closed pipe) is not a load failure
    result.unwrap_or(EXIT_FAILURE)
}

fn load_config(file: &Path) -> Result<Configuration, String> {
    Configuration::load(file).map_err(|e| format!("Failed to load {}: {}", file.display(), e))
}

fn cmd_check(files: &[PathBuf], out: &mut dyn Write, err: &mut dyn Write) -> io::Result<u8> {
    let mut all_valid = true;

    for file in files {
        match Configuration::load(file) {
            Ok(conf) => {
                writeln!(
                    out,
                    "{} {}: valid ('{}')",
                    "✓".green(),
                    file.display(),
                    conf.root().name()
                )?;
            }
            Err(e) => {
                writeln!(err, "{} {}: {}", "✗".red(), file.display(), e)?;
                all_valid = false;
            }
        }
    }

    Ok(if all_valid { 0 } else { EXIT_FAILURE })
}

fn cmd_get(
    file: &Path,
    path: &str,
    verbatim: bool,
    default: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<u8> {
    let conf = match load_config(file) {
        Ok(c) => c,
        Err(e) => {
            writeln!(err, "{}", e.red())?;
            return Ok(EXIT_LOAD_FAILURE);
        }
    };

    let node = match conf.get(path) {
        Ok(node) if node.exists() => node,
        Ok(_) => {
            if let Some(default_val) = default {
                writeln!(out, "{}", default_val)?;
                return Ok(0);
            }
            writeln!(err, "{}: Path '{}' not found", "Error".red(), path)?;
            return Ok(EXIT_FAILURE);
        }
        Err(e) => {
            writeln!(err, "{}: {}", "Error".red(), e)?;
            return Ok(EXIT_FAILURE);
        }
    };

    let value = if verbatim {
        Ok(node.verbatim_value().map(str::to_string))
    } else {
        node.value()
    };

    match value {
        Ok(value) => {
            writeln!(out, "{}", value.unwrap_or_default())?;
            Ok(0)
        }
        Err(e) => {
            writeln!(err, "{}: {}", "Error".red(), e)?;
            Ok(EXIT_FAILURE)
        }
    }
}

fn cmd_dump(
    file: &Path,
    format: DumpFormat,
    verbatim: bool,
    output: Option<PathBuf>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<u8> {
    let conf = match load_config(file) {
        Ok(c) => c,
        Err(e) => {
            writeln!(err, "{}", e.red())?;
            return Ok(EXIT_LOAD_FAILURE);
        }
    };

    let content = match format_tree(&conf, format, verbatim) {
        Ok(content) => content,
        Err(e) => {
            writeln!(err, "{}: {}", "Error".red(), e)?;
            return Ok(EXIT_FAILURE);
        }
    };

    if let Some(output_path) = output {
        if let Err(e) = std::fs::write(&output_path, &content) {
            writeln!(err, "{}: {}", "Error writing file".red(), e)?;
            return Ok(EXIT_LOAD_FAILURE);
        }
        writeln!(err, "{} Wrote to {}", "✓".green(), output_path.display())?;
    } else {
        write!(out, "{}", content)?;
    }
    Ok(0)
}

fn format_tree(conf: &Configuration, format: DumpFormat, verbatim: bool) -> Result<String, String> {
    if format == DumpFormat::Laconic && verbatim {
        return Ok(render(conf));
    }

    let snapshot = conf.root().snapshot(verbatim).map_err(|e| e.to_string())?;
    match format {
        DumpFormat::Laconic => Ok(snapshot.to_laconic()),
        DumpFormat::Json => serde_json::to_string_pretty(&snapshot)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| e.to_string()),
        DumpFormat::Yaml => serde_yaml::to_string(&snapshot).map_err(|e| e.to_string()),
    }
}

fn cmd_tokens(file: &Path, out: &mut dyn Write, err: &mut dyn Write) -> io::Result<u8> {
    let tokens = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {}", file.display(), e))
        .and_then(|text| {
            tokenize(&text).map_err(|e| format!("Failed to lex {}: {}", file.display(), e))
        });

    match tokens {
        Ok(tokens) => match serde_json::to_string_pretty(&tokens) {
            Ok(json) => {
                writeln!(out, "{}", json)?;
                Ok(0)
            }
            Err(e) => {
                writeln!(err, "{}: {}", "Error".red(), e)?;
                Ok(EXIT_FAILURE)
            }
        },
        Err(e) => {
            writeln!(err, "{}", e.red())?;
            Ok(EXIT_LOAD_FAILURE)
        }
    }
}
