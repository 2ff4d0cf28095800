//! Argument parsing and dispatch for the `packy` binary.
//!
//! Two paths exist. Arguments that parse as the `convert` subcommand run the
//! converter directly. Anything else is treated as a packer invocation: every
//! argument ending in `.yaml`/`.yml` is converted into a fresh `.json` temp
//! file, the temp path replaces the argument, and the rewritten command line
//! is handed to packer. The packer exit code is propagated unless the user
//! interrupted the run, in which case [`Exit::CANCELLED`] is returned without
//! reporting the child status.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::convert;
use crate::tempfiles::TempFileRegistry;

/// Process exit codes.
pub struct Exit;

impl Exit {
    pub const OK: i32 = 0;
    pub const CANCELLED: i32 = 1;
    pub const ERROR: i32 = 2;
}

static YAML_ARG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.ya?ml$").expect("valid regex"));

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static INSTALL_HANDLER: Once = Once::new();

/// Direction requested on the command line, before extension inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedDirection {
    ToJson,
    ToYaml,
    Inferred,
}

/// Concrete conversion direction after inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToJson,
    ToYaml,
}

impl RequestedDirection {
    /// Resolve against the template's extension. `Inferred` with an
    /// unrecognized extension is a usage error.
    fn resolve(self, template: &Path) -> Result<Direction, String> {
        match self {
            RequestedDirection::ToJson => Ok(Direction::ToJson),
            RequestedDirection::ToYaml => Ok(Direction::ToYaml),
            RequestedDirection::Inferred => {
                match template.extension().and_then(|e| e.to_str()) {
                    Some("yaml") | Some("yml") => Ok(Direction::ToJson),
                    Some("json") => Ok(Direction::ToYaml),
                    _ => Err(format!(
                        "cannot infer a conversion direction for '{}': \
                         pass --json or --yaml, or use a .yaml/.yml/.json extension",
                        template.display()
                    )),
                }
            }
        }
    }
}

/// A recognized `convert` invocation.
#[derive(Debug)]
pub struct ConvertArgs {
    pub template: String,
    pub out: Option<String>,
    pub direction: RequestedDirection,
}

/// Outcome of argument parsing. Parse failures are not errors here; they
/// select the fallback path instead.
#[derive(Debug)]
pub enum Parsed {
    /// The `convert` subcommand, fully parsed.
    Convert(ConvertArgs),
    /// Unrecognized arguments, to be delegated to packer verbatim.
    Fallback(Vec<String>),
    /// Help or version output was already printed; exit with this code.
    Done(i32),
}

fn command() -> Command {
    Command::new("packy")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Packer wrapper that converts between YAML and JSON templates")
        .subcommand(
            Command::new("convert")
                .about("Convert between JSON and YAML")
                .arg(
                    Arg::new("template")
                        .help("JSON or YAML file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .help("Output file ('-' or absent means stdout)"),
                )
                .arg(
                    Arg::new("json")
                        .long("from-yaml-to-json")
                        .visible_aliases(["y-to-j", "json"])
                        .short('j')
                        .action(ArgAction::SetTrue)
                        .conflicts_with("yaml")
                        .help("src is YAML, dst is JSON"),
                )
                .arg(
                    Arg::new("yaml")
                        .long("from-json-to-yaml")
                        .visible_aliases(["j-to-y", "yaml", "yml"])
                        .short('y')
                        .action(ArgAction::SetTrue)
                        .help("src is JSON, dst is YAML"),
                ),
        )
}

/// Parse process arguments. Anything clap rejects becomes
/// [`Parsed::Fallback`] rather than an error.
pub fn parse_args(args: &[String]) -> Parsed {
    let matches = match command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => {
            // Help and version are not delegation intent.
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = err.print();
                    Parsed::Done(Exit::OK)
                }
                _ => Parsed::Fallback(args.to_vec()),
            };
        }
    };

    match matches.subcommand() {
        Some(("convert", sub)) => {
            let template = sub
                .get_one::<String>("template")
                .expect("template is required")
                .clone();
            let out = sub.get_one::<String>("out").cloned();
            let direction = if sub.get_flag("json") {
                RequestedDirection::ToJson
            } else if sub.get_flag("yaml") {
                RequestedDirection::ToYaml
            } else {
                RequestedDirection::Inferred
            };
            Parsed::Convert(ConvertArgs {
                template,
                out,
                direction,
            })
        }
        _ => Parsed::Fallback(args.to_vec()),
    }
}

/// Run the CLI with the given process arguments, delegating unrecognized
/// invocations to `tool`. Returns the process exit code.
pub fn dispatch(args: &[String], tool: &str) -> i32 {
    match parse_args(args) {
        Parsed::Done(code) => code,
        Parsed::Convert(cmd) => run_convert(&cmd),
        Parsed::Fallback(raw) => delegate(&raw, tool),
    }
}

fn run_convert(cmd: &ConvertArgs) -> i32 {
    let direction = match cmd.direction.resolve(Path::new(&cmd.template)) {
        Ok(direction) => direction,
        Err(msg) => {
            eprintln!("{msg}");
            return Exit::ERROR;
        }
    };

    let source = match fs::read_to_string(&cmd.template) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("cannot read {}: {e}", cmd.template);
            return Exit::ERROR;
        }
    };

    let converted = match direction {
        Direction::ToJson => convert::yaml_to_json(&source),
        Direction::ToYaml => convert::json_to_yaml(&source),
    };
    let output = match converted {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{e}");
            return Exit::ERROR;
        }
    };

    match write_output(cmd.out.as_deref(), &output) {
        Ok(()) => Exit::OK,
        Err(e) => {
            eprintln!("cannot write output: {e}");
            Exit::ERROR
        }
    }
}

/// Write to the named file, or stdout for `-`/absent.
fn write_output(out: Option<&str>, text: &str) -> io::Result<()> {
    match out {
        Some(path) if path != "-" => fs::write(path, text),
        _ => io::stdout().lock().write_all(text.as_bytes()),
    }
}

/// Rewrite fallback arguments: every YAML file reference is converted into a
/// registered temp JSON file whose path replaces the argument.
fn rewrite_args(args: &[String], registry: &mut TempFileRegistry) -> Result<Vec<String>, String> {
    let mut rewritten = Vec::with_capacity(args.len());
    for arg in args {
        if !YAML_ARG.is_match(arg) {
            rewritten.push(arg.clone());
            continue;
        }
        let source =
            fs::read_to_string(arg).map_err(|e| format!("cannot read {arg}: {e}"))?;
        let json = convert::yaml_to_json(&source).map_err(|e| format!("{arg}: {e}"))?;
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .map_err(|e| format!("cannot create temp file: {e}"))?;
        file.write_all(json.as_bytes())
            .map_err(|e| format!("cannot write temp file: {e}"))?;
        let path = file.into_temp_path();
        rewritten.push(path.to_string_lossy().into_owned());
        registry.register(path);
    }
    Ok(rewritten)
}

/// Launch the external tool with YAML arguments rewritten to temp JSON files.
fn delegate(raw_args: &[String], tool: &str) -> i32 {
    let mut registry = TempFileRegistry::new();
    // The program name itself is not scanned.
    let tool_args = if raw_args.is_empty() {
        &raw_args[..]
    } else {
        &raw_args[1..]
    };
    let rewritten = match rewrite_args(tool_args, &mut registry) {
        Ok(rewritten) => rewritten,
        Err(msg) => {
            eprintln!("{msg}");
            registry.cleanup();
            return Exit::ERROR;
        }
    };

    let interrupted = interrupt_flag();
    let status = process::Command::new(tool).args(&rewritten).status();
    let code = match status {
        Err(e) => {
            eprintln!("failed to launch {tool}: {e}");
            Exit::ERROR
        }
        // An interrupt wins over whatever the child reported.
        Ok(_) if interrupted.load(Ordering::SeqCst) => Exit::CANCELLED,
        Ok(status) => status.code().unwrap_or(Exit::CANCELLED),
    };

    registry.cleanup();
    code
}

/// Install the Ctrl-C flag handler once; later calls reuse the same flag.
fn interrupt_flag() -> &'static AtomicBool {
    INSTALL_HANDLER.call_once(|| {
        if let Err(e) = ctrlc::set_handler(|| INTERRUPTED.store(true, Ordering::SeqCst)) {
            warn!("could not install interrupt handler: {e}");
        }
    });
    &INTERRUPTED
}
