use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser};
use rez::{CallError, ConcatOptions, LengthPolicy, Value};
use rez_contracts::{
    REZ_CONCAT_REPORT_SCHEMA_VERSION, REZ_EXPORTS_REPORT_SCHEMA_VERSION,
    REZ_HTML_REPORT_SCHEMA_VERSION,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod host;
mod report;

use report::{CallReport, ExportsReport, MachineArgs};

/// Exit code for a call rejected at the module boundary.
const EXIT_BAD_ARGUMENT: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "rez")]
#[command(about = "Concatenate and HTML-escape host values given as JSON.", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    machine: MachineArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Join the text of every element of a JSON array.
    Concat(ConcatArgs),
    /// HTML-escape the text of a JSON value. Empty input means "no value".
    Html(HtmlArgs),
    /// List the functions the module exports.
    Exports,
}

#[derive(Debug, Clone, Args)]
struct ConcatArgs {
    /// JSON input file, or `-` for stdin.
    #[arg(long = "in", value_name = "PATH", default_value = "-")]
    input: PathBuf,

    /// How many positions of the sequence to visit.
    #[arg(
        long,
        value_enum,
        value_name = "POLICY",
        default_value_t = LengthPolicy::Reported,
        env = "REZ_LENGTH_POLICY"
    )]
    length_policy: LengthPolicy,
}

#[derive(Debug, Clone, Args)]
struct HtmlArgs {
    /// JSON input file, or `-` for stdin.
    #[arg(long = "in", value_name = "PATH", default_value = "-")]
    input: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("REZ_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn try_main() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Command::Concat(args) => cmd_concat(&cli.machine, args),
        Command::Html(args) => cmd_html(&cli.machine, args),
        Command::Exports => cmd_exports(&cli.machine),
    }
}

fn cmd_concat(machine: &MachineArgs, args: ConcatArgs) -> Result<ExitCode> {
    let input = read_input(&args.input)?;
    let value = host::parse_input(&input)
        .with_context(|| format!("read concat input: {}", args.input.display()))?;

    let module = rez::module::open_with(ConcatOptions {
        length: args.length_policy,
    });
    tracing::debug!(length_policy = args.length_policy.as_str(), "concat");
    let outcome = module.call("concat", &host::call_args(value));

    let mut report = CallReport {
        schema_version: REZ_CONCAT_REPORT_SCHEMA_VERSION,
        ok: false,
        command: "concat",
        length_policy: Some(args.length_policy.as_str()),
        result: None,
        result_is_null: false,
        result_len: 0,
        error: None,
    };
    finish(machine, &mut report, outcome)
}

fn cmd_html(machine: &MachineArgs, args: HtmlArgs) -> Result<ExitCode> {
    let input = read_input(&args.input)?;
    let value = host::parse_input(&input)
        .with_context(|| format!("read html input: {}", args.input.display()))?;

    let module = rez::module::open();
    let outcome = module.call("escape.html", &host::call_args(value));

    let mut report = CallReport {
        schema_version: REZ_HTML_REPORT_SCHEMA_VERSION,
        ok: false,
        command: "html",
        length_policy: None,
        result: None,
        result_is_null: false,
        result_len: 0,
        error: None,
    };
    finish(machine, &mut report, outcome)
}

fn cmd_exports(machine: &MachineArgs) -> Result<ExitCode> {
    let exports = rez::module::open().function_paths();
    let mut listing = exports.join("\n");
    listing.push('\n');
    report::write_primary(machine, listing.as_bytes())?;
    report::emit(
        machine,
        &ExportsReport {
            schema_version: REZ_EXPORTS_REPORT_SCHEMA_VERSION,
            ok: true,
            command: "exports",
            exports,
        },
    )?;
    Ok(ExitCode::SUCCESS)
}

fn finish(
    machine: &MachineArgs,
    report: &mut CallReport,
    outcome: Result<Value, CallError>,
) -> Result<ExitCode> {
    match outcome {
        Ok(Value::String(bytes)) => {
            report.ok = true;
            report.result_len = bytes.len();
            report.result = Some(String::from_utf8_lossy(&bytes).into_owned());
            report::write_primary(machine, &bytes)?;
            report::emit(machine, &*report)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(Value::Nil) => {
            report.ok = true;
            report.result_is_null = true;
            report::emit(machine, &*report)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(other) => anyhow::bail!(
            "{}: unexpected {} result",
            report.command,
            other.type_name()
        ),
        Err(err) => {
            eprintln!("rez {}: {err}", report.command);
            report.error = Some(err.to_string());
            report::emit(machine, &*report)?;
            Ok(ExitCode::from(EXIT_BAD_ARGUMENT))
        }
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("read stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("read input: {}", path.display()))
}
