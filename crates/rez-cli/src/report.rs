use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "kebab_case")]
pub enum JsonArg {
    #[clap(alias = "true")]
    Canon,
    Pretty,
    #[clap(alias = "false")]
    Off,
}

#[derive(Debug, Clone, Args)]
pub struct MachineArgs {
    /// Write the command's primary output to a file instead of stdout.
    #[arg(long, global = true, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Emit a machine-readable JSON report to stdout.
    ///
    /// `--json` / `--json=canon` for compact JSON, `--json=pretty` for indented output,
    /// `--json=off` (or `false`) to disable.
    #[arg(
        long,
        global = true,
        num_args(0..=1),
        default_missing_value = "canon",
        value_enum,
        value_name = "MODE"
    )]
    pub json: Option<JsonArg>,

    /// Also write the JSON report to a file.
    #[arg(long, global = true, value_name = "PATH")]
    pub report_out: Option<PathBuf>,
}

impl MachineArgs {
    pub fn json_mode(&self) -> JsonArg {
        self.json.unwrap_or(JsonArg::Off)
    }
}

/// Outcome of one call through the module table.
#[derive(Debug, Serialize)]
pub struct CallReport {
    pub schema_version: &'static str,
    pub ok: bool,
    pub command: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_policy: Option<&'static str>,
    /// Result text; bytes that are not UTF-8 are replaced.
    pub result: Option<String>,
    pub result_is_null: bool,
    pub result_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExportsReport {
    pub schema_version: &'static str,
    pub ok: bool,
    pub command: &'static str,
    pub exports: Vec<String>,
}

/// Writes `report` to stdout (unless JSON is off) and to `--report-out` if given.
pub fn emit<T: Serialize>(machine: &MachineArgs, report: &T) -> Result<()> {
    let mode = machine.json_mode();
    let bytes = match mode {
        JsonArg::Pretty => serde_json::to_vec_pretty(report)?,
        JsonArg::Canon | JsonArg::Off => serde_json::to_vec(report)?,
    };

    if let Some(path) = &machine.report_out {
        write_file(path, &bytes)?;
    }
    if mode != JsonArg::Off {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&bytes).context("write report to stdout")?;
        stdout.write_all(b"\n").context("write report to stdout")?;
        stdout.flush().context("flush stdout")?;
    }
    Ok(())
}

/// Primary output: raw bytes to `--out`, or to stdout when no JSON report owns it.
pub fn write_primary(machine: &MachineArgs, bytes: &[u8]) -> Result<()> {
    if let Some(path) = &machine.out {
        return write_file(path, bytes);
    }
    if machine.json_mode() == JsonArg::Off {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(bytes).context("write output to stdout")?;
        stdout.flush().context("flush stdout")?;
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write: {}", path.display()))
}
