// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! External simulator trials.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use super::{Trial, TrialError};
use crate::config::{SimulatorConfig, TrialParams, TrialsConfig};

/// Runs an external simulator once with `--key=value` flags.
///
/// The simulator's stdout and stderr go to `<output>.log`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorTrial {
    program: PathBuf,
    args: Vec<String>,
    output_flag: String,
    params: TrialParams,
}

impl SimulatorTrial {
    pub fn new(simulator: &SimulatorConfig, params: TrialParams) -> Self {
        Self {
            program: simulator.program.clone(),
            args: simulator.args.clone(),
            output_flag: simulator.output_flag.clone(),
            params,
        }
    }

    /// One trial per `[[trial]]` table.
    pub fn from_config(config: &TrialsConfig) -> Vec<Self> {
        config
            .trials
            .iter()
            .map(|params| Self::new(&config.simulator, params.clone()))
            .collect()
    }

    pub fn params(&self) -> &TrialParams {
        &self.params
    }

    /// Arguments passed to the program, in order.
    pub fn arguments(&self, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        for (key, value) in &self.params {
            args.push(format!("--{key}={}", flag_value(value)).into());
        }
        let mut out = OsString::from(format!("--{}=", self.output_flag));
        out.push(output.as_os_str());
        args.push(out);
        args
    }
}

fn flag_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items.iter().map(flag_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

impl Trial for SimulatorTrial {
    fn run(&self, index: usize, output: &Path) -> Result<(), TrialError> {
        let program = self.program.display().to_string();
        let mut log_path = output.as_os_str().to_owned();
        log_path.push(".log");
        let log_path = PathBuf::from(log_path);
        let stdout = File::create(&log_path).map_err(|e| TrialError::io(&log_path, e))?;
        let stderr = stdout
            .try_clone()
            .map_err(|e| TrialError::io(&log_path, e))?;

        let args = self.arguments(output);
        debug!(trial = index, program = %program, ?args, "Starting simulator");
        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status()
            .map_err(|source| TrialError::Spawn { program, source })?;

        if status.success() {
            Ok(())
        } else {
            Err(TrialError::Failed {
                index,
                status: status.to_string(),
            })
        }
    }
}
