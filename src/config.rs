// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! TOML configuration for demultiplexing passes and simulator trials.
//!
//! A demux config names the channel each extractor reads and supplies the
//! three index maps, inline or as JSON files:
//!
//! ```toml
//! [channels]
//! robot_output = "CASSIE_STATE_SIMULATION"
//! robot_input = "CASSIE_INPUT"
//! osc_debug = "OSC_DEBUG_WALKING"
//! contact_results = "CASSIE_CONTACT_DRAKE"
//!
//! [index_maps]
//! positions = { file = "pos_map.json" }
//! velocities = { file = "vel_map.json" }
//! efforts = { hip_roll_left_motor = 0, hip_roll_right_motor = 1 }
//! ```
//!
//! Relative map files resolve against the directory of the config file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{LogError, Result};
use crate::demux::{ExtractorKind, IndexMaps, NameIndexMap};

/// Channel name per extractor. Unset extractors do not run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChannelConfig {
    pub robot_output: Option<String>,
    pub robot_input: Option<String>,
    pub osc_debug: Option<String>,
    pub contact_results: Option<String>,
    pub saved_traj: Option<String>,
}

impl ChannelConfig {
    /// Configured extractors and their channels.
    pub fn extractors(&self) -> Vec<(ExtractorKind, &str)> {
        [
            (ExtractorKind::State, &self.robot_output),
            (ExtractorKind::Input, &self.robot_input),
            (ExtractorKind::OscDebug, &self.osc_debug),
            (ExtractorKind::Contact, &self.contact_results),
            (ExtractorKind::SavedTraj, &self.saved_traj),
        ]
        .into_iter()
        .filter_map(|(kind, channel)| channel.as_deref().map(|c| (kind, c)))
        .collect()
    }
}

/// Where an index map comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexMapSource {
    /// A JSON object file of name to slot
    File { file: PathBuf },
    /// Name to slot, written in the config
    Inline(HashMap<String, usize>),
}

impl Default for IndexMapSource {
    fn default() -> Self {
        IndexMapSource::Inline(HashMap::new())
    }
}

impl IndexMapSource {
    /// Load the map. Relative files resolve against `base`.
    pub fn load(&self, base: Option<&Path>) -> Result<NameIndexMap> {
        match self {
            IndexMapSource::Inline(slots) => Ok(slots.iter().map(|(k, &v)| (k.as_str(), v)).collect()),
            IndexMapSource::File { file } => {
                let path = match base {
                    Some(dir) if file.is_relative() => dir.join(file),
                    _ => file.clone(),
                };
                NameIndexMap::from_json_file(path)
            }
        }
    }
}

/// Index map sources for positions, velocities and efforts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexMapConfig {
    pub positions: IndexMapSource,
    pub velocities: IndexMapSource,
    pub efforts: IndexMapSource,
}

/// Configuration of a demultiplexing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemuxConfig {
    pub channels: ChannelConfig,
    pub index_maps: IndexMapConfig,
    /// Directory relative map files resolve against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl DemuxConfig {
    /// Parse a config from TOML text. Relative map files resolve against the
    /// working directory.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| LogError::parse("DemuxConfig", e.to_string()))
    }

    /// Load a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_toml_str(&read_config(path)?)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Load all three index maps.
    pub fn index_maps(&self) -> Result<IndexMaps> {
        let base = self.base_dir.as_deref();
        Ok(IndexMaps {
            positions: self.index_maps.positions.load(base)?,
            velocities: self.index_maps.velocities.load(base)?,
            efforts: self.index_maps.efforts.load(base)?,
        })
    }
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| LogError::parse(format!("config {}", path.display()), e.to_string()))
}

/// External simulator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Program to run, looked up on `PATH` when it has no directory part
    pub program: PathBuf,
    /// Arguments passed before the per-trial flags
    #[serde(default)]
    pub args: Vec<String>,
    /// Flag that receives the trial's output path, as `--<flag>=<path>`
    #[serde(default = "default_output_flag")]
    pub output_flag: String,
}

fn default_output_flag() -> String {
    "output".to_string()
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(8)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("trials")
}

/// Parameters of one trial, passed to the simulator as `--key=value`.
pub type TrialParams = BTreeMap<String, toml::Value>;

/// A batch of independent simulator trials.
///
/// ```toml
/// workers = 4
/// output_dir = "results"
///
/// [simulator]
/// program = "./bazel-bin/examples/Cassie/multibody_sim"
/// args = ["--publish_rate=2000"]
/// output_flag = "save_file"
///
/// [[trial]]
/// mu = 0.8
/// stiffness = 4e4
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrialsConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Per-trial outputs are written here, relative to the config file
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    pub simulator: SimulatorConfig,
    #[serde(default, rename = "trial")]
    pub trials: Vec<TrialParams>,
}

impl TrialsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| LogError::parse("TrialsConfig", e.to_string()))?;
        if config.workers == 0 {
            return Err(LogError::parse("TrialsConfig", "workers must be at least 1"));
        }
        Ok(config)
    }

    /// Load a config file, resolving `output_dir` against its directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_toml_str(&read_config(path)?)?;
        if config.output_dir.is_relative() {
            if let Some(dir) = path.parent() {
                config.output_dir = dir.join(&config.output_dir);
            }
        }
        Ok(config)
    }
}
