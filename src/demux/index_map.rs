// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Name to slot maps used to reorder named vectors.
//!
//! Robot state arrives as parallel `(names, values)` arrays whose order is
//! whatever the publisher chose. A [`NameIndexMap`] assigns every name its
//! canonical slot so rows from different publishers line up.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{LogError, Result};

/// Immutable mapping from field name to canonical vector slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameIndexMap {
    slots: HashMap<String, usize>,
}

impl NameIndexMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON object of `name: slot` pairs.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LogError::parse("index map", e.to_string()))
    }

    /// Load a JSON file of `name: slot` pairs.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LogError::parse(
                "index map",
                format!("Failed to read {}: {e}", path.display()),
            )
        })?;
        Self::from_json_str(&text)
    }

    /// Slot of `name`.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.slots.get(name).copied()
    }

    /// Number of names.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names ordered by slot.
    pub fn names_by_slot(&self) -> Vec<&str> {
        let mut pairs: Vec<_> = self.slots.iter().collect();
        pairs.sort_by(|a, b| (a.1, a.0).cmp(&(b.1, b.0)));
        pairs.into_iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Place each value at its name's slot: `out[map[name]] = value`.
    ///
    /// The output is as wide as `names`. Every name must be mapped, every
    /// slot must fall inside the output, and no slot may be written twice,
    /// so a successful result has every slot filled exactly once.
    pub fn reindex(
        &self,
        label: &str,
        names: &[String],
        values: &[f64],
        channel: &str,
        timestamp: i64,
    ) -> Result<Vec<f64>> {
        if names.len() != values.len() {
            return Err(LogError::parse(
                label,
                format!("{} names but {} values", names.len(), values.len()),
            ));
        }

        let width = names.len();
        let mut out = vec![0.0; width];
        let mut filled = vec![false; width];
        for (name, &value) in names.iter().zip(values) {
            let index = self
                .get(name)
                .ok_or_else(|| LogError::missing_index_mapping(channel, label, name, timestamp))?;
            if index >= width || filled[index] {
                return Err(LogError::invalid_index_slot(
                    channel, label, name, index, width, timestamp,
                ));
            }
            filled[index] = true;
            out[index] = value;
        }
        Ok(out)
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for NameIndexMap {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// The three maps used to reindex robot state and efforts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMaps {
    /// Position name to slot in `q`
    pub positions: NameIndexMap,
    /// Velocity name to slot in `v`
    pub velocities: NameIndexMap,
    /// Effort name to slot in `u`
    pub efforts: NameIndexMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reindex_permutes() {
        let map: NameIndexMap = [("a", 1), ("b", 0), ("c", 2)].into_iter().collect();
        let out = map
            .reindex("positions", &names(&["a", "b", "c"]), &[1.0, 2.0, 3.0], "S", 0)
            .unwrap();
        assert_eq!(out, vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_missing_name() {
        let map: NameIndexMap = [("a", 0)].into_iter().collect();
        let err = map
            .reindex("positions", &names(&["a", "c"]), &[1.0, 2.0], "S", 5)
            .unwrap_err();
        match err {
            LogError::MissingIndexMapping {
                map,
                field,
                timestamp,
                ..
            } => {
                assert_eq!(map, "positions");
                assert_eq!(field, "c");
                assert_eq!(timestamp, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_slot_out_of_range() {
        let map: NameIndexMap = [("a", 0), ("b", 7)].into_iter().collect();
        let err = map
            .reindex("velocities", &names(&["a", "b"]), &[1.0, 2.0], "CASSIE_STATE", 777)
            .unwrap_err();
        match err {
            LogError::InvalidIndexSlot {
                channel,
                index,
                width,
                timestamp,
                ..
            } => {
                assert_eq!(channel, "CASSIE_STATE");
                assert_eq!(index, 7);
                assert_eq!(width, 2);
                assert_eq!(timestamp, 777);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_slot_written_twice() {
        let map: NameIndexMap = [("a", 0), ("b", 0)].into_iter().collect();
        let err = map
            .reindex("efforts", &names(&["a", "b"]), &[1.0, 2.0], "S", 0)
            .unwrap_err();
        assert!(matches!(err, LogError::InvalidIndexSlot { .. }));
    }

    #[test]
    fn test_subset_of_map_is_fine() {
        // A map may name more joints than a message carries.
        let map: NameIndexMap = [("a", 0), ("b", 1), ("z", 5)].into_iter().collect();
        let out = map
            .reindex("positions", &names(&["b", "a"]), &[2.0, 1.0], "S", 0)
            .unwrap();
        assert_eq!(out, vec![1.0, 2.0]);
    }

    #[test]
    fn test_from_json() {
        let map = NameIndexMap::from_json_str(r#"{"hip_roll_left": 7, "base_qw": 0}"#).unwrap();
        assert_eq!(map.get("hip_roll_left"), Some(7));
        assert_eq!(map.names_by_slot(), vec!["base_qw", "hip_roll_left"]);
        assert!(NameIndexMap::from_json_str("[1, 2]").is_err());
    }
}
