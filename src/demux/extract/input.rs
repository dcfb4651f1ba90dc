// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Robot input extractor. Efforts are reindexed like measured efforts.

use serde::Serialize;

use super::Fields;
use crate::core::Result;
use crate::demux::index_map::NameIndexMap;

/// One commanded-effort message in canonical order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSample {
    /// Publisher time in microseconds
    pub utime: i64,
    /// Commanded efforts
    pub u: Vec<f64>,
}

pub(super) fn extract(
    fields: &Fields<'_>,
    efforts: &NameIndexMap,
    channel: &str,
    timestamp: i64,
) -> Result<InputSample> {
    let u = efforts.reindex(
        "efforts",
        &fields.string_vec("effort_names")?,
        &fields.f64_vec("efforts")?,
        channel,
        timestamp,
    )?;
    Ok(InputSample {
        utime: fields.i64("utime")?,
        u,
    })
}
