// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Heterogeneous event-log demultiplexer.
//!
//! A single forward pass over timestamped, channel-tagged events. Each new
//! channel is classified once against the [`SchemaRegistry`]; later payloads
//! on a bound channel must decode with the same schema or the pass stops with
//! [`LogError::SchemaViolation`]. Decoded messages go to a per-channel
//! [`ChannelAccumulator`] and, for the configured channels, through the
//! schema-specific extractors into [`ExtractedTables`].
//!
//! # Architecture
//!
//! - [`SchemaRegistry`] - ordered decoders, first match wins
//! - [`ChannelClassifier`] - one-shot channel to schema binding
//! - [`ChannelAccumulator`] - decoded messages per channel
//! - [`extract`] - robot state, input, controller debug, contact and planner tables
//! - [`Demultiplexer`] - drives the pass and produces a [`DemuxSummary`]
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use lcmlog::demux::{Demultiplexer, ExtractorKind, IndexMaps, SchemaRegistry};
//! use lcmlog::io::LogReader;
//!
//! let reader = LogReader::open("lcmlog-2023-01-01.00")?;
//! let mut demux = Demultiplexer::new(SchemaRegistry::builtin()?, IndexMaps::default())?
//!     .with_extractor(ExtractorKind::Contact, "CASSIE_CONTACT_DRAKE")?;
//! demux.run(reader.events())?;
//! let output = demux.finish();
//! println!("{} contact samples", output.tables.contact.samples.len());
//! # Ok(())
//! # }
//! ```

pub mod accumulator;
pub mod classifier;
pub mod extract;
pub mod index_map;
pub mod registry;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::DemuxConfig;
use crate::core::{DecodedMessage, LogError, Result};
use crate::io::{ChannelFilter, Event};
use crate::schema::TypeTable;

pub use accumulator::{ChannelAccumulator, ChannelSeries, TimeSeries};
pub use classifier::{ChannelBinding, ChannelClassifier, Classification};
pub use extract::{ExtractedTables, ExtractorKind, PendingRow};
pub use index_map::{IndexMaps, NameIndexMap};
pub use registry::{DecodeAttempt, LcmType, MessageDecoder, SchemaId, SchemaRegistry};

/// Options for a demultiplexing pass.
#[derive(Clone, Debug)]
pub struct DemuxOptions {
    /// Keep every decoded message in the per-channel accumulator.
    ///
    /// Extraction runs either way; turning this off bounds memory on long
    /// logs when only the extracted tables are needed.
    pub keep_raw: bool,

    /// Channels to process. Events on other channels are counted as skipped
    /// and never classified.
    pub filter: ChannelFilter,
}

impl Default for DemuxOptions {
    fn default() -> Self {
        Self {
            keep_raw: true,
            filter: ChannelFilter::All,
        }
    }
}

impl DemuxOptions {
    pub fn with_keep_raw(mut self, keep_raw: bool) -> Self {
        self.keep_raw = keep_raw;
        self
    }

    pub fn with_filter(mut self, filter: ChannelFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// What happened to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Decoded, extracted and recorded
    Recorded { schema: SchemaId },
    /// The channel is bound to no schema
    Unrecognized,
    /// The channel filter rejected the event
    Skipped,
}

/// A channel dropped from the pass because no schema decodes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognizedChannel {
    pub channel: String,
    /// Timestamp of the first event on the channel (microseconds)
    pub first_timestamp: i64,
    /// Events seen on the channel
    pub events: u64,
}

/// A channel and the schema it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundChannel {
    pub channel: String,
    pub schema: String,
}

/// Statistics from a demultiplexing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DemuxSummary {
    /// Events handed to the demultiplexer
    pub events_seen: u64,
    /// Events decoded and recorded
    pub recorded: u64,
    /// Events rejected by the channel filter
    pub skipped: u64,
    /// Classified channels in first-seen order
    pub bindings: Vec<BoundChannel>,
    /// Channels no schema decodes, in first-seen order
    pub unrecognized: Vec<UnrecognizedChannel>,
    /// Same-side contacts dropped by the contact extractor
    pub contacts_discarded: u64,
    /// Contacts matching neither foot
    pub contacts_unassigned: u64,
}

impl DemuxSummary {
    /// Unrecognized channels as non-fatal errors.
    pub fn unrecognized_errors(&self) -> Vec<LogError> {
        self.unrecognized
            .iter()
            .map(|u| LogError::UnrecognizedChannel {
                channel: u.channel.clone(),
                timestamp: u.first_timestamp,
            })
            .collect()
    }

    /// Emit the summary through `tracing`.
    pub fn log(&self) {
        info!(
            events = self.events_seen,
            recorded = self.recorded,
            skipped = self.skipped,
            channels = self.bindings.len(),
            "Demultiplexing pass complete"
        );
        for u in &self.unrecognized {
            warn!(
                channel = %u.channel,
                first_timestamp = u.first_timestamp,
                events = u.events,
                "Unrecognized channel dropped from the pass"
            );
        }
        if self.contacts_discarded > 0 {
            warn!(
                discarded = self.contacts_discarded,
                "Extra same-side contacts were discarded"
            );
        }
    }
}

/// Everything a pass produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemuxOutput {
    pub summary: DemuxSummary,
    /// Decoded messages per channel (empty when `keep_raw` is off)
    pub channels: ChannelAccumulator,
    /// Typed tables from the configured extractors
    pub tables: ExtractedTables,
}

/// An extractor attached to one channel, with its own decoder.
#[derive(Debug)]
struct ChannelExtractor {
    kind: ExtractorKind,
    channel: String,
    decoder: LcmType,
}

/// Single-pass demultiplexer.
pub struct Demultiplexer {
    registry: SchemaRegistry,
    classifier: ChannelClassifier,
    accumulator: ChannelAccumulator,
    tables: ExtractedTables,
    maps: IndexMaps,
    extractor_types: Arc<TypeTable>,
    extractors: Vec<ChannelExtractor>,
    options: DemuxOptions,
    events_seen: u64,
    recorded: u64,
    skipped: u64,
    unrecognized: Vec<UnrecognizedChannel>,
    unrecognized_index: HashMap<String, usize>,
}

impl Demultiplexer {
    /// Create a demultiplexer with no extractors attached.
    pub fn new(registry: SchemaRegistry, maps: IndexMaps) -> Result<Self> {
        Ok(Self {
            registry,
            classifier: ChannelClassifier::new(),
            accumulator: ChannelAccumulator::new(),
            tables: ExtractedTables::default(),
            maps,
            extractor_types: Arc::new(TypeTable::builtin()?),
            extractors: Vec::new(),
            options: DemuxOptions::default(),
            events_seen: 0,
            recorded: 0,
            skipped: 0,
            unrecognized: Vec::new(),
            unrecognized_index: HashMap::new(),
        })
    }

    /// Build from a loaded configuration, with the built-in registry.
    pub fn from_config(config: &DemuxConfig) -> Result<Self> {
        let mut demux = Self::new(SchemaRegistry::builtin()?, config.index_maps()?)?;
        for (kind, channel) in config.channels.extractors() {
            demux = demux.with_extractor(kind, channel)?;
        }
        Ok(demux)
    }

    pub fn with_options(mut self, options: DemuxOptions) -> Self {
        self.options = options;
        self
    }

    /// Run `kind` on every event of `channel`.
    pub fn with_extractor(mut self, kind: ExtractorKind, channel: impl Into<String>) -> Result<Self> {
        let decoder = LcmType::new(Arc::clone(&self.extractor_types), kind.schema())?;
        self.extractors.push(ChannelExtractor {
            kind,
            channel: channel.into(),
            decoder,
        });
        Ok(self)
    }

    /// Process one event.
    ///
    /// Fatal errors leave the tables and the accumulator as they were before
    /// the event.
    pub fn push(&mut self, event: &Event) -> Result<EventOutcome> {
        self.events_seen += 1;
        let channel = event.channel.as_str();
        let timestamp = event.timestamp;

        if !self.options.filter.should_include(channel) {
            self.skipped += 1;
            return Ok(EventOutcome::Skipped);
        }

        let classification = self.classifier.classify(&self.registry, channel, &event.data);
        let id = match classification.binding {
            ChannelBinding::Bound(id) => id,
            ChannelBinding::Unknown => {
                self.note_unrecognized(channel, timestamp);
                return Ok(EventOutcome::Unrecognized);
            }
        };
        let schema = self.registry.name(id);

        let message = match classification.message {
            Some(msg) => msg,
            None => self
                .registry
                .decode_with(id, &event.data)
                .map_err(|e| LogError::schema_violation(channel, schema, timestamp, e))?,
        };

        let mut rows = Vec::new();
        for extractor in self.extractors.iter().filter(|x| x.channel == channel) {
            let row = if extractor.decoder.name() == schema {
                extract::prepare(extractor.kind, &message, &self.maps, channel, timestamp)?
            } else {
                let own = decode_for(extractor, channel, timestamp, &event.data)?;
                extract::prepare(extractor.kind, &own, &self.maps, channel, timestamp)?
            };
            rows.push(row);
        }

        for row in rows {
            self.tables.commit(timestamp, row);
        }
        if self.options.keep_raw {
            self.accumulator.record(channel, schema, timestamp, message);
        }
        self.recorded += 1;
        Ok(EventOutcome::Recorded { schema: id })
    }

    /// Process every event, stopping at the first fatal error.
    pub fn run<I>(&mut self, events: I) -> Result<DemuxSummary>
    where
        I: IntoIterator<Item = Event>,
    {
        for event in events {
            if let Err(e) = self.push(&event) {
                error!(fields = ?e.log_fields(), "Demultiplexing pass aborted: {e}");
                return Err(e);
            }
        }
        let summary = self.summary();
        summary.log();
        Ok(summary)
    }

    fn note_unrecognized(&mut self, channel: &str, timestamp: i64) {
        match self.unrecognized_index.get(channel) {
            Some(&i) => self.unrecognized[i].events += 1,
            None => {
                self.unrecognized_index
                    .insert(channel.to_string(), self.unrecognized.len());
                self.unrecognized.push(UnrecognizedChannel {
                    channel: channel.to_string(),
                    first_timestamp: timestamp,
                    events: 1,
                });
            }
        }
    }

    /// Statistics so far.
    pub fn summary(&self) -> DemuxSummary {
        DemuxSummary {
            events_seen: self.events_seen,
            recorded: self.recorded,
            skipped: self.skipped,
            bindings: self
                .classifier
                .bindings()
                .filter_map(|(channel, binding)| {
                    binding.schema().map(|id| BoundChannel {
                        channel: channel.to_string(),
                        schema: self.registry.name(id).to_string(),
                    })
                })
                .collect(),
            unrecognized: self.unrecognized.clone(),
            contacts_discarded: self.tables.contact.discarded,
            contacts_unassigned: self.tables.contact.unassigned,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn classifier(&self) -> &ChannelClassifier {
        &self.classifier
    }

    pub fn channels(&self) -> &ChannelAccumulator {
        &self.accumulator
    }

    pub fn tables(&self) -> &ExtractedTables {
        &self.tables
    }

    /// End the pass and hand over the results.
    pub fn finish(self) -> DemuxOutput {
        DemuxOutput {
            summary: self.summary(),
            channels: self.accumulator,
            tables: self.tables,
        }
    }
}

fn decode_for(
    extractor: &ChannelExtractor,
    channel: &str,
    timestamp: i64,
    data: &[u8],
) -> Result<DecodedMessage> {
    extractor
        .decoder
        .decode(data)
        .map_err(|e| LogError::schema_violation(channel, extractor.kind.schema(), timestamp, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CodecValue;
    use crate::encoding::LcmEncoder;
    use crate::schema::builtin;

    struct Payloads {
        types: TypeTable,
    }

    impl Payloads {
        fn new() -> Self {
            Self {
                types: TypeTable::builtin().unwrap(),
            }
        }

        fn robot_input(&self, names: &[&str], efforts: &[f64]) -> Vec<u8> {
            let msg = DecodedMessage::from([
                ("utime".to_string(), CodecValue::Int64(1)),
                ("num_efforts".to_string(), CodecValue::Int32(names.len() as i32)),
                ("effort_names".to_string(), CodecValue::string_array(names)),
                ("efforts".to_string(), CodecValue::f64_array(efforts)),
            ]);
            LcmEncoder::new(&self.types)
                .encode(builtin::ROBOT_INPUT, &msg)
                .unwrap()
        }

        fn contact(&self) -> Vec<u8> {
            let msg = DecodedMessage::from([
                ("timestamp".to_string(), CodecValue::Int64(3)),
                ("num_point_pair_contacts".to_string(), CodecValue::Int32(0)),
                ("point_pair_contact_info".to_string(), CodecValue::Array(vec![])),
            ]);
            LcmEncoder::new(&self.types)
                .encode(builtin::CONTACT_RESULTS, &msg)
                .unwrap()
        }
    }

    fn event(channel: &str, timestamp: i64, data: Vec<u8>) -> Event {
        Event::new(0, timestamp, channel, data)
    }

    fn efforts_map() -> IndexMaps {
        IndexMaps {
            efforts: [("hip", 1), ("knee", 0)].into_iter().collect(),
            ..IndexMaps::default()
        }
    }

    fn demux() -> Demultiplexer {
        Demultiplexer::new(SchemaRegistry::builtin().unwrap(), efforts_map())
            .unwrap()
            .with_extractor(ExtractorKind::Input, "U")
            .unwrap()
    }

    #[test]
    fn test_records_and_extracts() {
        let p = Payloads::new();
        let mut demux = demux();
        let outcome = demux
            .push(&event("U", 10, p.robot_input(&["hip", "knee"], &[1.0, 2.0])))
            .unwrap();
        let id = demux.registry().id_of(builtin::ROBOT_INPUT).unwrap();
        assert_eq!(outcome, EventOutcome::Recorded { schema: id });

        let output = demux.finish();
        assert_eq!(output.tables.input.values[0].u, vec![2.0, 1.0]);
        assert_eq!(output.channels.get("U").unwrap().schema, builtin::ROBOT_INPUT);
        assert_eq!(output.summary.recorded, 1);
    }

    #[test]
    fn test_failing_event_leaves_tables_untouched() {
        let p = Payloads::new();
        let mut demux = demux();
        demux
            .push(&event("U", 10, p.robot_input(&["hip", "knee"], &[1.0, 2.0])))
            .unwrap();

        let err = demux
            .push(&event("U", 20, p.robot_input(&["ankle"], &[1.0])))
            .unwrap_err();
        assert!(matches!(err, LogError::MissingIndexMapping { timestamp: 20, .. }));
        assert_eq!(demux.tables().input.len(), 1);
        assert_eq!(demux.channels().message_count(), 1);
    }

    #[test]
    fn test_schema_violation_after_binding() {
        let p = Payloads::new();
        let mut demux = demux();
        demux
            .push(&event("U", 10, p.robot_input(&["knee"], &[1.0])))
            .unwrap();
        let err = demux.push(&event("U", 11, p.contact())).unwrap_err();
        match err {
            LogError::SchemaViolation {
                channel,
                schema,
                timestamp,
                ..
            } => {
                assert_eq!(channel, "U");
                assert_eq!(schema, builtin::ROBOT_INPUT);
                assert_eq!(timestamp, 11);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extractor_on_channel_bound_to_other_schema() {
        let p = Payloads::new();
        let mut demux = demux();
        demux.push(&event("U", 10, p.contact())).unwrap_err();
        assert!(demux.tables().input.is_empty());
        assert!(demux.channels().is_empty());
    }

    #[test]
    fn test_unrecognized_channels_are_summarized() {
        let mut demux = demux();
        assert_eq!(
            demux.push(&event("NOISE", 5, vec![1, 2, 3])).unwrap(),
            EventOutcome::Unrecognized
        );
        assert_eq!(
            demux.push(&event("NOISE", 6, vec![])).unwrap(),
            EventOutcome::Unrecognized
        );

        let summary = demux.summary();
        assert_eq!(summary.unrecognized.len(), 1);
        assert_eq!(summary.unrecognized[0].first_timestamp, 5);
        assert_eq!(summary.unrecognized[0].events, 2);
        assert!(summary.bindings.is_empty());
        assert!(!summary.unrecognized_errors()[0].is_fatal());
    }

    #[test]
    fn test_filter_and_keep_raw() {
        let p = Payloads::new();
        let mut demux = demux().with_options(
            DemuxOptions::default()
                .with_keep_raw(false)
                .with_filter(ChannelFilter::exclude(vec!["CONTACT".to_string()])),
        );
        let events = vec![
            event("CONTACT", 1, p.contact()),
            event("U", 2, p.robot_input(&["knee"], &[4.0])),
        ];
        let summary = demux.run(events).unwrap();

        assert_eq!(summary.events_seen, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.recorded, 1);
        assert!(demux.channels().is_empty());
        assert_eq!(demux.tables().input.t, vec![2]);
        assert!(demux.classifier().binding("CONTACT").is_none());
    }
}
