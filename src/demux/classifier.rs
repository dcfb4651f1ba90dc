// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Channel classification.
//!
//! The first payload seen on a channel decides its schema for the rest of
//! the pass. A channel no decoder accepts is marked unknown and never retried.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::registry::{DecodeAttempt, SchemaId, SchemaRegistry};
use crate::core::DecodedMessage;

/// What a channel is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChannelBinding {
    /// Every payload on the channel is decoded with this schema
    Bound(SchemaId),
    /// No schema accepted the first payload
    Unknown,
}

impl ChannelBinding {
    /// The bound schema, if any.
    pub fn schema(self) -> Option<SchemaId> {
        match self {
            ChannelBinding::Bound(id) => Some(id),
            ChannelBinding::Unknown => None,
        }
    }
}

/// Result of classifying one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// The channel's (possibly just created) binding
    pub binding: ChannelBinding,
    /// Whether this event was the first on its channel
    pub first_sighting: bool,
    /// The message decoded while binding, on a first sighting only
    pub message: Option<DecodedMessage>,
}

/// Memo table from channel name to binding.
#[derive(Debug, Default)]
pub struct ChannelClassifier {
    bindings: HashMap<String, ChannelBinding>,
    order: Vec<String>,
}

impl ChannelClassifier {
    /// Create an empty classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a payload on `channel`, binding the channel on first sight.
    pub fn classify(
        &mut self,
        registry: &SchemaRegistry,
        channel: &str,
        payload: &[u8],
    ) -> Classification {
        if let Some(&binding) = self.bindings.get(channel) {
            return Classification {
                binding,
                first_sighting: false,
                message: None,
            };
        }

        let (binding, message) = match registry.attempt(payload) {
            DecodeAttempt::Decoded(id, msg) => {
                debug!(channel, schema = registry.name(id), "Bound channel");
                (ChannelBinding::Bound(id), Some(msg))
            }
            DecodeAttempt::Unmatched => {
                warn!(channel, "No known schema decodes channel, ignoring it");
                (ChannelBinding::Unknown, None)
            }
        };
        self.bindings.insert(channel.to_string(), binding);
        self.order.push(channel.to_string());

        Classification {
            binding,
            first_sighting: true,
            message,
        }
    }

    /// Binding of a channel, if it has been seen.
    pub fn binding(&self, channel: &str) -> Option<ChannelBinding> {
        self.bindings.get(channel).copied()
    }

    /// All bindings in first-seen order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, ChannelBinding)> {
        self.order
            .iter()
            .map(|c| (c.as_str(), self.bindings[c.as_str()]))
    }

    /// Channels bound to [`ChannelBinding::Unknown`], in first-seen order.
    pub fn unknown_channels(&self) -> Vec<&str> {
        self.bindings()
            .filter(|(_, b)| *b == ChannelBinding::Unknown)
            .map(|(c, _)| c)
            .collect()
    }

    /// Number of channels seen.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if no channel has been seen.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CodecValue, LogError, Result};
    use crate::demux::registry::MessageDecoder;
    use crate::schema::TypeTable;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Accepts payloads starting with `tag` and counts calls.
    struct Tagged {
        tag: u8,
        calls: Arc<AtomicUsize>,
    }

    impl MessageDecoder for Tagged {
        fn name(&self) -> &str {
            "tagged"
        }

        fn decode(&self, data: &[u8]) -> Result<DecodedMessage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match data.first() {
                Some(&b) if b == self.tag => {
                    Ok(DecodedMessage::from([("tag".into(), CodecValue::UInt8(b))]))
                }
                _ => Err(LogError::parse("tagged", "wrong tag")),
            }
        }
    }

    fn registry(calls: &Arc<AtomicUsize>) -> SchemaRegistry {
        let mut registry = SchemaRegistry::new(TypeTable::new());
        registry.register(Box::new(Tagged {
            tag: 1,
            calls: Arc::clone(calls),
        }));
        registry
    }

    #[test]
    fn test_binding_is_memoized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(&calls);
        let mut classifier = ChannelClassifier::new();

        let first = classifier.classify(&registry, "A", &[1]);
        assert!(first.first_sighting);
        assert!(first.message.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // A later payload the schema would reject does not rebind.
        let second = classifier.classify(&registry, "A", &[9]);
        assert!(!second.first_sighting);
        assert_eq!(second.binding, first.binding);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_is_permanent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(&calls);
        let mut classifier = ChannelClassifier::new();

        assert_eq!(
            classifier.classify(&registry, "N", &[0]).binding,
            ChannelBinding::Unknown
        );
        // Never retried, even with a decodable payload.
        assert_eq!(
            classifier.classify(&registry, "N", &[1]).binding,
            ChannelBinding::Unknown
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(classifier.unknown_channels(), vec!["N"]);
    }

    #[test]
    fn test_bindings_in_first_seen_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(&calls);
        let mut classifier = ChannelClassifier::new();
        for channel in ["C", "A", "B", "A"] {
            classifier.classify(&registry, channel, &[1]);
        }
        let order: Vec<_> = classifier.bindings().map(|(c, _)| c).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(classifier.len(), 3);
    }

    #[test]
    fn test_binding_schema() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = registry(&calls);
        let mut classifier = ChannelClassifier::new();
        classifier.classify(&registry, "A", &[1]);
        let id = classifier.binding("A").and_then(ChannelBinding::schema).unwrap();
        assert_eq!(registry.name(id), "tagged");
        assert_eq!(classifier.binding("missing"), None);
        assert_eq!(ChannelBinding::Unknown.schema(), None);
    }
}
