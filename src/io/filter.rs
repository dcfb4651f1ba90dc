// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Channel filtering for log readers and writers.

use std::fmt;
use std::sync::Arc;

/// Filter for selecting channels while reading or copying a log.
#[derive(Clone, Default)]
pub enum ChannelFilter {
    /// Read all channels (no filtering)
    #[default]
    All,
    /// Read only specific channels
    Include(Vec<String>),
    /// Exclude specific channels
    Exclude(Vec<String>),
    /// Include channels matching regex pattern
    RegexInclude(Arc<regex::Regex>),
    /// Exclude channels matching regex pattern
    RegexExclude(Arc<regex::Regex>),
    /// Custom filter function
    Custom(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl fmt::Debug for ChannelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.debug_tuple("All").finish(),
            Self::Include(v) => f.debug_tuple("Include").field(v).finish(),
            Self::Exclude(v) => f.debug_tuple("Exclude").field(v).finish(),
            Self::RegexInclude(re) => f.debug_tuple("RegexInclude").field(&re.as_str()).finish(),
            Self::RegexExclude(re) => f.debug_tuple("RegexExclude").field(&re.as_str()).finish(),
            Self::Custom(_) => f.debug_tuple("Custom").field(&"<fn>").finish(),
        }
    }
}

impl ChannelFilter {
    /// Check if a channel should be included.
    pub fn should_include(&self, channel: &str) -> bool {
        match self {
            ChannelFilter::All => true,
            ChannelFilter::Include(channels) => channels.iter().any(|c| c == channel),
            ChannelFilter::Exclude(channels) => !channels.iter().any(|c| c == channel),
            ChannelFilter::RegexInclude(re) => re.is_match(channel),
            ChannelFilter::RegexExclude(re) => !re.is_match(channel),
            ChannelFilter::Custom(f) => f(channel),
        }
    }

    /// Create an include filter from channel names.
    pub fn include(channels: Vec<String>) -> Self {
        Self::Include(channels)
    }

    /// Create an exclude filter from channel names.
    pub fn exclude(channels: Vec<String>) -> Self {
        Self::Exclude(channels)
    }

    /// Create a regex include filter.
    pub fn regex_include(pattern: &str) -> Result<Self, regex::Error> {
        regex::Regex::new(pattern).map(|re| Self::RegexInclude(Arc::new(re)))
    }

    /// Create a regex exclude filter.
    pub fn regex_exclude(pattern: &str) -> Result<Self, regex::Error> {
        regex::Regex::new(pattern).map(|re| Self::RegexExclude(Arc::new(re)))
    }

    /// Create a custom filter from a function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }
}
