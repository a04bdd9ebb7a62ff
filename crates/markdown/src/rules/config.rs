//! Serializable embed rule configuration.

use super::EmbedRule;
use crate::ConvertError;
use serde::{Deserialize, Serialize};

/// One embed rule in [`Options::embeds`](crate::Options::embeds).
///
/// Written either as a preset name (`"tweet"`) or as
/// `{ "kind": "gist", "pattern": "^https://gist\\.github\\.com/" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbedConfig {
    /// A built-in recognizer.
    Preset(EmbedPreset),
    /// A custom recognizer.
    Pattern {
        /// `_type` of the emitted block.
        kind: String,
        /// Regular expression matched at the start of the link destination.
        pattern: String,
    },
}

/// Built-in embed recognizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedPreset {
    /// Tweet status links.
    Tweet,
    /// YouTube video links.
    Youtube,
}

impl EmbedConfig {
    /// Compiles the configured rule.
    pub fn build(&self) -> Result<EmbedRule, ConvertError> {
        match self {
            EmbedConfig::Preset(EmbedPreset::Tweet) => Ok(EmbedRule::tweet()),
            EmbedConfig::Preset(EmbedPreset::Youtube) => Ok(EmbedRule::youtube()),
            EmbedConfig::Pattern { kind, pattern } => EmbedRule::new(kind.as_str(), pattern),
        }
    }
}

impl From<EmbedPreset> for EmbedConfig {
    fn from(preset: EmbedPreset) -> Self {
        EmbedConfig::Preset(preset)
    }
}
