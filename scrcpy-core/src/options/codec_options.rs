//! Encoder parameters forwarded to the device's `MediaFormat`.
//!
//! Rendered as `key=value` pairs joined by commas, in insertion order.
//! Non-int values carry a type suffix on the key (`key:float=1.5`), which
//! the server uses to pick the `MediaFormat` setter.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CodecOptionValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Text(String),
}

impl CodecOptionValue {
    fn type_suffix(&self) -> &'static str {
        match self {
            CodecOptionValue::Int(_) => "",
            CodecOptionValue::Long(_) => ":long",
            CodecOptionValue::Float(_) => ":float",
            CodecOptionValue::Text(_) => ":string",
        }
    }
}

impl fmt::Display for CodecOptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecOptionValue::Int(v) => write!(f, "{v}"),
            CodecOptionValue::Long(v) => write!(f, "{v}"),
            CodecOptionValue::Float(v) => write!(f, "{v}"),
            CodecOptionValue::Text(v) => f.write_str(v),
        }
    }
}

/// Ordered codec parameter map.
///
/// Serialized as a map whose entries keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodecOptions {
    entries: Vec<(String, CodecOptionValue)>,
}

impl CodecOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`; a replaced entry keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: CodecOptionValue) -> &mut Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&CodecOptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<CodecOptionValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // ── Well-known keys ──────────────────────────────────────────

    /// `MediaCodecInfo.CodecProfileLevel` profile constant.
    pub fn with_profile(mut self, profile: i32) -> Self {
        self.set("profile", CodecOptionValue::Int(profile));
        self
    }

    /// `MediaCodecInfo.CodecProfileLevel` level constant.
    pub fn with_level(mut self, level: i32) -> Self {
        self.set("level", CodecOptionValue::Int(level));
        self
    }

    pub fn with_i_frame_interval(mut self, seconds: f32) -> Self {
        self.set("i-frame-interval", CodecOptionValue::Float(seconds));
        self
    }

    pub fn with_max_bframes(mut self, count: i32) -> Self {
        self.set("max-bframes", CodecOptionValue::Int(count));
        self
    }

    pub fn with_repeat_previous_frame_after(mut self, micros: i64) -> Self {
        self.set("repeat-previous-frame-after", CodecOptionValue::Long(micros));
        self
    }

    pub fn with_max_pts_gap_to_encoder(mut self, micros: i64) -> Self {
        self.set("max-pts-gap-to-encoder", CodecOptionValue::Long(micros));
        self
    }

    pub fn with_intra_refresh_period(mut self, frames: i32) -> Self {
        self.set("intra-refresh-period", CodecOptionValue::Int(frames));
        self
    }

    /// Wire rendering, or `None` when no entry is present.
    pub fn to_option_value(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let pairs: Vec<String> = self
            .entries
            .iter()
            .map(|(key, value)| format!("{key}{}={value}", value.type_suffix()))
            .collect();
        Some(pairs.join(","))
    }
}

// ── Serde ────────────────────────────────────────────────────────

impl Serialize for CodecOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

struct CodecOptionsVisitor;

impl<'de> Visitor<'de> for CodecOptionsVisitor {
    type Value = CodecOptions;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of codec option names to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut options = CodecOptions::new();
        while let Some((key, value)) = map.next_entry::<String, CodecOptionValue>()? {
            options.set(key, value);
        }
        Ok(options)
    }
}

impl<'de> Deserialize<'de> for CodecOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CodecOptionsVisitor)
    }
}
