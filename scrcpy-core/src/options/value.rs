//! Typed option values and the user-supplied option set.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::codec_options::CodecOptions;

/// Rendered in place of any option that has no value.
pub const UNSET_PLACEHOLDER: &str = "-";

// ── LogLevel ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── VideoOrientation ─────────────────────────────────────────────

/// `lock_video_orientation` values; the raw value goes on the wire.
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoOrientation {
    /// Lock to the orientation at server start.
    Initial = -2,
    Unlocked = -1,
    Portrait = 0,
    Landscape = 1,
    PortraitFlipped = 2,
    LandscapeFlipped = 3,
}

impl VideoOrientation {
    pub fn raw_value(self) -> i8 {
        self as i8
    }
}

// ── OptionKey / OptionValue ──────────────────────────────────────

/// Positional server option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    LogLevel,
    MaxSize,
    BitRate,
    MaxFps,
    LockVideoOrientation,
    TunnelForward,
    Crop,
    SendFrameMeta,
    Control,
    DisplayId,
    ShowTouches,
    StayAwake,
    CodecOptions,
    /// An option introduced by a later protocol revision.
    Extension(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Enum rendered by its raw value.
    Enum(Cow<'static, str>),
    Number(i64),
    Text(String),
    Bool(bool),
    Codec(CodecOptions),
    Unset,
}

impl OptionValue {
    /// Server argument rendering.
    pub fn render(&self) -> String {
        match self {
            OptionValue::Enum(raw) => raw.to_string(),
            OptionValue::Number(n) => n.to_string(),
            OptionValue::Text(text) if !text.is_empty() => text.clone(),
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Codec(codec) => codec
                .to_option_value()
                .unwrap_or_else(|| UNSET_PLACEHOLDER.to_string()),
            OptionValue::Text(_) | OptionValue::Unset => UNSET_PLACEHOLDER.to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<LogLevel> for OptionValue {
    fn from(level: LogLevel) -> Self {
        OptionValue::Enum(Cow::Borrowed(level.as_str()))
    }
}

impl From<VideoOrientation> for OptionValue {
    fn from(orientation: VideoOrientation) -> Self {
        OptionValue::Enum(Cow::Owned(orientation.raw_value().to_string()))
    }
}

// ── OptionsInit ──────────────────────────────────────────────────

/// Partial user configuration; absent fields fall back to the revision's
/// defaults when arguments are formatted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsInit {
    pub log_level: Option<LogLevel>,
    /// Longest video side in pixels; 0 keeps the device resolution.
    pub max_size: Option<u32>,
    pub bit_rate: Option<u32>,
    pub max_fps: Option<u32>,
    pub lock_video_orientation: Option<VideoOrientation>,
    pub tunnel_forward: Option<bool>,
    /// `width:height:x:y` on the device screen.
    pub crop: Option<String>,
    pub send_frame_meta: Option<bool>,
    pub control: Option<bool>,
    pub display_id: Option<u32>,
    pub show_touches: Option<bool>,
    pub stay_awake: Option<bool>,
    pub codec_options: Option<CodecOptions>,
    /// Values for [`OptionKey::Extension`] keys.
    #[serde(skip)]
    pub extensions: BTreeMap<&'static str, OptionValue>,
}

impl OptionsInit {
    pub fn with_extension(mut self, key: &'static str, value: OptionValue) -> Self {
        self.extensions.insert(key, value);
        self
    }

    /// The user-supplied value for `key`, if any.
    pub fn get(&self, key: OptionKey) -> Option<OptionValue> {
        match key {
            OptionKey::LogLevel => self.log_level.map(OptionValue::from),
            OptionKey::MaxSize => self.max_size.map(|v| OptionValue::Number(v.into())),
            OptionKey::BitRate => self.bit_rate.map(|v| OptionValue::Number(v.into())),
            OptionKey::MaxFps => self.max_fps.map(|v| OptionValue::Number(v.into())),
            OptionKey::LockVideoOrientation => self.lock_video_orientation.map(OptionValue::from),
            OptionKey::TunnelForward => self.tunnel_forward.map(OptionValue::Bool),
            OptionKey::Crop => self.crop.clone().map(OptionValue::Text),
            OptionKey::SendFrameMeta => self.send_frame_meta.map(OptionValue::Bool),
            OptionKey::Control => self.control.map(OptionValue::Bool),
            OptionKey::DisplayId => self.display_id.map(|v| OptionValue::Number(v.into())),
            OptionKey::ShowTouches => self.show_touches.map(OptionValue::Bool),
            OptionKey::StayAwake => self.stay_awake.map(OptionValue::Bool),
            OptionKey::CodecOptions => self.codec_options.clone().map(OptionValue::Codec),
            OptionKey::Extension(name) => self.extensions.get(name).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_each_type() {
        assert_eq!(OptionValue::from(LogLevel::Warn).render(), "warn");
        assert_eq!(OptionValue::from(VideoOrientation::Unlocked).render(), "-1");
        assert_eq!(OptionValue::Number(8_000_000).render(), "8000000");
        assert_eq!(OptionValue::Bool(true).render(), "true");
        assert_eq!(OptionValue::Text("100:200:0:0".into()).render(), "100:200:0:0");
        assert_eq!(OptionValue::Text(String::new()).render(), "-");
        assert_eq!(OptionValue::Codec(CodecOptions::new()).render(), "-");
        assert_eq!(OptionValue::Unset.render(), "-");
    }

    #[test]
    fn get_reflects_only_user_values() {
        let init = OptionsInit {
            max_size: Some(1024),
            tunnel_forward: Some(true),
            ..Default::default()
        };
        assert_eq!(init.get(OptionKey::MaxSize), Some(OptionValue::Number(1024)));
        assert_eq!(init.get(OptionKey::TunnelForward), Some(OptionValue::Bool(true)));
        assert_eq!(init.get(OptionKey::BitRate), None);
        assert_eq!(init.get(OptionKey::Extension("encoder_name")), None);
    }
}
