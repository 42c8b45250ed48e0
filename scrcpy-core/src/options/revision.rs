//! Protocol revision table.
//!
//! Each revision names its parent and supplies only what it changes: keys
//! appended to the parent's positional order, overridden defaults, the
//! control type table and message layouts. A new revision is one more
//! `static`; nothing above it in the chain is touched.

use crate::control::ControlMessageType;
use crate::options::codec_options::CodecOptions;
use crate::options::value::{LogLevel, OptionKey, OptionValue, VideoOrientation};

/// Back/screen-on message layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOrScreenOnLayout {
    /// `[type]`, sent for key-down only.
    KeyDownOnly,
    /// `[type][action]`, sent for every action.
    WithAction,
}

/// Inject-scroll message layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectScrollLayout {
    Base,
    /// Base layout followed by a `u32` button mask.
    WithButtons,
}

/// How connection handshake flags are derived from the options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPolicy {
    /// Control socket, dummy byte and device meta are always on.
    Legacy,
    /// Control socket follows the `control` option; handshake bytes stay on.
    ControlFromOptions,
}

#[derive(Debug)]
pub struct ProtocolRevision {
    pub version: &'static str,
    pub parent: Option<&'static ProtocolRevision>,
    /// Keys appended after the parent's order.
    pub added_keys: &'static [OptionKey],
    /// Defaults this revision sets or overrides; `None` defers to the parent.
    pub defaults: fn(OptionKey) -> Option<OptionValue>,
    /// Pattern matching the encoder name in server diagnostic output.
    pub encoder_name_pattern: &'static str,
    /// Discriminant of each type is its index here.
    pub control_types: &'static [ControlMessageType],
    pub back_or_screen_on: BackOrScreenOnLayout,
    pub inject_scroll: InjectScrollLayout,
    pub connection: ConnectionPolicy,
}

impl ProtocolRevision {
    /// Positional argument order, parent keys first.
    pub fn option_order(&self) -> Vec<OptionKey> {
        let mut order = match self.parent {
            Some(parent) => parent.option_order(),
            None => Vec::new(),
        };
        order.extend_from_slice(self.added_keys);
        order
    }

    pub fn default_value(&self, key: OptionKey) -> OptionValue {
        if let Some(value) = (self.defaults)(key) {
            return value;
        }
        match self.parent {
            Some(parent) => parent.default_value(key),
            None => OptionValue::Unset,
        }
    }

    pub fn control_type_value(&self, ty: ControlMessageType) -> Option<u8> {
        self.control_types
            .iter()
            .position(|&t| t == ty)
            .and_then(|index| u8::try_from(index).ok())
    }

    /// `true` when `self` is `ancestor` or extends it.
    pub fn extends(&self, ancestor: &ProtocolRevision) -> bool {
        std::ptr::eq(self, ancestor) || self.parent.is_some_and(|p| p.extends(ancestor))
    }
}

// ── 1.16 ─────────────────────────────────────────────────────────

pub static V1_16: ProtocolRevision = ProtocolRevision {
    version: "1.16",
    parent: None,
    added_keys: &[
        OptionKey::LogLevel,
        OptionKey::MaxSize,
        OptionKey::BitRate,
        OptionKey::MaxFps,
        OptionKey::LockVideoOrientation,
        OptionKey::TunnelForward,
        OptionKey::Crop,
        OptionKey::SendFrameMeta,
        OptionKey::Control,
        OptionKey::DisplayId,
        OptionKey::ShowTouches,
        OptionKey::StayAwake,
        OptionKey::CodecOptions,
    ],
    defaults: defaults_1_16,
    encoder_name_pattern: r"\s+scrcpy --encoder-name '(.*?)'",
    control_types: &[
        ControlMessageType::InjectKeycode,
        ControlMessageType::InjectText,
        ControlMessageType::InjectTouch,
        ControlMessageType::InjectScroll,
        ControlMessageType::BackOrScreenOn,
        ControlMessageType::ExpandNotificationPanel,
        ControlMessageType::CollapseNotificationPanel,
        ControlMessageType::GetClipboard,
        ControlMessageType::SetClipboard,
        ControlMessageType::SetScreenPowerMode,
        ControlMessageType::RotateDevice,
    ],
    back_or_screen_on: BackOrScreenOnLayout::KeyDownOnly,
    inject_scroll: InjectScrollLayout::Base,
    connection: ConnectionPolicy::Legacy,
};

fn defaults_1_16(key: OptionKey) -> Option<OptionValue> {
    let value = match key {
        OptionKey::LogLevel => LogLevel::Debug.into(),
        OptionKey::MaxSize => OptionValue::Number(0),
        OptionKey::BitRate => OptionValue::Number(8_000_000),
        OptionKey::MaxFps => OptionValue::Number(0),
        OptionKey::LockVideoOrientation => VideoOrientation::Unlocked.into(),
        OptionKey::TunnelForward => OptionValue::Bool(false),
        OptionKey::Crop => OptionValue::Unset,
        OptionKey::SendFrameMeta => OptionValue::Bool(true),
        OptionKey::Control => OptionValue::Bool(true),
        OptionKey::DisplayId => OptionValue::Number(0),
        OptionKey::ShowTouches => OptionValue::Bool(false),
        OptionKey::StayAwake => OptionValue::Bool(false),
        OptionKey::CodecOptions => OptionValue::Codec(CodecOptions::new()),
        OptionKey::Extension(_) => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    static NEXT: ProtocolRevision = ProtocolRevision {
        version: "next",
        parent: Some(&V1_16),
        added_keys: &[OptionKey::Extension("encoder_name")],
        defaults: next_defaults,
        encoder_name_pattern: "",
        control_types: &[],
        back_or_screen_on: BackOrScreenOnLayout::WithAction,
        inject_scroll: InjectScrollLayout::WithButtons,
        connection: ConnectionPolicy::ControlFromOptions,
    };

    fn next_defaults(key: OptionKey) -> Option<OptionValue> {
        match key {
            OptionKey::BitRate => Some(OptionValue::Number(4_000_000)),
            _ => None,
        }
    }

    #[test]
    fn base_order_has_thirteen_keys() {
        let order = V1_16.option_order();
        assert_eq!(order.len(), 13);
        assert_eq!(order[0], OptionKey::LogLevel);
        assert_eq!(order[12], OptionKey::CodecOptions);
    }

    #[test]
    fn child_appends_keys_and_overrides_defaults() {
        let order = NEXT.option_order();
        assert_eq!(order.len(), 14);
        assert_eq!(order[13], OptionKey::Extension("encoder_name"));

        assert_eq!(NEXT.default_value(OptionKey::BitRate), OptionValue::Number(4_000_000));
        assert_eq!(NEXT.default_value(OptionKey::MaxFps), OptionValue::Number(0));
        assert_eq!(
            NEXT.default_value(OptionKey::Extension("encoder_name")),
            OptionValue::Unset
        );
    }

    #[test]
    fn control_type_is_table_position() {
        assert_eq!(V1_16.control_type_value(ControlMessageType::InjectKeycode), Some(0));
        assert_eq!(V1_16.control_type_value(ControlMessageType::BackOrScreenOn), Some(4));
        assert_eq!(V1_16.control_type_value(ControlMessageType::RotateDevice), Some(10));
        assert_eq!(V1_16.control_type_value(ControlMessageType::CollapsePanels), None);
    }

    #[test]
    fn extends_walks_the_chain() {
        assert!(NEXT.extends(&V1_16));
        assert!(V1_16.extends(&V1_16));
        assert!(!V1_16.extends(&NEXT));
    }
}
