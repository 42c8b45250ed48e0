//! Control message records and their per-revision serialization.
//!
//! All multi-byte fields are big-endian. `[type]` below stands for the
//! one-byte discriminant taken from the revision's type table.
//!
//! ```text
//! InjectKeycode      [type][action u8][keycode u32][repeat u32][meta u32]
//! InjectText         [type][len u32][utf8]
//! InjectTouch        [type][action u8][pointer u64][x u32][y u32][w u16][h u16][pressure u16][buttons u32]
//! InjectScroll       [type][x u32][y u32][w u16][h u16][hscroll i32][vscroll i32]  (+[buttons u32])
//! BackOrScreenOn     [type]                    key-down only
//!                    [type][action u8]         every action
//! SetClipboard       [type][paste u8][len u32][utf8]
//! SetScreenPowerMode [type][mode u8]
//! others             [type]
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

use crate::control::ControlMessageType;
use crate::control::android::{
    AndroidKeyEventAction, AndroidMotionEventAction, MotionEventButtons, ScreenPowerMode,
};
use crate::error::ScrcpyError;
use crate::options::revision::{BackOrScreenOnLayout, InjectScrollLayout, ProtocolRevision};

// ── Messages ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectKeycode {
    pub action: AndroidKeyEventAction,
    /// `KeyEvent.KEYCODE_*`
    pub keycode: u32,
    pub repeat: u32,
    /// `KeyEvent.META_*` mask.
    pub meta_state: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectText {
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InjectTouch {
    pub action: AndroidMotionEventAction,
    pub pointer_id: u64,
    pub pointer_x: u32,
    pub pointer_y: u32,
    pub screen_width: u16,
    pub screen_height: u16,
    /// In `[0, 1]`; out-of-range values are clamped.
    pub pressure: f32,
    pub buttons: MotionEventButtons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectScroll {
    pub pointer_x: u32,
    pub pointer_y: u32,
    pub screen_width: u16,
    pub screen_height: u16,
    pub scroll_x: i32,
    pub scroll_y: i32,
    /// Only transmitted by the extended scroll layout.
    pub buttons: MotionEventButtons,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackOrScreenOn {
    pub action: AndroidKeyEventAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetClipboard {
    pub text: String,
    /// Also inject a paste after setting the clipboard.
    pub paste: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    InjectKeycode(InjectKeycode),
    InjectText(InjectText),
    InjectTouch(InjectTouch),
    InjectScroll(InjectScroll),
    BackOrScreenOn(BackOrScreenOn),
    ExpandNotificationPanel,
    ExpandSettingsPanel,
    CollapsePanels,
    CollapseNotificationPanel,
    GetClipboard,
    SetClipboard(SetClipboard),
    SetScreenPowerMode(ScreenPowerMode),
    RotateDevice,
}

impl ControlMessage {
    pub fn message_type(&self) -> ControlMessageType {
        match self {
            ControlMessage::InjectKeycode(_) => ControlMessageType::InjectKeycode,
            ControlMessage::InjectText(_) => ControlMessageType::InjectText,
            ControlMessage::InjectTouch(_) => ControlMessageType::InjectTouch,
            ControlMessage::InjectScroll(_) => ControlMessageType::InjectScroll,
            ControlMessage::BackOrScreenOn(_) => ControlMessageType::BackOrScreenOn,
            ControlMessage::ExpandNotificationPanel => ControlMessageType::ExpandNotificationPanel,
            ControlMessage::ExpandSettingsPanel => ControlMessageType::ExpandSettingsPanel,
            ControlMessage::CollapsePanels => ControlMessageType::CollapsePanels,
            ControlMessage::CollapseNotificationPanel => {
                ControlMessageType::CollapseNotificationPanel
            }
            ControlMessage::GetClipboard => ControlMessageType::GetClipboard,
            ControlMessage::SetClipboard(_) => ControlMessageType::SetClipboard,
            ControlMessage::SetScreenPowerMode(_) => ControlMessageType::SetScreenPowerMode,
            ControlMessage::RotateDevice => ControlMessageType::RotateDevice,
        }
    }
}

/// Touch pressure as 16-bit fixed point; 1.0 saturates to `0xffff`.
fn pressure_to_fixed(pressure: f32) -> u16 {
    let scaled = (pressure.clamp(0.0, 1.0) * 65536.0) as u32;
    scaled.min(0xffff) as u16
}

fn put_string(dst: &mut BytesMut, text: &str) {
    dst.put_u32(text.len() as u32);
    dst.put_slice(text.as_bytes());
}

// ── ControlMessageEncoder ────────────────────────────────────────

/// Serializes [`ControlMessage`]s for one negotiated revision.
///
/// An empty result means "do not transmit"; it is never an error.
#[derive(Debug, Clone, Copy)]
pub struct ControlMessageEncoder {
    revision: &'static ProtocolRevision,
    scroll_layout: InjectScrollLayout,
    back_layout: BackOrScreenOnLayout,
}

impl ControlMessageEncoder {
    pub fn new(revision: &'static ProtocolRevision) -> Self {
        Self {
            revision,
            scroll_layout: revision.inject_scroll,
            back_layout: revision.back_or_screen_on,
        }
    }

    /// Force a scroll layout, e.g. the base layout when the device server
    /// turns out to be older than the negotiated revision.
    pub fn with_inject_scroll_layout(mut self, layout: InjectScrollLayout) -> Self {
        self.scroll_layout = layout;
        self
    }

    pub fn with_back_or_screen_on_layout(mut self, layout: BackOrScreenOnLayout) -> Self {
        self.back_layout = layout;
        self
    }

    pub fn revision(&self) -> &'static ProtocolRevision {
        self.revision
    }

    /// Wire bytes for `message`, or `None` when nothing should be sent.
    pub fn serialize(&self, message: &ControlMessage) -> Option<Bytes> {
        let mut buf = BytesMut::new();
        self.write(message, &mut buf);
        if buf.is_empty() { None } else { Some(buf.freeze()) }
    }

    pub fn serialize_back_or_screen_on(
        &self,
        message: &BackOrScreenOn,
        layout: BackOrScreenOnLayout,
    ) -> Option<Bytes> {
        let type_value = self.type_value(ControlMessageType::BackOrScreenOn)?;
        let mut buf = BytesMut::new();
        Self::write_back_or_screen_on(type_value, message, layout, &mut buf);
        if buf.is_empty() { None } else { Some(buf.freeze()) }
    }

    pub fn serialize_inject_scroll(
        &self,
        message: &InjectScroll,
        layout: InjectScrollLayout,
    ) -> Option<Bytes> {
        let type_value = self.type_value(ControlMessageType::InjectScroll)?;
        let mut buf = BytesMut::new();
        Self::write_inject_scroll(type_value, message, layout, &mut buf);
        Some(buf.freeze())
    }

    fn type_value(&self, ty: ControlMessageType) -> Option<u8> {
        let value = self.revision.control_type_value(ty);
        if value.is_none() {
            warn!(
                message_type = ?ty,
                revision = self.revision.version,
                "control message type not supported by revision"
            );
        }
        value
    }

    /// Appends the encoding of `message` to `dst`; appends nothing when the
    /// message is not transmitted.
    fn write(&self, message: &ControlMessage, dst: &mut BytesMut) {
        let Some(type_value) = self.type_value(message.message_type()) else {
            return;
        };

        match message {
            ControlMessage::InjectKeycode(m) => {
                dst.reserve(14);
                dst.put_u8(type_value);
                dst.put_u8(m.action as u8);
                dst.put_u32(m.keycode);
                dst.put_u32(m.repeat);
                dst.put_u32(m.meta_state);
            }
            ControlMessage::InjectText(m) => {
                dst.reserve(5 + m.text.len());
                dst.put_u8(type_value);
                put_string(dst, &m.text);
            }
            ControlMessage::InjectTouch(m) => {
                dst.reserve(28);
                dst.put_u8(type_value);
                dst.put_u8(m.action as u8);
                dst.put_u64(m.pointer_id);
                dst.put_u32(m.pointer_x);
                dst.put_u32(m.pointer_y);
                dst.put_u16(m.screen_width);
                dst.put_u16(m.screen_height);
                dst.put_u16(pressure_to_fixed(m.pressure));
                dst.put_u32(m.buttons.bits());
            }
            ControlMessage::InjectScroll(m) => {
                Self::write_inject_scroll(type_value, m, self.scroll_layout, dst);
            }
            ControlMessage::BackOrScreenOn(m) => {
                Self::write_back_or_screen_on(type_value, m, self.back_layout, dst);
            }
            ControlMessage::SetClipboard(m) => {
                dst.reserve(6 + m.text.len());
                dst.put_u8(type_value);
                dst.put_u8(m.paste as u8);
                put_string(dst, &m.text);
            }
            ControlMessage::SetScreenPowerMode(mode) => {
                dst.put_u8(type_value);
                dst.put_u8(*mode as u8);
            }
            ControlMessage::ExpandNotificationPanel
            | ControlMessage::ExpandSettingsPanel
            | ControlMessage::CollapsePanels
            | ControlMessage::CollapseNotificationPanel
            | ControlMessage::GetClipboard
            | ControlMessage::RotateDevice => dst.put_u8(type_value),
        }
    }

    fn write_inject_scroll(
        type_value: u8,
        m: &InjectScroll,
        layout: InjectScrollLayout,
        dst: &mut BytesMut,
    ) {
        dst.reserve(25);
        dst.put_u8(type_value);
        dst.put_u32(m.pointer_x);
        dst.put_u32(m.pointer_y);
        dst.put_u16(m.screen_width);
        dst.put_u16(m.screen_height);
        dst.put_i32(m.scroll_x);
        dst.put_i32(m.scroll_y);
        if layout == InjectScrollLayout::WithButtons {
            dst.put_u32(m.buttons.bits());
        }
    }

    fn write_back_or_screen_on(
        type_value: u8,
        m: &BackOrScreenOn,
        layout: BackOrScreenOnLayout,
        dst: &mut BytesMut,
    ) {
        match layout {
            BackOrScreenOnLayout::KeyDownOnly => {
                if m.action == AndroidKeyEventAction::Down {
                    dst.put_u8(type_value);
                }
            }
            BackOrScreenOnLayout::WithAction => {
                dst.put_u8(type_value);
                dst.put_u8(m.action as u8);
            }
        }
    }
}

impl Encoder<ControlMessage> for ControlMessageEncoder {
    type Error = ScrcpyError;

    fn encode(&mut self, item: ControlMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.write(&item, dst);
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────
