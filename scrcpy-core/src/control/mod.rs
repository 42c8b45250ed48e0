//! Control Message Codec.
//!
//! Typed input events are serialized into the fixed binary layouts the
//! device server expects. The leading type byte is not a fixed enum value:
//! it is the message type's position in the negotiated revision's type
//! table, so revisions can insert types without renumbering by hand.

pub mod android;
pub mod message;

pub use android::{
    AndroidKeyEventAction, AndroidMotionEventAction, MotionEventButtons, POINTER_ID_MOUSE,
    ScreenPowerMode,
};
pub use message::{
    BackOrScreenOn, ControlMessage, ControlMessageEncoder, InjectKeycode, InjectScroll,
    InjectText, InjectTouch, SetClipboard,
};

/// Every control message type known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlMessageType {
    InjectKeycode,
    InjectText,
    InjectTouch,
    InjectScroll,
    BackOrScreenOn,
    ExpandNotificationPanel,
    ExpandSettingsPanel,
    CollapsePanels,
    CollapseNotificationPanel,
    GetClipboard,
    SetClipboard,
    SetScreenPowerMode,
    RotateDevice,
}
