//! Android framework constants carried inside control messages.

use bitflags::bitflags;

use crate::error::ScrcpyError;

/// `KeyEvent.ACTION_*`
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AndroidKeyEventAction {
    Down = 0,
    Up = 1,
}

impl TryFrom<u8> for AndroidKeyEventAction {
    type Error = ScrcpyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AndroidKeyEventAction::Down),
            1 => Ok(AndroidKeyEventAction::Up),
            _ => Err(ScrcpyError::UnknownVariant {
                type_name: "AndroidKeyEventAction",
                value: value as u64,
            }),
        }
    }
}

/// `MotionEvent.ACTION_*`
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AndroidMotionEventAction {
    Down = 0,
    Up = 1,
    Move = 2,
    Cancel = 3,
    Outside = 4,
    PointerDown = 5,
    PointerUp = 6,
    HoverMove = 7,
    Scroll = 8,
    HoverEnter = 9,
    HoverExit = 10,
    ButtonPress = 11,
    ButtonRelease = 12,
}

bitflags! {
    /// `MotionEvent.BUTTON_*`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MotionEventButtons: u32 {
        const PRIMARY = 1 << 0;
        const SECONDARY = 1 << 1;
        const TERTIARY = 1 << 2;
        const BACK = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

/// `SurfaceControl.POWER_MODE_*`
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenPowerMode {
    Off = 0,
    Normal = 2,
}

/// Pointer id the server maps to the mouse.
pub const POINTER_ID_MOUSE: u64 = u64::MAX;
