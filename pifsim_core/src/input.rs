// SPDX-License-Identifier: GPL-3.0
// input.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{convert::Infallible, fmt, str::FromStr};

/// This module contains the input profiles, which translate readings from a
/// host keyboard or gamepad into the controller layout. There may be others
/// in future.
pub mod profiles;

/// Button bits as they appear in the first two bytes of a controller poll
/// response (most significant byte first).
pub mod buttons {
    pub const A: u16 = 0x8000;
    pub const B: u16 = 0x4000;
    pub const Z: u16 = 0x2000;
    pub const START: u16 = 0x1000;
    pub const D_UP: u16 = 0x0800;
    pub const D_DOWN: u16 = 0x0400;
    pub const D_LEFT: u16 = 0x0200;
    pub const D_RIGHT: u16 = 0x0100;
    pub const L: u16 = 0x0020;
    pub const R: u16 = 0x0010;
    pub const C_UP: u16 = 0x0008;
    pub const C_DOWN: u16 = 0x0004;
    pub const C_LEFT: u16 = 0x0002;
    pub const C_RIGHT: u16 = 0x0001;
}

/// This struct is a snapshot of one controller: the button bitmap and the
/// two signed analog stick axes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub buttons: u16,
    pub stick_x: i8,
    pub stick_y: i8,
}

impl ControllerState {

    /// Encodes the snapshot as the 4-byte poll response.
    pub fn to_bytes(&self) -> [u8; 4] {
        let [high, low] = self.buttons.to_be_bytes();
        [high, low, self.stick_x as u8, self.stick_y as u8]
    }
}

/// This enum selects how host input is mapped onto controller channels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputProfile {
    Keyboard,
    MayflashN64,
    Retrolink,
    Xbox360,
}

impl InputProfile {

    /// Selects a profile by name. Only the known prefix is compared, and
    /// anything unrecognised falls back to the keyboard.
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("keyboard") {
            InputProfile::Keyboard
        } else if name.starts_with("mayflash64") {
            InputProfile::MayflashN64
        } else if name.starts_with("retrolink") {
            InputProfile::Retrolink
        } else if name.starts_with("x360") {
            InputProfile::Xbox360
        } else {
            InputProfile::Keyboard
        }
    }

    /// Returns the name this profile is selected by.
    pub fn name(&self) -> &'static str {
        match self {
            InputProfile::Keyboard => "keyboard",
            InputProfile::MayflashN64 => "mayflash64",
            InputProfile::Retrolink => "retrolink",
            InputProfile::Xbox360 => "x360",
        }
    }
}

impl fmt::Display for InputProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parsing never fails: unknown names select the keyboard, as with
/// `from_name`.
impl FromStr for InputProfile {
    type Err = Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(InputProfile::from_name(name))
    }
}

/// Host keys the keyboard profile looks at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HostKey {
    Up,
    Down,
    Left,
    Right,
    LeftShift,
    RightShift,
    Home,
    End,
    Delete,
    PageDown,
    A,
    S,
    X,
    C,
    Z,
    Enter,
    Keypad8,
    Keypad2,
    Keypad4,
    Keypad6,
}

/// This trait provides an implementation-opaque way of reading the raw state
/// of whatever the host has plugged in. Gamepad buttons and axes are addressed
/// by index, in the order the host reports them.
pub trait RawInputDevice {

    /// Implementations may use this to sample fresh state before a poll.
    fn refresh(&mut self) {}

    /// Implementations must report whether a keyboard key is held.
    fn key_pressed(&self, key: HostKey) -> bool;

    /// Implementations must report whether a gamepad button is held.
    fn button_pressed(&self, channel: usize, index: usize) -> bool;

    /// Implementations must return a gamepad axis in the range -1.0 to 1.0.
    fn axis(&self, channel: usize, index: usize) -> f32;
}

/// A device with nothing held and every stick centred.
pub struct IdleDevice;

impl RawInputDevice for IdleDevice {

    fn key_pressed(&self, _key: HostKey) -> bool {
        false
    }

    fn button_pressed(&self, _channel: usize, _index: usize) -> bool {
        false
    }

    fn axis(&self, _channel: usize, _index: usize) -> f32 {
        0.0
    }
}

/// This trait provides an implementation-opaque way of asking for controller
/// state. The PIF calls it whenever a controller poll reaches one of the four
/// controller channels.
pub trait InputSource {

    /// Implementations must return the current state of the given channel.
    fn poll(&mut self, channel: usize) -> ControllerState;

    /// Implementations that support several profiles should switch to the
    /// supplied one.
    fn set_profile(&mut self, _profile: InputProfile) {}
}
