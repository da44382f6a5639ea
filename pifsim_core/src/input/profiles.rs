// SPDX-License-Identifier: GPL-3.0
// profiles.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::{
    buttons,
    ControllerState,
    HostKey,
    InputProfile,
    InputSource,
    RawInputDevice,
};
use log::trace;
use pifsim_utility::scale_axis;

/// Stick deflection produced by a direction key on its own.
const KEYBOARD_WALK: i8 = 38;

/// Stick deflection produced by a direction key with shift held.
const KEYBOARD_RUN: i8 = 114;

/// Axis value past which an analog input counts as a digital press.
const AXIS_PRESS_THRESHOLD: f32 = 0.75;

/// This struct maps a raw host device onto controller state, using whichever
/// profile is currently selected.
pub struct ProfileInput {

    // The selected mapping.
    profile: InputProfile,

    // The host device being read.
    device: Box<dyn RawInputDevice>,
}

/// Implementation functions for the profile mapper itself.
impl ProfileInput {

    /// Creates a new mapper for the given profile and device.
    pub fn new(profile: InputProfile, device: Box<dyn RawInputDevice>) -> Self {
        ProfileInput {
            profile,
            device,
        }
    }

    /// Returns the currently selected profile.
    pub fn profile(&self) -> InputProfile {
        self.profile
    }
}

impl InputSource for ProfileInput {

    /// Polls the device and applies the selected layout.
    fn poll(&mut self, channel: usize) -> ControllerState {

        self.device.refresh();

        let state = match self.profile {
            InputProfile::Keyboard => keyboard_state(&*self.device),
            InputProfile::MayflashN64 => mayflash_state(&*self.device, channel),
            InputProfile::Retrolink => retrolink_state(&*self.device, channel),
            InputProfile::Xbox360 => xbox360_state(&*self.device, channel),
        };

        trace!("Input | {} channel {}: {:?}", self.profile, channel, state);
        state
    }

    /// Switches profile.
    fn set_profile(&mut self, profile: InputProfile) {
        self.profile = profile;
    }
}

/// Returns `bit` if `pressed`, otherwise nothing.
#[inline(always)]
fn bit_if(pressed: bool, bit: u16) -> u16 {
    if pressed { bit } else { 0 }
}

/// Keyboard layout. Every channel sees the same keyboard, with the arrow keys
/// driving the stick and shift pushing it further.
fn keyboard_state(device: &dyn RawInputDevice) -> ControllerState {

    let deflection = if device.key_pressed(HostKey::LeftShift) || device.key_pressed(HostKey::RightShift) {
        KEYBOARD_RUN
    } else {
        KEYBOARD_WALK
    };

    let stick_y = if device.key_pressed(HostKey::Up) {
        deflection
    } else if device.key_pressed(HostKey::Down) {
        -deflection
    } else {
        0
    };

    let stick_x = if device.key_pressed(HostKey::Right) {
        deflection
    } else if device.key_pressed(HostKey::Left) {
        -deflection
    } else {
        0
    };

    let key_map = [
        (HostKey::Home, buttons::C_UP),
        (HostKey::End, buttons::C_DOWN),
        (HostKey::Delete, buttons::C_LEFT),
        (HostKey::PageDown, buttons::C_RIGHT),
        (HostKey::A, buttons::L),
        (HostKey::S, buttons::R),
        (HostKey::X, buttons::A),
        (HostKey::C, buttons::B),
        (HostKey::Z, buttons::Z),
        (HostKey::Enter, buttons::START),
        (HostKey::Keypad8, buttons::D_UP),
        (HostKey::Keypad2, buttons::D_DOWN),
        (HostKey::Keypad4, buttons::D_LEFT),
        (HostKey::Keypad6, buttons::D_RIGHT),
    ];

    let pressed = key_map
        .iter()
        .fold(0, |acc, &(key, bit)| acc | bit_if(device.key_pressed(key), bit));

    ControllerState {
        buttons: pressed,
        stick_x,
        stick_y,
    }
}

/// Maps gamepad button indices onto button bits.
fn mapped_buttons(device: &dyn RawInputDevice, channel: usize, button_map: &[(usize, u16)]) -> u16 {
    button_map
        .iter()
        .fold(0, |acc, &(index, bit)| acc | bit_if(device.button_pressed(channel, index), bit))
}

/// Retrolink USB pad layout.
fn retrolink_state(device: &dyn RawInputDevice, channel: usize) -> ControllerState {

    let pressed = mapped_buttons(device, channel, &[
        (0, buttons::C_UP),
        (1, buttons::C_RIGHT),
        (2, buttons::C_DOWN),
        (3, buttons::C_LEFT),
        (4, buttons::L),
        (5, buttons::R),
        (6, buttons::A),
        (7, buttons::Z),
        (8, buttons::B),
        (9, buttons::START),
    ]);

    ControllerState {
        buttons: pressed,
        stick_x: scale_axis(device.axis(channel, 0)),
        stick_y: scale_axis(device.axis(channel, 1)),
    }
}

/// Mayflash N64 adapter layout. The C buttons arrive as a pair of hat axes.
fn mayflash_state(device: &dyn RawInputDevice, channel: usize) -> ControllerState {

    let mut pressed = mapped_buttons(device, channel, &[
        (6, buttons::L),
        (7, buttons::R),
        (1, buttons::A),
        (2, buttons::B),
        (8, buttons::Z),
        (9, buttons::START),
        (12, buttons::D_UP),
        (14, buttons::D_DOWN),
        (15, buttons::D_LEFT),
        (13, buttons::D_RIGHT),
    ]);

    let c_vertical = device.axis(channel, 2);
    if c_vertical >= AXIS_PRESS_THRESHOLD {
        pressed |= buttons::C_DOWN;
    } else if c_vertical <= -AXIS_PRESS_THRESHOLD {
        pressed |= buttons::C_UP;
    }

    let c_horizontal = device.axis(channel, 3);
    if c_horizontal >= AXIS_PRESS_THRESHOLD {
        pressed |= buttons::C_LEFT;
    } else if c_horizontal <= -AXIS_PRESS_THRESHOLD {
        pressed |= buttons::C_RIGHT;
    }

    ControllerState {
        buttons: pressed,
        stick_x: scale_axis(device.axis(channel, 0)),
        stick_y: scale_axis(device.axis(channel, 1)),
    }
}

/// Xbox 360 pad layout. The right stick stands in for the C buttons and the
/// shared trigger axis supplies Z and R. The D-pad is not mapped.
fn xbox360_state(device: &dyn RawInputDevice, channel: usize) -> ControllerState {

    let mut pressed = mapped_buttons(device, channel, &[
        (4, buttons::L),
        (0, buttons::A),
        (1, buttons::B),
        (7, buttons::START),
    ]);

    let right_y = device.axis(channel, 3);
    if right_y > AXIS_PRESS_THRESHOLD {
        pressed |= buttons::C_DOWN;
    } else if right_y < -AXIS_PRESS_THRESHOLD {
        pressed |= buttons::C_UP;
    }

    let right_x = device.axis(channel, 4);
    if right_x < -AXIS_PRESS_THRESHOLD {
        pressed |= buttons::C_LEFT;
    } else if right_x > AXIS_PRESS_THRESHOLD {
        pressed |= buttons::C_RIGHT;
    }

    let triggers = device.axis(channel, 2);
    if triggers < -AXIS_PRESS_THRESHOLD {
        pressed |= buttons::R;
    } else if triggers > AXIS_PRESS_THRESHOLD {
        pressed |= buttons::Z;
    }

    ControllerState {
        buttons: pressed,
        stick_x: scale_axis(device.axis(channel, 0)),
        stick_y: scale_axis(device.axis(channel, 1)),
    }
}
