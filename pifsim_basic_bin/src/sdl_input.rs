// SPDX-License-Identifier: GPL-3.0
// sdl_input.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use log::info;
use pifsim_core::input::{HostKey, RawInputDevice};
use sdl3::{
    joystick::Joystick,
    keyboard::Scancode,
    EventPump,
    JoystickSubsystem,
    Sdl,
};

/// This struct reads the keyboard and any attached joysticks through SDL3.
/// Joysticks are assigned to channels in the order SDL reports them.
pub struct SdlDevice {

    // Keeps SDL alive for as long as the device is.
    _sdl: Sdl,
    _joystick_subsystem: JoystickSubsystem,

    // Open joysticks, one per channel.
    joysticks: Vec<Joystick>,

    // Source of keyboard state.
    event_pump: EventPump,
}

impl SdlDevice {

    /// Initialises SDL and opens every attached joystick.
    pub fn new() -> Result<Self, String> {

        let sdl = sdl3::init().map_err(|err| err.to_string())?;
        let joystick_subsystem = sdl.joystick().map_err(|err| err.to_string())?;
        let event_pump = sdl.event_pump().map_err(|err| err.to_string())?;

        let mut joysticks = Vec::new();
        for id in joystick_subsystem.joysticks().map_err(|err| err.to_string())? {
            match joystick_subsystem.open(id) {
                Ok(joystick) => {
                    info!("SDL | Joystick [{}] on channel {}.", joystick.name(), joysticks.len());
                    joysticks.push(joystick);
                },
                Err(err) => info!("SDL | Skipping joystick: {}.", err),
            }
        }

        Ok(SdlDevice {
            _sdl: sdl,
            _joystick_subsystem: joystick_subsystem,
            joysticks,
            event_pump,
        })
    }
}

/// Maps a host key onto its SDL scancode.
fn scancode(key: HostKey) -> Scancode {
    match key {
        HostKey::Up => Scancode::Up,
        HostKey::Down => Scancode::Down,
        HostKey::Left => Scancode::Left,
        HostKey::Right => Scancode::Right,
        HostKey::LeftShift => Scancode::LShift,
        HostKey::RightShift => Scancode::RShift,
        HostKey::Home => Scancode::Home,
        HostKey::End => Scancode::End,
        HostKey::Delete => Scancode::Delete,
        HostKey::PageDown => Scancode::PageDown,
        HostKey::A => Scancode::A,
        HostKey::S => Scancode::S,
        HostKey::X => Scancode::X,
        HostKey::C => Scancode::C,
        HostKey::Z => Scancode::Z,
        HostKey::Enter => Scancode::Return,
        HostKey::Keypad8 => Scancode::Kp8,
        HostKey::Keypad2 => Scancode::Kp2,
        HostKey::Keypad4 => Scancode::Kp4,
        HostKey::Keypad6 => Scancode::Kp6,
    }
}

impl RawInputDevice for SdlDevice {

    fn refresh(&mut self) {
        self.event_pump.pump_events();
    }

    fn key_pressed(&self, key: HostKey) -> bool {
        self.event_pump.keyboard_state().is_scancode_pressed(scancode(key))
    }

    fn button_pressed(&self, channel: usize, index: usize) -> bool {
        self.joysticks
            .get(channel)
            .and_then(|joystick| joystick.button(index as u32).ok())
            .unwrap_or(false)
    }

    fn axis(&self, channel: usize, index: usize) -> f32 {
        self.joysticks
            .get(channel)
            .and_then(|joystick| joystick.axis(index as u32).ok())
            .map(|value| (value as f32 / i16::MAX as f32).clamp(-1.0, 1.0))
            .unwrap_or(0.0)
    }
}
