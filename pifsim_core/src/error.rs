// SPDX-License-Identifier: GPL-3.0
// error.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::io;
use thiserror::Error;

/// Convenience alias used by every fallible operation in the crate.
pub type Result<T> = ::std::result::Result<T, PifError>;

/// This enum represents everything that can go wrong when loading or storing
/// the data the PIF depends on. Failed joybus transactions are not errors at
/// this level, they are reported to the host through the command table itself.
#[derive(Error, Debug)]
pub enum PifError {
    #[error("Input output error: {0}")]
    Io(#[from] io::Error),
    #[error("The PIF ROM image is empty")]
    EmptyRom,
    #[error("No EEPROM file has been attached")]
    EepromNotAttached,
}
