// SPDX-License-Identifier: GPL-3.0
// lib.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

// Crate-wide lines to disable specific lints:

// Device state is always constructed from a ROM image and an input source, so
// there will be no derived Default implementations unless needed.
#![allow(clippy::new_without_default)]

// We use upper-case acronyms for some names, in order to match the hardware
// documentation more closely.
#![allow(clippy::upper_case_acronyms)]

/// This module contains the error type shared by the whole crate.
pub mod error;

/// This module contains EEPROM (save region) related functionality.
pub mod eeprom;

/// This module contains controller input related functionality.
pub mod input;

/// This module contains PIF and serial interface related functionality.
pub mod pif;

pub use error::{PifError, Result};
