// SPDX-License-Identifier: GPL-3.0
// joybus.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::N64Pif;
use crate::{
    eeprom::EEPROM_BLOCK_SIZE,
    pif::{checksum::mempak_checksum, PIF_RAM_SIZE},
};
use log::debug;
use pifsim_utility::BigEndianBytes;
use thiserror::Error;

/// Channel the save EEPROM answers on.
const EEPROM_CHANNEL: usize = 4;

/// Number of controller ports.
const CONTROLLER_CHANNELS: usize = 4;

/// Size of a controller pak block in bytes.
const MEMPAK_BLOCK_SIZE: usize = 32;

/// Controller pak address of the lock/identify block.
const MEMPAK_LOCK_ADDRESS: u16 = 0x8000;

/// Controller pak addresses at or past this one are outside the usable area.
const MEMPAK_USABLE_END: u16 = 0x7FE0;

/// Reply to a status query on a controller channel: standard controller, pak inserted.
const CONTROLLER_STATUS: [u8; 3] = [0x05, 0x00, 0x01];

/// Reply to a status query on the EEPROM channel: 4 kbit EEPROM.
const EEPROM_STATUS: [u8; 3] = [0x00, 0x80, 0x00];

/// This enum is the reason a joybus transaction was refused. Every variant is
/// reported to the host the same way, by flagging the transaction's slot.
#[derive(Error, Debug, PartialEq, Eq)]
pub(super) enum JoybusError {
    #[error("nothing connected")]
    NoDevice,
    #[error("command 0x{command:02X} not valid on this channel")]
    WrongChannel { command: u8 },
    #[error("controller pak address 0x{0:04X} out of range")]
    BadPakAddress(u16),
    #[error("unimplemented command 0x{0:02X}")]
    UnknownCommand(u8),
}

/// Decodes the 32-byte aligned controller pak address that follows the opcode.
fn mempak_address(send: &[u8; PIF_RAM_SIZE]) -> u16 {
    send.read_be_u16(1).unwrap_or(0) & !0x1F
}

impl N64Pif {

    /// Performs a single joybus transaction. The opcode is the first send byte;
    /// the response is written to the start of `recv`.
    pub(super) fn handle_command(
        &mut self,
        channel: usize,
        send: &[u8; PIF_RAM_SIZE],
        send_len: usize,
        recv: &mut [u8; PIF_RAM_SIZE],
        recv_len: usize
    ) -> Result<(), JoybusError> {

        let command = send[0];

        match command {

            // Status/reset.
            0x00 | 0xFF => {
                debug!("Command: Read PIF status/reset on channel {}.", channel);

                match channel {
                    0 => recv[..3].copy_from_slice(&CONTROLLER_STATUS),
                    1..=3 => return Err(JoybusError::NoDevice),
                    EEPROM_CHANNEL => recv[..3].copy_from_slice(&EEPROM_STATUS),
                    _ => {
                        debug!("PIF: Status/reset on unknown channel?");
                        return Err(JoybusError::NoDevice);
                    },
                }
            },

            // Controller poll.
            0x01 => {
                if channel >= CONTROLLER_CHANNELS {
                    debug!("Read from invalid controller?");
                    return Err(JoybusError::WrongChannel { command });
                }

                let state = self.input.poll(channel);
                recv[..4].copy_from_slice(&state.to_bytes());
            },

            // Controller pak read. There is no pak storage, so every readable
            // block is blank.
            0x02 => {
                let address = mempak_address(send);
                debug!("MemPak | Command: Read from MemPak [0x{:04X}].", address);

                if address != MEMPAK_LOCK_ADDRESS && address >= MEMPAK_USABLE_END {
                    return Err(JoybusError::BadPakAddress(address));
                }

                recv[..MEMPAK_BLOCK_SIZE].fill(0);
                let crc = mempak_checksum(&recv[..MEMPAK_BLOCK_SIZE]);
                recv[MEMPAK_BLOCK_SIZE] = crc;
            },

            // Controller pak write. The data is acknowledged with its checksum
            // but not kept.
            0x03 => {
                let address = mempak_address(send);
                debug!("MemPak | Command: Write to MemPak [0x{:04X}].", address);

                let data = send.get(3..send_len).unwrap_or(&[]);
                recv[0] = mempak_checksum(data);
            },

            // EEPROM read.
            0x04 => {
                if channel != EEPROM_CHANNEL {
                    return Err(JoybusError::WrongChannel { command });
                }

                if send_len != 2 || recv_len != EEPROM_BLOCK_SIZE {
                    debug!("EEPROM | Unusual send/recv sizes?");
                }

                debug!("EEPROM | Command: Read from EEPROM block {}.", send[1]);
                recv[..EEPROM_BLOCK_SIZE].copy_from_slice(&self.eeprom.read_block(send[1]));
            },

            // EEPROM write.
            0x05 => {
                if channel != EEPROM_CHANNEL {
                    return Err(JoybusError::WrongChannel { command });
                }

                if send_len != 2 + EEPROM_BLOCK_SIZE || recv_len != 1 {
                    debug!("EEPROM | Unusual send/recv sizes?");
                }

                debug!("EEPROM | Command: Write to EEPROM block {}.", send[1]);
                let mut block = [0_u8; EEPROM_BLOCK_SIZE];
                block.copy_from_slice(&send[2..2 + EEPROM_BLOCK_SIZE]);
                self.eeprom.write_block(send[1], &block);
            },

            _ => {
                debug!("Unimplemented command: [0x{:02X}].", command);
                return Err(JoybusError::UnknownCommand(command));
            },
        }

        Ok(())
    }
}
