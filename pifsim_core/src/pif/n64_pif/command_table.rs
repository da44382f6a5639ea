// SPDX-License-Identifier: GPL-3.0
// command_table.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use super::N64Pif;
use crate::pif::{COMMAND_TRIGGER_BYTE, PIF_RAM_SIZE};
use log::{debug, trace};
use pifsim_utility::min;

/// Length byte that ends the command table.
const END_OF_TABLE: i8 = -2;

/// Bit set in a receive length byte when its transaction failed.
const TRANSACTION_ERROR: u8 = 0x80;

/// Only the low six bits of a length byte are a length.
const LENGTH_MASK: u8 = 0x3F;

impl N64Pif {

    /// Runs the command table held in PIF RAM, if the host has asked for it by
    /// setting the trigger byte to 1.
    ///
    /// Each slot starts with a send length. Negative lengths are padding and do
    /// not take up a channel; a zero length, or one with either of its top two
    /// bits set, is an empty slot that does. Otherwise a receive length follows,
    /// then the send bytes, then room for the response. Responses are written to
    /// RAM in place and never past the end of it.
    pub fn process_command_table(&mut self) {

        if self.command[COMMAND_TRIGGER_BYTE] != 0x1 {
            return;
        }

        let mut channel: usize = 0;
        let mut cursor: usize = 0;

        while cursor < COMMAND_TRIGGER_BYTE {

            let send_bytes = self.command[cursor] as i8;
            cursor += 1;

            if send_bytes == END_OF_TABLE {
                break;
            }

            if send_bytes < 0 {
                continue;
            }

            if send_bytes > 0 && (send_bytes as u8 & !LENGTH_MASK) == 0 {

                // Cursor is at most 0x3F here, which is still inside the table.
                let recv_slot = cursor;
                let recv_bytes = self.command[recv_slot] as i8;
                cursor += 1;

                if recv_bytes == END_OF_TABLE {
                    break;
                }

                let send_len = send_bytes as usize;
                let recv_len = (recv_bytes as u8 & LENGTH_MASK) as usize;

                // Anything past the end of RAM reads as zero.
                let mut send_buffer = [0_u8; PIF_RAM_SIZE];
                let available = min(send_len, PIF_RAM_SIZE.saturating_sub(cursor));
                send_buffer[..available].copy_from_slice(&self.command[cursor..cursor + available]);
                cursor += send_len;

                let mut recv_buffer = [0_u8; PIF_RAM_SIZE];
                let result = self.handle_command(channel, &send_buffer, send_len, &mut recv_buffer, recv_len);

                match result {
                    Ok(()) => {
                        let end = min(cursor + recv_len, PIF_RAM_SIZE);
                        if cursor < end {
                            self.ram[cursor..end].copy_from_slice(&recv_buffer[..end - cursor]);
                        }
                        if cursor + recv_len > PIF_RAM_SIZE {
                            debug!("PIF | Response on channel {} truncated at end of RAM.", channel);
                        }
                        cursor += recv_len;
                    },
                    Err(err) => {
                        trace!("PIF | Channel {}: {}.", channel, err);
                        self.ram[recv_slot] |= TRANSACTION_ERROR;
                    },
                }
            }

            channel += 1;
        }

        self.ram[COMMAND_TRIGGER_BYTE] = 0;
    }
}
