// SPDX-License-Identifier: GPL-3.0
// checksum.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

/// Polynomial fed back whenever a set bit is shifted out.
const POLYNOMIAL: u32 = 0x85;

/// Calculates the checksum of a controller pak block.
///
/// The input is shifted through an 8-bit register most significant bit first,
/// followed by one extra byte's worth of zero bits. That trailing pass is part
/// of the format: existing pak data was written with it, so it must stay.
pub fn mempak_checksum(buffer: &[u8]) -> u8 {

    let size = buffer.len();
    let mut crc: u32 = 0;

    for i in 0..=size {
        for j in (0..8).rev() {

            let feedback = if crc & 0x80 != 0 { POLYNOMIAL } else { 0 };
            crc <<= 1;

            if i == size {
                crc &= 0xFF;
            } else if buffer[i] & (1 << j) != 0 {
                crc |= 0x1;
            }

            crc ^= feedback;
        }
    }

    crc as u8
}
