// SPDX-License-Identifier: GPL-3.0
// n64_pif.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

/// This module contains the command table interpreter, which walks PIF RAM and
/// splits it into joybus transactions.
mod command_table;

/// This module contains the joybus command handlers for each transaction.
mod joybus;

use super::{
    PifBridge,
    SerialInterface,
    SiRegister,
    CIC_STATUS_BYTE,
    DRAM_ADDRESS_MASK,
    MI_INTR_SI,
    PIF_RAM_BASE_ADDRESS,
    PIF_RAM_SIZE,
    PIF_ROM_ADDRESS_LEN,
    PIF_ROM_BASE_ADDRESS,
    SI_REGISTER_COUNT,
    SI_STATUS_INTERRUPT,
};
use crate::{
    eeprom::Eeprom,
    error::{PifError, Result},
    input::{InputProfile, InputSource},
};
use log::{debug, info, warn};
use pifsim_utility::BigEndianBytes;
use std::{fs, path::Path};

/// Offset of the CIC seed within PIF RAM.
const CIC_SEED_OFFSET: usize = 0x24;

/// Seed reported by a CIC-NUS-6102, which is assumed at power on.
const CIC_6102_SEED: u32 = 0x00023F3F;

/// This struct models the N64's PIF along with the serial interface in front of
/// it: the SI registers, PIF RAM, the boot ROM and the save EEPROM on channel 4.
pub struct N64Pif {

    // Boot ROM image (never modified after load).
    rom: Vec<u8>,

    // SI register bank.
    regs: [u32; SI_REGISTER_COUNT],

    // Snapshot of PIF RAM taken when a command block arrives.
    command: [u8; PIF_RAM_SIZE],

    // PIF RAM as the host sees it, with responses written in place.
    ram: [u8; PIF_RAM_SIZE],

    // Alternates on every read of the CIC status byte.
    status_latch: u8,

    // Save EEPROM and its backing file.
    eeprom: Eeprom,

    // Controller input and the profile it was configured with.
    input: Box<dyn InputSource>,
    control_type: InputProfile,
}

/// Implementation functions for the PIF itself.
impl N64Pif {

    /// Creates a new PIF object from a ROM image, with the correct initial state.
    pub fn new(rom: Vec<u8>, input: Box<dyn InputSource>) -> Result<Self> {

        if rom.is_empty() {
            return Err(PifError::EmptyRom);
        }

        if rom.len() != PIF_ROM_ADDRESS_LEN as usize {
            warn!("PIF ROM is 0x{:X} bytes, expected 0x{:X}.", rom.len(), PIF_ROM_ADDRESS_LEN);
        }

        debug!("Initializing PIF.");

        let mut pif = N64Pif {

            // Setup ROM.
            rom,

            // Setup registers and memory areas.
            regs: [0; SI_REGISTER_COUNT],
            command: [0; PIF_RAM_SIZE],
            ram: [0; PIF_RAM_SIZE],
            status_latch: 0x00,

            // Setup EEPROM with no backing file for now.
            eeprom: Eeprom::new(),

            // Setup input.
            input,
            control_type: InputProfile::Keyboard,
        };

        // Assume CIC-NUS-6102.
        pif.set_cic_seed(CIC_6102_SEED);

        Ok(pif)
    }

    /// Creates a new PIF object, loading the ROM image from the given path.
    pub fn from_rom_file(path: &Path, input: Box<dyn InputSource>) -> Result<Self> {

        let rom = fs::read(path)?;
        info!("Loaded {} byte PIF ROM from [{}].", rom.len(), path.display());

        Self::new(rom, input)
    }

    /// Stores the CIC seed into PIF RAM, where the boot code expects it.
    pub fn set_cic_seed(&mut self, seed: u32) {
        self.ram.write_be_u32(CIC_SEED_OFFSET, seed);
    }

    /// Selects the input profile by name, falling back to the keyboard for
    /// anything unrecognised.
    pub fn set_control_type(&mut self, name: &str) {

        let profile = InputProfile::from_name(name);
        info!("Using [{}] input profile.", profile);

        self.control_type = profile;
        self.input.set_profile(profile);
    }

    /// Returns the configured input profile.
    pub fn control_type(&self) -> InputProfile {
        self.control_type
    }

    /// Attaches the save EEPROM to a file, loading it if it already exists.
    pub fn attach_eeprom_file(&mut self, path: &Path) -> Result<()> {
        self.eeprom.attach(path)
    }

    /// Reloads the save EEPROM from its attached file.
    pub fn read_eeprom_file(&mut self) -> Result<()> {
        self.eeprom.load()
    }

    /// Writes the save EEPROM back to its attached file.
    pub fn write_eeprom_file(&mut self) -> Result<()> {
        self.eeprom.flush()
    }

    /// Returns the save EEPROM.
    pub fn eeprom(&self) -> &Eeprom {
        &self.eeprom
    }

    /// Returns PIF RAM as it currently stands.
    pub fn ram(&self) -> &[u8; PIF_RAM_SIZE] {
        &self.ram
    }

    /// Returns the last command block received.
    pub fn command(&self) -> &[u8; PIF_RAM_SIZE] {
        &self.command
    }

    /// This function flips the CIC status latch and returns its new value.
    fn toggle_status_latch(&mut self) -> u8 {

        self.status_latch = if self.status_latch == 0x00 { 0x80 } else { 0x00 };
        self.status_latch
    }

    /// This function translates a PIF RAM address into an offset, checking that
    /// `width` bytes fit.
    fn ram_offset(address: u32, width: usize) -> Option<usize> {

        let offset = address.checked_sub(PIF_RAM_BASE_ADDRESS)? as usize;
        if offset + width <= PIF_RAM_SIZE {
            Some(offset)
        } else {
            None
        }
    }

    /// This function resolves the DMA address from SI_DRAM_ADDR_REG. The DMA
    /// engine only moves whole words, so a misaligned address is fatal.
    fn dma_address(&self) -> u32 {

        let address = self.regs[SiRegister::DramAddr as usize] & DRAM_ADDRESS_MASK;
        assert!(address & 0x3 == 0, "Unaligned SI DMA access [0x{:08X}].", address);
        address
    }

    /// This function is invoked when SI_PIF_ADDR_RD64B_REG is written. The command
    /// block is fetched from DRAM, run, and the results are copied back to the same
    /// place.
    fn handle_dma_read(&mut self, bridge: &mut dyn PifBridge) {

        let target = self.dma_address();

        debug!("DMA | Request: Read from PIF RAM.");
        debug!("DMA | DEST   : [0x{:08X}].", target);
        debug!("DMA | SOURCE : [0x{:08X}].", PIF_RAM_BASE_ADDRESS);
        debug!("DMA | LENGTH : [0x{:08X}].", PIF_RAM_SIZE);

        bridge.dma_from_dram(&mut self.ram, target);
        self.command.copy_from_slice(&self.ram);

        self.process_command_table();

        bridge.dma_to_dram(target, &self.ram);

        self.regs[SiRegister::Status as usize] |= SI_STATUS_INTERRUPT;
        bridge.raise_rcp_interrupt(MI_INTR_SI);
    }

    /// This function is invoked when SI_PIF_ADDR_WR64B_REG is written. A command
    /// block is copied from DRAM into PIF RAM.
    fn handle_dma_write(&mut self, bridge: &mut dyn PifBridge) {

        let source = self.dma_address();

        debug!("DMA | Request: Write to PIF RAM.");
        debug!("DMA | DEST   : [0x{:08X}].", PIF_RAM_BASE_ADDRESS);
        debug!("DMA | SOURCE : [0x{:08X}].", source);
        debug!("DMA | LENGTH : [0x{:08X}].", PIF_RAM_SIZE);

        bridge.dma_from_dram(&mut self.ram, source);
        self.command.copy_from_slice(&self.ram);

        self.regs[SiRegister::Status as usize] |= SI_STATUS_INTERRUPT;
        bridge.raise_rcp_interrupt(MI_INTR_SI);
    }
}

/// Implementation functions to be called from anything that understands what
/// a SerialInterface object is.
impl SerialInterface for N64Pif {

    /// Reads an SI register.
    fn read_register(&mut self, address: u32) -> u32 {

        match SiRegister::from_address(address) {
            Some(reg) => {
                debug!("SIRegRead: Reading from register [{}].", reg.mnemonic());
                self.regs[reg as usize]
            },
            None => {
                warn!("SIRegRead: No register at [0x{:08X}].", address);
                0
            },
        }
    }

    /// Writes an SI register.
    fn write_register(&mut self, bridge: &mut dyn PifBridge, address: u32, value: u32) {

        let Some(reg) = SiRegister::from_address(address) else {
            warn!("SIRegWrite: No register at [0x{:08X}].", address);
            return;
        };

        debug!("SIRegWrite: Writing to register [{}].", reg.mnemonic());

        match reg {

            // Any write acknowledges the interrupt.
            SiRegister::Status => {
                self.regs[reg as usize] &= !SI_STATUS_INTERRUPT;
                bridge.clear_rcp_interrupt(MI_INTR_SI);
            },

            // DMA triggers, the value written is irrelevant.
            SiRegister::PifAddrRd64b => self.handle_dma_read(bridge),
            SiRegister::PifAddrWr64b => self.handle_dma_write(bridge),

            _ => self.regs[reg as usize] = value,
        }
    }

    /// Reads a byte from PIF RAM.
    fn read_ram_byte(&mut self, address: u32) -> u8 {

        debug!("PIFRAMRead: Read byte from address [0x{:08X}].", address);

        match Self::ram_offset(address, 1) {
            Some(CIC_STATUS_BYTE) => self.toggle_status_latch(),
            Some(offset) => self.ram[offset],
            None => {
                warn!("PIFRAMRead: Address [0x{:08X}] out of range.", address);
                0
            },
        }
    }

    /// Reads a half-word from PIF RAM.
    fn read_ram_half(&mut self, address: u32) -> u16 {

        debug!("PIFRAMRead: Read half from address [0x{:08X}].", address);

        match Self::ram_offset(address, 2) {
            Some(CIC_STATUS_BYTE) => self.toggle_status_latch() as u16,
            Some(offset) => self.ram.read_be_u16(offset).unwrap_or(0),
            None => {
                warn!("PIFRAMRead: Address [0x{:08X}] out of range.", address);
                0
            },
        }
    }

    /// Reads a word from PIF RAM.
    fn read_ram_word(&mut self, address: u32) -> u32 {

        debug!("PIFRAMRead: Read word from address [0x{:08X}].", address);

        match Self::ram_offset(address, 4) {
            Some(CIC_STATUS_BYTE) => self.toggle_status_latch() as u32,
            Some(offset) => self.ram.read_be_u32(offset).unwrap_or(0),
            None => {
                warn!("PIFRAMRead: Address [0x{:08X}] out of range.", address);
                0
            },
        }
    }

    /// Writes a byte to PIF RAM.
    fn write_ram_byte(&mut self, bridge: &mut dyn PifBridge, address: u32, value: u8) {

        debug!("PIFRAMWrite: Write byte to address [0x{:08X}].", address);

        match Self::ram_offset(address, 1) {
            Some(offset) => {
                self.ram[offset] = value;
                bridge.raise_rcp_interrupt(MI_INTR_SI);
            },
            None => warn!("PIFRAMWrite: Address [0x{:08X}] out of range.", address),
        }
    }

    /// Writes a half-word to PIF RAM.
    fn write_ram_half(&mut self, bridge: &mut dyn PifBridge, address: u32, value: u16) {

        debug!("PIFRAMWrite: Write half to address [0x{:08X}].", address);

        match Self::ram_offset(address, 2) {
            Some(offset) => {
                self.ram.write_be_u16(offset, value);
                bridge.raise_rcp_interrupt(MI_INTR_SI);
            },
            None => warn!("PIFRAMWrite: Address [0x{:08X}] out of range.", address),
        }
    }

    /// Writes a word to PIF RAM.
    fn write_ram_word(&mut self, bridge: &mut dyn PifBridge, address: u32, value: u32) {

        debug!("PIFRAMWrite: Write word to address [0x{:08X}].", address);

        match Self::ram_offset(address, 4) {
            Some(offset) => {
                self.ram.write_be_u32(offset, value);
                bridge.raise_rcp_interrupt(MI_INTR_SI);
            },
            None => warn!("PIFRAMWrite: Address [0x{:08X}] out of range.", address),
        }
    }

    /// Reads a word from PIF ROM.
    fn read_rom_word(&self, address: u32) -> u32 {

        let word = address
            .checked_sub(PIF_ROM_BASE_ADDRESS)
            .and_then(|offset| self.rom.read_be_u32(offset as usize));

        match word {
            Some(word) => word,
            None => {
                warn!("PIFROMRead: Address [0x{:08X}] out of range.", address);
                0
            },
        }
    }

    /// PIF ROM is read-only, writes are only logged.
    fn write_rom_word(&mut self, address: u32, _value: u32) {
        debug!("PIF ROM: Detected write [0x{:08X}].", address);
    }
}

#[cfg(test)]
mod tests;
