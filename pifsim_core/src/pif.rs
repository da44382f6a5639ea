// SPDX-License-Identifier: GPL-3.0
// pif.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

/// This module contains the default PIF implementation, as found on the
/// N64. There may be others in future.
pub mod n64_pif;

/// This module contains the checksum used to protect controller pak blocks.
pub mod checksum;

/// Base address of the PIF ROM.
pub const PIF_ROM_BASE_ADDRESS: u32 = 0x1FC00000;

/// Nominal length of the PIF ROM region.
pub const PIF_ROM_ADDRESS_LEN: u32 = 0x000007C0;

/// Base address of PIF RAM.
pub const PIF_RAM_BASE_ADDRESS: u32 = 0x1FC007C0;

/// Size of PIF RAM (and of every SI DMA transfer) in bytes.
pub const PIF_RAM_SIZE: usize = 0x40;

/// Offset of the CIC status byte within PIF RAM.
pub const CIC_STATUS_BYTE: usize = 0x3C;

/// Offset of the command table trigger byte within PIF RAM.
pub const COMMAND_TRIGGER_BYTE: usize = 0x3F;

/// Base address of the serial interface registers.
pub const SI_REGS_BASE_ADDRESS: u32 = 0x04800000;

/// Length of the serial interface register block.
pub const SI_REGS_ADDRESS_LEN: u32 = 0x0000001C;

/// Number of serial interface registers.
pub const SI_REGISTER_COUNT: usize = (SI_REGS_ADDRESS_LEN / 4) as usize;

/// SI_STATUS_REG bit signalling a completed DMA with interrupt pending.
pub const SI_STATUS_INTERRUPT: u32 = 0x1000;

/// MI_INTR_REG bit for the serial interface.
pub const MI_INTR_SI: u32 = 0x02;

/// Only the low 29 bits of SI_DRAM_ADDR_REG reach the DMA engine.
pub const DRAM_ADDRESS_MASK: u32 = 0x1FFFFFFF;

/// This enum names the serial interface registers, in address order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum SiRegister {
    DramAddr = 0,
    PifAddrRd64b = 1,
    Reserved1 = 2,
    Reserved2 = 3,
    PifAddrWr64b = 4,
    Reserved3 = 5,
    Status = 6,
}

impl SiRegister {

    /// Resolves an absolute register address, returning `None` if it falls
    /// outside the register block.
    pub fn from_address(address: u32) -> Option<Self> {

        let offset = address.checked_sub(SI_REGS_BASE_ADDRESS)?;
        if offset >= SI_REGS_ADDRESS_LEN {
            return None;
        }

        match offset >> 2 {
            0 => Some(SiRegister::DramAddr),
            1 => Some(SiRegister::PifAddrRd64b),
            2 => Some(SiRegister::Reserved1),
            3 => Some(SiRegister::Reserved2),
            4 => Some(SiRegister::PifAddrWr64b),
            5 => Some(SiRegister::Reserved3),
            6 => Some(SiRegister::Status),
            _ => None,
        }
    }

    /// Returns the absolute address of this register.
    pub fn address(self) -> u32 {
        SI_REGS_BASE_ADDRESS + 4 * self as u32
    }

    /// Returns the register's mnemonic, for diagnostics.
    pub fn mnemonic(self) -> &'static str {
        match self {
            SiRegister::DramAddr => "SI_DRAM_ADDR_REG",
            SiRegister::PifAddrRd64b => "SI_PIF_ADDR_RD64B_REG",
            SiRegister::Reserved1 => "SI_RESERVED_1_REG",
            SiRegister::Reserved2 => "SI_RESERVED_2_REG",
            SiRegister::PifAddrWr64b => "SI_PIF_ADDR_WR64B_REG",
            SiRegister::Reserved3 => "SI_RESERVED_3_REG",
            SiRegister::Status => "SI_STATUS_REG",
        }
    }
}

/// This trait provides an implementation-opaque way of calling serial interface
/// and PIF methods from elsewhere in the system. Writes that can start a DMA or
/// signal an interrupt take a bridge so the implementation can call back out to
/// the host.
pub trait SerialInterface {

    /// Implementations must return the value of the SI register at this address.
    fn read_register(&mut self, address: u32) -> u32;

    /// Implementations must write the SI register at this address, performing any
    /// side effects (DMA, interrupt acknowledgement) it triggers.
    fn write_register(&mut self, bridge: &mut dyn PifBridge, address: u32, value: u32);

    /// Implementations must read a byte from PIF RAM.
    fn read_ram_byte(&mut self, address: u32) -> u8;

    /// Implementations must read a big-endian half-word from PIF RAM.
    fn read_ram_half(&mut self, address: u32) -> u16;

    /// Implementations must read a big-endian word from PIF RAM.
    fn read_ram_word(&mut self, address: u32) -> u32;

    /// Implementations must write a byte to PIF RAM.
    fn write_ram_byte(&mut self, bridge: &mut dyn PifBridge, address: u32, value: u8);

    /// Implementations must write a big-endian half-word to PIF RAM.
    fn write_ram_half(&mut self, bridge: &mut dyn PifBridge, address: u32, value: u16);

    /// Implementations must write a big-endian word to PIF RAM.
    fn write_ram_word(&mut self, bridge: &mut dyn PifBridge, address: u32, value: u32);

    /// Implementations must read a big-endian word from PIF ROM.
    fn read_rom_word(&self, address: u32) -> u32;

    /// Implementations must ignore writes to PIF ROM.
    fn write_rom_word(&mut self, address: u32, value: u32);
}

/// This trait provides an implementation-opaque way of the PIF calling
/// methods from elsewhere in the system via a 'bridge'.
pub trait PifBridge {

    /// The PIF must call this to copy `dst.len()` bytes out of main memory.
    fn dma_from_dram(&mut self, dst: &mut [u8], address: u32);

    /// The PIF must call this to copy `src` into main memory.
    fn dma_to_dram(&mut self, address: u32, src: &[u8]);

    /// The PIF must call this to raise an RCP interrupt.
    fn raise_rcp_interrupt(&mut self, mask: u32);

    /// The PIF must call this to clear an RCP interrupt.
    fn clear_rcp_interrupt(&mut self, mask: u32);
}
