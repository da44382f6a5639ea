// SPDX-License-Identifier: GPL-3.0
// tests.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{cell::Cell, fs, rc::Rc};

use crate::{
    error::PifError,
    input::{buttons, ControllerState, InputProfile, InputSource},
    pif::{
        PifBridge,
        SerialInterface,
        SiRegister,
        CIC_STATUS_BYTE,
        MI_INTR_SI,
        PIF_RAM_BASE_ADDRESS,
        PIF_RAM_SIZE,
        PIF_ROM_ADDRESS_LEN,
        PIF_ROM_BASE_ADDRESS,
        SI_STATUS_INTERRUPT,
    },
};

use super::N64Pif;

// Tests for the PIF, its command table and the serial interface in front of it.

/// Input source handing back a fixed state per channel.
struct FixedInput {
    states: [ControllerState; 4],
    profile: Rc<Cell<Option<InputProfile>>>,
}

impl InputSource for FixedInput {

    fn poll(&mut self, channel: usize) -> ControllerState {
        self.states[channel]
    }

    fn set_profile(&mut self, profile: InputProfile) {
        self.profile.set(Some(profile));
    }
}

/// Host bus with a small DRAM and an interrupt line.
struct FakeBus {
    dram: Vec<u8>,
    interrupts: u32,
    raised: u32,
}

impl FakeBus {

    fn new() -> Self {
        FakeBus {
            dram: vec![0; 0x4000],
            interrupts: 0,
            raised: 0,
        }
    }
}

impl PifBridge for FakeBus {

    fn dma_from_dram(&mut self, dst: &mut [u8], address: u32) {
        let start = address as usize;
        dst.copy_from_slice(&self.dram[start..start + dst.len()]);
    }

    fn dma_to_dram(&mut self, address: u32, src: &[u8]) {
        let start = address as usize;
        self.dram[start..start + src.len()].copy_from_slice(src);
    }

    fn raise_rcp_interrupt(&mut self, mask: u32) {
        self.interrupts |= mask;
        self.raised += 1;
    }

    fn clear_rcp_interrupt(&mut self, mask: u32) {
        self.interrupts &= !mask;
    }
}

const PLAYER_ONE: ControllerState = ControllerState {
    buttons: buttons::A | buttons::START,
    stick_x: 10,
    stick_y: -5,
};

const PLAYER_TWO: ControllerState = ControllerState {
    buttons: buttons::Z,
    stick_x: -127,
    stick_y: 127,
};

fn new_pif() -> N64Pif {

    let input = FixedInput {
        states: [PLAYER_ONE, PLAYER_TWO, ControllerState::default(), ControllerState::default()],
        profile: Rc::new(Cell::new(None)),
    };

    N64Pif::new(vec![0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0], Box::new(input)).unwrap()
}

/// Builds a command table from its leading bytes, with the trigger byte set.
fn table(bytes: &[u8]) -> [u8; PIF_RAM_SIZE] {

    let mut block = [0_u8; PIF_RAM_SIZE];
    block[..bytes.len()].copy_from_slice(bytes);
    block[0x3F] = 0x1;
    block
}

/// Places a command table in PIF RAM as if it had just been DMA'd in.
fn load(pif: &mut N64Pif, block: &[u8; PIF_RAM_SIZE]) {
    pif.command = *block;
    pif.ram = *block;
}

#[test]
fn test_new_rejects_empty_rom() {

    let input = FixedInput {
        states: [ControllerState::default(); 4],
        profile: Rc::new(Cell::new(None)),
    };

    let result = N64Pif::new(vec![], Box::new(input));

    assert!(matches!(result, Err(PifError::EmptyRom)));
}

#[test]
fn test_status_latch_alternates() {

    let mut pif = new_pif();
    let mut bus = FakeBus::new();
    let latch = PIF_RAM_BASE_ADDRESS + CIC_STATUS_BYTE as u32;

    assert_eq!(pif.read_ram_byte(latch), 0x80);
    assert_eq!(pif.read_ram_byte(latch), 0x00);

    // Unrelated register traffic should not disturb it.
    pif.write_register(&mut bus, SiRegister::Reserved1.address(), 0xFFFF);
    pif.read_register(SiRegister::Status.address());

    assert_eq!(pif.read_ram_word(latch), 0x80);
    assert_eq!(pif.read_ram_half(latch), 0x00);
    assert_eq!(pif.read_ram_byte(latch), 0x80);
}

#[test]
fn test_status_latch_is_write_transparent() {

    let mut pif = new_pif();
    let mut bus = FakeBus::new();
    let latch = PIF_RAM_BASE_ADDRESS + CIC_STATUS_BYTE as u32;

    pif.write_ram_byte(&mut bus, latch, 0x55);

    assert_eq!(pif.ram()[CIC_STATUS_BYTE], 0x55);
    assert_eq!(pif.read_ram_byte(latch), 0x80);
    assert_eq!(pif.ram()[CIC_STATUS_BYTE], 0x55);
}

#[test]
fn test_cic_seed_defaults_to_6102() {

    let mut pif = new_pif();

    assert_eq!(pif.read_ram_word(PIF_RAM_BASE_ADDRESS + 0x24), 0x00023F3F);

    pif.set_cic_seed(0x00043F3F);
    assert_eq!(pif.ram()[0x24..0x28], [0x00, 0x04, 0x3F, 0x3F]);
}

#[test]
fn test_ram_access_is_big_endian_and_raises_interrupt() {

    let mut pif = new_pif();
    let mut bus = FakeBus::new();

    pif.write_ram_word(&mut bus, PIF_RAM_BASE_ADDRESS + 0x10, 0x11223344);

    assert_eq!(pif.ram()[0x10..0x14], [0x11, 0x22, 0x33, 0x44]);
    assert_eq!(pif.read_ram_half(PIF_RAM_BASE_ADDRESS + 0x12), 0x3344);
    assert_eq!(pif.read_ram_byte(PIF_RAM_BASE_ADDRESS + 0x11), 0x22);
    assert_eq!(bus.interrupts, MI_INTR_SI);

    pif.write_ram_half(&mut bus, PIF_RAM_BASE_ADDRESS + 0x20, 0xBEEF);
    assert_eq!(pif.read_ram_word(PIF_RAM_BASE_ADDRESS + 0x20), 0xBEEF0000);
}

#[test]
fn test_ram_access_out_of_range_is_ignored() {

    let mut pif = new_pif();
    let mut bus = FakeBus::new();
    let before = *pif.ram();

    pif.write_ram_word(&mut bus, PIF_RAM_BASE_ADDRESS + 0x3E, 0xFFFFFFFF);
    pif.write_ram_byte(&mut bus, PIF_RAM_BASE_ADDRESS + 0x40, 0xFF);

    assert_eq!(*pif.ram(), before);
    assert_eq!(bus.raised, 0);
    assert_eq!(pif.read_ram_word(PIF_RAM_BASE_ADDRESS + 0x3D), 0);
    assert_eq!(pif.read_ram_byte(PIF_RAM_BASE_ADDRESS - 1), 0);
}

#[test]
fn test_rom_reads_are_big_endian_and_writes_ignored() {

    let mut pif = new_pif();

    assert_eq!(pif.read_rom_word(PIF_ROM_BASE_ADDRESS), 0x12345678);
    assert_eq!(pif.read_rom_word(PIF_ROM_BASE_ADDRESS + 4), 0x9ABCDEF0);

    pif.write_rom_word(PIF_ROM_BASE_ADDRESS, 0);
    assert_eq!(pif.read_rom_word(PIF_ROM_BASE_ADDRESS), 0x12345678);

    // Past the end of the image.
    assert_eq!(pif.read_rom_word(PIF_ROM_BASE_ADDRESS + 6), 0);
}

#[test]
fn test_plain_registers_pass_through() {

    let mut pif = new_pif();
    let mut bus = FakeBus::new();

    pif.write_register(&mut bus, SiRegister::DramAddr.address(), 0x00123450);
    pif.write_register(&mut bus, SiRegister::Reserved3.address(), 0xCAFEF00D);

    assert_eq!(pif.read_register(SiRegister::DramAddr.address()), 0x00123450);
    assert_eq!(pif.read_register(SiRegister::Reserved3.address()), 0xCAFEF00D);
    assert_eq!(pif.read_register(SiRegister::Status.address() + 4), 0);
    assert_eq!(bus.raised, 0);
}

#[test]
fn test_register_addresses_and_mnemonics() {

    assert_eq!(SiRegister::from_address(0x04800000), Some(SiRegister::DramAddr));
    assert_eq!(SiRegister::from_address(0x04800004), Some(SiRegister::PifAddrRd64b));
    assert_eq!(SiRegister::from_address(0x04800010), Some(SiRegister::PifAddrWr64b));
    assert_eq!(SiRegister::from_address(0x04800018), Some(SiRegister::Status));
    assert_eq!(SiRegister::from_address(0x0480001C), None);
    assert_eq!(SiRegister::from_address(0x047FFFFC), None);
    assert_eq!(SiRegister::Status.mnemonic(), "SI_STATUS_REG");
    assert_eq!(SiRegister::PifAddrWr64b.address(), 0x04800010);
}

#[test]
fn test_interpreter_ignores_table_without_trigger() {

    let mut pif = new_pif();
    let mut block = table(&[0x01, 0x04, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]);
    block[0x3F] = 0x00;
    load(&mut pif, &block);

    pif.process_command_table();

    assert_eq!(*pif.ram(), block);
}

#[test]
fn test_controller_poll_on_channel_zero() {

    let mut pif = new_pif();
    load(&mut pif, &table(&[0x01, 0x04, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]));

    pif.process_command_table();

    assert_eq!(pif.ram()[3..7], PLAYER_ONE.to_bytes());
    assert_eq!(pif.ram()[3..7], [0x90, 0x00, 0x0A, 0xFB]);
    assert_eq!(pif.ram()[0x3F], 0x00);
}

#[test]
fn test_status_query_per_channel() {

    let mut pif = new_pif();
    let slot = [0x01, 0x03, 0x00, 0xFF, 0xFF, 0xFF];
    let mut bytes = Vec::new();
    for _ in 0..4 {
        bytes.extend_from_slice(&slot);
    }
    bytes.push(0xFE);
    load(&mut pif, &table(&bytes));

    pif.process_command_table();

    // Channel 0 has a controller with a pak.
    assert_eq!(pif.ram()[3..6], [0x05, 0x00, 0x01]);

    // Channels 1-3 fail, leaving their response areas alone.
    for channel in 1..4 {
        let start = channel * slot.len();
        assert_eq!(pif.ram()[start + 1], 0x83);
        assert_eq!(pif.ram()[start + 3..start + 6], [0xFF, 0xFF, 0xFF]);
    }
}

#[test]
fn test_padding_does_not_advance_channel_but_filler_does() {

    let mut pif = new_pif();

    // Padding (0xFF) then a poll: still channel 0.
    load(&mut pif, &table(&[0xFF, 0xFF, 0x01, 0x04, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]));
    pif.process_command_table();
    assert_eq!(pif.ram()[5..9], PLAYER_ONE.to_bytes());

    // An empty slot then a poll: channel 1.
    load(&mut pif, &table(&[0x00, 0x01, 0x04, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]));
    pif.process_command_table();
    assert_eq!(pif.ram()[4..8], PLAYER_TWO.to_bytes());

    // A filler length with bit 6 set then a poll: also channel 1.
    load(&mut pif, &table(&[0x40, 0x01, 0x04, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]));
    pif.process_command_table();
    assert_eq!(pif.ram()[4..8], PLAYER_TWO.to_bytes());
}

#[test]
fn test_end_of_table_stops_processing() {

    let mut pif = new_pif();
    let block = table(&[0xFE, 0x01, 0x04, 0x01, 0xFF, 0xFF, 0xFF, 0xFF]);
    load(&mut pif, &block);

    pif.process_command_table();

    assert_eq!(pif.ram()[..0x3F], block[..0x3F]);
    assert_eq!(pif.ram()[0x3F], 0x00);
}

#[test]
fn test_poll_on_eeprom_channel_fails() {

    let mut pif = new_pif();
    load(&mut pif, &table(&[0x00, 0x00, 0x00, 0x00, 0x01, 0x04, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]));

    pif.process_command_table();

    assert_eq!(pif.ram()[5], 0x84);
    assert_eq!(pif.ram()[7..11], [0xFF; 4]);
}

#[test]
fn test_eeprom_status_on_channel_four() {

    let mut pif = new_pif();
    load(&mut pif, &table(&[0x00, 0x00, 0x00, 0x00, 0x01, 0x03, 0x00, 0xFF, 0xFF, 0xFF, 0xFE]));

    pif.process_command_table();

    assert_eq!(pif.ram()[7..10], [0x00, 0x80, 0x00]);
}

#[test]
fn test_eeprom_write_then_read_round_trip() {

    let mut pif = new_pif();
    let data = [1, 2, 3, 4, 5, 6, 7, 8];

    // Write block 2.
    let mut write = vec![0x00, 0x00, 0x00, 0x00, 0x0A, 0x01, 0x05, 0x02];
    write.extend_from_slice(&data);
    write.extend_from_slice(&[0xFF, 0xFE]);
    load(&mut pif, &table(&write));
    pif.process_command_table();

    assert_eq!(pif.eeprom().read_block(2), data);
    assert_eq!(pif.ram()[16], 0x00);

    // Read it back.
    let mut read = vec![0x00, 0x00, 0x00, 0x00, 0x02, 0x08, 0x04, 0x02];
    read.extend_from_slice(&[0xFF; 8]);
    read.push(0xFE);
    load(&mut pif, &table(&read));
    pif.process_command_table();

    assert_eq!(pif.ram()[8..16], data);

    // An untouched block reads as zero.
    read[7] = 0x03;
    load(&mut pif, &table(&read));
    pif.process_command_table();

    assert_eq!(pif.ram()[8..16], [0x00; 8]);
}

#[test]
fn test_eeprom_commands_need_channel_four() {

    let mut pif = new_pif();
    let mut write = vec![0x0A, 0x01, 0x05, 0x00];
    write.extend_from_slice(&[0xEE; 8]);
    write.extend_from_slice(&[0xFF, 0xFE]);
    load(&mut pif, &table(&write));

    pif.process_command_table();

    assert_eq!(pif.ram()[1], 0x81);
    assert_eq!(pif.eeprom().read_block(0), [0x00; 8]);
}

#[test]
fn test_mempak_read_returns_blank_block() {

    let mut pif = new_pif();

    // Lock block address, with low bits that should be masked off.
    let mut bytes = vec![0x03, 0x21, 0x02, 0x80, 0x1F];
    bytes.extend_from_slice(&[0xFF; 33]);
    bytes.push(0xFE);
    load(&mut pif, &table(&bytes));

    pif.process_command_table();

    assert_eq!(pif.ram()[1], 0x21);
    assert_eq!(pif.ram()[5..37], [0x00; 32]);
    assert_eq!(pif.ram()[37], 0x00);
}

#[test]
fn test_mempak_read_outside_usable_area_fails() {

    let mut pif = new_pif();
    let mut bytes = vec![0x03, 0x21, 0x02, 0x7F, 0xE0];
    bytes.extend_from_slice(&[0xFF; 33]);
    bytes.push(0xFE);
    load(&mut pif, &table(&bytes));

    pif.process_command_table();

    assert_eq!(pif.ram()[1], 0xA1);
    assert_eq!(pif.ram()[5..38], [0xFF; 33]);
}

#[test]
fn test_mempak_write_acknowledges_with_checksum_without_storing() {

    let mut pif = new_pif();

    // Write 32 bytes of 0xFF to block 0x0020.
    let mut bytes = vec![0x23, 0x01, 0x03, 0x00, 0x20];
    bytes.extend_from_slice(&[0xFF; 32]);
    bytes.extend_from_slice(&[0xFF, 0xFE]);
    load(&mut pif, &table(&bytes));
    pif.process_command_table();

    assert_eq!(pif.ram()[37], 0x0A);

    // The data is not kept: reading the same block gives a blank block.
    let mut bytes = vec![0x03, 0x21, 0x02, 0x00, 0x20];
    bytes.extend_from_slice(&[0xFF; 33]);
    bytes.push(0xFE);
    load(&mut pif, &table(&bytes));
    pif.process_command_table();

    assert_eq!(pif.ram()[5..37], [0x00; 32]);
}

#[test]
fn test_unknown_command_marks_slot() {

    let mut pif = new_pif();
    load(&mut pif, &table(&[0x01, 0x02, 0x42, 0xFF, 0xFF, 0xFE]));

    pif.process_command_table();

    assert_eq!(pif.ram()[1], 0x82);
}

#[test]
fn test_response_is_clamped_to_end_of_ram() {

    let mut pif = new_pif();

    // Padding up to 0x3B, then a status query asking for 8 bytes, which would
    // run 6 bytes past the end.
    let mut bytes = vec![0xFF; 0x3B];
    bytes.extend_from_slice(&[0x01, 0x08, 0x00]);
    let block = table(&bytes);
    load(&mut pif, &block);

    pif.process_command_table();

    assert_eq!(pif.ram()[..0x3E], block[..0x3E]);
    assert_eq!(pif.ram()[0x3E], 0x05);
    assert_eq!(pif.ram()[0x3F], 0x00);
}

#[test]
fn test_dma_write_then_read_runs_table() {

    let mut pif = new_pif();
    let mut bus = FakeBus::new();
    let block = table(&[0x01, 0x04, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]);
    bus.dram[0x1000..0x1040].copy_from_slice(&block);

    // The top bits of the DRAM address are dropped.
    pif.write_register(&mut bus, SiRegister::DramAddr.address(), 0xA0001000);

    // DRAM to PIF.
    pif.write_register(&mut bus, SiRegister::PifAddrWr64b.address(), PIF_RAM_BASE_ADDRESS);
    assert_eq!(*pif.command(), block);
    assert_eq!(*pif.ram(), block);
    assert_eq!(bus.interrupts, MI_INTR_SI);
    assert_ne!(pif.read_register(SiRegister::Status.address()) & SI_STATUS_INTERRUPT, 0);

    // Acknowledge.
    pif.write_register(&mut bus, SiRegister::Status.address(), 0);
    assert_eq!(bus.interrupts, 0);
    assert_eq!(pif.read_register(SiRegister::Status.address()) & SI_STATUS_INTERRUPT, 0);

    // PIF to DRAM.
    pif.write_register(&mut bus, SiRegister::PifAddrRd64b.address(), PIF_RAM_BASE_ADDRESS);
    assert_eq!(bus.dram[0x1003..0x1007], PLAYER_ONE.to_bytes());
    assert_eq!(bus.dram[0x103F], 0x00);
    assert_eq!(bus.interrupts, MI_INTR_SI);
    assert_eq!(bus.raised, 2);
    assert_ne!(pif.read_register(SiRegister::Status.address()) & SI_STATUS_INTERRUPT, 0);
}

#[test]
#[should_panic(expected = "Unaligned SI DMA access")]
fn test_misaligned_dma_is_fatal() {

    let mut pif = new_pif();
    let mut bus = FakeBus::new();

    pif.write_register(&mut bus, SiRegister::DramAddr.address(), 0x1002);
    pif.write_register(&mut bus, SiRegister::PifAddrRd64b.address(), 0);
}

#[test]
fn test_set_control_type_selects_profile() {

    let profile = Rc::new(Cell::new(None));
    let input = FixedInput {
        states: [ControllerState::default(); 4],
        profile: Rc::clone(&profile),
    };
    let mut pif = N64Pif::new(vec![0; 4], Box::new(input)).unwrap();

    assert_eq!(pif.control_type(), InputProfile::Keyboard);

    pif.set_control_type("retrolink");
    assert_eq!(pif.control_type(), InputProfile::Retrolink);
    assert_eq!(profile.get(), Some(InputProfile::Retrolink));

    pif.set_control_type("joystick");
    assert_eq!(pif.control_type(), InputProfile::Keyboard);
}

#[test]
fn test_eeprom_file_round_trip() {

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("save.eep");
    fs::write(&path, [0x77_u8; 100]).unwrap();

    // A short file gives a blank save.
    let mut pif = new_pif();
    pif.attach_eeprom_file(&path).unwrap();
    assert!(pif.eeprom().data().iter().all(|&byte| byte == 0));

    // Write block 5 through the command table and flush.
    let mut write = vec![0x00, 0x00, 0x00, 0x00, 0x0A, 0x01, 0x05, 0x05];
    write.extend_from_slice(&[0xAB; 8]);
    write.extend_from_slice(&[0xFF, 0xFE]);
    load(&mut pif, &table(&write));
    pif.process_command_table();
    pif.write_eeprom_file().unwrap();

    // A new PIF on the same file sees it.
    let mut reloaded = new_pif();
    reloaded.attach_eeprom_file(&path).unwrap();
    assert_eq!(reloaded.eeprom().read_block(5), [0xAB; 8]);
    reloaded.read_eeprom_file().unwrap();
    assert_eq!(reloaded.eeprom().read_block(5), [0xAB; 8]);
}

#[test]
fn test_eeprom_file_operations_need_attachment() {

    let mut pif = new_pif();

    assert!(matches!(pif.write_eeprom_file(), Err(PifError::EepromNotAttached)));
    assert!(matches!(pif.read_eeprom_file(), Err(PifError::EepromNotAttached)));
}

#[test]
fn test_rom_reads_cover_whole_image() {

    let input = FixedInput {
        states: [ControllerState::default(); 4],
        profile: Rc::new(Cell::new(None)),
    };

    // Given an image larger than the usual ROM size,
    let mut image = vec![0xAB; 0x800];
    image[0x7FC..].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    let pif = N64Pif::new(image, Box::new(input)).unwrap();

    // The last word of the usual size should read,
    assert_eq!(pif.read_rom_word(PIF_ROM_BASE_ADDRESS + PIF_ROM_ADDRESS_LEN - 4), 0xABABABAB);

    // And so should the rest of the image, up to its last word.
    assert_eq!(pif.read_rom_word(PIF_ROM_BASE_ADDRESS + 0x7FC), 0xDEADBEEF);
    assert_eq!(pif.read_rom_word(PIF_ROM_BASE_ADDRESS + 0x800), 0);
}
