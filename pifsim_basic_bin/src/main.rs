// SPDX-License-Identifier: GPL-3.0
// main.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use std::{ffi::OsString, fs, path::Path, process::ExitCode};

// This file is the core of the basic client - it exists merely as a CLI-based
// program to load a PIF ROM, optionally attach an EEPROM save, and push a single
// command block through the serial interface the way a game would.

use clap::Parser;
use log::{error, info};
use pifsim_core::{
    input::{profiles::ProfileInput, IdleDevice, InputProfile, RawInputDevice},
    pif::{
        n64_pif::N64Pif,
        PifBridge,
        SerialInterface,
        SiRegister,
        PIF_RAM_BASE_ADDRESS,
        PIF_RAM_SIZE,
    },
    Result,
};

/// This module contains an SDL3-backed host input device.
#[cfg(feature = "sdl")]
mod sdl_input;

/// Size of the emulated DRAM in bytes.
const DRAM_SIZE: usize = 0x400000;

/// Command block used when none is supplied: a status query on channel 0
/// followed by a controller poll on channel 1.
const DEFAULT_COMMAND_BLOCK: [u8; 13] = [
    0x01, 0x03, 0x00, 0xFF, 0xFF, 0xFF,
    0x01, 0x04, 0x01, 0xFF, 0xFF, 0xFF, 0xFF,
];

#[derive(Parser)]
#[command(
    version,
    about = "A basic barebones UI for the PIFSIM peripheral interface simulator",
    long_about = None
)]
struct PifSimArgs {
    #[arg(
        long = "rom",
        help = "A PIF ROM image",
        id = "ROM file"
    )]
    rom: OsString,

    #[arg(
        long = "eeprom",
        help = "An optional EEPROM save file, created if missing",
        id = "EEPROM file"
    )]
    eeprom: Option<OsString>,

    #[arg(
        long = "control-type",
        help = "Input profile: keyboard, mayflash64, retrolink or x360",
        default_value = "keyboard"
    )]
    control_type: InputProfile,

    #[arg(
        long = "commands",
        help = "An optional file holding a 64-byte command block",
        id = "Command file"
    )]
    commands: Option<OsString>,

    #[arg(
        long = "dram-address",
        help = "DRAM address the command block is placed at",
        default_value_t = 0x1000,
        value_parser = parse_address
    )]
    dram_address: u32,
}

/// Accepts decimal or 0x-prefixed hexadecimal.
fn parse_address(value: &str) -> std::result::Result<u32, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|err| err.to_string())
}

/// This struct is the host side of the serial interface: a flat DRAM and an
/// MI interrupt register.
struct HostMemory {
    dram: Vec<u8>,
    mi_intr: u32,
}

impl HostMemory {

    fn new() -> Self {
        HostMemory {
            dram: vec![0; DRAM_SIZE],
            mi_intr: 0,
        }
    }

    fn range(&self, address: u32, len: usize) -> std::ops::Range<usize> {
        let start = address as usize % self.dram.len();
        start..(start + len).min(self.dram.len())
    }
}

impl PifBridge for HostMemory {

    fn dma_from_dram(&mut self, dst: &mut [u8], address: u32) {
        let range = self.range(address, dst.len());
        let len = range.len();
        dst[..len].copy_from_slice(&self.dram[range]);
    }

    fn dma_to_dram(&mut self, address: u32, src: &[u8]) {
        let range = self.range(address, src.len());
        let len = range.len();
        self.dram[range].copy_from_slice(&src[..len]);
    }

    fn raise_rcp_interrupt(&mut self, mask: u32) {
        self.mi_intr |= mask;
    }

    fn clear_rcp_interrupt(&mut self, mask: u32) {
        self.mi_intr &= !mask;
    }
}

/// Picks the host input device.
fn host_device() -> Box<dyn RawInputDevice> {

    #[cfg(feature = "sdl")]
    {
        match sdl_input::SdlDevice::new() {
            Ok(device) => return Box::new(device),
            Err(err) => log::warn!("SDL input unavailable ({}), using idle input.", err),
        }
    }

    Box::new(IdleDevice)
}

/// Loads the command block, padding it to a full block and setting the trigger.
fn command_block(path: Option<&Path>) -> Result<[u8; PIF_RAM_SIZE]> {

    let mut block = [0_u8; PIF_RAM_SIZE];

    match path {
        Some(path) => {
            let bytes = fs::read(path)?;
            let len = bytes.len().min(PIF_RAM_SIZE);
            block[..len].copy_from_slice(&bytes[..len]);
        },
        None => {
            block[..DEFAULT_COMMAND_BLOCK.len()].copy_from_slice(&DEFAULT_COMMAND_BLOCK);
            block[DEFAULT_COMMAND_BLOCK.len()] = 0xFE;
            block[PIF_RAM_SIZE - 1] = 0x1;
        },
    }

    Ok(block)
}

/// Places a command block in DRAM and pushes it through the PIF with the same
/// register sequence a game uses: write the block, acknowledge, read it back.
fn exchange(
    pif: &mut N64Pif,
    host: &mut HostMemory,
    dram_address: u32,
    block: &[u8; PIF_RAM_SIZE]
) -> [u8; PIF_RAM_SIZE] {

    host.dma_to_dram(dram_address, block);

    pif.write_register(&mut *host, SiRegister::DramAddr.address(), dram_address);
    pif.write_register(&mut *host, SiRegister::PifAddrWr64b.address(), PIF_RAM_BASE_ADDRESS);
    pif.write_register(&mut *host, SiRegister::Status.address(), 0);
    pif.write_register(&mut *host, SiRegister::DramAddr.address(), dram_address);
    pif.write_register(&mut *host, SiRegister::PifAddrRd64b.address(), PIF_RAM_BASE_ADDRESS);

    let mut response = [0_u8; PIF_RAM_SIZE];
    host.dma_from_dram(&mut response, dram_address);
    response
}

fn run(args: &PifSimArgs) -> Result<()> {

    let input = ProfileInput::new(args.control_type, host_device());
    let mut pif = N64Pif::from_rom_file(Path::new(&args.rom), Box::new(input))?;
    pif.set_control_type(args.control_type.name());

    if let Some(eeprom) = &args.eeprom {
        pif.attach_eeprom_file(Path::new(eeprom))?;
    }

    let block = command_block(args.commands.as_deref().map(Path::new))?;
    let mut host = HostMemory::new();
    let response = exchange(&mut pif, &mut host, args.dram_address, &block);

    for row in response.chunks(16) {
        let line: Vec<String> = row.iter().map(|byte| format!("{:02X}", byte)).collect();
        println!("{}", line.join(" "));
    }

    info!("MI_INTR_REG: 0x{:08X}", host.mi_intr);

    if pif.eeprom().is_attached() {
        pif.write_eeprom_file()?;
    }

    Ok(())
}

fn main() -> ExitCode {
    colog::init();

    let pifsim_args = PifSimArgs::parse();

    match run(&pifsim_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        },
    }
}
