// SPDX-License-Identifier: GPL-3.0
// eeprom.rs - Copyright Phillip Potter, 2026, under GPLv3 only.

use crate::error::{PifError, Result};
use log::{debug, info, warn};
use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::Path,
};

/// Size of the EEPROM save region in bytes.
pub const EEPROM_SIZE: usize = 2048;

/// Size of one EEPROM block in bytes. All transfers are exactly one block.
pub const EEPROM_BLOCK_SIZE: usize = 8;

/// This struct models the save EEPROM sitting on channel 4, along with the
/// optional file backing it. Nothing is written to the file until a flush is
/// explicitly requested.
pub struct Eeprom {

    // Save contents.
    data: [u8; EEPROM_SIZE],

    // Backing file, opened read-write.
    file: Option<File>,
}

/// Implementation functions for the EEPROM.
impl Eeprom {

    /// Creates a new, blank EEPROM with no backing file.
    pub fn new() -> Self {
        Eeprom {
            data: [0; EEPROM_SIZE],
            file: None,
        }
    }

    /// Returns the whole save region.
    pub fn data(&self) -> &[u8; EEPROM_SIZE] {
        &self.data
    }

    /// Returns whether a backing file is attached.
    pub fn is_attached(&self) -> bool {
        self.file.is_some()
    }

    /// Reads the 8-byte block with the given index.
    pub fn read_block(&self, block: u8) -> [u8; EEPROM_BLOCK_SIZE] {

        let offset = block as usize * EEPROM_BLOCK_SIZE;
        let mut value = [0; EEPROM_BLOCK_SIZE];
        value.copy_from_slice(&self.data[offset..offset + EEPROM_BLOCK_SIZE]);
        value
    }

    /// Writes the 8-byte block with the given index.
    pub fn write_block(&mut self, block: u8, value: &[u8; EEPROM_BLOCK_SIZE]) {

        let offset = block as usize * EEPROM_BLOCK_SIZE;
        self.data[offset..offset + EEPROM_BLOCK_SIZE].copy_from_slice(value);
    }

    /// Attaches a backing file, replacing any previous one. An existing file
    /// is loaded straight away, a missing one is created and the save region
    /// is cleared.
    pub fn attach(&mut self, path: &Path) -> Result<()> {

        // Drop (and so close) any previously attached file first.
        self.file = None;

        match OpenOptions::new().read(true).write(true).open(path) {
            Ok(mut file) => {
                debug!("EEPROM | Opened existing file [{}].", path.display());

                // Only keep the file once its contents have been read.
                read_save(&mut file, &mut self.data)?;
                self.file = Some(file);
                Ok(())
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("EEPROM | Creating new file [{}].", path.display());
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)?;
                self.file = Some(file);
                self.data.fill(0);
                Ok(())
            },
            Err(err) => Err(PifError::Io(err)),
        }
    }

    /// Re-reads the save region from the backing file. Files shorter than the
    /// save region are ignored, leaving a blank save.
    pub fn load(&mut self) -> Result<()> {

        let file = self.file.as_mut().ok_or(PifError::EepromNotAttached)?;
        read_save(file, &mut self.data)
    }

    /// Writes the whole save region to the backing file, from offset 0.
    pub fn flush(&mut self) -> Result<()> {

        let file = self.file.as_mut().ok_or(PifError::EepromNotAttached)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&self.data)?;
        file.flush()?;

        debug!("EEPROM | Flushed {} bytes.", EEPROM_SIZE);
        Ok(())
    }
}

/// Reads a whole save region from the start of `source` into `data`. A short
/// source gives a blank save. On any other error `data` is left as it was.
fn read_save<R: Read + Seek>(source: &mut R, data: &mut [u8; EEPROM_SIZE]) -> Result<()> {

    source.seek(SeekFrom::Start(0))?;

    let mut buffer = [0; EEPROM_SIZE];
    match source.read_exact(&mut buffer) {
        Ok(()) => {
            *data = buffer;
            Ok(())
        },
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
            warn!("EEPROM | Ignoring short EEPROM file.");
            data.fill(0);
            Ok(())
        },
        Err(err) => Err(PifError::Io(err)),
    }
}
