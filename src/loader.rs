//! Executable loading for the emulator.
//!
//! Three formats: raw binary, Apex BIN (ASCII hex with `*` address
//! records), and Apex SAV (binary page image with system-page and
//! zero-page relocation).

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::apex;
use crate::memory::Memory;

/// Errors that can occur while loading an executable or dumping memory.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("BIN data byte before any '*' address record")]
    MissingAddress,
}

/// Load a raw binary verbatim at `load_address`. Returns the byte count.
pub fn load_raw(mem: &mut Memory, path: &Path, load_address: u16) -> Result<usize, LoadError> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    mem.load_slice(load_address.into(), &bytes);
    info!("loaded {} (0x{:04x}) bytes", bytes.len(), bytes.len());
    Ok(bytes.len())
}

/// Load an Apex BIN file.
///
/// `*` followed by four hex digits seeds the load pointer; each
/// subsequent pair of hex digits is one data byte. Case-insensitive;
/// other characters are skipped.
pub fn load_apex_bin(mem: &mut Memory, path: &Path) -> Result<(), LoadError> {
    let mut text = Vec::new();
    File::open(path)?.read_to_end(&mut text)?;

    let mut address: Option<u16> = None;
    let mut reading_address = false;
    let mut value: u16 = 0;
    let mut digit_count = 0;
    for &c in &text {
        if c == b'*' {
            reading_address = true;
            continue;
        }
        let Some(digit) = (c as char).to_digit(16) else {
            continue;
        };
        value = (value << 4) | digit as u16;
        digit_count += 1;
        if reading_address {
            if digit_count < 4 {
                continue;
            }
            address = Some(value);
            reading_address = false;
        } else {
            if digit_count < 2 {
                continue;
            }
            let Some(addr) = address.as_mut() else {
                return Err(LoadError::MissingAddress);
            };
            mem.write_8(u32::from(*addr), value as u8);
            *addr = addr.wrapping_add(1);
        }
        digit_count = 0;
        value = 0;
    }
    Ok(())
}

/// Load an Apex SAV file.
///
/// The first 256-byte page splits into the system-page program area
/// (bytes 0x00..0x4F to 0xBF00) and the upper zero page (bytes 0x50..0xFF
/// to 0x0050). The 16-bit USRMEM word relocated with that first page
/// selects the base for the remaining pages, which load sequentially.
/// Only whole pages are loaded; EOF ends the load.
pub fn load_apex_sav(mem: &mut Memory, path: &Path) -> Result<(), LoadError> {
    let mut file = File::open(path)?;
    let mut page = [0u8; apex::PAGE_SIZE];
    let mut address: u32 = 0;
    let mut loaded_size = 0usize;
    let mut first_page = true;
    loop {
        if !read_page(&mut file, &mut page)? {
            break;
        }
        if first_page {
            mem.load_slice(
                apex::SYS_PAGE.into(),
                &page[..apex::SYS_PAGE_PROGRAM_AREA_SIZE],
            );
            mem.load_slice(
                apex::SYS_PAGE_PROGRAM_AREA_SIZE as u32,
                &page[apex::SYS_PAGE_PROGRAM_AREA_SIZE..],
            );
            address = mem
                .read_16_le(u32::from(apex::SYS_PAGE) + u32::from(apex::syspage::USRMEM))
                .into();
            info!("loading at {:04x}", address);
            first_page = false;
        } else {
            mem.load_slice(address, &page);
            address += apex::PAGE_SIZE as u32;
            loaded_size += apex::PAGE_SIZE;
        }
    }
    info!(
        "loading ended at {:04x}, size {}",
        address.wrapping_sub(1) & 0xffff,
        loaded_size
    );
    Ok(())
}

/// Write the whole address space to `path` (the `--dump` teardown path).
pub fn dump_raw(mem: &Memory, path: &Path) -> Result<(), LoadError> {
    let mut file = File::create(path)?;
    file.write_all(mem.as_slice())?;
    Ok(())
}

/// Fill `page` from the file. Returns false at EOF; a trailing partial
/// page is dropped, matching the page-granular SAV format.
fn read_page(file: &mut File, page: &mut [u8; apex::PAGE_SIZE]) -> Result<bool, LoadError> {
    let mut filled = 0;
    while filled < page.len() {
        let n = file.read(&mut page[filled..])?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(true)
}
