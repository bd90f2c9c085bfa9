use std::{
    fs::File,
    io::Read,
    path::Path,
};

use crate::{
    decode::RawInstruction,
    error::LoadError,
    registers::{IndexRegister, ProgramCounter},
};

pub type TypeAddr = u16; // in reality u12
type FontBytes = [u8; 5 * 16];

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const PROGRAM_CAPACITY: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_SIZE: usize = 16;
pub const GLYPH_SIZE: u16 = 5;

const ADDR_MASK: usize = MEMORY_SIZE - 1;

pub const FONT: FontBytes = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// The 4 KiB address space plus the registers that point into it.
///
/// Font glyphs live at 000 -> 04F, programs from 200 up. Every access is taken modulo
/// the memory size, so no program can index outside it.
#[derive(Debug, Clone)]
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub stack: Stack,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        bytes[..FONT.len()].copy_from_slice(&FONT);
        Self {
            bytes,
            pc: ProgramCounter::default(),
            index: IndexRegister::default(),
            stack: Stack::new(),
        }
    }

    pub fn set(&mut self, addr: TypeAddr, val: u8) {
        self.bytes[addr as usize & ADDR_MASK] = val;
    }

    pub fn get(&self, addr: TypeAddr) -> u8 {
        self.bytes[addr as usize & ADDR_MASK]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Reads the big-endian instruction word under pc. Does not move pc.
    pub fn fetch(&self) -> u16 {
        let pc = self.pc.0;
        RawInstruction::from_bytes(self.get(pc), self.get(pc.wrapping_add(1))).code()
    }

    /// `count` bytes starting at I, wrapping at the end of memory.
    pub fn slice_from_index(&self, count: u8) -> Vec<u8> {
        (0..count as u16).map(|i| self.get(self.index.offset(i))).collect()
    }

    /// Copies a program verbatim to 0x200. Bytes past its end keep whatever they held.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        if bytes.len() > PROGRAM_CAPACITY {
            return Err(LoadError::TooLarge {
                size: bytes.len(),
                max: PROGRAM_CAPACITY,
            });
        }

        let start_index = PROGRAM_START as usize;
        self.bytes[start_index..start_index + bytes.len()].copy_from_slice(bytes);
        log::debug!("loaded {} byte program at {:#05X}", bytes.len(), PROGRAM_START);
        Ok(())
    }

    pub fn load_rom_from(&mut self, reader: impl Read) -> Result<(), LoadError> {
        let program = read_bounded(reader)?;
        self.load_rom(&program)
    }

    pub fn load_rom_by_file(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let path = path.as_ref();
        let not_found = |source| LoadError::NotFound {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(not_found)?;
        // only regular files have a meaningful length; anything else is read and judged
        let metadata = file.metadata().map_err(not_found)?;
        if metadata.is_file() && metadata.len() as usize > PROGRAM_CAPACITY {
            return Err(LoadError::TooLarge {
                size: metadata.len() as usize,
                max: PROGRAM_CAPACITY,
            });
        }

        let program = read_bounded(file).map_err(|e| match e {
            LoadError::Read(source) => not_found(source),
            other => other,
        })?;
        self.load_rom(&program)
    }
}

// Reads one byte past the capacity so oversized sources are caught without slurping them.
fn read_bounded(reader: impl Read) -> Result<Vec<u8>, LoadError> {
    let mut program = Vec::new();
    reader
        .take(PROGRAM_CAPACITY as u64 + 1)
        .read_to_end(&mut program)
        .map_err(LoadError::Read)?;
    Ok(program)
}

/// Return addresses for subroutine calls: 16 fixed slots and a stack pointer.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    addresses: [TypeAddr; STACK_SIZE],
    sp: usize,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores then bumps sp. Returns false, changing nothing, when all slots are taken.
    pub fn push(&mut self, addr: TypeAddr) -> bool {
        match self.addresses.get_mut(self.sp) {
            Some(slot) => {
                *slot = addr;
                self.sp += 1;
                true
            }
            None => false,
        }
    }

    pub fn pop(&mut self) -> Option<TypeAddr> {
        self.sp = self.sp.checked_sub(1)?;
        Some(self.addresses[self.sp])
    }

    pub fn sp(&self) -> usize {
        self.sp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn starts_with_font_and_nothing_else() {
        let mem = Memory::new();
        assert_eq!(&mem.as_slice()[..80], &FONT[..]);
        assert!(mem.as_slice()[80..].iter().all(|&b| b == 0));
        assert_eq!(mem.pc.0, 0x200);
        assert_eq!(mem.index.0, 0);
        assert_eq!(mem.stack.sp(), 0);
    }

    #[test]
    fn program_of_exact_capacity_fits() {
        let mut mem = Memory::new();
        let program = vec![0xAB; PROGRAM_CAPACITY];
        mem.load_rom(&program).unwrap();
        assert_eq!(&mem.as_slice()[0x200..], &program[..]);
    }

    #[test]
    fn oversized_program_leaves_memory_untouched() {
        let mut mem = Memory::new();
        let err = mem.load_rom(&vec![0xAB; PROGRAM_CAPACITY + 1]).unwrap_err();
        assert!(matches!(err, LoadError::TooLarge { size: 3585, max: 3584 }));
        assert!(mem.as_slice()[80..].iter().all(|&b| b == 0));

        let err = mem
            .load_rom_from(Cursor::new(vec![1u8; PROGRAM_CAPACITY + 50]))
            .unwrap_err();
        assert!(matches!(err, LoadError::TooLarge { .. }));
        assert!(mem.as_slice()[80..].iter().all(|&b| b == 0));
    }

    #[test]
    fn shorter_reload_keeps_tail() {
        let mut mem = Memory::new();
        mem.load_rom(&[1, 2, 3, 4]).unwrap();
        mem.load_rom_from(&[9u8, 9][..]).unwrap();
        assert_eq!(&mem.as_slice()[0x200..0x205], &[9, 9, 3, 4, 0]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let mut mem = Memory::new();
        let err = mem
            .load_rom_by_file("/definitely/not/a/real/program.ch8")
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(mem.as_slice()[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn directory_is_not_found() {
        let mut mem = Memory::new();
        let dir = std::env::temp_dir();
        let err = mem.load_rom_by_file(&dir).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { ref path, .. } if *path == dir));
        assert!(mem.as_slice()[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn fetch_is_big_endian_and_wraps() {
        let mut mem = Memory::new();
        mem.load_rom(&[0x12, 0x34]).unwrap();
        assert_eq!(mem.fetch(), 0x1234);

        mem.set(0xFFF, 0xAA);
        mem.pc.set_addr(0xFFF);
        assert_eq!(mem.fetch(), 0xAAF0);
    }

    #[test]
    fn stack_bounds() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.sp(), 0);
        for i in 0..STACK_SIZE as u16 {
            assert!(stack.push(0x200 + i * 2));
        }
        assert!(!stack.push(0x400));
        assert_eq!(stack.sp(), 16);
        assert_eq!(stack.pop(), Some(0x21E));
        assert_eq!(stack.sp(), 15);
    }
}
