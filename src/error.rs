use std::{io, path::PathBuf};

use crate::memory::TypeAddr;

/// Failure to place a program in memory. Memory is left untouched in every case.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read program {}: {source}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not read program: {0}")]
    Read(#[from] io::Error),

    /// `size` is a lower bound when the program came from an unsized reader.
    #[error("program is {size} bytes, the program region holds {max} bytes")]
    TooLarge { size: usize, max: usize },
}

/// Something odd happened during a cycle. Not fatal: the cycle still completed.
///
/// `addr` is always the address of the instruction that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Anomaly {
    #[error("unknown opcode {opcode:#06X} at {addr:#05X}")]
    UnknownOpcode { opcode: u16, addr: TypeAddr },

    #[error("call at {addr:#05X} with a full call stack")]
    StackOverflow { addr: TypeAddr },

    #[error("return at {addr:#05X} with an empty call stack")]
    StackUnderflow { addr: TypeAddr },
}
