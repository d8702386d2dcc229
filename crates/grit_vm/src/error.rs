use crate::opcode::Opcode;
use std::path::PathBuf;
use thiserror::Error;

/// Hard failure while loading a program. Unrecognized lines are not errors,
/// they surface as `Status::Errored`.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("{} could not be opened: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("program source could not be read: {0}")]
    Read(#[from] std::io::Error),
}

/// Fatal run-time fault. `index` is the position of the faulting instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("invalid jump at instruction {index}: argument cannot be 0")]
    InvalidJump { index: usize },
    #[error("{op} at instruction {index}: address {address} outside memory of length {len}")]
    AddressOutOfRange {
        op: Opcode,
        address: i64,
        len: usize,
        index: usize,
    },
    #[error("{op} at instruction {index}: division by zero")]
    DivisionByZero { op: Opcode, index: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("collection is empty")]
    Empty,
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },
}
