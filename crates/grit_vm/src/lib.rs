//! GritVM - accumulator VM for line-oriented `.gvm` programs
//!
//! Goals:
//! - One accumulator register, one growable data memory
//! - Program memory addressed by a cursor with relative jumps
//! - Explicit lifecycle: WAITING -> READY -> RUNNING -> HALTED | ERRORED
//! - Parse failures are values, run-time faults are `ExecError`

pub mod cid;
pub mod dump;
pub mod error;
pub mod exec;
pub mod memory;
pub mod opcode;
pub mod output;
pub mod parser;
pub mod program;

pub use dump::VmSnapshot;
pub use error::{ExecError, LoadError, StoreError};
pub use exec::{LoadFailure, Status, Vm};
pub use memory::DataMemory;
pub use opcode::{Instruction, Opcode};
pub use output::{OutputSink, StdoutSink};
pub use parser::{parse_instruction, ParseError};
pub use program::{Cursor, InstructionStore};
