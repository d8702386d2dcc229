//! Debug views of a VM: a plain-text report and a serializable snapshot.

use crate::exec::{Status, Vm};
use crate::opcode::Instruction;
use crate::output::OutputSink;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmSnapshot {
    pub status: Status,
    pub accumulator: i64,
    /// Index of the next instruction, `None` at end of program.
    pub cursor: Option<usize>,
    pub steps: u64,
    pub memory: Vec<i64>,
    pub program: Vec<Instruction>,
    pub program_cid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_failure: Option<String>,
}

impl<O: OutputSink> Vm<O> {
    pub fn dump(&self, include_memory: bool, include_program: bool) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "****** Output Dump ******");
        let _ = writeln!(out, "Status: {}", self.status());
        let _ = writeln!(out, "Accumulator: {}", self.accumulator());
        if let Some(failure) = self.load_failure() {
            let _ = writeln!(out, "Load failure: {failure}");
        }
        if include_memory {
            let _ = writeln!(out, "*** Data Memory ***");
            for (i, v) in self.memory().iter().enumerate() {
                let _ = writeln!(out, "Location {i}: {v}");
            }
        }
        if include_program {
            let _ = writeln!(out, "*** Instruction Memory ***");
            let current = self.cursor().index();
            for (i, ins) in self.program().iter().enumerate() {
                let marker = if current == Some(i) { " <" } else { "" };
                let _ = writeln!(out, "Instruction {i}: {ins}{marker}");
            }
        }
        out
    }

    pub fn snapshot(&self) -> VmSnapshot {
        VmSnapshot {
            status: self.status(),
            accumulator: self.accumulator(),
            cursor: self.cursor().index(),
            steps: self.steps(),
            memory: self.memory_snapshot(),
            program: self.program().iter().copied().collect(),
            program_cid: self.program().cid(),
            load_failure: self.load_failure().map(|f| f.to_string()),
        }
    }
}
