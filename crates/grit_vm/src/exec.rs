use crate::error::{ExecError, LoadError};
use crate::memory::DataMemory;
use crate::opcode::{Instruction, Opcode};
use crate::output::{OutputSink, StdoutSink};
use crate::parser::{parse_instruction, ParseError};
use crate::program::{Cursor, InstructionStore};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Waiting,
    Ready,
    Running,
    Halted,
    Errored,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Waiting => "WAITING",
            Status::Ready => "READY",
            Status::Running => "RUNNING",
            Status::Halted => "HALTED",
            Status::Errored => "ERRORED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Halted | Status::Errored)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first line a load rejected. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub line: usize,
    pub text: String,
    pub error: ParseError,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.error, self.text.trim())
    }
}

pub struct Vm<O: OutputSink = StdoutSink> {
    accumulator: i64,
    status: Status,
    cursor: Cursor,
    memory: DataMemory,
    program: InstructionStore,
    output: O,
    steps: u64,
    load_failure: Option<LoadFailure>,
}

impl Vm<StdoutSink> {
    pub fn new() -> Self {
        Self::with_output(StdoutSink)
    }
}

impl Default for Vm<StdoutSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: OutputSink> Vm<O> {
    pub fn with_output(output: O) -> Self {
        Self {
            accumulator: 0,
            status: Status::Waiting,
            cursor: Cursor::END,
            memory: DataMemory::new(),
            program: InstructionStore::new(),
            output,
            steps: 0,
            load_failure: None,
        }
    }

    // ── lifecycle ───────────────────────────────────────────────

    /// Loads the program at `path` and copies `initial_memory` into data
    /// memory. Only legal from `WAITING`; otherwise the current status is
    /// returned and nothing changes.
    pub fn load(&mut self, path: impl AsRef<Path>, initial_memory: &[i64]) -> Result<Status, LoadError> {
        if self.status != Status::Waiting {
            debug!(status = %self.status, "load ignored: not waiting");
            return Ok(self.status);
        }
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_source(BufReader::new(file), initial_memory)
            .map_err(|e| match e {
                LoadError::Read(source) => LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            })
    }

    /// Same as [`load`](Self::load) for any line source.
    pub fn load_source<R: BufRead>(&mut self, mut reader: R, initial_memory: &[i64]) -> Result<Status, LoadError> {
        if self.status != Status::Waiting {
            debug!(status = %self.status, "load ignored: not waiting");
            return Ok(self.status);
        }

        let mut raw = Vec::new();
        let mut n = 0;
        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => n += 1,
                Err(e) => {
                    self.program.clear();
                    return Err(LoadError::Read(e));
                }
            }
            let bytes = raw.strip_suffix(b"\n").unwrap_or(&raw[..]);
            let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
            let parsed = match std::str::from_utf8(bytes) {
                Ok(line) => {
                    let text = line.trim_start();
                    if text.is_empty() || text.starts_with('#') {
                        continue;
                    }
                    parse_instruction(text)
                }
                Err(_) => Err(ParseError::InvalidEncoding),
            };
            match parsed {
                Ok(ins) => self.program.push_back(ins),
                Err(error) => {
                    warn!(line = n, %error, "unrecognized instruction, load aborted");
                    self.load_failure = Some(LoadFailure {
                        line: n,
                        text: String::from_utf8_lossy(bytes).into_owned(),
                        error,
                    });
                    self.status = Status::Errored;
                    return Ok(self.status);
                }
            }
        }

        self.status = if self.program.is_empty() {
            Status::Waiting
        } else {
            Status::Ready
        };
        self.memory.clear();
        self.memory.extend_from_slice(initial_memory);
        self.cursor = self.program.begin();
        self.steps = 0;
        debug!(
            status = %self.status,
            instructions = self.program.len(),
            memory = self.memory.len(),
            "program loaded"
        );
        Ok(self.status)
    }

    pub fn load_str(&mut self, source: &str, initial_memory: &[i64]) -> Result<Status, LoadError> {
        self.load_source(source.as_bytes(), initial_memory)
    }

    /// Runs from `READY` until the program halts, fails a `CHECKMEM`, or
    /// falls off the end (treated as `HALT`). Any other status is returned
    /// unchanged. A fatal fault leaves the VM `ERRORED` and is returned as
    /// `Err`.
    pub fn run(&mut self) -> Result<Status, ExecError> {
        if self.status != Status::Ready {
            return Ok(self.status);
        }
        self.status = Status::Running;
        debug!(instructions = self.program.len(), "run started");
        while self.status == Status::Running {
            self.step_running()?;
        }
        debug!(status = %self.status, steps = self.steps, acc = self.accumulator, "run finished");
        Ok(self.status)
    }

    /// Executes exactly one instruction. `READY` moves to `RUNNING` first;
    /// statuses other than `READY`/`RUNNING` are returned unchanged.
    pub fn step(&mut self) -> Result<Status, ExecError> {
        match self.status {
            Status::Ready => self.status = Status::Running,
            Status::Running => {}
            other => return Ok(other),
        }
        self.step_running()?;
        Ok(self.status)
    }

    pub fn reset(&mut self) -> Status {
        self.accumulator = 0;
        self.memory.clear();
        self.program.clear();
        self.cursor = Cursor::END;
        self.steps = 0;
        self.load_failure = None;
        self.status = Status::Waiting;
        debug!("reset");
        self.status
    }

    // ── introspection ───────────────────────────────────────────

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn accumulator(&self) -> i64 {
        self.accumulator
    }

    pub fn memory(&self) -> &DataMemory {
        &self.memory
    }

    /// Copy of data memory.
    pub fn memory_snapshot(&self) -> Vec<i64> {
        self.memory.to_vec()
    }

    pub fn program(&self) -> &InstructionStore {
        &self.program
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Instructions executed since the last load.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn load_failure(&self) -> Option<&LoadFailure> {
        self.load_failure.as_ref()
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }

    // ── execution ───────────────────────────────────────────────

    fn step_running(&mut self) -> Result<(), ExecError> {
        let fetched = self
            .cursor
            .index()
            .zip(self.program.get(self.cursor).copied());
        let Some((index, ins)) = fetched else {
            self.status = Status::Halted;
            return Ok(());
        };

        trace!(index, instruction = %ins, acc = self.accumulator, "exec");
        if let Err(e) = self.execute(index, ins) {
            warn!(error = %e, "fatal fault");
            self.status = Status::Errored;
            return Err(e);
        }
        self.steps += 1;

        if self.status == Status::Running && self.cursor.is_end() {
            self.status = Status::Halted;
        }
        Ok(())
    }

    fn execute(&mut self, index: usize, ins: Instruction) -> Result<(), ExecError> {
        let arg = ins.arg;
        let mut next = self.program.next(self.cursor);

        match ins.op {
            Opcode::Clear => self.accumulator = 0,
            Opcode::At => self.accumulator = self.read(ins, index)?,
            Opcode::Set => {
                let len = self.memory.len();
                let cell = usize::try_from(arg)
                    .ok()
                    .and_then(|a| self.memory.get_mut(a))
                    .ok_or_else(|| out_of_range(ins, len, index))?;
                *cell = self.accumulator;
            }
            Opcode::Insert => {
                let len = self.memory.len();
                let addr = usize::try_from(arg)
                    .map_err(|_| out_of_range(ins, len, index))?;
                self.memory
                    .insert(addr, self.accumulator)
                    .map_err(|_| out_of_range(ins, len, index))?;
            }
            Opcode::Erase => {
                let addr = self.address(ins, index)?;
                let len = self.memory.len();
                self.memory
                    .erase(addr)
                    .map_err(|_| out_of_range(ins, len, index))?;
            }
            Opcode::AddConst => self.accumulator = self.accumulator.saturating_add(arg),
            Opcode::SubConst => self.accumulator = self.accumulator.saturating_sub(arg),
            Opcode::MulConst => self.accumulator = self.accumulator.saturating_mul(arg),
            Opcode::DivConst => self.accumulator = divide(self.accumulator, arg, ins.op, index)?,
            Opcode::AddMem => self.accumulator = self.accumulator.saturating_add(self.read(ins, index)?),
            Opcode::SubMem => self.accumulator = self.accumulator.saturating_sub(self.read(ins, index)?),
            Opcode::MulMem => self.accumulator = self.accumulator.saturating_mul(self.read(ins, index)?),
            Opcode::DivMem => {
                let divisor = self.read(ins, index)?;
                self.accumulator = divide(self.accumulator, divisor, ins.op, index)?;
            }
            Opcode::JumpRel | Opcode::JumpZero | Opcode::JumpNZero => {
                if arg == 0 {
                    return Err(ExecError::InvalidJump { index });
                }
                let taken = match ins.op {
                    Opcode::JumpRel => true,
                    Opcode::JumpZero => self.accumulator == 0,
                    _ => self.accumulator != 0,
                };
                if taken {
                    next = self.program.advance(self.cursor, arg);
                }
            }
            Opcode::Noop => {}
            Opcode::Halt => self.status = Status::Halted,
            Opcode::Output => self.output.emit(self.accumulator),
            Opcode::CheckMem => {
                let len = i64::try_from(self.memory.len()).unwrap_or(i64::MAX);
                if len < arg {
                    debug!(index, len, required = arg, "CHECKMEM failed");
                    self.status = Status::Errored;
                }
            }
        }

        self.cursor = next;
        Ok(())
    }

    fn address(&self, ins: Instruction, index: usize) -> Result<usize, ExecError> {
        let len = self.memory.len();
        usize::try_from(ins.arg)
            .ok()
            .filter(|&a| a < len)
            .ok_or_else(|| out_of_range(ins, len, index))
    }

    fn read(&self, ins: Instruction, index: usize) -> Result<i64, ExecError> {
        let addr = self.address(ins, index)?;
        Ok(self.memory[addr])
    }
}

fn out_of_range(ins: Instruction, len: usize, index: usize) -> ExecError {
    ExecError::AddressOutOfRange {
        op: ins.op,
        address: ins.arg,
        len,
        index,
    }
}

fn divide(a: i64, b: i64, op: Opcode, index: usize) -> Result<i64, ExecError> {
    if b == 0 {
        return Err(ExecError::DivisionByZero { op, index });
    }
    Ok(a.saturating_div(b))
}
