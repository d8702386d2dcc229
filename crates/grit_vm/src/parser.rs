//! Line parser: `MNEMONIC [argument]` -> [`Instruction`].
//!
//! The loader skips blank and `#` lines before calling in, so every input
//! here is expected to be an instruction. A failure is returned as a value;
//! the loader treats any [`ParseError`] as an unrecognized line.

use crate::opcode::{Instruction, Opcode};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty instruction")]
    Empty,
    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),
    #[error("{0} requires an integer argument")]
    MissingArgument(Opcode),
    #[error("{0} takes no argument")]
    UnexpectedArgument(Opcode),
    #[error("{op}: '{text}' is not a valid integer")]
    InvalidArgument { op: Opcode, text: String },
    #[error("{0}: unexpected trailing tokens")]
    TrailingTokens(Opcode),
    /// Raised by the loader for a line that is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

pub fn parse_instruction(line: &str) -> Result<Instruction, ParseError> {
    let mut tokens = line.split_ascii_whitespace();
    let mnemonic = tokens.next().ok_or(ParseError::Empty)?;
    let op = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| ParseError::UnknownMnemonic(mnemonic.to_string()))?;

    let arg = match (op.takes_argument(), tokens.next()) {
        (true, None) => return Err(ParseError::MissingArgument(op)),
        (true, Some(text)) => text.parse::<i64>().map_err(|_| ParseError::InvalidArgument {
            op,
            text: text.to_string(),
        })?,
        (false, None) => 0,
        (false, Some(_)) => return Err(ParseError::UnexpectedArgument(op)),
    };

    if tokens.next().is_some() {
        return Err(ParseError::TrailingTokens(op));
    }
    Ok(Instruction::new(op, arg))
}
