//! Program content ids.
//!
//! The id is taken over the canonical listing (one `Instruction` display per
//! line), so sources that differ only in comments, blank lines, spacing or a
//! leading `+` on operands share an id.

use crate::opcode::Instruction;
use blake3::Hasher;
use std::fmt::Write;

pub const CID_PREFIX: &str = "b3:";

/// `b3:<64 hex>` over the listing of `program`.
pub fn program_cid<'a, I>(program: I) -> String
where
    I: IntoIterator<Item = &'a Instruction>,
{
    let mut hasher = Hasher::new();
    let mut line = String::new();
    for ins in program {
        line.clear();
        // Writing to a String cannot fail.
        let _ = writeln!(line, "{ins}");
        hasher.update(line.as_bytes());
    }
    format!("{CID_PREFIX}{}", hex::encode(hasher.finalize().as_bytes()))
}
