use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    Clear,
    At,
    Set,
    Insert,
    Erase,
    AddConst,
    SubConst,
    MulConst,
    DivConst,
    AddMem,
    SubMem,
    MulMem,
    DivMem,
    JumpRel,
    JumpZero,
    JumpNZero,
    Noop,
    Halt,
    Output,
    CheckMem,
}

impl Opcode {
    pub const ALL: [Opcode; 20] = [
        Opcode::Clear,
        Opcode::At,
        Opcode::Set,
        Opcode::Insert,
        Opcode::Erase,
        Opcode::AddConst,
        Opcode::SubConst,
        Opcode::MulConst,
        Opcode::DivConst,
        Opcode::AddMem,
        Opcode::SubMem,
        Opcode::MulMem,
        Opcode::DivMem,
        Opcode::JumpRel,
        Opcode::JumpZero,
        Opcode::JumpNZero,
        Opcode::Noop,
        Opcode::Halt,
        Opcode::Output,
        Opcode::CheckMem,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Clear => "CLEAR",
            Opcode::At => "AT",
            Opcode::Set => "SET",
            Opcode::Insert => "INSERT",
            Opcode::Erase => "ERASE",
            Opcode::AddConst => "ADDCONST",
            Opcode::SubConst => "SUBCONST",
            Opcode::MulConst => "MULCONST",
            Opcode::DivConst => "DIVCONST",
            Opcode::AddMem => "ADDMEM",
            Opcode::SubMem => "SUBMEM",
            Opcode::MulMem => "MULMEM",
            Opcode::DivMem => "DIVMEM",
            Opcode::JumpRel => "JUMPREL",
            Opcode::JumpZero => "JUMPZERO",
            Opcode::JumpNZero => "JUMPNZERO",
            Opcode::Noop => "NOOP",
            Opcode::Halt => "HALT",
            Opcode::Output => "OUTPUT",
            Opcode::CheckMem => "CHECKMEM",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == s)
    }

    /// Whether the opcode reads its integer argument.
    pub fn takes_argument(self) -> bool {
        !matches!(
            self,
            Opcode::Clear | Opcode::Noop | Opcode::Halt | Opcode::Output
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One line of program text. Opcodes without an operand carry `arg == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub op: Opcode,
    pub arg: i64,
}

impl Instruction {
    pub fn new(op: Opcode, arg: i64) -> Self {
        Self { op, arg }
    }

    pub fn bare(op: Opcode) -> Self {
        Self { op, arg: 0 }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op.takes_argument() {
            write!(f, "{} {}", self.op, self.arg)
        } else {
            write!(f, "{}", self.op)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonic_lookup_covers_every_opcode() {
        for op in Opcode::ALL {
            assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
        }
        assert_eq!(Opcode::from_mnemonic("addconst"), None);
        assert_eq!(Opcode::from_mnemonic("FOO"), None);
    }

    #[test]
    fn display_omits_unused_argument() {
        assert_eq!(Instruction::new(Opcode::AddConst, -4).to_string(), "ADDCONST -4");
        assert_eq!(Instruction::bare(Opcode::Halt).to_string(), "HALT");
    }
}
