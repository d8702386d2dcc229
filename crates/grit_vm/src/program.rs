//! Program memory: an ordered store of instructions and the cursor used as
//! the program counter.
//!
//! A cursor is either on an element or at the end-of-sequence position.
//! Motion that runs off either end lands on the end position, which the
//! engine treats as program termination.

use crate::cid::program_cid;
use crate::error::StoreError;
use crate::opcode::Instruction;
use std::collections::VecDeque;
use tracing::warn;

/// Position handle into an [`InstructionStore`]. `None` is end-of-sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor(Option<usize>);

impl Cursor {
    pub const END: Cursor = Cursor(None);

    pub fn is_end(self) -> bool {
        self.0.is_none()
    }

    /// Element index, `None` at end.
    pub fn index(self) -> Option<usize> {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionStore {
    items: VecDeque<Instruction>,
}

impl InstructionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push_front(&mut self, ins: Instruction) {
        self.items.push_front(ins);
    }

    pub fn push_back(&mut self, ins: Instruction) {
        self.items.push_back(ins);
    }

    pub fn front(&self) -> Result<&Instruction, StoreError> {
        self.items.front().ok_or(StoreError::Empty)
    }

    pub fn back(&self) -> Result<&Instruction, StoreError> {
        self.items.back().ok_or(StoreError::Empty)
    }

    pub fn pop_front(&mut self) {
        if self.items.pop_front().is_none() {
            warn!("pop_front on empty instruction store");
        }
    }

    pub fn pop_back(&mut self) {
        if self.items.pop_back().is_none() {
            warn!("pop_back on empty instruction store");
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, Instruction> {
        self.items.iter()
    }

    pub fn begin(&self) -> Cursor {
        self.cursor_at(0)
    }

    pub fn end(&self) -> Cursor {
        Cursor::END
    }

    /// Cursor on element `index`, or end if out of range.
    pub fn cursor_at(&self, index: usize) -> Cursor {
        if index < self.items.len() {
            Cursor(Some(index))
        } else {
            Cursor::END
        }
    }

    /// Position of `cursor` in this store, `None` at end.
    pub fn index_of(&self, cursor: Cursor) -> Option<usize> {
        cursor.0.filter(|&i| i < self.items.len())
    }

    pub fn get(&self, cursor: Cursor) -> Option<&Instruction> {
        cursor.0.and_then(|i| self.items.get(i))
    }

    pub fn next(&self, cursor: Cursor) -> Cursor {
        match cursor.0 {
            Some(i) => self.cursor_at(i + 1),
            None => Cursor::END,
        }
    }

    pub fn prev(&self, cursor: Cursor) -> Cursor {
        match cursor.0 {
            Some(0) => Cursor::END,
            Some(i) => self.cursor_at(i - 1),
            None => match self.items.len() {
                0 => Cursor::END,
                n => Cursor(Some(n - 1)),
            },
        }
    }

    /// Moves `cursor` by `n` positions, the same as `|n|` calls to
    /// [`next`](Self::next) or [`prev`](Self::prev) that stop as soon as the
    /// motion runs off either end.
    pub fn advance(&self, cursor: Cursor, n: i64) -> Cursor {
        let len = self.items.len() as i128;
        let from = match cursor.0 {
            Some(i) => i as i128,
            None if n > 0 => return Cursor::END,
            None => len,
        };
        let target = from + n as i128;
        if (0..len).contains(&target) {
            Cursor(Some(target as usize))
        } else {
            Cursor::END
        }
    }

    /// Content id of the loaded listing, see [`program_cid`].
    pub fn cid(&self) -> String {
        program_cid(&self.items)
    }
}

impl<'a> IntoIterator for &'a InstructionStore {
    type Item = &'a Instruction;
    type IntoIter = std::collections::vec_deque::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Instruction> for InstructionStore {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
