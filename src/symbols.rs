use num_derive::{FromPrimitive, ToPrimitive};
use std::fmt;
use util::ParseEnumError;

/// One cell of a tape.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Symbol {
    Zero,
    One,
    Blank,
}

impl Symbol {
    pub fn as_char(self) -> char {
        match self {
            Symbol::Zero => '0',
            Symbol::One => '1',
            Symbol::Blank => '_',
        }
    }

    pub fn from_char(c: char) -> Option<Symbol> {
        match c {
            '0' => Some(Symbol::Zero),
            '1' => Some(Symbol::One),
            '_' => Some(Symbol::Blank),
            _ => None,
        }
    }

    pub(crate) fn bit(self) -> u8 {
        match self {
            Symbol::Zero => 0b001,
            Symbol::One => 0b010,
            Symbol::Blank => 0b100,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Parse a cell string such as `01_1` into symbols.
pub fn parse_cells(cells: &str) -> Result<Vec<Symbol>, ParseEnumError> {
    cells
        .chars()
        .map(|c| Symbol::from_char(c).ok_or_else(|| ParseEnumError::new(&c.to_string(), "Symbol")))
        .collect()
}

/// Head movement of a single tape within one step.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum Shift {
    Left = -1,
    Hold = 0,
    Right = 1,
}
