use crate::{Shift, Symbol};
use std::fmt;
use util::ParseEnumError;

/// Set of symbols accepted by a [`ReadPattern::AnyOf`](enum.ReadPattern.html#variant.AnyOf) rule.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SymbolSet(u8);

impl SymbolSet {
    pub const EMPTY: SymbolSet = SymbolSet(0);
    /// `0` or `1`.
    pub const BITS: SymbolSet = SymbolSet(0b011);
    /// `0` or blank.
    pub const ZERO_OR_BLANK: SymbolSet = SymbolSet(0b101);
    /// `1` or blank.
    pub const ONE_OR_BLANK: SymbolSet = SymbolSet(0b110);

    pub fn with(self, symbol: Symbol) -> SymbolSet {
        SymbolSet(self.0 | symbol.bit())
    }

    pub fn contains(self, symbol: Symbol) -> bool {
        self.0 & symbol.bit() != 0
    }

    fn symbols(self) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        for &s in &[Symbol::Zero, Symbol::One, Symbol::Blank] {
            if self.contains(s) {
                symbols.push(s);
            }
        }
        symbols
    }
}

/// Per-tape read rule of a transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReadPattern {
    /// Matches any symbol; serialized as `.`.
    Any,
    Only(Symbol),
    /// Matches a class of symbols; serialized as `[..]`.
    AnyOf(SymbolSet),
}

impl ReadPattern {
    pub fn matches(self, symbol: Symbol) -> bool {
        match self {
            ReadPattern::Any => true,
            ReadPattern::Only(s) => s == symbol,
            ReadPattern::AnyOf(set) => set.contains(symbol),
        }
    }
}

impl fmt::Display for ReadPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ReadPattern::Any => write!(f, "."),
            ReadPattern::Only(s) => write!(f, "{}", s),
            ReadPattern::AnyOf(set) => {
                write!(f, "[")?;
                for s in set.symbols() {
                    write!(f, "{}", s)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Per-tape write rule of a transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WriteRule {
    /// Leave the cell as read; serialized as `.`.
    Keep,
    Put(Symbol),
}

impl WriteRule {
    pub fn apply(self, read: Symbol) -> Symbol {
        match self {
            WriteRule::Keep => read,
            WriteRule::Put(s) => s,
        }
    }
}

impl fmt::Display for WriteRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            WriteRule::Keep => write!(f, "."),
            WriteRule::Put(s) => write!(f, "{}", s),
        }
    }
}

/// One transition: read rules over all tapes, target state, write rules and
/// head shifts over all tapes. The `read`, `write` and `shifts` vectors all
/// have one entry per tape.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub from: usize,
    pub read: Vec<ReadPattern>,
    pub to: usize,
    pub write: Vec<WriteRule>,
    pub shifts: Vec<Shift>,
}

impl Transition {
    pub fn new(
        from: usize,
        read: Vec<ReadPattern>,
        to: usize,
        write: Vec<WriteRule>,
        shifts: Vec<Shift>,
    ) -> Transition {
        Transition {
            from,
            read,
            to,
            write,
            shifts,
        }
    }

    pub fn matches(&self, symbols: &[Symbol]) -> bool {
        self.read
            .iter()
            .zip(symbols.iter())
            .all(|(pattern, symbol)| pattern.matches(*symbol))
    }

    pub fn read_string(&self) -> String {
        self.read.iter().map(ToString::to_string).collect()
    }

    pub fn write_string(&self) -> String {
        self.write.iter().map(ToString::to_string).collect()
    }
}

/// Parse a serialized read rule string such as `.[01]_.` back into patterns.
pub fn read_patterns_from_str(s: &str) -> Result<Vec<ReadPattern>, ParseEnumError> {
    let mut patterns = Vec::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '.' => patterns.push(ReadPattern::Any),
            '[' => {
                let mut set = SymbolSet::EMPTY;
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(inner) => match Symbol::from_char(inner) {
                            Some(symbol) => set = set.with(symbol),
                            None => return Err(ParseEnumError::new(s, "ReadPattern")),
                        },
                        None => return Err(ParseEnumError::new(s, "ReadPattern")),
                    }
                }
                patterns.push(ReadPattern::AnyOf(set));
            }
            _ => match Symbol::from_char(c) {
                Some(symbol) => patterns.push(ReadPattern::Only(symbol)),
                None => return Err(ParseEnumError::new(s, "ReadPattern")),
            },
        }
    }
    Ok(patterns)
}

/// Parse a serialized write rule string such as `..0.` back into rules.
pub fn write_rules_from_str(s: &str) -> Result<Vec<WriteRule>, ParseEnumError> {
    s.chars()
        .map(|c| match c {
            '.' => Ok(WriteRule::Keep),
            _ => Symbol::from_char(c)
                .map(WriteRule::Put)
                .ok_or_else(|| ParseEnumError::new(s, "WriteRule")),
        })
        .collect()
}
