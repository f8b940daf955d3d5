use crate::parser::Rule;
use pest::error::Error as PestError;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A `/* ... */` comment with no closing `*/`.
    UnterminatedComment { line: usize },
    /// The source failed the syntactic pre-check.
    Precheck(String),
    /// An identifier that is neither a declared name nor part of the
    /// library vocabulary.
    UnknownToken { name: String },
    /// Unmatched parenthesis or bracket inside an expression.
    UnbalancedExpression { statement: String },
    /// An assembly line that matches no known instruction shape.
    BadAssembly { line: usize, message: String },
    /// An assembly line the grammar could not parse at all.
    Parse {
        line: usize,
        source: Box<PestError<Rule>>,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnterminatedComment { line } => {
                write!(f, "Block comment starting on line {} is never closed", line)
            }
            Error::Precheck(message) => write!(f, "Invalid source: {}", message),
            Error::UnknownToken { name } => write!(f, "Unknown identifier `{}`", name),
            Error::UnbalancedExpression { statement } => {
                write!(f, "Unbalanced expression: {}", statement)
            }
            Error::BadAssembly { line, message } => {
                write!(f, "Bad assembly on line {}: {}", line, message)
            }
            Error::Parse { line, source } => {
                write!(f, "Unparsable assembly on line {}:\n{}", line, source)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
