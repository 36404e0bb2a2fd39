use std::error;
use std::fmt;

use super::Delimiter;
use crate::lexer::scan::Pos;

/// Separator errors
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A custom terminator must not be empty
    EmptyTerminator,
    /// Missing quote or double-quote or backtick
    UnterminatedLiteral(Delimiter, Option<Pos>),
    /// Missing `*/`
    UnterminatedBlockComment(Option<Pos>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTerminator => f.write_str("empty terminator"),
            Self::UnterminatedLiteral(delim, Some(pos)) => {
                write!(f, "non-terminated literal (missing {delim}) at {pos}")
            }
            Self::UnterminatedLiteral(delim, None) => {
                write!(f, "non-terminated literal (missing {delim})")
            }
            Self::UnterminatedBlockComment(Some(pos)) => {
                write!(f, "non-terminated block comment at {pos}")
            }
            Self::UnterminatedBlockComment(None) => f.write_str("non-terminated block comment"),
        }
    }
}

impl error::Error for Error {}
