//! GoogleSQL statement separator
//!
//! Splits a script into statements without parsing them: only comments,
//! literals and quoted identifiers are recognized, so that a terminator
//! inside them does not end a statement.
#![warn(missing_docs)]
#![warn(clippy::large_stack_frames)]

pub mod lexer;

pub use lexer::sql::{
    separate_preserving_comments, separate_preserving_comments_string,
    separate_preserving_comments_with_status, separate_stripping_comments,
    separate_stripping_comments_string, strip_comments_from_statement, Delimiter, Error,
    InputStatement, Separator, Statements, Status,
};
pub use lexer::Pos;
