//! Forward-only cursor over the input text.

use log::debug;

use std::fmt;

/// Position in the input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    /// line number (1-based)
    pub line: u64,
    /// column number (1-based, char offset)
    pub column: usize,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line: {}, column: {}", self.line, self.column)
    }
}

/// Steps through an immutable input, one explicit amount at a time.
///
/// The offset only moves forward and always stays on a char boundary:
/// callers advance by whole chars or by lengths of ASCII markers they
/// have matched.
pub struct Scanner<'input> {
    /// The whole input
    input: &'input str,
    /// byte offset of the next unconsumed char
    offset: usize,
    /// current line number
    line: u64,
    /// current column number (char offset, not byte offset)
    column: usize,
}

impl<'input> Scanner<'input> {
    /// Cursor at the start of `input`
    pub fn new(input: &'input str) -> Scanner<'input> {
        Scanner {
            input,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Current position
    pub fn pos(&self) -> Pos {
        Pos {
            line: self.line,
            column: self.column,
        }
    }

    /// Unconsumed input
    pub fn rest(&self) -> &'input str {
        &self.input[self.offset..]
    }

    /// Whether the whole input has been consumed
    pub fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Next char, without consuming it
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Whether the unconsumed input starts with `prefix`
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Consume `amt` bytes and return them.
    ///
    /// `amt` must end on a char boundary.
    pub fn consume(&mut self, amt: usize) -> &'input str {
        debug!(target: "scanner", "consume({})", amt);
        let rest = self.rest();
        debug_assert!(amt <= rest.len());
        debug_assert!(rest.is_char_boundary(amt));
        let consumed = &rest[..amt];
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset += amt;
        consumed
    }

    /// Consume the next char, if any.
    pub fn consume_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.consume(c.len_utf8());
        Some(c)
    }

    /// Consume everything left.
    pub fn consume_all(&mut self) -> &'input str {
        let amt = self.input.len() - self.offset;
        self.consume(amt)
    }
}

impl fmt::Debug for Scanner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scanner")
            .field("rest", &self.rest())
            .field("line", &self.line)
            .field("column", &self.column)
            .finish()
    }
}
