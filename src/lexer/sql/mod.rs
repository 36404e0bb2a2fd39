//! Statement separator for [GoogleSQL](https://cloud.google.com/spanner/docs/reference/standard-sql/lexical)
//!
//! Only the lexical structures which may hide a terminator are recognized:
//! comments, string and bytes literals (with optional `r`/`b` prefixes,
//! single or triple quoted) and quoted identifiers.
//! Everything else is copied through verbatim, statements are not validated.
use bitflags::bitflags;
use indexmap::IndexSet;
use log::{debug, warn};
use memchr::{memchr, memmem};

use std::fmt;
use std::iter::FusedIterator;

use crate::lexer::scan::{Pos, Scanner};

mod error;

pub use error::Error;

/// Built-in terminator, always recognized
pub const SEMICOLON: &str = ";";

/// A statement and the terminator which ended it
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct InputStatement {
    /// Statement text, without surrounding whitespace
    pub statement: String,
    /// Terminator, empty when input ended before any terminator
    pub terminator: String,
}

impl InputStatement {
    /// Whether the statement has been ended by a terminator
    pub fn is_terminated(&self) -> bool {
        !self.terminator.is_empty()
    }

    /// Remove comments from the statement text, each one is replaced by a
    /// single space. The terminator is kept.
    ///
    /// The statement text is expected to hold a single statement, as produced
    /// by [`separate_preserving_comments`]. A statement made only of comments
    /// becomes empty.
    pub fn strip_comments(&self) -> InputStatement {
        let statement = Separator::new()
            .statements(&self.statement)
            .next()
            .map(|stmt| stmt.statement)
            .unwrap_or_default();
        InputStatement {
            statement,
            terminator: self.terminator.clone(),
        }
    }
}

impl fmt::Display for InputStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.statement, self.terminator)
    }
}

/// Closing marker of a comment, a literal or a quoted identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// end of `#` or `--` comment
    Newline,
    /// `*/`
    BlockCommentEnd,
    /// `'`
    SingleQuote,
    /// `"`
    DoubleQuote,
    /// `'''`
    TripleSingleQuote,
    /// `"""`
    TripleDoubleQuote,
    /// `` ` ``
    Backtick,
}

impl Delimiter {
    /// Marker text
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newline => "\n",
            Self::BlockCommentEnd => "*/",
            Self::SingleQuote => "'",
            Self::DoubleQuote => "\"",
            Self::TripleSingleQuote => "'''",
            Self::TripleDoubleQuote => "\"\"\"",
            Self::Backtick => "`",
        }
    }

    /// Delimiter of the string literal starting at `data[0]`
    fn string(data: &[u8]) -> Delimiter {
        let triple = data.len() >= 3 && data[1] == data[0] && data[2] == data[0];
        match (data[0], triple) {
            (b'\'', false) => Self::SingleQuote,
            (b'\'', true) => Self::TripleSingleQuote,
            (_, false) => Self::DoubleQuote,
            (_, true) => Self::TripleDoubleQuote,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What was still open when the input ended
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Status {
    open: Option<(Delimiter, Pos)>,
}

impl Status {
    /// Awaited delimiter, empty when nothing is left open
    pub fn open_delimiter(&self) -> &'static str {
        self.open.map_or("", |(delim, _)| delim.as_str())
    }

    /// Awaited delimiter
    pub fn waiting(&self) -> Option<Delimiter> {
        self.open.map(|(delim, _)| delim)
    }

    /// Where the unterminated comment or literal starts
    pub fn position(&self) -> Option<Pos> {
        self.open.map(|(_, pos)| pos)
    }

    /// Whether the input ended outside any comment or literal
    pub fn is_clean(&self) -> bool {
        self.open.is_none()
    }

    /// Report an unterminated literal or block comment as an error.
    /// A line comment ended by the end of input is complete.
    pub fn check(&self) -> Result<(), Error> {
        match self.open {
            None | Some((Delimiter::Newline, _)) => Ok(()),
            Some((Delimiter::BlockCommentEnd, pos)) => {
                Err(Error::UnterminatedBlockComment(Some(pos)))
            }
            Some((delim, pos)) => Err(Error::UnterminatedLiteral(delim, Some(pos))),
        }
    }
}

/// Separator configuration
#[derive(Clone, Debug, Default)]
pub struct Separator {
    /// custom terminators, in matching order
    terminators: IndexSet<String>,
    preserve_comments: bool,
}

impl Separator {
    /// Only `;` as terminator, comments stripped
    pub fn new() -> Separator {
        Separator::default()
    }

    /// Keep comments verbatim instead of replacing each by a single space
    #[must_use]
    pub fn preserve_comments(mut self, preserve: bool) -> Separator {
        self.preserve_comments = preserve;
        self
    }

    /// Add a custom terminator, checked after the ones already added.
    ///
    /// A terminator starting with `;`, a quote, a backtick, a comment opener
    /// or a string prefix letter (`r`, `b`) is never matched.
    pub fn terminator<S: Into<String>>(mut self, terminator: S) -> Result<Separator, Error> {
        let terminator = terminator.into();
        if terminator.is_empty() {
            return Err(Error::EmptyTerminator);
        }
        self.terminators.insert(terminator);
        Ok(self)
    }

    fn with_terminators(custom_terminators: &[&str]) -> Separator {
        let mut separator = Separator::new();
        for terminator in custom_terminators {
            if terminator.is_empty() {
                warn!(target: "separator", "empty terminator ignored");
                continue;
            }
            separator.terminators.insert((*terminator).to_owned());
        }
        separator
    }

    /// Custom terminators, in matching order
    pub fn terminators(&self) -> impl Iterator<Item = &str> {
        self.terminators.iter().map(String::as_str)
    }

    /// Whether comments are kept in statements
    pub fn preserves_comments(&self) -> bool {
        self.preserve_comments
    }

    /// Lazily separate `input`
    pub fn statements<'s, 'input>(&'s self, input: &'input str) -> Statements<'s, 'input> {
        Statements {
            separator: self,
            scanner: Scanner::new(input),
            buffer: String::new(),
            open: None,
            done: false,
        }
    }

    /// Separate `input` and report what was left open
    pub fn separate(&self, input: &str) -> (Vec<InputStatement>, Status) {
        let mut statements = self.statements(input);
        let result: Vec<_> = statements.by_ref().collect();
        (result, statements.status())
    }
}

bitflags! {
    /// String literal prefix
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Prefix: u8 {
        /// `r` or `R`: backslash is not an escape character
        const RAW = 0b01;
        /// `b` or `B`
        const BYTES = 0b10;
    }
}

/// Length of the prefix letters of the string literal starting `data`, if any.
///
/// Valid prefixes: `r`, `b`, `rb`, `br`, case insensitive.
fn string_prefix(data: &[u8]) -> Option<(usize, Prefix)> {
    let mut prefix = Prefix::empty();
    for (i, &b) in data.iter().take(3).enumerate() {
        match b {
            b'r' | b'R' if !prefix.contains(Prefix::RAW) => prefix |= Prefix::RAW,
            b'b' | b'B' if !prefix.contains(Prefix::BYTES) => prefix |= Prefix::BYTES,
            b'"' | b'\'' => return Some((i, prefix)),
            _ => return None,
        }
    }
    None
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lexeme<'s> {
    /// length of the opening marker and closing delimiter
    Comment(usize, Delimiter),
    /// length of the prefix letters
    String(usize, Prefix),
    QuotedIdentifier,
    Terminator(&'s str),
    Plain(char),
}

/// Statements of one input, in order.
///
/// Once exhausted, [`Statements::status`] tells whether the input ended inside
/// a comment or a literal.
pub struct Statements<'s, 'input> {
    separator: &'s Separator,
    scanner: Scanner<'input>,
    /// statement being built
    buffer: String,
    open: Option<(Delimiter, Pos)>,
    done: bool,
}

impl<'s, 'input> Statements<'s, 'input> {
    /// What was still open when the input ended.
    /// Only meaningful once the iterator is exhausted.
    pub fn status(&self) -> Status {
        Status { open: self.open }
    }

    fn classify(&self) -> Option<Lexeme<'s>> {
        if self.scanner.is_empty() {
            return None;
        }
        let data = self.scanner.rest().as_bytes();
        match data[0] {
            b'#' => return Some(Lexeme::Comment(1, Delimiter::Newline)),
            b'-' if self.scanner.starts_with("--") => {
                return Some(Lexeme::Comment(2, Delimiter::Newline))
            }
            b'/' if self.scanner.starts_with("/*") => {
                return Some(Lexeme::Comment(2, Delimiter::BlockCommentEnd))
            }
            b'"' | b'\'' | b'r' | b'R' | b'b' | b'B' => {
                if let Some((len, prefix)) = string_prefix(data) {
                    return Some(Lexeme::String(len, prefix));
                }
            }
            b'`' => return Some(Lexeme::QuotedIdentifier),
            b';' => return Some(Lexeme::Terminator(SEMICOLON)),
            _ => {
                if let Some(terminator) = self
                    .separator
                    .terminators
                    .iter()
                    .find(|terminator| self.scanner.starts_with(terminator))
                {
                    return Some(Lexeme::Terminator(terminator));
                }
            }
        }
        self.scanner.peek().map(Lexeme::Plain)
    }

    fn comment(&mut self, open_len: usize, close: Delimiter, pos: Pos) {
        let body = &self.scanner.rest().as_bytes()[open_len..];
        let end = match close {
            Delimiter::Newline => memchr(b'\n', body),
            _ => memmem::find(body, close.as_str().as_bytes()),
        };
        if let Some(i) = end {
            let comment = self.scanner.consume(open_len + i + close.as_str().len());
            if self.separator.preserve_comments {
                self.buffer.push_str(comment);
            } else {
                self.buffer.push(' ');
            }
        } else {
            let comment = self.scanner.consume_all();
            if self.separator.preserve_comments {
                self.buffer.push_str(comment);
            }
            self.unterminated(close, pos);
        }
    }

    fn string(&mut self, prefix_len: usize, prefix: Prefix, pos: Pos) {
        let letters = self.scanner.consume(prefix_len);
        self.buffer.push_str(letters);
        let delim = Delimiter::string(self.scanner.rest().as_bytes());
        self.literal(delim, prefix.contains(Prefix::RAW), pos);
    }

    /// Copy a literal or quoted identifier, from its opening delimiter up to
    /// and including its closing delimiter.
    fn literal(&mut self, delim: Delimiter, raw: bool, pos: Pos) {
        let open = self.scanner.consume(delim.as_str().len());
        self.buffer.push_str(open);

        let close = delim.as_str().as_bytes();
        let rest = self.scanner.rest();
        let data = rest.as_bytes();
        // UTF-8 continuation bytes never match an ASCII delimiter
        let mut i = 0;
        let end = loop {
            match data.get(i) {
                None => break None,
                Some(_) if data[i..].starts_with(close) => break Some(i + close.len()),
                Some(b'\\') if !raw => match rest[i + 1..].chars().next() {
                    // escape sequence, copied as is
                    Some(c) => i += 1 + c.len_utf8(),
                    None => break None,
                },
                Some(_) => i += 1,
            }
        };
        if let Some(end) = end {
            let literal = self.scanner.consume(end);
            self.buffer.push_str(literal);
        } else {
            let literal = self.scanner.consume_all();
            self.buffer.push_str(literal);
            self.unterminated(delim, pos);
        }
    }

    fn unterminated(&mut self, delim: Delimiter, pos: Pos) {
        debug!(
            target: "separator",
            "{:?} still expected at end of input (opened at {})",
            delim.as_str(),
            pos
        );
        self.open = Some((delim, pos));
    }

    fn flush(&mut self, terminator: &str) -> InputStatement {
        debug!(
            target: "separator",
            "statement terminated by {:?} at {}",
            terminator,
            self.scanner.pos()
        );
        let statement = self.buffer.trim().to_owned();
        self.buffer.clear();
        InputStatement {
            statement,
            terminator: terminator.to_owned(),
        }
    }
}

impl Iterator for Statements<'_, '_> {
    type Item = InputStatement;

    fn next(&mut self) -> Option<InputStatement> {
        if self.done {
            return None;
        }
        loop {
            let pos = self.scanner.pos();
            let Some(lexeme) = self.classify() else {
                break;
            };
            match lexeme {
                Lexeme::Comment(open_len, close) => self.comment(open_len, close, pos),
                Lexeme::String(prefix_len, prefix) => self.string(prefix_len, prefix, pos),
                Lexeme::QuotedIdentifier => self.literal(Delimiter::Backtick, false, pos),
                Lexeme::Terminator(terminator) => {
                    self.scanner.consume(terminator.len());
                    return Some(self.flush(terminator));
                }
                Lexeme::Plain(_) => {
                    if let Some(c) = self.scanner.consume_char() {
                        self.buffer.push(c);
                    }
                }
            }
        }
        self.done = true;
        // flush remained
        let statement = self.buffer.trim();
        if statement.is_empty() {
            return None;
        }
        let statement = statement.to_owned();
        self.buffer.clear();
        Some(InputStatement {
            statement,
            terminator: String::new(),
        })
    }
}

impl FusedIterator for Statements<'_, '_> {}

impl fmt::Debug for Statements<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statements")
            .field("scanner", &self.scanner)
            .field("buffer", &self.buffer)
            .field("open", &self.open)
            .finish()
    }
}

/// Separate `input` into statements, comments included.
///
/// `;` is always a terminator, `custom_terminators` (`\G` for example) are
/// recognized too. Empty custom terminators are ignored.
pub fn separate_preserving_comments(
    input: &str,
    custom_terminators: &[&str],
) -> Vec<InputStatement> {
    separate_preserving_comments_with_status(input, custom_terminators).0
}

/// Like [`separate_preserving_comments`] but also tell whether input ended
/// inside a comment or a literal.
pub fn separate_preserving_comments_with_status(
    input: &str,
    custom_terminators: &[&str],
) -> (Vec<InputStatement>, Status) {
    Separator::with_terminators(custom_terminators)
        .preserve_comments(true)
        .separate(input)
}

/// Separate `input` into statements, each comment replaced by a single space.
///
/// Input made only of comments gives no statement.
pub fn separate_stripping_comments(input: &str, custom_terminators: &[&str]) -> Vec<InputStatement> {
    Separator::with_terminators(custom_terminators)
        .separate(input)
        .0
}

/// Statement texts of [`separate_preserving_comments`]
pub fn separate_preserving_comments_string(input: &str, custom_terminators: &[&str]) -> Vec<String> {
    separate_preserving_comments(input, custom_terminators)
        .into_iter()
        .map(|stmt| stmt.statement)
        .collect()
}

/// Statement texts of [`separate_stripping_comments`]
pub fn separate_stripping_comments_string(input: &str, custom_terminators: &[&str]) -> Vec<String> {
    separate_stripping_comments(input, custom_terminators)
        .into_iter()
        .map(|stmt| stmt.statement)
        .collect()
}

/// See [`InputStatement::strip_comments`]
pub fn strip_comments_from_statement(stmt: &InputStatement) -> InputStatement {
    stmt.strip_comments()
}
