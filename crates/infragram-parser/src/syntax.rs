//! Lexical helpers shared by the Terraform and Bicep readers.
//!
//! Readers run over a [`LocatingSlice`] so parsers can report byte offsets.
//! Attribute values are never parsed into an AST; they are scanned as raw
//! text, honoring brackets, strings, interpolation, heredocs, and comments,
//! up to the first terminator at nesting depth zero.

use winnow::{
    Parser as _,
    ascii::multispace1,
    combinator::{alt, not, peek, repeat},
    error::{ContextError, ErrMode, ModalResult, StrContext},
    stream::{LocatingSlice, Stream},
    token::{literal, one_of, take_until, take_while},
};

use infragram_core::semantic::Dialect;

pub(crate) type Input<'src> = LocatingSlice<&'src str>;
pub(crate) type IResult<O> = ModalResult<O, ContextError>;

fn line_comment<'src>(input: &mut Input<'src>) -> IResult<()> {
    (alt(("#", "//")), take_while(0.., |c: char| c != '\n'))
        .void()
        .parse_next(input)
}

fn block_comment<'src>(input: &mut Input<'src>) -> IResult<()> {
    ("/*", take_until(0.., "*/"), "*/").void().parse_next(input)
}

/// Skips whitespace, line breaks, and comments.
pub(crate) fn trivia<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., alt((multispace1.void(), line_comment, block_comment))).parse_next(input)
}

/// Skips spaces, tabs, and block comments on the current line.
pub(crate) fn inline_trivia<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(
        0..,
        alt((take_while(1.., [' ', '\t', '\r']).void(), block_comment)),
    )
    .parse_next(input)
}

/// Parse an identifier: a letter or underscore followed by letters, digits,
/// underscores, or dashes.
pub(crate) fn identifier<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '-'
        }),
    )
        .take()
        .context(StrContext::Label("identifier"))
        .parse_next(input)
}

/// Parse a keyword with word boundary checking.
pub(crate) fn keyword<'src>(
    word: &'static str,
) -> impl FnMut(&mut Input<'src>) -> IResult<&'src str> {
    move |input: &mut Input<'src>| {
        (
            literal(word),
            peek(not(one_of(|c: char| c.is_ascii_alphanumeric() || c == '_'))),
        )
            .map(|(matched, _)| matched)
            .parse_next(input)
    }
}

/// Parse a single-line quoted string and return the text between the quotes.
///
/// Terraform strings use double quotes, Bicep strings single quotes.
pub(crate) fn quoted<'src>(
    dialect: Dialect,
) -> impl FnMut(&mut Input<'src>) -> IResult<&'src str> {
    move |input: &mut Input<'src>| {
        let text = input.peek_finish();
        let mut cur = Cursor::new(text);
        if cur.peek() != Some(quote_char(dialect)) || cur.rest().starts_with("'''") {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        if !skip_string(&mut cur, dialect) {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        let raw = input.next_slice(cur.pos);
        Ok(&raw[1..raw.len() - 1])
    }
}

/// Parse a raw attribute value up to the end of its line, a `,`, or an
/// unbalanced closing bracket. Trailing whitespace is dropped.
pub(crate) fn expression<'src>(
    dialect: Dialect,
) -> impl FnMut(&mut Input<'src>) -> IResult<&'src str> {
    move |input: &mut Input<'src>| {
        let len = expression_len(input.peek_finish(), dialect);
        let raw = input.peek_finish()[..len].trim_end();
        if raw.is_empty() {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        input.next_slice(len);
        Ok(raw)
    }
}

/// Parse one balanced bracketed group, such as `(cond)`, including the
/// brackets.
pub(crate) fn group<'src>(dialect: Dialect) -> impl FnMut(&mut Input<'src>) -> IResult<&'src str> {
    move |input: &mut Input<'src>| match group_len(input.peek_finish(), dialect) {
        Some(len) => Ok(input.next_slice(len)),
        None => Err(ErrMode::Backtrack(ContextError::new())),
    }
}

/// Skip one unrecognized statement. Always consumes at least one character
/// unless the input is exhausted.
pub(crate) fn skip_statement(input: &mut Input<'_>, dialect: Dialect) {
    let len = expression_len(input.peek_finish(), dialect);
    if len > 0 {
        input.next_slice(len);
    } else {
        input.next_token();
    }
}

fn quote_char(dialect: Dialect) -> char {
    match dialect {
        Dialect::Terraform => '"',
        Dialect::Bicep => '\'',
    }
}

/// Byte length of the expression at the start of `text`.
pub(crate) fn expression_len(text: &str, dialect: Dialect) -> usize {
    let mut cur = Cursor::new(text);
    let mut depth = 0usize;
    loop {
        let before = cur.pos;
        let Some(atom) = next_atom(&mut cur, dialect) else {
            break;
        };
        match atom {
            Atom::Open => depth += 1,
            Atom::Close if depth == 0 => {
                cur.pos = before;
                break;
            }
            Atom::Close => depth -= 1,
            Atom::Newline | Atom::Comma | Atom::LineComment if depth == 0 => {
                cur.pos = before;
                break;
            }
            _ => {}
        }
    }
    cur.pos
}

/// Byte length of the balanced group opening at the start of `text`.
fn group_len(text: &str, dialect: Dialect) -> Option<usize> {
    let mut cur = Cursor::new(text);
    let mut depth = 0usize;
    while let Some(atom) = next_atom(&mut cur, dialect) {
        match atom {
            Atom::Open => depth += 1,
            Atom::Close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(cur.pos);
                }
            }
            _ if depth == 0 => return None,
            _ => {}
        }
    }
    None
}

/// Unit of text consumed by [`next_atom`].
enum Atom {
    Open,
    Close,
    Newline,
    Comma,
    LineComment,
    Other,
}

fn next_atom(cur: &mut Cursor<'_>, dialect: Dialect) -> Option<Atom> {
    let c = cur.peek()?;
    let atom = match c {
        '(' | '[' | '{' => {
            cur.bump();
            Atom::Open
        }
        ')' | ']' | '}' => {
            cur.bump();
            Atom::Close
        }
        '\n' => {
            cur.bump();
            Atom::Newline
        }
        ',' => {
            cur.bump();
            Atom::Comma
        }
        '#' if dialect == Dialect::Terraform => {
            cur.skip_line();
            Atom::LineComment
        }
        '/' if cur.peek_second() == Some('/') => {
            cur.skip_line();
            Atom::LineComment
        }
        '/' if cur.peek_second() == Some('*') => {
            match cur.rest()[2..].find("*/") {
                Some(end) => cur.pos += end + 4,
                None => cur.pos = cur.text.len(),
            }
            Atom::Other
        }
        '<' if dialect == Dialect::Terraform && cur.rest().starts_with("<<") => {
            if !skip_heredoc(cur) {
                cur.pos += 2;
            }
            Atom::Other
        }
        c if c == quote_char(dialect) => {
            skip_string(cur, dialect);
            Atom::Other
        }
        _ => {
            cur.bump();
            Atom::Other
        }
    };
    Some(atom)
}

/// Skips a string starting at the cursor. Returns `false` when the string is
/// not terminated; the cursor then rests on the offending line break or at
/// the end of input.
fn skip_string(cur: &mut Cursor<'_>, dialect: Dialect) -> bool {
    let quote = quote_char(dialect);
    if dialect == Dialect::Bicep && cur.eat("'''") {
        return match cur.rest().find("'''") {
            Some(end) => {
                cur.pos += end + 3;
                true
            }
            None => {
                cur.pos = cur.text.len();
                false
            }
        };
    }

    cur.bump();
    while let Some(c) = cur.peek() {
        match c {
            '\n' => return false,
            '\\' => {
                cur.bump();
                cur.bump();
            }
            '$' if cur.rest().starts_with("$${") => cur.pos += 3,
            '$' | '%' if cur.peek_second() == Some('{') => {
                if c == '%' && dialect != Dialect::Terraform {
                    cur.bump();
                    continue;
                }
                cur.pos += 2;
                if !skip_interpolation(cur, dialect) {
                    return false;
                }
            }
            c if c == quote => {
                cur.bump();
                return true;
            }
            _ => {
                cur.bump();
            }
        }
    }
    false
}

/// Skips the body of `${ ... }` after the opening `${`.
fn skip_interpolation(cur: &mut Cursor<'_>, dialect: Dialect) -> bool {
    let quote = quote_char(dialect);
    let mut depth = 0usize;
    while let Some(c) = cur.peek() {
        match c {
            '{' | '(' | '[' => {
                depth += 1;
                cur.bump();
            }
            '}' if depth == 0 => {
                cur.bump();
                return true;
            }
            '}' | ')' | ']' => {
                depth = depth.saturating_sub(1);
                cur.bump();
            }
            c if c == quote => {
                if !skip_string(cur, dialect) {
                    return false;
                }
            }
            _ => {
                cur.bump();
            }
        }
    }
    false
}

/// Skips a `<<MARKER` or `<<-MARKER` heredoc including its closing marker
/// line. Returns `false`, leaving the cursor untouched, when the `<<` does
/// not open a heredoc.
fn skip_heredoc(cur: &mut Cursor<'_>) -> bool {
    let start = cur.pos;
    cur.eat("<<");
    cur.eat("-");
    let rest = cur.rest();
    let marker_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    if marker_len == 0 || !rest[marker_len..].starts_with(['\n', '\r']) {
        cur.pos = start;
        return false;
    }
    let marker = &rest[..marker_len];
    cur.pos += marker_len;
    cur.skip_line();

    while cur.eat("\n") {
        let line = cur.rest().split('\n').next().unwrap_or_default();
        cur.pos += line.len();
        if line.trim() == marker {
            break;
        }
    }
    true
}

/// Character cursor over raw source text.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    /// Moves to the next line break, or to the end of input.
    fn skip_line(&mut self) {
        match self.rest().find('\n') {
            Some(offset) => self.pos += offset,
            None => self.pos = self.text.len(),
        }
    }
}
