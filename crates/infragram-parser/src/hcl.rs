//! Reader for Terraform (HCL) declaration files.
//!
//! The reader understands the block/attribute structure of HCL and keeps
//! attribute values as raw expression text. Only `resource`, `data`, and
//! `module` blocks become declarations; every other top-level construct is
//! read and dropped, and anything unreadable is skipped.

use std::{collections::HashMap, ops::Range};

use indexmap::IndexMap;
use log::debug;
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, not, opt, peek, repeat, terminated},
    error::{ErrMode, StrContext, StrContextValue},
    stream::{Location, Stream},
};

use infragram_core::semantic::Dialect;

use crate::{
    extract::Declaration,
    span::Span,
    syntax::{
        IResult, Input, expression, identifier, inline_trivia, quoted, skip_statement, trivia,
    },
};

#[derive(Debug)]
enum Item<'src> {
    Attribute { key: &'src str, value: &'src str },
    Block(Block<'src>),
}

#[derive(Debug)]
struct Block<'src> {
    kind: &'src str,
    labels: Vec<&'src str>,
    body: Vec<Item<'src>>,
    header: Span,
}

/// Read every `resource`, `data`, and `module` declaration in `source`.
pub(crate) fn read(source: &str) -> Vec<Declaration> {
    let mut input = Input::new(source);
    let mut declarations = Vec::new();

    loop {
        if trivia(&mut input).is_err() || input.eof_offset() == 0 {
            break;
        }

        let checkpoint = input.checkpoint();
        match item(&mut input) {
            Ok(Item::Block(block)) => declarations.extend(declaration(block)),
            Ok(Item::Attribute { .. }) => {}
            Err(_) => {
                input.reset(&checkpoint);
                debug!(offset = input.current_token_start(); "Skipping unreadable statement");
                skip_statement(&mut input, Dialect::Terraform);
            }
        }
    }

    declarations
}

/// Parse a label: a quoted string or a bare identifier.
fn label<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    alt((quoted(Dialect::Terraform), identifier)).parse_next(input)
}

/// Parse an attribute (`key = expr`) or a block (`kind "label"... { body }`).
fn item<'src>(input: &mut Input<'src>) -> IResult<Item<'src>> {
    let (key, key_range) = identifier.with_span().parse_next(input)?;
    inline_trivia.parse_next(input)?;

    if opt(('=', peek(not('=')))).parse_next(input)?.is_some() {
        inline_trivia.parse_next(input)?;
        let value = expression(Dialect::Terraform)
            .context(StrContext::Label("attribute value"))
            .parse_next(input)?;
        return Ok(Item::Attribute { key, value });
    }

    let labels: Vec<(&str, Range<usize>)> =
        repeat(0.., terminated(label.with_span(), inline_trivia)).parse_next(input)?;
    let header_end = labels.last().map_or(key_range.end, |(_, range)| range.end);

    '{'.parse_next(input)?;
    let body = body.parse_next(input)?;
    cut_err('}')
        .context(StrContext::Expected(StrContextValue::CharLiteral('}')))
        .parse_next(input)?;

    Ok(Item::Block(Block {
        kind: key,
        labels: labels.into_iter().map(|(label, _)| label).collect(),
        body,
        header: Span::new(key_range.start..header_end),
    }))
}

/// Parse the items of a block body up to (not including) its closing brace.
fn body<'src>(input: &mut Input<'src>) -> IResult<Vec<Item<'src>>> {
    let mut items = Vec::new();
    loop {
        trivia.parse_next(input)?;
        if matches!(input.peek_token(), None | Some('}')) {
            return Ok(items);
        }

        let checkpoint = input.checkpoint();
        match item(input) {
            Ok(item) => items.push(item),
            Err(ErrMode::Backtrack(_)) => {
                input.reset(&checkpoint);
                skip_statement(input, Dialect::Terraform);
            }
            Err(err) => return Err(err),
        }
    }
}

fn declaration(block: Block<'_>) -> Option<Declaration> {
    let (kind, name) = match (block.kind, block.labels.as_slice()) {
        ("resource", [kind, name]) => (kind.to_string(), name.to_string()),
        ("data", [kind, name]) => (format!("data.{kind}"), name.to_string()),
        ("module", [name]) => ("module".to_string(), name.to_string()),
        _ => return None,
    };

    let mut attributes = IndexMap::new();
    flatten(&block.body, "", &mut attributes);

    Some(Declaration {
        kind,
        name,
        attributes,
        span: block.header,
    })
}

/// Flatten nested blocks into `block.<index>.key` paths.
fn flatten(items: &[Item<'_>], prefix: &str, out: &mut IndexMap<String, String>) {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for item in items {
        match item {
            Item::Attribute { key, value } => {
                out.insert(join_path(prefix, key), value.to_string());
            }
            Item::Block(block) => {
                let index = occurrences.entry(block.kind).or_default();
                let path = join_path(prefix, &format!("{}.{index}", block.kind));
                *index += 1;
                flatten(&block.body, &path, out);
            }
        }
    }
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
