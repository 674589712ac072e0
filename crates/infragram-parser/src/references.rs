//! Relationship extraction.
//!
//! Every attribute value is scanned for identifier paths that address another
//! declared entity: `type.name`, `data.type.name`, or `module.name` in
//! Terraform, a symbolic name in Bicep. String-literal text is ignored except
//! inside `${...}` interpolations.

use std::{collections::HashMap, sync::LazyLock};

use indexmap::IndexMap;
use log::trace;
use regex::Regex;

use infragram_core::semantic::{Dialect, Entity, EntityId, Reference, ReferenceKind};

static TERRAFORM_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_][A-Za-z0-9_-]*(?:\.[A-Za-z_][A-Za-z0-9_-]*)*")
        .expect("terraform path pattern is valid")
});

static BICEP_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_][A-Za-z0-9_]*(?:::[A-Za-z_][A-Za-z0-9_]*)*(?:\.[A-Za-z_][A-Za-z0-9_]*)*")
        .expect("bicep path pattern is valid")
});

/// Find the references between `entities`, in discovery order.
///
/// Each `(from, to)` pair appears once; the first occurrence decides the
/// kind and later ones only add origins. Self references and paths that do
/// not name a known entity are dropped.
pub(crate) fn resolve(entities: &IndexMap<EntityId, Entity>) -> Vec<Reference> {
    let addresses: HashMap<(Dialect, String), EntityId> = entities
        .values()
        .map(|entity| ((entity.dialect(), entity.address()), entity.id()))
        .collect();

    let mut found: IndexMap<(EntityId, EntityId), Reference> = IndexMap::new();
    for entity in entities.values() {
        let dialect = entity.dialect();
        for (path, raw) in entity.attributes() {
            let kind = reference_kind(dialect, path);
            for address in referenced_addresses(raw, dialect) {
                let Some(&to) = addresses.get(&(dialect, address)) else {
                    continue;
                };
                if to == entity.id() {
                    continue;
                }
                trace!(from:% = entity.id(), to:% = to, origin = path.as_str(); "Found reference");
                found
                    .entry((entity.id(), to))
                    .and_modify(|reference| reference.add_origin(path))
                    .or_insert_with(|| Reference::new(entity.id(), to, kind, path.as_str()));
            }
        }
    }

    found.into_values().collect()
}

fn reference_kind(dialect: Dialect, path: &str) -> ReferenceKind {
    let root = path.split('.').next().unwrap_or(path);
    if root == dialect.depends_on_key() {
        ReferenceKind::DependsOn
    } else if path == "parent" {
        ReferenceKind::Parent
    } else {
        ReferenceKind::AttributeReference
    }
}

/// Candidate entity addresses mentioned in code positions of `raw`.
fn referenced_addresses(raw: &str, dialect: Dialect) -> Vec<String> {
    let code = mask_literals(raw, dialect);
    let pattern = match dialect {
        Dialect::Terraform => &*TERRAFORM_PATH,
        Dialect::Bicep => &*BICEP_PATH,
    };

    pattern
        .find_iter(&code)
        .filter(|found| !code[..found.start()].ends_with('.'))
        .filter(|found| !is_property_key(&code, found.start(), found.end()))
        .filter_map(|found| address_of(found.as_str(), dialect))
        .collect()
}

fn address_of(path: &str, dialect: Dialect) -> Option<String> {
    let segments: Vec<&str> = path.split('.').collect();
    match dialect {
        Dialect::Terraform => match segments.as_slice() {
            ["data", kind, name, ..] => Some(format!("data.{kind}.{name}")),
            ["module", name, ..] => Some(format!("module.{name}")),
            [kind, name, ..] => Some(format!("{kind}.{name}")),
            _ => None,
        },
        // `parent::child` addresses the nested child only.
        Dialect::Bicep => segments
            .first()
            .and_then(|symbol| symbol.rsplit("::").next())
            .map(str::to_string),
    }
}

/// An object key: followed by a single `:` and opening an entry, i.e.
/// preceded by nothing, a newline, `{`, or `,` on its line.
fn is_property_key(code: &str, start: usize, end: usize) -> bool {
    let mut after = code[end..].chars().skip_while(|c| matches!(c, ' ' | '\t'));
    if after.next() != Some(':') || after.next() == Some(':') {
        return false;
    }
    let before = code[..start]
        .trim_end_matches([' ', '\t'])
        .chars()
        .next_back();
    matches!(before, None | Some('\n' | '{' | ','))
}

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// Code, with the number of unclosed `{` seen in it.
    Code { depth: usize },
    /// Inside a string literal.
    Str,
}

/// Replace string-literal text (outside interpolations) and comments with
/// blanks so that only code positions remain.
fn mask_literals(raw: &str, dialect: Dialect) -> String {
    let quote = match dialect {
        Dialect::Terraform => '"',
        Dialect::Bicep => '\'',
    };

    let mut out = String::with_capacity(raw.len());
    let mut stack = vec![Frame::Code { depth: 0 }];
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        let Some(&top) = stack.last() else {
            out.push(c);
            continue;
        };
        match top {
            Frame::Str => match c {
                '\\' => {
                    chars.next();
                    out.push_str("  ");
                }
                '$' | '%'
                    if chars.peek() == Some(&'{')
                        && (c == '$' || dialect == Dialect::Terraform) =>
                {
                    chars.next();
                    out.push(c);
                    out.push('{');
                    stack.push(Frame::Code { depth: 0 });
                }
                c if c == quote => {
                    stack.pop();
                    out.push(c);
                }
                _ => out.push(' '),
            },
            Frame::Code { depth } => {
                match c {
                    c if c == quote => stack.push(Frame::Str),
                    '{' => set_top(&mut stack, Frame::Code { depth: depth + 1 }),
                    '}' if depth == 0 && stack.len() > 1 => {
                        stack.pop();
                    }
                    '}' => set_top(
                        &mut stack,
                        Frame::Code {
                            depth: depth.saturating_sub(1),
                        },
                    ),
                    '#' if dialect == Dialect::Terraform => {
                        skip_comment(&mut chars);
                        continue;
                    }
                    '/' if chars.peek() == Some(&'/') => {
                        skip_comment(&mut chars);
                        continue;
                    }
                    _ => {}
                }
                out.push(c);
            }
        }
    }

    out
}

fn set_top(stack: &mut [Frame], frame: Frame) {
    if let Some(top) = stack.last_mut() {
        *top = frame;
    }
}

fn skip_comment(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while chars.next_if(|&next| next != '\n').is_some() {}
}
