//! Reader for Azure Bicep declaration files.
//!
//! Recognizes `resource` and `module` declarations, including conditional
//! (`= if (...) {`) and looped (`= [for ...: {`) forms and `existing`
//! references. Object properties are flattened into dotted paths. A
//! `resource` nested inside another becomes a declaration of its own, typed
//! relative to its parent and carrying an implicit `parent` attribute.

use std::ops::Range;

use indexmap::IndexMap;
use log::debug;
use winnow::{
    Parser as _,
    combinator::{alt, opt, preceded},
    error::{ContextError, ErrMode},
    stream::{Location, Stream},
    token::take_until,
};

use infragram_core::semantic::Dialect;

use crate::{
    extract::Declaration,
    hcl::join_path,
    span::Span,
    syntax::{
        IResult, Input, expression, group, identifier, inline_trivia, keyword, quoted,
        skip_statement, trivia,
    },
};

/// The declaration whose body is being read.
struct Owner<'a> {
    symbol: &'a str,
    kind: &'a str,
}

/// What an object body contributes to its owning declaration.
#[derive(Default)]
struct Members {
    attributes: IndexMap<String, String>,
    children: Vec<Declaration>,
}

/// Read every `resource` and `module` declaration in `source`.
pub(crate) fn read(source: &str) -> Vec<Declaration> {
    let mut input = Input::new(source);
    let mut declarations = Vec::new();

    loop {
        if trivia(&mut input).is_err() || input.eof_offset() == 0 {
            break;
        }

        let checkpoint = input.checkpoint();
        match declaration(&mut input, None) {
            Ok(found) => declarations.extend(found),
            Err(_) => {
                input.reset(&checkpoint);
                skip_statement(&mut input, Dialect::Bicep);
            }
        }
    }

    declarations
}

/// Parse one declaration; returns it followed by its nested children.
fn declaration<'src>(
    input: &mut Input<'src>,
    parent: Option<&Owner<'_>>,
) -> IResult<Vec<Declaration>> {
    let ((keyword_name, symbol, type_string), header): ((&str, &str, &str), Range<usize>) = (
        alt((keyword("resource"), keyword("module"))),
        preceded(inline_trivia, identifier),
        preceded(inline_trivia, quoted(Dialect::Bicep)),
    )
        .with_span()
        .parse_next(input)?;

    (
        inline_trivia,
        opt((keyword("existing"), inline_trivia)),
        '=',
        trivia,
    )
        .void()
        .parse_next(input)?;

    let kind = match keyword_name {
        "module" => "module".to_string(),
        _ => resource_kind(type_string, parent),
    };
    let owner = Owner {
        symbol,
        kind: &kind,
    };

    let mut members = Members::default();
    declaration_value(input, &owner, &mut members)?;

    if let Some(parent) = parent {
        members
            .attributes
            .entry("parent".to_string())
            .or_insert_with(|| parent.symbol.to_string());
    }
    debug!(symbol = symbol, kind = kind.as_str(); "Read Bicep declaration");

    let mut declarations = vec![Declaration {
        kind,
        name: symbol.to_string(),
        attributes: members.attributes,
        span: Span::new(header),
    }];
    declarations.extend(members.children);
    Ok(declarations)
}

/// Parse the right-hand side of a declaration: an object, optionally behind
/// an `if (...)` condition or inside a `[for ...: ...]` loop.
fn declaration_value<'src>(
    input: &mut Input<'src>,
    owner: &Owner<'_>,
    members: &mut Members,
) -> IResult<()> {
    if opt('[').parse_next(input)?.is_some() {
        (
            trivia,
            keyword("for"),
            take_until(1.., ':'),
            ':',
            trivia,
        )
            .void()
            .parse_next(input)?;
        condition.parse_next(input)?;
        object(input, "", owner, members)?;
        (trivia, ']').void().parse_next(input)?;
        return Ok(());
    }

    condition.parse_next(input)?;
    object(input, "", owner, members)
}

/// Parse an optional `if (...)` guard.
fn condition<'src>(input: &mut Input<'src>) -> IResult<()> {
    opt((keyword("if"), inline_trivia, group(Dialect::Bicep), trivia))
        .void()
        .parse_next(input)
}

/// Parse `{ ... }`, recording properties under `prefix`.
fn object<'src>(
    input: &mut Input<'src>,
    prefix: &str,
    owner: &Owner<'_>,
    members: &mut Members,
) -> IResult<()> {
    '{'.parse_next(input)?;
    loop {
        (trivia, opt(','), trivia).void().parse_next(input)?;
        match input.peek_token() {
            None => return Err(ErrMode::Cut(ContextError::new())),
            Some('}') => {
                input.next_token();
                return Ok(());
            }
            Some(_) => {}
        }

        let checkpoint = input.checkpoint();
        match property(input, prefix, owner, members) {
            Ok(()) => continue,
            Err(ErrMode::Backtrack(_)) => input.reset(&checkpoint),
            Err(err) => return Err(err),
        }

        match declaration(input, Some(owner)) {
            Ok(children) => members.children.extend(children),
            Err(ErrMode::Backtrack(_)) => {
                input.reset(&checkpoint);
                debug!(offset = input.current_token_start(); "Skipping unreadable member");
                skip_statement(input, Dialect::Bicep);
            }
            Err(err) => return Err(err),
        }
    }
}

/// Parse `key: value`; object values are flattened recursively.
fn property<'src>(
    input: &mut Input<'src>,
    prefix: &str,
    owner: &Owner<'_>,
    members: &mut Members,
) -> IResult<()> {
    let key = alt((quoted(Dialect::Bicep), identifier)).parse_next(input)?;
    (inline_trivia, ':', inline_trivia).void().parse_next(input)?;

    let path = join_path(prefix, key);
    if input.peek_token() == Some('{') {
        return object(input, &path, owner, members).map_err(|err| err.cut());
    }

    let value = expression(Dialect::Bicep).parse_next(input)?;
    members.attributes.insert(path, value.to_string());
    Ok(())
}

/// Resource type without its API version; nested children with a short
/// type are qualified by their parent's type.
fn resource_kind(type_string: &str, parent: Option<&Owner<'_>>) -> String {
    let type_name = type_string
        .split_once('@')
        .map_or(type_string, |(name, _)| name);
    match parent {
        Some(parent) if !type_name.contains('/') => format!("{}/{type_name}", parent.kind),
        _ => type_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_declaration() {
        let source = r#"
param location string = resourceGroup().location

resource vnet 'Microsoft.Network/virtualNetworks@2023-05-01' = {
  name: 'cust1Vnet'
  location: location
  properties: {
    addressSpace: {
      addressPrefixes: [
        '10.0.0.0/16'
      ]
    }
  }
}
"#;
        let declarations = read(source);
        assert_eq!(declarations.len(), 1);

        let vnet = &declarations[0];
        assert_eq!(vnet.kind, "Microsoft.Network/virtualNetworks");
        assert_eq!(vnet.name, "vnet");
        assert_eq!(vnet.attributes["name"], "'cust1Vnet'");
        assert_eq!(vnet.attributes["location"], "location");
        assert_eq!(
            vnet.attributes["properties.addressSpace.addressPrefixes"],
            "[\n        '10.0.0.0/16'\n      ]"
        );
        assert_eq!(
            vnet.span.slice(source),
            Some("resource vnet 'Microsoft.Network/virtualNetworks@2023-05-01'")
        );
    }

    #[test]
    fn test_nested_child_resource() {
        let source = r#"
resource vnet 'Microsoft.Network/virtualNetworks@2023-05-01' = {
  name: 'vnet'
  resource frontend 'subnets' = {
    name: 'FESubnetName'
    properties: {
      addressPrefix: '10.0.1.0/24'
    }
  }
}
"#;
        let declarations = read(source);
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].name, "vnet");
        assert!(!declarations[0].attributes.contains_key("parent"));

        let subnet = &declarations[1];
        assert_eq!(subnet.kind, "Microsoft.Network/virtualNetworks/subnets");
        assert_eq!(subnet.name, "frontend");
        assert_eq!(subnet.attributes["parent"], "vnet");
        assert_eq!(
            subnet.attributes["properties.addressPrefix"],
            "'10.0.1.0/24'"
        );
    }

    #[test]
    fn test_conditional_loop_and_existing_forms() {
        let source = r#"
resource shared 'Microsoft.Network/virtualNetworks@2023-05-01' existing = {
  name: 'hub'
}

resource pip 'Microsoft.Network/publicIPAddresses@2023-05-01' = if (deployLb) {
  name: 'lbPublicIp'
}

resource nics 'Microsoft.Network/networkInterfaces@2023-05-01' = [for i in range(0, 2): {
  name: 'nic${i}'
}]

module web './web.bicep' = {
  name: 'webDeploy'
  params: {
    subnetId: shared.id
  }
}
"#;
        let declarations = read(source);
        let names: Vec<&str> = declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["shared", "pip", "nics", "web"]);
        assert_eq!(declarations[3].kind, "module");
        assert_eq!(declarations[3].attributes["params.subnetId"], "shared.id");
        assert_eq!(declarations[2].attributes["name"], "'nic${i}'");
    }

    #[test]
    fn test_commas_and_quoted_keys() {
        let source = "resource st 'Microsoft.Storage/storageAccounts@2023-01-01' = { name: 'st', 'kind': 'StorageV2' }\n";
        let declarations = read(source);
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].attributes["name"], "'st'");
        assert_eq!(declarations[0].attributes["kind"], "'StorageV2'");
    }

    #[test]
    fn test_non_declarations_are_skipped() {
        let source = r#"
targetScope = 'resourceGroup'

@description('Admin user')
param adminUser string

var subnets = {
  web: '10.0.1.0/24'
}

output vnetId string = vnet.id

resource vnet 'Microsoft.Network/virtualNetworks@2023-05-01' = {
  name: 'vnet'
}

resource broken 'Microsoft.Network/publicIPAddresses@2023-05-01' = {
  name: 'never closed'
"#;
        let declarations = read(source);
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].name, "vnet");
    }

    #[test]
    fn test_resource_kind() {
        let parent = Owner {
            symbol: "sql",
            kind: "Microsoft.Sql/servers",
        };
        assert_eq!(
            resource_kind("databases@2022-05-01-preview", Some(&parent)),
            "Microsoft.Sql/servers/databases"
        );
        assert_eq!(
            resource_kind("Microsoft.Sql/servers/databases@2022-05-01-preview", Some(&parent)),
            "Microsoft.Sql/servers/databases"
        );
        assert_eq!(resource_kind("Microsoft.Web/sites", None), "Microsoft.Web/sites");
    }
}
