//! Tag syntax parsers
//!
//! Each parser takes the full raw text of one tag, delimiters included, and
//! builds the matching AST node. Children are attached later by the tree
//! builder in [`crate::parser`].

use crate::ast::Node;
use crate::error::{Error, Result};

pub const VALUE_OPEN: &str = "{$";
pub const VALUE_CLOSE: &str = "}";
pub const DIRECTIVE_OPEN: &str = "{%";
pub const DIRECTIVE_CLOSE: &str = "%}";

/// Strip an exact delimiter pair and trim the payload
fn strip_delimiters<'a>(tag: &'a str, open: &str, close: &str) -> Result<&'a str> {
    if tag.len() < open.len() + close.len() || !tag.starts_with(open) || !tag.ends_with(close)
    {
        return Err(Error::invalid_tag(format!(
            "tag '{}' must be enclosed with {} and {}",
            tag, open, close
        )));
    }

    Ok(tag[open.len()..tag.len() - close.len()].trim())
}

/// Payload of a `{% ... %}` tag with delimiters and outer whitespace removed
pub fn directive_payload(tag: &str) -> Result<&str> {
    strip_delimiters(tag, DIRECTIVE_OPEN, DIRECTIVE_CLOSE)
}

/// Condition name of an `if`/`elif` tag
fn condition_name<'a>(tag: &'a str, keyword: &str) -> Result<&'a str> {
    let payload = directive_payload(tag)?;

    payload
        .strip_prefix(keyword)
        .and_then(|rest| rest.strip_prefix(' '))
        .map(str::trim)
        .ok_or_else(|| {
            Error::invalid_tag(format!(
                "tag '{}' must be prefixed with '{} '",
                tag, keyword
            ))
        })
}

/// Parse a value tag such as `{$ first_name }`
pub fn parse_value_tag(tag: &str) -> Result<Node> {
    let name = strip_delimiters(tag, VALUE_OPEN, VALUE_CLOSE)?;
    Node::value(name)
}

/// Parse an if tag such as `{% if is_admin %}`
pub fn parse_if_tag(tag: &str) -> Result<Node> {
    Node::if_value(condition_name(tag, "if")?)
}

/// Parse an elif tag such as `{% elif is_guest %}`
pub fn parse_elif_tag(tag: &str) -> Result<Node> {
    Node::elif_value(condition_name(tag, "elif")?)
}

/// Parse an else tag, which takes no arguments
pub fn parse_else_tag(tag: &str) -> Result<Node> {
    match directive_payload(tag)? {
        "else" => Ok(Node::else_value()),
        _ => Err(Error::invalid_tag(format!(
            "tag '{}' must be exactly {{% else %}}",
            tag
        ))),
    }
}

/// Parse a for tag such as `{% for users as user %}`
///
/// The payload must be exactly `for <list> as <alias>`; any other token
/// structure is an expression syntax error rather than an invalid name.
pub fn parse_for_tag(tag: &str) -> Result<Node> {
    let payload = directive_payload(tag)?;
    let tokens: Vec<&str> = payload.split_whitespace().collect();

    match tokens.as_slice() {
        ["for", list, "as", alias] => Node::for_value(*list, *alias),
        _ => Err(Error::expression_syntax(format!(
            "unrecognized for expression '{}': expected 'for <list> as <alias>'",
            payload
        ))),
    }
}
