//! Tag name grammar and path resolution
//!
//! A path expression is a `.`-separated list of segments, each a plain name
//! optionally followed by one `[N]` list index: `config.servers[1].name`.
//! [`PathSegments`] tokenizes a path lazily and [`resolve`] walks a scope
//! with it, so a name missing from an earlier map is reported before a later
//! segment is even looked at.

use crate::error::{Error, Result};
use crate::value::{DataMap, DataPtr, DataVector};
use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::Peekable;
use std::str::Split;

/// Plain names: letters, digits, `_` and `-`
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("path: invalid name pattern regex"));

/// Path expressions additionally allow `.`, `[` and `]`
static PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_.\[\]-]+$").expect("path: invalid path pattern regex")
});

/// Check a plain name such as a for-loop alias
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Check the character grammar of a path expression
pub fn is_valid_path(path: &str) -> bool {
    PATH_PATTERN.is_match(path) && !path.contains("..")
}

/// Parse an array index such as `[5]`
///
/// The value is returned signed; rejecting negative indexes is left to
/// [`parse_segment`].
pub fn parse_index(text: &str) -> Result<i64> {
    let inner = text
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            Error::invalid_tag(format!(
                "invalid array syntax '{}': index must be enclosed with []",
                text
            ))
        })?;

    inner.trim().parse::<i64>().map_err(|_| {
        Error::invalid_tag(format!(
            "invalid array index '{}': value must be an integer",
            text
        ))
    })
}

/// One segment of a path expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment<'a> {
    pub name: &'a str,
    pub index: Option<usize>,
}

/// Parse a single segment such as `servers[1]` into its name and index
pub fn parse_segment(text: &str) -> Result<PathSegment<'_>> {
    let (name, index) = match text.find('[') {
        None => (text, None),
        Some(pos) => {
            let index = parse_index(&text[pos..])?;
            let index = usize::try_from(index).map_err(|_| {
                Error::invalid_tag(format!(
                    "invalid array index '{}': value must not be negative",
                    text
                ))
            })?;
            (&text[..pos], Some(index))
        }
    };

    if name.is_empty() {
        return Err(Error::invalid_tag(format!(
            "invalid tag name '{}': segment has no name",
            text
        )));
    }
    if !is_valid_name(name) {
        return Err(Error::invalid_tag(format!(
            "invalid tag name '{}': name contains invalid characters",
            text
        )));
    }

    Ok(PathSegment { name, index })
}

/// Lazy tokenizer over the segments of a path expression
pub struct PathSegments<'a> {
    parts: Peekable<Split<'a, char>>,
}

impl<'a> PathSegments<'a> {
    pub fn new(path: &'a str) -> Self {
        Self {
            parts: path.split('.').peekable(),
        }
    }

    /// True once the last segment has been yielded
    pub fn is_finished(&mut self) -> bool {
        self.parts.peek().is_none()
    }
}

impl<'a> Iterator for PathSegments<'a> {
    type Item = Result<PathSegment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parts.next().map(parse_segment)
    }
}

/// Tokenize a whole path up front
pub fn tokenize_path(path: &str) -> Result<Vec<PathSegment<'_>>> {
    PathSegments::new(path).collect()
}

/// Index into a list entity
fn index_into<'s>(entry: &'s DataPtr, segment: &PathSegment<'_>, index: usize) -> Result<&'s DataPtr> {
    let items = entry.as_list().ok_or_else(|| {
        Error::invalid_tag(format!(
            "'{}' is a {}: only lists support indexing",
            segment.name,
            entry.kind()
        ))
    })?;

    items.get(index).ok_or_else(|| {
        Error::invalid_tag(format!(
            "'{}[{}]': index out of range (length {})",
            segment.name,
            index,
            items.len()
        ))
    })
}

/// Resolve a path expression against a scope
///
/// Every segment but the last must lead to a map, either directly or through
/// one list index. The last segment yields the entity itself, or a list
/// element when it carries an index.
pub fn resolve<'s>(path: &str, scope: &'s DataMap) -> Result<&'s DataPtr> {
    let mut segments = PathSegments::new(path);
    let mut current = scope;

    while let Some(segment) = segments.next() {
        let segment = segment?;
        let entry = current.get(segment.name).ok_or_else(|| {
            Error::missing_tag(format!("'{}' not found while resolving '{}'", segment.name, path))
        })?;

        if segments.is_finished() {
            return match segment.index {
                None => Ok(entry),
                Some(index) => index_into(entry, &segment, index),
            };
        }

        let next = match segment.index {
            None => entry,
            Some(index) => index_into(entry, &segment, index)?,
        };
        current = next.as_map().ok_or_else(|| {
            Error::invalid_tag(format!(
                "'{}' in '{}' does not match a map object",
                segment.name, path
            ))
        })?;
    }

    Err(Error::invalid_tag("empty tag name"))
}

/// Resolve a path that must name a string
pub fn resolve_string<'s>(path: &str, scope: &'s DataMap) -> Result<&'s str> {
    let entity = resolve(path, scope)?;
    entity.as_string().ok_or_else(|| {
        Error::invalid_tag(format!(
            "'{}' must reference a string, found {}",
            path,
            entity.kind()
        ))
    })
}

/// Resolve a path that must name a list
pub fn resolve_list<'s>(path: &str, scope: &'s DataMap) -> Result<&'s DataVector> {
    let entity = resolve(path, scope)?;
    entity.as_list().ok_or_else(|| {
        Error::invalid_tag(format!(
            "'{}' must reference a list, found {}",
            path,
            entity.kind()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Entity;

    fn scope(entries: Vec<(&str, Entity)>) -> DataMap {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.into_ptr()))
            .collect()
    }

    fn map(entries: Vec<(&str, Entity)>) -> Entity {
        Entity::Map(scope(entries))
    }

    #[test]
    fn test_name_grammar() {
        assert!(is_valid_name("azAZ09-_"));
        assert!(is_valid_name("user"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("foo bar"));
        assert!(!is_valid_name("foo&bar"));
        assert!(!is_valid_name("foo\0bar"));
        assert!(!is_valid_name("user.id"));
        assert!(!is_valid_name("user[0]"));
    }

    #[test]
    fn test_path_grammar() {
        assert!(is_valid_path("config.servers[1].name"));
        assert!(is_valid_path("a.b.c"));
        assert!(!is_valid_path("bad..name"));
        assert!(!is_valid_path("a...b"));
        assert!(!is_valid_path("foo bar"));
        assert!(!is_valid_path("a{b}"));
        assert!(!is_valid_path(""));
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("[5]").unwrap(), 5);
        assert_eq!(parse_index("[02]").unwrap(), 2);
        assert_eq!(parse_index("[-1]").unwrap(), -1);
        assert_eq!(parse_index("[ 3 ]").unwrap(), 3);

        for bad in ["[abc]", "[]", "[1.56]", "[0x01]", "5", "[5", "[[0]]"] {
            assert!(parse_index(bad).unwrap_err().is_invalid_tag(), "{}", bad);
        }
    }

    #[test]
    fn test_parse_segment() {
        assert_eq!(
            parse_segment("servers[1]").unwrap(),
            PathSegment {
                name: "servers",
                index: Some(1)
            }
        );
        assert_eq!(
            parse_segment("name").unwrap(),
            PathSegment {
                name: "name",
                index: None
            }
        );

        assert!(parse_segment("items[-1]").unwrap_err().is_invalid_tag());
        assert!(parse_segment("[1]").unwrap_err().is_invalid_tag());
        assert!(parse_segment("").unwrap_err().is_invalid_tag());
        assert!(parse_segment("servers[0]ips[1]").unwrap_err().is_invalid_tag());
        assert!(parse_segment("item0]").unwrap_err().is_invalid_tag());
    }

    #[test]
    fn test_tokenize_path() {
        let segments = tokenize_path("config.servers[1].name").unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].index, Some(1));
        assert_eq!(segments[2].name, "name");

        assert!(tokenize_path(".server").is_err());
        assert!(tokenize_path("server.[1]").is_err());
    }

    #[test]
    fn test_resolve_nested_maps() {
        let data = scope(vec![("a", map(vec![("b", map(vec![("c", "x".into())]))]))]);
        assert_eq!(resolve_string("a.b.c", &data).unwrap(), "x");
    }

    #[test]
    fn test_resolve_index() {
        let data = scope(vec![("a", vec!["p", "q", "r"].into())]);
        assert_eq!(resolve_string("a[2]", &data).unwrap(), "r");
        assert_eq!(resolve_string("a[00]", &data).unwrap(), "p");

        let err = resolve("a[5]", &data).unwrap_err();
        assert!(err.is_invalid_tag());
    }

    #[test]
    fn test_resolve_nested_path_with_index() {
        let servers = Entity::from(vec![
            map(vec![("name", "s0".into())]),
            map(vec![("name", "s1".into())]),
        ]);
        let data = scope(vec![("config", map(vec![("servers", servers)]))]);

        assert_eq!(resolve_string("config.servers[1].name", &data).unwrap(), "s1");
        assert!(resolve("config.servers[2].name", &data)
            .unwrap_err()
            .is_invalid_tag());
        // A list needs an index before it can be walked into
        assert!(resolve("config.servers.name", &data)
            .unwrap_err()
            .is_invalid_tag());
    }

    #[test]
    fn test_resolve_missing() {
        let data = scope(vec![("config", map(vec![("hostname", "localhost".into())]))]);

        assert!(resolve("user", &data).unwrap_err().is_missing_tag());
        assert!(resolve("config.port", &data).unwrap_err().is_missing_tag());
        // The missing name wins over a malformed later segment
        assert!(resolve("nope.items[x]", &data).unwrap_err().is_missing_tag());
    }

    #[test]
    fn test_resolve_wrong_shapes() {
        let data = scope(vec![
            ("item", "hello world".into()),
            ("config", map(vec![("hostname", "localhost".into())])),
        ]);

        // Indexing a string or a map
        assert!(resolve("item[0]", &data).unwrap_err().is_invalid_tag());
        assert!(resolve("config[0]", &data).unwrap_err().is_invalid_tag());
        // Walking through a string
        assert!(resolve("item.length", &data).unwrap_err().is_invalid_tag());
        // Wrong terminal kind
        assert!(resolve_string("config", &data).unwrap_err().is_invalid_tag());
        assert!(resolve_list("item", &data).unwrap_err().is_invalid_tag());
    }

    #[test]
    fn test_resolve_list() {
        let data = scope(vec![("users", vec!["John", "Jane"].into())]);
        let users = resolve_list("users", &data).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].as_string(), Some("Jane"));
    }
}
