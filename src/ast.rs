use crate::error::{Error, Result};
use crate::path::{is_valid_name, is_valid_path};
use std::fmt;

/// Kind of an AST node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Value,
    If,
    Elif,
    Else,
    For,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Text => "text",
            NodeKind::Value => "value",
            NodeKind::If => "if",
            NodeKind::Elif => "elif",
            NodeKind::Else => "else",
            NodeKind::For => "for",
        };
        f.write_str(name)
    }
}

/// AST node types for templates
///
/// Names are stored raw and resolved on every render, so the same tree can
/// produce different output for different data.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Plain text content
    Text(String),

    /// Value substitution {$ path }
    Value { path: String },

    /// Conditional block {% if name %}
    If {
        condition: String,
        children: Vec<Node>,
    },

    /// Alternative branch {% elif name %}, nested inside the preceding if/elif
    Elif {
        condition: String,
        children: Vec<Node>,
    },

    /// Fallback branch {% else %}
    Else { children: Vec<Node> },

    /// Loop block {% for list as alias %}
    For {
        list: String,
        alias: String,
        children: Vec<Node>,
    },
}

fn check_path(path: &str, what: &str) -> Result<()> {
    if is_valid_path(path) {
        Ok(())
    } else {
        Err(Error::invalid_tag(format!(
            "{} tag name '{}' contains invalid characters",
            what, path
        )))
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn value(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        check_path(&path, "Variable")?;
        Ok(Node::Value { path })
    }

    pub fn if_value(condition: impl Into<String>) -> Result<Self> {
        let condition = condition.into();
        check_path(&condition, "If expression")?;
        Ok(Node::If {
            condition,
            children: Vec::new(),
        })
    }

    pub fn elif_value(condition: impl Into<String>) -> Result<Self> {
        let condition = condition.into();
        check_path(&condition, "Elif expression")?;
        Ok(Node::Elif {
            condition,
            children: Vec::new(),
        })
    }

    pub fn else_value() -> Self {
        Node::Else {
            children: Vec::new(),
        }
    }

    /// Create a for loop node; the alias must be a plain name
    pub fn for_value(list: impl Into<String>, alias: impl Into<String>) -> Result<Self> {
        let list = list.into();
        let alias = alias.into();
        check_path(&list, "For expression list")?;
        if !is_valid_name(&alias) {
            return Err(Error::invalid_tag(format!(
                "For expression alias '{}' contains invalid characters",
                alias
            )));
        }
        Ok(Node::For {
            list,
            alias,
            children: Vec::new(),
        })
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Text(_) => NodeKind::Text,
            Node::Value { .. } => NodeKind::Value,
            Node::If { .. } => NodeKind::If,
            Node::Elif { .. } => NodeKind::Elif,
            Node::Else { .. } => NodeKind::Else,
            Node::For { .. } => NodeKind::For,
        }
    }

    /// True for the nodes that start an alternative branch of a conditional
    pub fn is_branch(&self) -> bool {
        matches!(self, Node::Elif { .. } | Node::Else { .. })
    }

    /// Child nodes; empty for text and value nodes
    pub fn children(&self) -> &[Node] {
        match self {
            Node::If { children, .. }
            | Node::Elif { children, .. }
            | Node::Else { children }
            | Node::For { children, .. } => children,
            Node::Text(_) | Node::Value { .. } => &[],
        }
    }

    /// Attach the ordered child list of a composite node
    pub fn set_children(&mut self, nodes: Vec<Node>) -> Result<()> {
        let kind = self.kind();
        match self {
            Node::If { children, .. }
            | Node::Elif { children, .. }
            | Node::Else { children }
            | Node::For { children, .. } => {
                *children = nodes;
                Ok(())
            }
            Node::Text(_) | Node::Value { .. } => Err(Error::invalid_tag(format!(
                "{} nodes cannot have children",
                kind
            ))),
        }
    }
}
