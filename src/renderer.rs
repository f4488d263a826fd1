use crate::ast::Node;
use crate::error::{Error, Result};
use crate::path::{resolve_list, resolve_string};
use crate::value::DataMap;
use std::fmt::Write;
use std::sync::Arc;

/// Options that change how a tree is rendered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Propagate a missing value tag as an error instead of emitting nothing
    pub strict_missing: bool,
}

/// Check whether a conditional name is bound in the scope
///
/// Only presence is tested, never the bound value, and the name is looked up
/// as a literal key with no path resolution.
pub fn condition_holds(name: &str, scope: &DataMap) -> bool {
    scope.contains_key(name)
}

/// Template renderer
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a list of nodes to a string
    pub fn render(&self, nodes: &[Node], scope: &DataMap) -> Result<String> {
        let mut output = String::new();
        self.render_to(nodes, &mut output, scope)?;
        Ok(output)
    }

    /// Render a list of nodes into an output sink
    ///
    /// On error the sink may already hold part of the output; callers should
    /// discard it.
    pub fn render_to<W: Write>(&self, nodes: &[Node], out: &mut W, scope: &DataMap) -> Result<()> {
        self.render_nodes(nodes, out, scope)
    }

    fn render_nodes(&self, nodes: &[Node], out: &mut dyn Write, scope: &DataMap) -> Result<()> {
        for node in nodes {
            self.render_node(node, out, scope)?;
        }
        Ok(())
    }

    /// Render a single node
    pub fn render_node(&self, node: &Node, out: &mut dyn Write, scope: &DataMap) -> Result<()> {
        match node {
            Node::Text(text) => out.write_str(text)?,

            Node::Value { path } => match resolve_string(path, scope) {
                Ok(value) => out.write_str(value)?,
                Err(err) if err.is_missing_tag() && !self.options.strict_missing => {
                    log::trace!("Skipping value tag '{}': {}", path, err);
                }
                Err(err) => return Err(err),
            },

            Node::If {
                condition,
                children,
            }
            | Node::Elif {
                condition,
                children,
            } => self.render_conditional(condition, children, out, scope)?,

            Node::Else { children } => self.render_nodes(children, out, scope)?,

            Node::For {
                list,
                alias,
                children,
            } => self.render_loop(list, alias, children, out, scope)?,
        }

        Ok(())
    }

    /// Render an if or elif node
    ///
    /// When the condition holds, children up to the first elif/else are
    /// rendered. Otherwise only the elif/else children are, each applying its
    /// own rule. The tree builder nests the rest of a chain inside each elif,
    /// so at most one branch produces output.
    fn render_conditional(
        &self,
        condition: &str,
        children: &[Node],
        out: &mut dyn Write,
        scope: &DataMap,
    ) -> Result<()> {
        if condition_holds(condition, scope) {
            for child in children.iter().take_while(|child| !child.is_branch()) {
                self.render_node(child, out, scope)?;
            }
        } else {
            for child in children.iter().filter(|child| child.is_branch()) {
                self.render_node(child, out, scope)?;
            }
        }
        Ok(())
    }

    /// Render a for node once per list element with the alias bound
    fn render_loop(
        &self,
        list: &str,
        alias: &str,
        children: &[Node],
        out: &mut dyn Write,
        scope: &DataMap,
    ) -> Result<()> {
        let items = resolve_list(list, scope)?;
        if scope.contains_key(alias) {
            return Err(Error::invalid_tag(format!(
                "For expression alias '{}' collides with an existing name",
                alias
            )));
        }

        log::trace!("Rendering loop over '{}' ({} items)", list, items.len());

        // The copy shares every payload with the enclosing scope
        let mut inner = scope.clone();
        for item in items {
            inner.insert(alias.to_string(), Arc::clone(item));
            self.render_nodes(children, out, &inner)?;
        }

        Ok(())
    }
}
