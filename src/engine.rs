use crate::ast::Node;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::renderer::{RenderOptions, Renderer};
use crate::value::{data_from_json, DataMap};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A parsed template
///
/// The tree keeps names unresolved, so one template renders against any
/// number of data maps.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template text into a node tree
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let nodes = Parser::new(&source).parse()?;

        log::debug!("Parsed template into {} top-level nodes", nodes.len());

        Ok(Self { source, nodes })
    }

    /// Read and parse a template file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = fs::read_to_string(path_ref).map_err(|e| {
            Error::from(e).with_context(format!(
                "Failed to load template '{}'",
                path_ref.display()
            ))
        })?;

        log::debug!("Loaded template from: {}", path_ref.display());

        Self::parse(content).map_err(|e| {
            let message = format!("in template '{}': {}", path_ref.display(), e);
            e.with_context(message)
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn render(&self, data: &DataMap) -> Result<String> {
        Renderer::default().render(&self.nodes, data)
    }

    pub fn render_with(&self, data: &DataMap, options: &RenderOptions) -> Result<String> {
        Renderer::new(options.clone()).render(&self.nodes, data)
    }

    /// Render into an output sink; on error the sink may hold partial output
    pub fn render_to<W: fmt::Write>(&self, out: &mut W, data: &DataMap) -> Result<()> {
        Renderer::default().render_to(&self.nodes, out, data)
    }

    /// Render and write the result to a file
    ///
    /// The file is only written once rendering has fully succeeded.
    pub fn render_to_file<P: AsRef<Path>>(&self, path: P, data: &DataMap) -> Result<()> {
        let output = self.render(data)?;
        fs::write(path.as_ref(), output).map_err(|e| {
            Error::from(e).with_context(format!(
                "Failed to write rendered output to '{}'",
                path.as_ref().display()
            ))
        })
    }
}

/// Render template text against a data map in one step
pub fn render(text: &str, data: &DataMap) -> Result<String> {
    Template::parse(text)?.render(data)
}

/// Render template text against JSON data; the top level must be an object
pub fn render_json(text: &str, data: &Value) -> Result<String> {
    let data = data_from_json(data)?;
    render(text, &data)
}

/// Template engine loading templates from a configured directory
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    renderer: Renderer,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let renderer = Renderer::new(config.render_options());
        Self { config, renderer }
    }

    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(EngineConfig::from_file(path)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the path to a template file
    fn template_path(&self, name: &str) -> PathBuf {
        let mut path = PathBuf::from(&self.config.directory);
        let name = name.strip_prefix('/').unwrap_or(name);

        if Path::new(name).extension().is_some() {
            path.push(name);
        } else {
            path.push(format!("{}.{}", name, self.config.extension));
        }

        path
    }

    /// Load and parse a template by name; nothing is cached
    pub fn load(&self, name: &str) -> Result<Template> {
        Template::from_file(self.template_path(name))
    }

    pub fn render(&self, name: &str, data: &DataMap) -> Result<String> {
        let template = self.load(name)?;
        self.renderer.render(template.nodes(), data)
    }

    pub fn render_string(&self, text: &str, data: &DataMap) -> Result<String> {
        let template = Template::parse(text)?;
        self.renderer.render(template.nodes(), data)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
