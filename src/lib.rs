//! tagtree - a small text template engine
//!
//! Templates mix literal text with two kinds of tags:
//! - `{$ path }` substitutes a string found by a dotted/indexed path such as
//!   `config.servers[1].name`
//! - `{% if name %}` / `{% elif name %}` / `{% else %}` / `{% endif %}` pick a
//!   branch by whether a name is bound, and `{% for list as alias %}` /
//!   `{% endfor %}` repeat a block per list element
//!
//! ```
//! use tagtree::{DataMap, Entity};
//!
//! let mut data = DataMap::new();
//! data.insert("name".to_string(), Entity::from("World").into_ptr());
//!
//! let output = tagtree::render("Hello {$ name }!", &data).unwrap();
//! assert_eq!(output, "Hello World!");
//! ```

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod renderer;
pub mod tags;
pub mod value;

pub use ast::{Node, NodeKind};
pub use config::EngineConfig;
pub use engine::{render, render_json, Engine, Template};
pub use error::{Error, Result};
pub use renderer::{RenderOptions, Renderer};
pub use value::{data_from_json, DataMap, DataPtr, DataVector, Entity, EntityKind};
