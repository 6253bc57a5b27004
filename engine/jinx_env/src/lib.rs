//! Jinx Env - template registry and rendering pipeline.
//!
//! This crate provides:
//! - `Environment`: compiled templates plus rendering configuration
//! - `EnvConfig`, `SyntaxConfig`, `UndefinedBehavior`: the configuration surface
//! - The lookup → bind → execute pipeline (`render_template`,
//!   `render_named_str`, `eval_expr`)
//!
//! The template language itself (grammar, VM, filters and tests) is provided
//! by `minijinja`. Host values are handed to it without copying containers;
//! see the `bridge` module.

mod bridge;
mod config;
mod environment;
mod errors;
mod render;
mod syntax;

pub use config::{EnvConfig, UndefinedBehavior, DEFAULT_RECURSION_LIMIT};
pub use environment::Environment;
pub use render::RenderStage;
pub use syntax::{SyntaxConfig, SyntaxConfigError};
