//! The rendering pipeline.
//!
//! Every render call walks the same stages:
//!
//! 1. **Lookup** resolves the template (or compiles the ad hoc source).
//! 2. **Bind** converts the context into the root scope.
//! 3. **Execute** runs the template under the environment's policies.
//!
//! A failure in any stage ends that call only. The environment is never
//! mutated by rendering, so it stays usable after recursion-limit failures
//! and other fatal runtime errors.

use std::fmt;

use jinx_value::{Error, Value};
use tracing::{debug, trace};

use crate::bridge::{bind_context, from_engine};
use crate::environment::Environment;
use crate::errors::{from_engine_error, template_not_found};

/// Stage of a render call, used in trace events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStage {
    Lookup,
    Bind,
    Execute,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderStage::Lookup => "lookup",
            RenderStage::Bind => "bind",
            RenderStage::Execute => "execute",
        })
    }
}

impl Environment {
    /// Render the registered template `name` against `ctx`.
    #[tracing::instrument(level = "debug", skip_all, fields(template = name))]
    pub fn render_template(&self, name: &str, ctx: &Value) -> Result<String, Error> {
        trace!(stage = %RenderStage::Lookup);
        let template = self.engine.get_template(name).map_err(|err| {
            if err.kind() == minijinja::ErrorKind::TemplateNotFound {
                template_not_found(name)
            } else {
                self.engine_error(&err)
            }
        });
        let template = report(template)?;

        trace!(stage = %RenderStage::Bind);
        let root = report(bind_context(ctx))?;

        trace!(stage = %RenderStage::Execute);
        let output = template.render(root).map_err(|err| self.engine_error(&err));
        let output = report(output)?;
        debug!(bytes = output.len(), "rendered");
        Ok(output)
    }

    /// Compile `source` under `name` and render it once against `ctx`.
    ///
    /// The template is not registered.
    #[tracing::instrument(level = "debug", skip_all, fields(template = name))]
    pub fn render_named_str(&self, name: &str, source: &str, ctx: &Value) -> Result<String, Error> {
        trace!(stage = %RenderStage::Bind);
        let root = report(bind_context(ctx))?;

        // Compilation happens inside the engine call, so lookup and execute
        // are a single step here.
        trace!(stage = %RenderStage::Execute);
        let output = self
            .engine
            .render_named_str(name, source, root)
            .map_err(|err| {
                let err = self.engine_error(&err);
                if err.name().is_none() {
                    err.with_name(name)
                } else {
                    err
                }
            });
        let output = report(output)?;
        debug!(bytes = output.len(), "rendered");
        Ok(output)
    }

    /// Compile `expr` as a standalone expression and evaluate it against `ctx`.
    ///
    /// Callers at the C boundary turn a failure into an invalid value.
    #[tracing::instrument(level = "debug", skip_all, fields(expr = expr))]
    pub fn eval_expr(&self, expr: &str, ctx: &Value) -> Result<Value, Error> {
        trace!(stage = %RenderStage::Lookup);
        let compiled = self
            .engine
            .compile_expression_owned(expr.to_owned())
            .map_err(|err| self.engine_error(&err));
        let compiled = report(compiled)?;

        trace!(stage = %RenderStage::Bind);
        let root = report(bind_context(ctx))?;

        trace!(stage = %RenderStage::Execute);
        let result = compiled.eval(root).map_err(|err| self.engine_error(&err));
        let result = report(result)?;
        report(from_engine(&result))
    }

    fn engine_error(&self, err: &minijinja::Error) -> Error {
        from_engine_error(err, self.config().debug)
    }
}

fn report<T>(result: Result<T, Error>) -> Result<T, Error> {
    if let Err(err) = &result {
        debug!(kind = ?err.kind(), error = %err, "render failed");
    }
    result
}

#[cfg(test)]
mod tests;
