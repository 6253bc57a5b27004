//! The template registry and its rendering configuration.
//!
//! An `Environment` owns every compiled template. Templates are compiled
//! eagerly when added, so syntax errors surface at registration time and a
//! failed registration leaves any previous template of the same name in
//! place. Configuration changes apply to templates compiled afterwards and
//! to every subsequent render.

use jinx_value::Error;
use tracing::debug;

use crate::config::{EnvConfig, UndefinedBehavior};
use crate::errors::from_engine_error;
use crate::syntax::SyntaxConfig;

/// Owner of compiled templates and rendering configuration.
pub struct Environment {
    pub(crate) engine: minijinja::Environment<'static>,
    config: EnvConfig,
}

impl Environment {
    /// An empty environment with default configuration.
    pub fn new() -> Self {
        let mut env = Environment {
            engine: minijinja::Environment::new(),
            config: EnvConfig::default(),
        };
        env.apply_flags();
        env
    }

    /// An empty environment built from a configuration snapshot.
    ///
    /// Fails only if the syntax configuration is invalid.
    pub fn with_config(config: EnvConfig) -> Result<Self, Error> {
        let syntax = config.syntax.to_engine()?;
        let mut env = Environment {
            engine: minijinja::Environment::new(),
            config,
        };
        env.engine.set_syntax(syntax);
        env.apply_flags();
        Ok(env)
    }

    /// Current configuration snapshot.
    #[inline]
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    fn apply_flags(&mut self) {
        let EnvConfig {
            debug,
            keep_trailing_newline,
            lstrip_blocks,
            trim_blocks,
            undefined_behavior,
            recursion_limit,
            syntax: _,
        } = self.config;
        self.engine.set_debug(debug);
        self.engine.set_keep_trailing_newline(keep_trailing_newline);
        self.engine.set_lstrip_blocks(lstrip_blocks);
        self.engine.set_trim_blocks(trim_blocks);
        self.engine
            .set_undefined_behavior(undefined_behavior.to_engine());
        self.engine.set_recursion_limit(recursion_limit);
        self.config.recursion_limit = self.engine.recursion_limit();
    }

    // Template Registry

    /// Compile `source` and register it under `name`, replacing any
    /// template of that name.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), Error> {
        let replacing = self.has_template(name);
        self.engine
            .add_template_owned(name.to_owned(), source.to_owned())
            .map_err(|err| {
                let err = from_engine_error(&err, self.config.debug);
                debug!(template = name, error = %err, "template rejected");
                if err.name().is_none() {
                    err.with_name(name)
                } else {
                    err
                }
            })?;
        debug!(template = name, replaced = replacing, "template registered");
        Ok(())
    }

    /// Drop the template registered under `name`.
    ///
    /// Returns whether a template was actually removed.
    pub fn remove_template(&mut self, name: &str) -> bool {
        let present = self.has_template(name);
        if present {
            self.engine.remove_template(name);
        }
        debug!(template = name, removed = present, "template removed");
        present
    }

    /// Drop every registered template.
    pub fn clear_templates(&mut self) {
        self.engine.clear_templates();
        debug!("templates cleared");
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.engine.get_template(name).is_ok()
    }

    // Configuration

    pub fn set_debug(&mut self, enabled: bool) {
        self.config.debug = enabled;
        self.engine.set_debug(enabled);
        debug!(enabled, "debug mode");
    }

    /// Keep the final newline of a template instead of stripping it.
    pub fn set_keep_trailing_newline(&mut self, yes: bool) {
        self.config.keep_trailing_newline = yes;
        self.engine.set_keep_trailing_newline(yes);
        debug!(yes, "keep_trailing_newline");
    }

    /// Strip whitespace before a block tag at the start of a line.
    pub fn set_lstrip_blocks(&mut self, yes: bool) {
        self.config.lstrip_blocks = yes;
        self.engine.set_lstrip_blocks(yes);
        debug!(yes, "lstrip_blocks");
    }

    /// Remove the first newline after a block tag.
    pub fn set_trim_blocks(&mut self, yes: bool) {
        self.config.trim_blocks = yes;
        self.engine.set_trim_blocks(yes);
        debug!(yes, "trim_blocks");
    }

    /// Set the runtime depth limit.
    ///
    /// The engine caps the limit at [`DEFAULT_RECURSION_LIMIT`](crate::DEFAULT_RECURSION_LIMIT); the snapshot
    /// records the limit actually in effect.
    pub fn set_recursion_limit(&mut self, limit: usize) {
        self.engine.set_recursion_limit(limit);
        self.config.recursion_limit = self.engine.recursion_limit();
        debug!(
            requested = limit,
            effective = self.config.recursion_limit,
            "recursion_limit"
        );
    }

    pub fn set_undefined_behavior(&mut self, behavior: UndefinedBehavior) {
        self.config.undefined_behavior = behavior;
        self.engine.set_undefined_behavior(behavior.to_engine());
        debug!(?behavior, "undefined_behavior");
    }

    /// Replace the syntax used for templates compiled from now on.
    ///
    /// Already registered templates keep the syntax they were compiled with.
    pub fn set_syntax(&mut self, syntax: SyntaxConfig) -> Result<(), Error> {
        let engine_syntax = syntax.to_engine().map_err(|err| {
            debug!(error = %err, "syntax rejected");
            Error::from(err)
        })?;
        self.engine.set_syntax(engine_syntax);
        debug!(?syntax, "syntax");
        self.config.syntax = syntax;
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
