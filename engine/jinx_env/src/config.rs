//! Environment settings.

use crate::syntax::SyntaxConfig;

/// Default runtime depth limit for recursion and includes.
pub const DEFAULT_RECURSION_LIMIT: usize = 500;

/// How use of an undefined value is treated during rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UndefinedBehavior {
    /// Undefined values render as empty and are falsy.
    #[default]
    Lenient,
    /// Any use of an undefined value other than a truthiness check fails.
    Strict,
    /// Lookups on undefined values yield undefined instead of failing.
    Chainable,
}

impl UndefinedBehavior {
    pub(crate) fn to_engine(self) -> minijinja::UndefinedBehavior {
        match self {
            UndefinedBehavior::Lenient => minijinja::UndefinedBehavior::Lenient,
            UndefinedBehavior::Strict => minijinja::UndefinedBehavior::Strict,
            UndefinedBehavior::Chainable => minijinja::UndefinedBehavior::Chainable,
        }
    }
}

/// Snapshot of every environment setting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    pub debug: bool,
    pub keep_trailing_newline: bool,
    pub lstrip_blocks: bool,
    pub trim_blocks: bool,
    pub undefined_behavior: UndefinedBehavior,
    pub recursion_limit: usize,
    pub syntax: SyntaxConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            debug: false,
            keep_trailing_newline: false,
            lstrip_blocks: false,
            trim_blocks: false,
            undefined_behavior: UndefinedBehavior::Lenient,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            syntax: SyntaxConfig::default(),
        }
    }
}
