//! Delimiter configuration for template compilation.

use jinx_value::{Error, ErrorKind};
use thiserror::Error as ThisError;

/// The eight configurable markers of the template syntax.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxConfig {
    pub block_start: String,
    pub block_end: String,
    pub variable_start: String,
    pub variable_end: String,
    pub comment_start: String,
    pub comment_end: String,
    /// Prefix that turns a whole line into a statement, e.g. `#`.
    pub line_statement_prefix: Option<String>,
    /// Prefix that turns the rest of a line into a comment, e.g. `##`.
    pub line_comment_prefix: Option<String>,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        SyntaxConfig {
            block_start: "{%".into(),
            block_end: "%}".into(),
            variable_start: "{{".into(),
            variable_end: "}}".into(),
            comment_start: "{#".into(),
            comment_end: "#}".into(),
            line_statement_prefix: None,
            line_comment_prefix: None,
        }
    }
}

/// Why a syntax configuration was rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SyntaxConfigError {
    #[error("the {0} delimiter must not be empty")]
    EmptyDelimiter(&'static str),
    #[error("the {first} and {second} start markers are both {marker:?}")]
    ConflictingDelimiters {
        first: &'static str,
        second: &'static str,
        marker: String,
    },
    #[error("the {0} prefix must not be empty")]
    EmptyPrefix(&'static str),
    #[error("the {prefix} prefix {value:?} collides with the {marker} start marker")]
    PrefixCollision {
        prefix: &'static str,
        marker: &'static str,
        value: String,
    },
    #[error("{0}")]
    Rejected(String),
}

impl From<SyntaxConfigError> for Error {
    fn from(err: SyntaxConfigError) -> Self {
        Error::new(ErrorKind::InvalidOperation, err.to_string())
    }
}

impl SyntaxConfig {
    /// Check the configuration for empty or colliding markers.
    pub fn validate(&self) -> Result<(), SyntaxConfigError> {
        let delimiters = [
            ("block start", &self.block_start),
            ("block end", &self.block_end),
            ("variable start", &self.variable_start),
            ("variable end", &self.variable_end),
            ("comment start", &self.comment_start),
            ("comment end", &self.comment_end),
        ];
        if let Some((name, _)) = delimiters.iter().find(|(_, d)| d.is_empty()) {
            return Err(SyntaxConfigError::EmptyDelimiter(*name));
        }

        let starts = self.start_markers();
        for (idx, (first, a)) in starts.iter().enumerate() {
            if let Some((second, _)) = starts[idx + 1..].iter().find(|(_, b)| a == b) {
                return Err(SyntaxConfigError::ConflictingDelimiters {
                    first: *first,
                    second: *second,
                    marker: (*a).to_owned(),
                });
            }
        }

        let prefixes = [
            ("line statement", self.line_statement_prefix.as_deref()),
            ("line comment", self.line_comment_prefix.as_deref()),
        ];
        for (prefix, value) in prefixes {
            let Some(value) = value else { continue };
            if value.is_empty() {
                return Err(SyntaxConfigError::EmptyPrefix(prefix));
            }
            if let Some((marker, _)) = starts.iter().find(|(_, start)| *start == value) {
                return Err(SyntaxConfigError::PrefixCollision {
                    prefix,
                    marker: *marker,
                    value: value.to_owned(),
                });
            }
        }
        Ok(())
    }

    fn start_markers(&self) -> [(&'static str, &str); 3] {
        [
            ("block", self.block_start.as_str()),
            ("variable", self.variable_start.as_str()),
            ("comment", self.comment_start.as_str()),
        ]
    }

    /// Validate and convert into the template language's configuration.
    pub(crate) fn to_engine(&self) -> Result<minijinja::syntax::SyntaxConfig, SyntaxConfigError> {
        self.validate()?;
        let mut builder = minijinja::syntax::SyntaxConfig::builder();
        builder
            .block_delimiters(self.block_start.clone(), self.block_end.clone())
            .variable_delimiters(self.variable_start.clone(), self.variable_end.clone())
            .comment_delimiters(self.comment_start.clone(), self.comment_end.clone());
        if let Some(prefix) = &self.line_statement_prefix {
            builder.line_statement_prefix(prefix.clone());
        }
        if let Some(prefix) = &self.line_comment_prefix {
            builder.line_comment_prefix(prefix.clone());
        }
        builder
            .build()
            .map_err(|err| SyntaxConfigError::Rejected(err.to_string()))
    }
}
