//! Structured errors shared by every layer of the engine.
//!
//! An `Error` carries a typed [`ErrorKind`] plus optional location
//! information (template name and line). The same type flows out of the
//! value model, the environment and the rendering pipeline, and is what the
//! C boundary stores in its error slot.

use std::borrow::Cow;
use std::fmt;

/// Typed error category.
///
/// The declaration order is part of the C boundary contract (`jx_err_kind`)
/// and must not be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A non-primitive value was used where a primitive is required.
    NonPrimitive,
    /// The value cannot be used as a map key.
    NonKey,
    /// The operation does not apply to the value or configuration.
    InvalidOperation,
    /// A template or expression failed to compile.
    SyntaxError,
    /// No template is registered under the requested name.
    TemplateNotFound,
    /// A callable received more arguments than it accepts.
    TooManyArguments,
    /// A callable is missing a required argument.
    MissingArgument,
    UnknownFilter,
    UnknownFunction,
    UnknownTest,
    UnknownMethod,
    /// Malformed escape sequence in a string literal.
    BadEscape,
    /// An undefined value was used where the policy forbids it.
    UndefinedError,
    /// A value could not be converted into the form an operation needs.
    BadSerialization,
    /// An include target was invalid.
    BadInclude,
    /// An error unwound out of block evaluation (including recursion limits).
    EvalBlock,
    /// Destructuring did not match the value's shape.
    CannotUnpack,
    /// The output sink failed.
    WriteFailure,
    /// Anything that does not fit the categories above.
    Unknown,
}

impl ErrorKind {
    /// Human readable description used as the prefix of rendered errors.
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::NonPrimitive => "not a primitive",
            ErrorKind::NonKey => "not a key type",
            ErrorKind::InvalidOperation => "invalid operation",
            ErrorKind::SyntaxError => "syntax error",
            ErrorKind::TemplateNotFound => "template not found",
            ErrorKind::TooManyArguments => "too many arguments",
            ErrorKind::MissingArgument => "missing argument",
            ErrorKind::UnknownFilter => "unknown filter",
            ErrorKind::UnknownFunction => "unknown function",
            ErrorKind::UnknownTest => "unknown test",
            ErrorKind::UnknownMethod => "unknown method",
            ErrorKind::BadEscape => "bad string escape",
            ErrorKind::UndefinedError => "undefined value",
            ErrorKind::BadSerialization => "could not serialize value",
            ErrorKind::BadInclude => "could not render include",
            ErrorKind::EvalBlock => "could not evaluate block",
            ErrorKind::CannotUnpack => "cannot unpack",
            ErrorKind::WriteFailure => "failed to write output",
            ErrorKind::Unknown => "unknown error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// An engine error with optional source location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    detail: Option<Cow<'static, str>>,
    name: Option<String>,
    line: Option<usize>,
    debug_info: Option<String>,
    causes: Vec<String>,
}

impl Error {
    /// Create an error of the given kind with a detail message.
    pub fn new(kind: ErrorKind, detail: impl Into<Cow<'static, str>>) -> Self {
        Error {
            kind,
            detail: Some(detail.into()),
            name: None,
            line: None,
            debug_info: None,
            causes: Vec::new(),
        }
    }

    /// Attach the name of the template the error originated in.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach the 1-based line the error originated on.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach a pre-rendered source excerpt.
    #[must_use]
    pub fn with_debug_info(mut self, info: impl Into<String>) -> Self {
        self.debug_info = Some(info.into());
        self
    }

    /// Append a message to the cause chain (outermost first).
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Name of the template the error belongs to, if known.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Source excerpt captured when the environment ran in debug mode.
    #[inline]
    pub fn debug_info(&self) -> Option<&str> {
        self.debug_info.as_deref()
    }

    /// Messages of the errors that caused this one, outermost first.
    #[inline]
    pub fn causes(&self) -> &[String] {
        &self.causes
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error {
            kind,
            detail: None,
            name: None,
            line: None,
            debug_info: None,
            causes: Vec::new(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {detail}", self.kind)?,
            None => write!(f, "{}", self.kind)?,
        }
        if let Some(name) = &self.name {
            match self.line {
                Some(line) => write!(f, " (in {name}:{line})")?,
                None => write!(f, " (in {name})")?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for Error {}
