//! Error translation from the template language into `jinx_value::Error`.
//!
//! Every failure the pipeline reports goes through this module, so the
//! mapping between the two kind taxonomies lives in one place.

use std::error::Error as _;

use jinx_value::{Error, ErrorKind};
use minijinja::ErrorKind as EngineKind;

/// Runtime detail the template language uses when its depth counter overflows.
const RECURSION_LIMIT_DETAIL: &str = "recursion limit exceeded";

/// Translate an engine error, keeping location, cause chain and (in debug
/// mode) the rendered source excerpt.
pub(crate) fn from_engine_error(err: &minijinja::Error, debug: bool) -> Error {
    let kind = if hit_recursion_limit(err) {
        ErrorKind::EvalBlock
    } else {
        translate_kind(err.kind())
    };

    let mut out = match err.detail() {
        Some(detail) => Error::new(kind, detail.to_owned()),
        None => Error::from(kind),
    };
    if let Some(name) = err.name() {
        out = out.with_name(name);
    }
    if let Some(line) = err.line() {
        out = out.with_line(line);
    }
    if debug {
        let info = err.display_debug_info().to_string();
        if !info.trim().is_empty() {
            out = out.with_debug_info(info);
        }
    }

    let mut source = err.source();
    while let Some(cause) = source {
        out = out.with_cause(cause.to_string());
        source = cause.source();
    }
    out
}

/// Whether the error, or anything in its cause chain, is the depth counter
/// overflowing.
fn hit_recursion_limit(err: &minijinja::Error) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if err.kind() == EngineKind::InvalidOperation && err.detail() == Some(RECURSION_LIMIT_DETAIL)
        {
            return true;
        }
        current = err
            .source()
            .and_then(|cause| cause.downcast_ref::<minijinja::Error>());
    }
    false
}

/// Map an engine error kind onto the host taxonomy.
pub(crate) fn translate_kind(kind: EngineKind) -> ErrorKind {
    match kind {
        EngineKind::NonPrimitive => ErrorKind::NonPrimitive,
        EngineKind::NonKey => ErrorKind::NonKey,
        EngineKind::InvalidOperation | EngineKind::InvalidDelimiter => {
            ErrorKind::InvalidOperation
        }
        EngineKind::SyntaxError => ErrorKind::SyntaxError,
        EngineKind::TemplateNotFound => ErrorKind::TemplateNotFound,
        EngineKind::TooManyArguments => ErrorKind::TooManyArguments,
        EngineKind::MissingArgument => ErrorKind::MissingArgument,
        EngineKind::UnknownFilter => ErrorKind::UnknownFilter,
        EngineKind::UnknownFunction => ErrorKind::UnknownFunction,
        EngineKind::UnknownTest => ErrorKind::UnknownTest,
        EngineKind::UnknownMethod => ErrorKind::UnknownMethod,
        EngineKind::BadEscape => ErrorKind::BadEscape,
        EngineKind::UndefinedError => ErrorKind::UndefinedError,
        EngineKind::BadSerialization | EngineKind::CannotDeserialize => {
            ErrorKind::BadSerialization
        }
        EngineKind::BadInclude => ErrorKind::BadInclude,
        EngineKind::EvalBlock => ErrorKind::EvalBlock,
        EngineKind::CannotUnpack => ErrorKind::CannotUnpack,
        EngineKind::WriteFailure => ErrorKind::WriteFailure,
        _ => ErrorKind::Unknown,
    }
}

/// The registry has no template under `name`.
pub(crate) fn template_not_found(name: &str) -> Error {
    Error::new(
        ErrorKind::TemplateNotFound,
        format!("template {name:?} does not exist"),
    )
    .with_name(name)
}
