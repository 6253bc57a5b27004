//! Environment lifecycle, configuration and rendering entry points.

use std::ffi::{c_char, CString};

use jinx_env::{Environment, SyntaxConfig, UndefinedBehavior};
use jinx_value::{Error, Value};

use crate::guard::{guard, guard_or, into_c_string, non_null, opt_str_arg, str_arg};
use crate::handle::jx_value;
use crate::logging::init_tracing;

/// Opaque environment handle.
pub struct jx_env(Environment);

/// Undefined value policy, mirrored by `jx_undefined_behavior` in the header.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum jx_undefined_behavior {
    /// Undefined renders as empty and is falsy.
    JX_UNDEFINED_BEHAVIOR_LENIENT,
    /// Any use of undefined beyond a truthiness check fails.
    JX_UNDEFINED_BEHAVIOR_STRICT,
    /// Like lenient, and lookups on undefined yield undefined.
    JX_UNDEFINED_BEHAVIOR_CHAINABLE,
}

impl From<jx_undefined_behavior> for UndefinedBehavior {
    fn from(value: jx_undefined_behavior) -> Self {
        match value {
            jx_undefined_behavior::JX_UNDEFINED_BEHAVIOR_LENIENT => UndefinedBehavior::Lenient,
            jx_undefined_behavior::JX_UNDEFINED_BEHAVIOR_STRICT => UndefinedBehavior::Strict,
            jx_undefined_behavior::JX_UNDEFINED_BEHAVIOR_CHAINABLE => UndefinedBehavior::Chainable,
        }
    }
}

/// Template delimiters.
///
/// A null delimiter keeps the standard one; a null line prefix disables
/// that feature.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct jx_syntax_config {
    pub block_start: *const c_char,
    pub block_end: *const c_char,
    pub variable_start: *const c_char,
    pub variable_end: *const c_char,
    pub comment_start: *const c_char,
    pub comment_end: *const c_char,
    pub line_statement_prefix: *const c_char,
    pub line_comment_prefix: *const c_char,
}

impl jx_syntax_config {
    fn to_syntax(self) -> Result<SyntaxConfig, Error> {
        let defaults = SyntaxConfig::default();
        let pick = |ptr: *const c_char, what: &'static str, default: String| {
            opt_str_arg(ptr, what).map(|s| s.map_or(default, str::to_owned))
        };
        Ok(SyntaxConfig {
            block_start: pick(self.block_start, "block_start", defaults.block_start)?,
            block_end: pick(self.block_end, "block_end", defaults.block_end)?,
            variable_start: pick(self.variable_start, "variable_start", defaults.variable_start)?,
            variable_end: pick(self.variable_end, "variable_end", defaults.variable_end)?,
            comment_start: pick(self.comment_start, "comment_start", defaults.comment_start)?,
            comment_end: pick(self.comment_end, "comment_end", defaults.comment_end)?,
            line_statement_prefix: opt_str_arg(self.line_statement_prefix, "line_statement_prefix")?
                .map(str::to_owned),
            line_comment_prefix: opt_str_arg(self.line_comment_prefix, "line_comment_prefix")?
                .map(str::to_owned),
        })
    }
}

fn env_ref<'a>(env: *const jx_env) -> Result<&'a Environment, Error> {
    non_null(env, "env")?;
    // SAFETY: non-null and produced by `jx_env_new`.
    Ok(unsafe { &(*env).0 })
}

fn env_mut<'a>(env: *mut jx_env) -> Result<&'a mut Environment, Error> {
    non_null(env, "env")?;
    // SAFETY: non-null, produced by `jx_env_new` and not aliased during the call.
    Ok(unsafe { &mut (*env).0 })
}

// ── Lifecycle ───────────────────────────────────────────────────────────

/// Allocate an empty environment with default configuration.
///
/// Release with `jx_env_free`.
#[no_mangle]
pub extern "C" fn jx_env_new() -> *mut jx_env {
    init_tracing();
    guard(|| Ok(Box::into_raw(Box::new(jx_env(Environment::new())))))
}

/// Destroy an environment and every template it holds. Null is ignored.
#[no_mangle]
pub extern "C" fn jx_env_free(env: *mut jx_env) {
    if env.is_null() {
        return;
    }
    // SAFETY: non-null and produced by `jx_env_new`; the host releases it once.
    drop(unsafe { Box::from_raw(env) });
}

// ── Template Registry ───────────────────────────────────────────────────

/// Compile `source` and register it as `name`, replacing any previous
/// template of that name.
///
/// On a syntax error the previous template stays registered.
#[no_mangle]
pub extern "C" fn jx_env_add_template(
    env: *mut jx_env,
    name: *const c_char,
    source: *const c_char,
) -> bool {
    guard(|| {
        let env = env_mut(env)?;
        let name = str_arg(name, "name")?;
        let source = str_arg(source, "source")?;
        env.add_template(name, source)?;
        Ok(true)
    })
}

/// Unregister a template. Removing an unknown name succeeds.
#[no_mangle]
pub extern "C" fn jx_env_remove_template(env: *mut jx_env, name: *const c_char) -> bool {
    guard(|| {
        let env = env_mut(env)?;
        env.remove_template(str_arg(name, "name")?);
        Ok(true)
    })
}

/// Unregister every template.
#[no_mangle]
pub extern "C" fn jx_env_clear_templates(env: *mut jx_env) -> bool {
    guard(|| {
        env_mut(env)?.clear_templates();
        Ok(true)
    })
}

// ── Configuration ───────────────────────────────────────────────────────

/// Attach source excerpts to errors.
#[no_mangle]
pub extern "C" fn jx_env_set_debug(env: *mut jx_env, val: bool) {
    guard(|| {
        env_mut(env)?.set_debug(val);
        Ok(())
    });
}

/// Keep the final newline of templates compiled from now on.
#[no_mangle]
pub extern "C" fn jx_env_set_keep_trailing_newline(env: *mut jx_env, val: bool) {
    guard(|| {
        env_mut(env)?.set_keep_trailing_newline(val);
        Ok(())
    });
}

/// Strip leading whitespace before block tags.
#[no_mangle]
pub extern "C" fn jx_env_set_lstrip_blocks(env: *mut jx_env, val: bool) {
    guard(|| {
        env_mut(env)?.set_lstrip_blocks(val);
        Ok(())
    });
}

/// Remove the first newline after a block tag.
#[no_mangle]
pub extern "C" fn jx_env_set_trim_blocks(env: *mut jx_env, val: bool) {
    guard(|| {
        env_mut(env)?.set_trim_blocks(val);
        Ok(())
    });
}

/// Limit recursion and include depth. Values above 500 are capped.
#[no_mangle]
pub extern "C" fn jx_env_set_recursion_limit(env: *mut jx_env, val: u32) {
    guard(|| {
        env_mut(env)?.set_recursion_limit(val as usize);
        Ok(())
    });
}

#[no_mangle]
pub extern "C" fn jx_env_set_undefined_behavior(env: *mut jx_env, val: jx_undefined_behavior) {
    guard(|| {
        env_mut(env)?.set_undefined_behavior(val.into());
        Ok(())
    });
}

/// Change the delimiters of templates compiled from now on.
///
/// Fails with `JX_ERR_KIND_INVALID_OPERATION` if the delimiters conflict;
/// the previous syntax then stays in effect.
#[no_mangle]
pub extern "C" fn jx_env_set_syntax_config(
    env: *mut jx_env,
    syntax: *const jx_syntax_config,
) -> bool {
    guard(|| {
        let env = env_mut(env)?;
        non_null(syntax, "syntax")?;
        // SAFETY: non-null; the host passes a readable struct.
        let syntax = unsafe { *syntax }.to_syntax()?;
        env.set_syntax(syntax)?;
        Ok(true)
    })
}

/// Fill `syntax` with the standard delimiters and no line prefixes.
///
/// The strings are static and must not be freed.
#[no_mangle]
pub extern "C" fn jx_syntax_config_default(syntax: *mut jx_syntax_config) {
    guard(|| {
        non_null(syntax, "syntax")?;
        let defaults = jx_syntax_config {
            block_start: c"{%".as_ptr(),
            block_end: c"%}".as_ptr(),
            variable_start: c"{{".as_ptr(),
            variable_end: c"}}".as_ptr(),
            comment_start: c"{#".as_ptr(),
            comment_end: c"#}".as_ptr(),
            line_statement_prefix: std::ptr::null(),
            line_comment_prefix: std::ptr::null(),
        };
        // SAFETY: non-null; the host passes a writable struct.
        unsafe { syntax.write(defaults) };
        Ok(())
    });
}

// ── Rendering ───────────────────────────────────────────────────────────

/// Render a registered template.
///
/// Consumes `ctx`. Returns an owned string released with `jx_str_free`, or
/// null on failure.
#[no_mangle]
pub extern "C" fn jx_env_render_template(
    env: *const jx_env,
    name: *const c_char,
    ctx: jx_value,
) -> *mut c_char {
    guard(|| {
        // SAFETY: the host moves `ctx` into this call.
        let ctx = unsafe { ctx.into_value() };
        let env = env_ref(env)?;
        let rendered = env.render_template(str_arg(name, "name")?, &ctx)?;
        into_c_string(rendered)
    })
}

/// Compile and render `source` once under `name` without registering it.
///
/// Consumes `ctx`. Returns an owned string released with `jx_str_free`, or
/// null on failure.
#[no_mangle]
pub extern "C" fn jx_env_render_named_str(
    env: *const jx_env,
    name: *const c_char,
    source: *const c_char,
    ctx: jx_value,
) -> *mut c_char {
    guard(|| {
        // SAFETY: the host moves `ctx` into this call.
        let ctx = unsafe { ctx.into_value() };
        let env = env_ref(env)?;
        let name = str_arg(name, "name")?;
        let source = str_arg(source, "source")?;
        into_c_string(env.render_named_str(name, source, &ctx)?)
    })
}

/// Evaluate a standalone expression.
///
/// Consumes `ctx`. On failure the error is recorded and an invalid value
/// carrying the message is returned.
#[no_mangle]
pub extern "C" fn jx_env_eval_expr(
    env: *const jx_env,
    expr: *const c_char,
    ctx: jx_value,
) -> jx_value {
    guard_or(
        || {
            // SAFETY: the host moves `ctx` into this call.
            let ctx = unsafe { ctx.into_value() };
            let env = env_ref(env)?;
            let value = env.eval_expr(str_arg(expr, "expr")?, &ctx)?;
            Ok(jx_value::from_value(value))
        },
        |err| jx_value::from_value(Value::invalid(err.to_string())),
    )
}

/// Release a string returned by this library. Null is ignored.
#[no_mangle]
pub extern "C" fn jx_str_free(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    // SAFETY: produced by `CString::into_raw` in this crate; released once.
    drop(unsafe { CString::from_raw(s) });
}
