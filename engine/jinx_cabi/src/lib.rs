//! Jinx C ABI (`libjinx`)
//!
//! This crate exposes the Jinx template engine to C hosts. Every public item
//! is an `extern "C"` function or a `#[repr(C)]` type mirrored by
//! `include/jinx.h`.
//!
//! # Build Modes
//!
//! - **rlib**: For Rust consumers and this crate's own tests
//! - **staticlib**: For static linking (`libjinx_cabi.a`)
//! - **cdylib**: For dynamic linking (`libjinx_cabi.so`)
//!
//! # Function Categories
//!
//! - **Environment**: `jx_env_new`, `jx_env_free`, `jx_env_add_template`,
//!   `jx_env_set_syntax_config`, the `jx_env_set_*` flags
//! - **Rendering**: `jx_env_render_template`, `jx_env_render_named_str`,
//!   `jx_env_eval_expr`, `jx_str_free`
//! - **Values**: `jx_value_new_*`, `jx_value_append`, `jx_value_set_key`,
//!   `jx_value_get_*`, `jx_value_as_*`, `jx_value_incref`, `jx_value_decref`
//! - **Iteration**: `jx_value_try_iter`, `jx_value_iter_next`, `jx_value_iter_free`
//! - **Errors**: `jx_err_is_set`, `jx_err_get_*`, `jx_err_print`, `jx_err_clear`
//! - **Logging**: `jx_init_tracing`
//!
//! # Ownership
//!
//! A `jx_value` passed by value into a consuming call (`append`, `set_key`,
//! the render and eval context) is moved: the caller must not release it
//! afterwards. Inspectors (`get_kind`, `len`, `get_by_*`, `as_*`, `to_str`,
//! `try_iter`) only borrow their argument. Every returned value, string or
//! iterator is owned by the caller and released with `jx_value_decref`,
//! `jx_str_free` or `jx_value_iter_free`.
//!
//! # Errors
//!
//! Failures never unwind into the host. A failing call returns its sentinel
//! (`false`, null, `0` or an undefined/invalid value) and records the error
//! in a thread-local slot read through the `jx_err_*` functions. Successful
//! calls leave the slot untouched.

#![warn(clippy::allow_attributes_without_reason)]
#![allow(
    unsafe_code,
    reason = "C-ABI entry points require unsafe for raw pointer operations"
)]
#![allow(
    clippy::not_unsafe_ptr_arg_deref,
    reason = "FFI entry points validate pointers for null; validity beyond that is the host's contract"
)]
#![allow(
    non_camel_case_types,
    reason = "C-facing types follow the jx_ naming of the header"
)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    reason = "handle words pack pointers and 128-bit integers into u64 slots"
)]

mod env;
mod error;
mod guard;
mod handle;
mod logging;
mod value;

pub use env::{
    jx_env, jx_env_add_template, jx_env_clear_templates, jx_env_eval_expr, jx_env_free,
    jx_env_new, jx_env_remove_template, jx_env_render_named_str, jx_env_render_template,
    jx_env_set_debug, jx_env_set_keep_trailing_newline, jx_env_set_lstrip_blocks,
    jx_env_set_recursion_limit, jx_env_set_syntax_config, jx_env_set_trim_blocks,
    jx_env_set_undefined_behavior, jx_str_free, jx_syntax_config, jx_syntax_config_default,
    jx_undefined_behavior,
};
pub use error::{
    jx_err_clear, jx_err_get_detail, jx_err_get_kind, jx_err_get_line, jx_err_get_template_name,
    jx_err_is_set, jx_err_kind, jx_err_print,
};
pub use handle::{jx_value, jx_value_iter};
pub use logging::{init_tracing, jx_init_tracing, LOG_ENV_VAR};
pub use value::{
    jx_value_append, jx_value_as_bytes, jx_value_as_f64, jx_value_as_i64, jx_value_as_u64,
    jx_value_dbg, jx_value_decref, jx_value_get_by_index, jx_value_get_by_str,
    jx_value_get_by_value, jx_value_get_kind, jx_value_incref, jx_value_is_number,
    jx_value_is_true, jx_value_iter_free, jx_value_iter_next, jx_value_kind, jx_value_len,
    jx_value_new_bool, jx_value_new_bytes, jx_value_new_f32, jx_value_new_f64, jx_value_new_i32,
    jx_value_new_i64, jx_value_new_list, jx_value_new_none, jx_value_new_object,
    jx_value_new_string, jx_value_new_u32, jx_value_new_u64, jx_value_new_undefined,
    jx_value_set_key, jx_value_set_string_key, jx_value_to_str, jx_value_try_iter,
};
