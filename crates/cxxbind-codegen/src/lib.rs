//! pybind11 registration text from a structural header model.
//!
//! ```text
//! HeaderModel → emit_header → emit_class → emit_method (+ HookSet)
//!                          ↘ emit_enum
//! emit_module wraps header blocks in the PYBIND11_PLUGIN boilerplate
//! ```
//!
//! Every emitter is a pure function returning lines; nothing is printed.

mod enums;
mod hooks;
mod method;
mod class;
mod module;

pub use enums::emit_enum;
pub use hooks::{
    HookContext, HookOutcome, HookSet, MethodHook, ReferenceOutHook, SentinelErrorHook,
};
pub use method::{classify_method, emit_method, MethodBinding};
pub use class::{emit_class, group_overloads};
pub use module::{emit_header, emit_module, HeaderUnit};

/// Local that holds the wrapped call's return value inside a wrapper lambda.
pub const RETURN_VALUE: &str = "__ret";

/// Name of the bound instance parameter inside a wrapper lambda.
pub const INSTANCE: &str = "__inst";
