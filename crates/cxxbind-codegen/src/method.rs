use cxxbind_model::{adapt, MethodModel};
use tracing::debug;

use crate::hooks::{HookContext, HookSet};
use crate::{INSTANCE, RETURN_VALUE};

/// How a method ends up bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodBinding {
    /// Destructors are never bound.
    Skipped,
    /// `py::init<...>` from the parameter raw types.
    Constructor,
    /// A lambda synthesized from the hook context.
    Wrapper(HookContext),
    /// A member pointer bound under `name`.
    Direct { name: String },
}

/// Decide how `method` of `class_name` is bound.
///
/// Constructors are recognized by name before any hook runs.
pub fn classify_method(class_name: &str, method: &MethodModel, hooks: &HookSet) -> MethodBinding {
    if method.is_destructor {
        return MethodBinding::Skipped;
    }
    if method.name == class_name {
        return MethodBinding::Constructor;
    }

    let outcome = hooks.run(class_name, method);
    if outcome.modified {
        MethodBinding::Wrapper(outcome.context)
    } else {
        MethodBinding::Direct {
            name: outcome.context.method_name.to_string(),
        }
    }
}

/// Binding lines for one method, each a `.def(...)` continuation.
///
/// `overloaded` marks a member of a same-name group; direct bindings of such
/// members carry a member-function-pointer cast.
pub fn emit_method(
    class_name: &str,
    method: &MethodModel,
    hooks: &HookSet,
    overloaded: bool,
) -> Vec<String> {
    let method = adapt::normalize_method(method);
    let binding = classify_method(class_name, &method, hooks);
    debug!(class = class_name, method = %method.name, ?binding, "binding method");

    match binding {
        MethodBinding::Skipped => Vec::new(),
        MethodBinding::Constructor => {
            vec![format!("  .def(py::init<{}>())", raw_types(&method))]
        }
        MethodBinding::Wrapper(ctx) => emit_wrapper(class_name, &method, ctx),
        MethodBinding::Direct { name } => {
            let cast = if overloaded {
                format!("({} ({class_name}::*)({}))", method.returns, raw_types(&method))
            } else {
                String::new()
            };
            vec![format!(
                "  .def(\"{name}\", {cast}&{class_name}::{})",
                method.name
            )]
        }
    }
}

fn raw_types(method: &MethodModel) -> String {
    method
        .params
        .iter()
        .map(|p| p.raw_type.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn emit_wrapper(class_name: &str, method: &MethodModel, ctx: HookContext) -> Vec<String> {
    let returns_value = ctx.returns_value();
    let HookContext {
        method_name,
        in_params,
        mut ret_names,
        pre,
        post,
    } = ctx;

    let mut lines = Vec::new();

    let in_args: String = in_params
        .iter()
        .map(|p| format!(", {} {}", p.ty, p.name))
        .collect();
    lines.push(format!(
        "  .def(\"{method_name}\", []({class_name} &{INSTANCE}{in_args}) {{"
    ));

    if !pre.is_empty() {
        lines.push(format!("    {};", pre.join("; ")));
    }

    // The wrapped call always receives every original argument; outputs are
    // satisfied by the locals declared in `pre`.
    let call_args = method
        .params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let captures = !method.returns_void() && (returns_value || !post.is_empty());
    let mut call_prefix = if captures {
        format!("auto {RETURN_VALUE} = ")
    } else {
        String::new()
    };

    if post.is_empty() && ret_names.len() == 1 && ret_names[0] == RETURN_VALUE {
        ret_names.clear();
        call_prefix = "return ".to_string();
    }

    lines.push(format!(
        "    {call_prefix}{INSTANCE}.{}({call_args});",
        method.name
    ));

    if !post.is_empty() {
        lines.push(format!("    {};", post.join("; ")));
    }

    match ret_names.as_slice() {
        [] => {}
        [single] => lines.push(format!("    return {single};")),
        names => lines.push(format!(
            "    return std::make_tuple({});",
            names
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }

    lines.push("  })".to_string());
    lines
}
