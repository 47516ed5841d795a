use cxxbind_model::{ClassModel, MethodModel};
use indexmap::IndexMap;
use tracing::debug;

use crate::enums::emit_enum;
use crate::hooks::HookSet;
use crate::method::emit_method;

/// Group methods by name, keeping first-seen name order and declaration order
/// within each name.
pub fn group_overloads(methods: &[MethodModel]) -> IndexMap<&str, Vec<&MethodModel>> {
    let mut groups: IndexMap<&str, Vec<&MethodModel>> = IndexMap::new();
    for method in methods {
        groups.entry(method.name.as_str()).or_default().push(method);
    }
    groups
}

/// Registration lines for a class, its methods and its nested enums.
///
/// Base classes are not consulted; only the class's own public methods bind.
pub fn emit_class(class: &ClassModel, hooks: &HookSet) -> Vec<String> {
    let class_name = class.name.as_str();
    let var = class_name.to_lowercase();

    let mut lines = vec![format!("py::class_<{class_name}> {var}(m, \"{class_name}\");")];

    if !class.methods.is_empty() {
        lines.push(var);

        for (name, group) in group_overloads(&class.methods) {
            let overloaded = group.len() > 1;
            if overloaded {
                debug!(class = class_name, method = name, count = group.len(), "overload set");
            }
            for method in group {
                lines.extend(emit_method(class_name, method, hooks, overloaded));
            }
        }

        if let Some(last) = lines.last_mut() {
            last.push(';');
        }
    }

    for e in &class.enums {
        lines.push(String::new());
        lines.extend(emit_enum(e, Some(class_name)));
    }

    lines
}
