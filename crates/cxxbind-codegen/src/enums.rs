use cxxbind_model::EnumModel;

/// Lines registering `e` with pybind11.
///
/// Header-scope enums attach to the module object `m`; nested enums attach to
/// the owning class's variable (the lower-cased class name) and are qualified
/// with the class name. The terminating `;` goes on the final line only.
pub fn emit_enum(e: &EnumModel, class_name: Option<&str>) -> Vec<String> {
    let (typename, parent) = match class_name {
        Some(class) => (format!("{class}::{}", e.name), class.to_lowercase()),
        None => (e.name.to_string(), "m".to_string()),
    };

    let mut lines = Vec::with_capacity(e.values.len() + 1);
    lines.push(format!("py::enum_<{typename}>({parent}, \"{}\")", e.name));
    lines.extend(
        e.values
            .iter()
            .map(|v| format!("  .value(\"{v}\", {typename}::{v})")),
    );

    if let Some(last) = lines.last_mut() {
        last.push(';');
    }
    lines
}
