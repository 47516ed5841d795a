use cxxbind_model::HeaderModel;
use tracing::debug;

use crate::class::emit_class;
use crate::enums::emit_enum;
use crate::hooks::HookSet;

/// One header taking part in a module: the include line text and its model.
#[derive(Debug, Clone)]
pub struct HeaderUnit {
    pub include: String,
    pub model: HeaderModel,
}

impl HeaderUnit {
    pub fn new(include: impl Into<String>, model: HeaderModel) -> Self {
        Self {
            include: include.into(),
            model,
        }
    }
}

/// Lines for one header: header-scope enums, then classes in source order,
/// each block followed by an empty line. Free functions are not bound.
pub fn emit_header(header: &HeaderModel, hooks: &HookSet) -> Vec<String> {
    let mut lines = Vec::new();

    for e in &header.enums {
        lines.extend(emit_enum(e, None));
        lines.push(String::new());
    }

    for class in header.classes_in_source_order() {
        debug!(class = %class.name, line = class.line, "emitting class");
        lines.extend(emit_class(class, hooks));
        lines.push(String::new());
    }

    lines
}

/// Complete extension module source for `module_name`.
pub fn emit_module(module_name: &str, headers: &[HeaderUnit], hooks: &HookSet) -> String {
    let mut writer = ModuleWriter::new();

    writer.writeln("");
    writer.writeln("#include <pybind11/pybind11.h>");
    writer.writeln("namespace py = pybind11;");
    writer.writeln("");

    for unit in headers {
        writer.writeln(&format!("#include <{}>", unit.include));
    }

    writer.writeln("");
    writer.writeln(&format!("PYBIND11_PLUGIN({module_name}) {{"));
    writer.writeln("");
    writer.indent += 1;
    writer.writeln(&format!("py::module m(\"{module_name}\");"));
    writer.writeln("");

    for unit in headers {
        for line in emit_header(&unit.model, hooks) {
            writer.writeln(&line);
        }
        writer.writeln("");
    }

    writer.writeln("return m.ptr();");
    writer.indent -= 1;
    writer.writeln("}");

    writer.output
}

struct ModuleWriter {
    output: String,
    indent: usize,
}

impl ModuleWriter {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    /// Empty lines are written without indentation.
    fn writeln(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent {
                self.output.push_str("    ");
            }
            self.output.push_str(line);
        }
        self.output.push('\n');
    }
}
