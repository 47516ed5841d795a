//! Whole-class binding output for representative headers.

use cxxbind_codegen::{emit_class, emit_method, HookSet, MethodHook, HookContext};
use cxxbind_model::{ClassModel, EnumModel, MethodModel, ParameterModel};

fn class_text(class: &ClassModel, hooks: &HookSet) -> String {
    emit_class(class, hooks).join("\n")
}

#[test]
fn widget_plain_binding() {
    let widget = ClassModel::new("Widget", 1).with_method(MethodModel::new("GetValue", "int"));
    insta::assert_snapshot!(class_text(&widget, &HookSet::standard()), @r#"
py::class_<Widget> widget(m, "Widget");
widget
  .def("GetValue", &Widget::GetValue);
"#);
}

#[test]
fn sensor_status_code_with_output() {
    let sensor = ClassModel::new("Sensor", 1).with_method(
        MethodModel::new("Read", "CTR_Code").with_param(ParameterModel::new("out", "double &")),
    );
    insta::assert_snapshot!(class_text(&sensor, &HookSet::standard()), @r#"
py::class_<Sensor> sensor(m, "Sensor");
sensor
  .def("Read", [](Sensor &__inst) {
    double out;
    auto __ret = __inst.Read(out);
    CheckCTRCode(__ret);
    return out;
  });
"#);
}

#[test]
fn shape_overloads() {
    let shape = ClassModel::new("Shape", 1)
        .with_method(MethodModel::new("Area", "double"))
        .with_method(
            MethodModel::new("Area", "double").with_param(ParameterModel::new("scale", "double")),
        );
    insta::assert_snapshot!(class_text(&shape, &HookSet::standard()), @r#"
py::class_<Shape> shape(m, "Shape");
shape
  .def("Area", (double (Shape::*)())&Shape::Area)
  .def("Area", (double (Shape::*)(double))&Shape::Area);
"#);
}

#[test]
fn talon_style_class() {
    let talon = ClassModel::new("CANTalon", 10)
        .with_method(
            MethodModel::constructor("CANTalon")
                .with_param(ParameterModel::new("deviceNumber", "int")),
        )
        .with_method(MethodModel::destructor("CANTalon"))
        .with_method(
            MethodModel::new("SetControlMode", "void")
                .with_param(
                    ParameterModel::new("mode", "ControlMode").with_enum("CANTalon::ControlMode"),
                ),
        )
        .with_method(
            MethodModel::new("GetPosition", "CTR_Code")
                .with_param(ParameterModel::new("pos", "int &"))
                .with_param(ParameterModel::new("vel", "int &")),
        )
        .with_method(
            MethodModel::new("Set", "void").with_param(ParameterModel::new("value", "double")),
        )
        .with_method(
            MethodModel::new("Set", "void")
                .with_param(ParameterModel::new("value", "double"))
                .with_param(ParameterModel::new("syncGroup", "uint8_t")),
        )
        .with_method(
            MethodModel::new("GetFaults", "bool")
                .with_param(ParameterModel::new("channel", "int"))
                .with_param(ParameterModel::new("faults", "uint32_t &")),
        )
        .with_enum(EnumModel::new("ControlMode", ["kPercentVbus", "kPosition"]));

    insta::assert_snapshot!(class_text(&talon, &HookSet::standard()), @r#"
py::class_<CANTalon> cantalon(m, "CANTalon");
cantalon
  .def(py::init<int>())
  .def("SetControlMode", &CANTalon::SetControlMode)
  .def("GetPosition", [](CANTalon &__inst) {
    int pos; int vel;
    auto __ret = __inst.GetPosition(pos, vel);
    CheckCTRCode(__ret);
    return std::make_tuple(pos, vel);
  })
  .def("Set", (void (CANTalon::*)(double))&CANTalon::Set)
  .def("Set", (void (CANTalon::*)(double,uint8_t))&CANTalon::Set)
  .def("GetFaults", [](CANTalon &__inst, int channel) {
    uint32_t faults;
    auto __ret = __inst.GetFaults(channel, faults);
    return std::make_tuple(__ret, faults);
  });

py::enum_<CANTalon::ControlMode>(cantalon, "ControlMode")
  .value("kPercentVbus", CANTalon::ControlMode::kPercentVbus)
  .value("kPosition", CANTalon::ControlMode::kPosition);
"#);
}

/// Hooks that never fire leave every method on the direct path.
#[test]
fn no_refs_and_no_status_code_binds_directly() {
    let methods = [
        MethodModel::new("A", "int"),
        MethodModel::new("B", "void").with_param(ParameterModel::new("x", "const char *")),
        MethodModel::new("C", "double").with_param(ParameterModel::new("y", "float")),
    ];
    for method in &methods {
        let outcome = HookSet::standard().run("K", method);
        assert!(!outcome.modified, "{} should not be wrapped", method.name);
        let lines = emit_method("K", method, &HookSet::standard(), false);
        assert_eq!(lines, [format!("  .def(\"{0}\", &K::{0})", method.name)]);
    }
}

/// With references, the returned tuple is the return value (if any) then the
/// references in declaration order.
#[test]
fn tuple_arity_matches_outputs() {
    let cases = [
        ("int", 2, "    return std::make_tuple(__ret, a, b);"),
        ("void", 2, "    return std::make_tuple(a, b);"),
        ("int", 1, "    return std::make_tuple(__ret, a);"),
        ("void", 1, "    return a;"),
    ];
    for (returns, refs, expected) in cases {
        let mut method = MethodModel::new("Get", returns);
        for name in ["a", "b"].iter().take(refs) {
            method = method.with_param(ParameterModel::new(*name, "int &"));
        }
        let lines = emit_method("K", &method, &HookSet::standard(), false);
        assert_eq!(lines[lines.len() - 2], expected, "{returns} with {refs} refs");
    }
}

#[test]
fn overload_casts_only_for_groups() {
    let single = ClassModel::new("K", 1)
        .with_method(MethodModel::new("A", "int"))
        .with_method(MethodModel::new("B", "int"));
    assert!(emit_class(&single, &HookSet::standard())
        .iter()
        .all(|l| !l.contains("(K::*)")));

    let grouped = ClassModel::new("K", 1)
        .with_method(MethodModel::new("A", "int"))
        .with_method(MethodModel::new("A", "int").with_param(ParameterModel::new("i", "int")))
        .with_method(MethodModel::new("A", "int").with_param(ParameterModel::new("d", "double")));
    let casts = emit_class(&grouped, &HookSet::standard())
        .iter()
        .filter(|l| l.contains("(int (K::*)("))
        .count();
    assert_eq!(casts, 3);
}

struct Rename;

impl MethodHook for Rename {
    fn name(&self) -> &str {
        "rename"
    }

    fn rewrite(&self, _class_name: &str, method: &MethodModel, ctx: &mut HookContext) -> bool {
        match method.name.strip_prefix("Get") {
            Some(rest) if !rest.is_empty() => {
                ctx.method_name = rest.to_lowercase().into();
                true
            }
            _ => false,
        }
    }
}

#[test]
fn renamed_binding_calls_original_name() {
    let hooks = HookSet::standard().with(Rename);
    let lines = emit_method("K", &MethodModel::new("GetSpeed", "double"), &hooks, false);
    assert_eq!(
        lines,
        [
            "  .def(\"speed\", [](K &__inst) {",
            "    return __inst.GetSpeed();",
            "  })",
        ]
    );
}
