//! Normalization between the parsed model and what the emitters expect.
//!
//! Two passes: [`associate_enums`] links parameters to the enums they are
//! typed with, and [`normalize_method`] rewrites such parameters to use the
//! qualified enum name as both declared and raw type.

use std::borrow::Cow;

use smol_str::SmolStr;

use crate::header::HeaderModel;
use crate::item::{MethodModel, ParameterModel};

/// Attach qualified enum names to parameters typed with a known enum.
///
/// A class's own nested enums shadow header-scope enums of the same name.
/// Parameters that already carry an association are left alone.
pub fn associate_enums(header: &mut HeaderModel) {
    let module_enums: Vec<SmolStr> = header.enums.iter().map(|e| e.name.clone()).collect();

    for class in header.classes.values_mut() {
        let nested: Vec<SmolStr> = class.enums.iter().map(|e| e.name.clone()).collect();
        let class_name = class.name.clone();

        for param in class.methods.iter_mut().flat_map(|m| m.params.iter_mut()) {
            if param.enum_name.is_some() {
                continue;
            }
            param.enum_name = resolve_enum(&param.raw_type, &class_name, &nested, &module_enums);
        }
    }

    for param in header.functions.iter_mut().flat_map(|f| f.params.iter_mut()) {
        if param.enum_name.is_none() && module_enums.iter().any(|e| *e == param.raw_type) {
            param.enum_name = Some(SmolStr::new(&param.raw_type));
        }
    }
}

fn resolve_enum(
    raw_type: &str,
    class_name: &str,
    nested: &[SmolStr],
    module_enums: &[SmolStr],
) -> Option<SmolStr> {
    let local = raw_type
        .strip_prefix(class_name)
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or(raw_type);

    if nested.iter().any(|e| e == local) {
        return Some(SmolStr::new(format!("{class_name}::{local}")));
    }
    if module_enums.iter().any(|e| e == raw_type) {
        return Some(SmolStr::new(raw_type));
    }
    None
}

/// Apply enum substitution to a single parameter.
pub fn normalize_parameter(param: &mut ParameterModel) {
    if let Some(enum_name) = &param.enum_name {
        param.raw_type = enum_name.to_string();
        param.ty = enum_name.to_string();
    }
}

/// The method with enum-typed parameters rewritten; borrowed when nothing changes.
pub fn normalize_method(method: &MethodModel) -> Cow<'_, MethodModel> {
    let needs_rewrite = method.params.iter().any(|p| {
        p.enum_name
            .as_deref()
            .is_some_and(|e| p.raw_type != e || p.ty != e)
    });

    if !needs_rewrite {
        return Cow::Borrowed(method);
    }

    let mut method = method.clone();
    method.params.iter_mut().for_each(normalize_parameter);
    Cow::Owned(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ClassModel, EnumModel, FunctionModel};

    fn header_with_motor() -> HeaderModel {
        let mut header = HeaderModel::new();
        header.add_enum(EnumModel::new("Color", ["Red", "Green"]));
        header.add_class(
            ClassModel::new("Motor", 1)
                .with_enum(EnumModel::new("Mode", ["Off", "On"]))
                .with_method(
                    MethodModel::new("SetMode", "void")
                        .with_param(ParameterModel::new("mode", "Mode"))
                        .with_param(ParameterModel::new("color", "const Color &"))
                        .with_param(ParameterModel::new("speed", "double")),
                )
                .with_method(
                    MethodModel::new("SetQualified", "void")
                        .with_param(ParameterModel::new("mode", "Motor::Mode")),
                ),
        );
        header.add_function(FunctionModel {
            name: "Paint".into(),
            returns: "void".to_string(),
            params: vec![ParameterModel::new("c", "Color")],
        });
        header
    }

    #[test]
    fn test_associate_enums() {
        let mut header = header_with_motor();
        associate_enums(&mut header);

        let motor = &header.classes["Motor"];
        let params = &motor.methods[0].params;
        assert_eq!(params[0].enum_name.as_deref(), Some("Motor::Mode"));
        assert_eq!(params[1].enum_name.as_deref(), Some("Color"));
        assert_eq!(params[2].enum_name, None);
        assert_eq!(
            motor.methods[1].params[0].enum_name.as_deref(),
            Some("Motor::Mode")
        );
        assert_eq!(header.functions[0].params[0].enum_name.as_deref(), Some("Color"));
    }

    #[test]
    fn test_normalize_rewrites_type_and_raw_type() {
        let method = MethodModel::new("SetMode", "void")
            .with_param(ParameterModel::new("mode", "const Mode &").with_enum("Motor::Mode"))
            .with_param(ParameterModel::new("speed", "double"));

        let normalized = normalize_method(&method);
        assert!(matches!(normalized, Cow::Owned(_)));
        assert_eq!(normalized.params[0].ty, "Motor::Mode");
        assert_eq!(normalized.params[0].raw_type, "Motor::Mode");
        // The reference flag is untouched by the rewrite.
        assert!(normalized.params[0].is_reference);
        assert_eq!(normalized.params[1].ty, "double");
    }

    #[test]
    fn test_normalize_is_borrowed_without_enums() {
        let method = MethodModel::new("Get", "int").with_param(ParameterModel::new("i", "int"));
        assert!(matches!(normalize_method(&method), Cow::Borrowed(_)));

        let mut once = method
            .clone()
            .with_param(ParameterModel::new("m", "Mode").with_enum("Mode"));
        once.params.iter_mut().for_each(normalize_parameter);
        assert!(matches!(normalize_method(&once), Cow::Borrowed(_)));
    }
}
