use serde::Serialize;
use smol_str::SmolStr;

use crate::types::split_declared_type;

/// A method or function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterModel {
    pub name: SmolStr,
    /// Declared type text, e.g. `const double &`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Declared type with const/reference stripped, used in casts and `py::init<...>`.
    pub raw_type: String,
    pub is_reference: bool,
    /// Qualified enum name when the parameter's type is a known enum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<SmolStr>,
}

impl ParameterModel {
    /// Build a parameter from its declared type text.
    pub fn new(name: impl Into<SmolStr>, declared_type: &str) -> Self {
        let ty = split_declared_type(declared_type);
        Self {
            name: name.into(),
            ty: ty.text,
            raw_type: ty.raw,
            is_reference: ty.is_reference,
            enum_name: None,
        }
    }

    pub fn with_enum(mut self, enum_name: impl Into<SmolStr>) -> Self {
        self.enum_name = Some(enum_name.into());
        self
    }
}

/// A public member function of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodModel {
    pub name: SmolStr,
    /// Declared return type text; `void` for no value, empty for constructors/destructors.
    pub returns: String,
    pub params: Vec<ParameterModel>,
    pub is_constructor: bool,
    pub is_destructor: bool,
}

impl MethodModel {
    pub fn new(name: impl Into<SmolStr>, returns: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            returns: returns.into(),
            params: Vec::new(),
            is_constructor: false,
            is_destructor: false,
        }
    }

    pub fn constructor(class_name: impl Into<SmolStr>) -> Self {
        Self {
            is_constructor: true,
            ..Self::new(class_name, "")
        }
    }

    pub fn destructor(class_name: &str) -> Self {
        Self {
            is_destructor: true,
            ..Self::new(format!("~{class_name}"), "")
        }
    }

    pub fn with_param(mut self, param: ParameterModel) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns_void(&self) -> bool {
        self.returns == "void"
    }

    pub fn reference_params(&self) -> impl Iterator<Item = &ParameterModel> {
        self.params.iter().filter(|p| p.is_reference)
    }
}

/// An enumeration, either at header scope or nested in a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumModel {
    pub name: SmolStr,
    pub values: Vec<SmolStr>,
}

impl EnumModel {
    pub fn new<I, S>(name: impl Into<SmolStr>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A class or struct with its public surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassModel {
    pub name: SmolStr,
    /// 1-based line of the class head in its header.
    pub line: u32,
    /// Base class names as written; never used for emission.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<SmolStr>,
    pub methods: Vec<MethodModel>,
    pub enums: Vec<EnumModel>,
}

impl ClassModel {
    pub fn new(name: impl Into<SmolStr>, line: u32) -> Self {
        Self {
            name: name.into(),
            line,
            bases: Vec::new(),
            methods: Vec::new(),
            enums: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: MethodModel) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_enum(mut self, e: EnumModel) -> Self {
        self.enums.push(e);
        self
    }
}

/// A free function. Parsed and carried along, but not bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionModel {
    pub name: SmolStr,
    pub returns: String,
    pub params: Vec<ParameterModel>,
}
