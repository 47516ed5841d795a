use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;

use crate::item::{ClassModel, EnumModel, FunctionModel};

/// Everything extracted from one header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderModel {
    pub enums: Vec<EnumModel>,
    /// Classes keyed by name. A later class with the same name replaces the earlier one.
    pub classes: IndexMap<SmolStr, ClassModel>,
    pub functions: Vec<FunctionModel>,
}

impl HeaderModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: ClassModel) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn add_enum(&mut self, e: EnumModel) {
        self.enums.push(e);
    }

    pub fn add_function(&mut self, f: FunctionModel) {
        self.functions.push(f);
    }

    /// Classes ordered by their position in the header.
    pub fn classes_in_source_order(&self) -> Vec<&ClassModel> {
        let mut classes: Vec<&ClassModel> = self.classes.values().collect();
        classes.sort_by_key(|c| c.line);
        classes
    }
}
