use cxxbind_common::{Diagnostic, SourceFile, Span};
use cxxbind_model::{
    adapt, split_declared_type, ClassModel, EnumModel, FunctionModel, HeaderModel, MethodModel,
    ParameterModel,
};
use tree_sitter::{Node, Tree};

use crate::parser::parse;

/// The model extracted from one header plus everything noticed along the way.
#[derive(Debug, Clone)]
pub struct Lowered {
    pub header: HeaderModel,
    pub diagnostics: Vec<Diagnostic>,
}

impl Lowered {
    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.is_error())
    }
}

/// Lower a tree-sitter Tree to a header model.
///
/// Lowering never fails. Unparsable regions become error diagnostics,
/// unsupported constructs become warnings, and the rest of the header is
/// still extracted.
pub fn lower(tree: &Tree, source: &SourceFile) -> Lowered {
    let mut ctx = LoweringContext::new(source);
    let root = tree.root_node();

    ctx.lower_items(root);
    if root.has_error() {
        ctx.report_syntax_errors(root);
    }
    adapt::associate_enums(&mut ctx.header);

    Lowered {
        header: ctx.header,
        diagnostics: ctx.diagnostics,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Protected,
    Private,
}

impl Access {
    fn from_text(text: &str) -> Self {
        match text.trim().trim_end_matches(':').trim() {
            "public" => Access::Public,
            "protected" => Access::Protected,
            _ => Access::Private,
        }
    }
}

fn named_children(node: Node) -> Vec<Node> {
    node.named_children(&mut node.walk()).collect()
}

fn has_child_kind(node: Node, kind: &str) -> bool {
    node.children(&mut node.walk()).any(|c| c.kind() == kind)
}

/// Same byte length, with every character but newlines turned into spaces.
fn blank(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' { "\n".to_string() } else { " ".repeat(c.len_utf8()) })
        .collect()
}

/// Parameter name, if any, and the `&`/`*` suffix of its declarator.
type ParamDeclarator<'a> = (Option<&'a str>, Vec<&'static str>);

fn is_preproc_conditional(kind: &str) -> bool {
    matches!(
        kind,
        "preproc_if" | "preproc_ifdef" | "preproc_else" | "preproc_elif" | "preproc_elifdef"
    )
}

/// A function declarator found under any number of `&`/`*` declarators, and
/// the return-type suffix those contributed.
struct FunctionShape<'tree> {
    declarator: Node<'tree>,
    return_suffix: Vec<&'static str>,
}

fn unwrap_function(declarator: Node<'_>) -> Option<FunctionShape<'_>> {
    let mut suffix = Vec::new();
    let mut current = declarator;

    loop {
        match current.kind() {
            "function_declarator" => {
                return Some(FunctionShape {
                    declarator: current,
                    return_suffix: suffix,
                })
            }
            "reference_declarator" => {
                let is_rvalue = current.child(0).is_some_and(|c| c.kind() == "&&");
                suffix.push(if is_rvalue { "&&" } else { "&" });
                current = current.named_child(0)?;
            }
            "pointer_declarator" => {
                suffix.push("*");
                current = current.child_by_field_name("declarator")?;
            }
            _ => return None,
        }
    }
}

struct LoweringContext<'a> {
    source: &'a SourceFile,
    header: HeaderModel,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> LoweringContext<'a> {
    fn new(source: &'a SourceFile) -> Self {
        Self {
            source,
            header: HeaderModel::new(),
            diagnostics: Vec::new(),
        }
    }

    fn span(&self, node: Node) -> Span {
        Span::new(
            self.source.id,
            node.start_byte() as u32,
            node.end_byte() as u32,
        )
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.content.as_bytes()).unwrap_or("")
    }

    fn line(&self, node: Node) -> u32 {
        node.start_position().row as u32 + 1
    }

    fn skip(&mut self, node: Node, what: &str) {
        let (line, _) = self.source.line_col(node.start_byte() as u32);
        let diag = Diagnostic::warning(format!("skipped {what} at line {}", line + 1))
            .with_span(self.span(node))
            .with_label(what.to_string());
        self.diagnostics.push(diag);
    }

    fn lower_items(&mut self, node: Node) {
        for child in named_children(node) {
            self.lower_item(child);
        }
    }

    fn lower_item(&mut self, node: Node) {
        match node.kind() {
            "class_specifier" => self.lower_class(node, Access::Private, None),
            "struct_specifier" => self.lower_class(node, Access::Public, None),
            "enum_specifier" => {
                if let Some(e) = self.lower_enum(node, None) {
                    self.header.add_enum(e);
                }
            }
            "namespace_definition" | "linkage_specification" => {
                if let Some(body) = node.child_by_field_name("body") {
                    if body.kind() == "declaration_list" {
                        self.lower_items(body);
                    } else {
                        self.lower_item(body);
                    }
                }
            }
            "declaration" => self.lower_declaration(node),
            "function_definition" => {
                if !self.lower_macro_class(node) {
                    self.lower_free_function(node);
                }
            }
            "type_definition" => self.lower_typedef(node),
            "template_declaration" => self.skip(node, "template declaration"),
            kind if is_preproc_conditional(kind) => self.lower_items(node),
            _ => {}
        }
    }

    /// `class X { ... } x;`, `enum E { ... } e;` and free function declarations.
    fn lower_declaration(&mut self, node: Node) {
        if let Some(ty) = node.child_by_field_name("type") {
            match ty.kind() {
                "class_specifier" | "struct_specifier" | "enum_specifier" => self.lower_item(ty),
                _ => {}
            }
        }
        self.lower_free_function(node);
    }

    /// `typedef struct { ... } Name;` and `typedef enum { ... } Name;`
    fn lower_typedef(&mut self, node: Node) {
        let Some(ty) = node.child_by_field_name("type") else {
            return;
        };
        let alias = node
            .child_by_field_name("declarator")
            .filter(|d| d.kind() == "type_identifier")
            .map(|d| self.text(d));

        match ty.kind() {
            "class_specifier" => self.lower_class(ty, Access::Private, alias),
            "struct_specifier" => self.lower_class(ty, Access::Public, alias),
            "enum_specifier" => {
                if let Some(e) = self.lower_enum(ty, alias) {
                    self.header.add_enum(e);
                }
            }
            _ => {}
        }
    }

    /// `class EXPORT Name { ... };` with `EXPORT` left unexpanded parses as a
    /// function `Name` returning class `EXPORT`. Re-lower the body as class
    /// `Name` from a copy of the header with everything else blanked out, so
    /// offsets and lines still match the original.
    fn lower_macro_class(&mut self, node: Node) -> bool {
        let (Some(ty), Some(declarator), Some(body)) = (
            node.child_by_field_name("type"),
            node.child_by_field_name("declarator"),
            node.child_by_field_name("body"),
        ) else {
            return false;
        };
        let keyword = match ty.kind() {
            "class_specifier" => "class",
            "struct_specifier" => "struct",
            _ => return false,
        };
        if ty.child_by_field_name("body").is_some()
            || declarator.kind() != "identifier"
            || body.kind() != "compound_statement"
        {
            return false;
        }

        let name = self.text(declarator);
        let source: &'a SourceFile = self.source;
        let content = &source.content;
        let head = format!("{keyword} {name}");
        let Some(rest) = content[node.start_byte()..body.start_byte()].get(head.len()..) else {
            return false;
        };

        let mut shadow = blank(&content[..node.start_byte()]);
        shadow.push_str(&head);
        shadow.push_str(&blank(rest));
        shadow.push_str(self.text(body));
        shadow.push_str(&blank(&content[body.end_byte()..]));
        shadow.push(';');

        let Ok(tree) = parse(&shadow) else {
            return false;
        };
        // Syntax errors inside the body are reported from the original tree.
        let shadow = SourceFile::new(source.id, source.path.clone(), shadow);
        let mut inner = LoweringContext::new(&shadow);
        inner.lower_items(tree.root_node());

        let macro_name = ty.child_by_field_name("name").map_or("", |n| self.text(n));
        self.diagnostics.push(
            Diagnostic::info(format!(
                "ignored `{macro_name}` in the head of `{name}` at line {}",
                self.line(node)
            ))
            .with_span(self.span(ty))
            .with_label("unexpanded macro"),
        );
        for class in inner.header.classes.into_values() {
            self.header.add_class(class);
        }
        self.diagnostics.extend(inner.diagnostics);
        true
    }

    fn lower_class(&mut self, node: Node, default_access: Access, alias: Option<&str>) {
        // Forward declarations have no body.
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };

        let name = match node.child_by_field_name("name") {
            Some(n) if n.kind() == "template_type" => {
                self.skip(node, "template specialization");
                return;
            }
            Some(n) => self.text(n),
            None => match alias {
                Some(alias) => alias,
                None => {
                    self.skip(node, "anonymous class");
                    return;
                }
            },
        };

        let mut class = ClassModel::new(name, self.line(node));

        if let Some(clause) = node
            .children(&mut node.walk())
            .find(|c| c.kind() == "base_class_clause")
        {
            class.bases = named_children(clause)
                .into_iter()
                .filter(|c| {
                    matches!(
                        c.kind(),
                        "type_identifier" | "qualified_identifier" | "template_type"
                    )
                })
                .map(|c| self.text(c).into())
                .collect();
        }

        let mut access = default_access;
        self.lower_members(body, &mut class, &mut access);
        self.header.add_class(class);
    }

    fn lower_members(&mut self, body: Node, class: &mut ClassModel, access: &mut Access) {
        for member in named_children(body) {
            match member.kind() {
                "access_specifier" => *access = Access::from_text(self.text(member)),
                kind if is_preproc_conditional(kind) => self.lower_members(member, class, access),
                _ if *access != Access::Public => {}
                "field_declaration" => self.lower_field_declaration(member, class),
                "function_definition" | "declaration" => {
                    if let Some(method) = self.lower_method(member, &class.name) {
                        class.methods.push(method);
                    }
                }
                "template_declaration" => self.skip(member, "member template"),
                _ => {}
            }
        }
    }

    fn lower_field_declaration(&mut self, node: Node, class: &mut ClassModel) {
        if let Some(ty) = node.child_by_field_name("type") {
            let has_body = ty.child_by_field_name("body").is_some();
            match ty.kind() {
                "enum_specifier" if has_body => {
                    if let Some(e) = self.lower_enum(ty, None) {
                        class.enums.push(e);
                    }
                    return;
                }
                "class_specifier" | "struct_specifier" if has_body => {
                    self.skip(ty, "nested class");
                    return;
                }
                _ => {}
            }
        }

        if let Some(method) = self.lower_method(node, &class.name) {
            class.methods.push(method);
        }
    }

    /// A method declaration or inline definition. `None` for data members,
    /// deleted functions and declarators we do not bind.
    fn lower_method(&mut self, node: Node, class_name: &str) -> Option<MethodModel> {
        if has_child_kind(node, "delete_method_clause") {
            return None;
        }

        let shape = unwrap_function(node.child_by_field_name("declarator")?)?;
        let name_node = shape.declarator.child_by_field_name("declarator")?;

        let (name, is_destructor) = match name_node.kind() {
            "identifier" | "field_identifier" => (self.text(name_node).to_string(), false),
            "destructor_name" => (
                self.text(name_node).split_whitespace().collect::<String>(),
                true,
            ),
            "operator_name" => {
                self.skip(node, "operator overload");
                return None;
            }
            _ => {
                self.skip(node, "unsupported method declarator");
                return None;
            }
        };

        let Some(params) = self.lower_parameters(shape.declarator) else {
            self.skip(node, "function pointer parameter");
            return None;
        };

        let is_constructor = !is_destructor && name == class_name;
        let returns = if is_constructor || is_destructor {
            String::new()
        } else {
            match self.return_type(node, &shape.return_suffix) {
                Some(returns) => returns,
                None => {
                    self.skip(node, "method without a return type");
                    return None;
                }
            }
        };

        Some(MethodModel {
            name: name.into(),
            returns,
            params,
            is_constructor,
            is_destructor,
        })
    }

    fn lower_free_function(&mut self, node: Node) {
        let Some(shape) = node
            .child_by_field_name("declarator")
            .and_then(unwrap_function)
        else {
            return;
        };

        // Qualified names are out-of-line member definitions.
        let Some(name_node) = shape
            .declarator
            .child_by_field_name("declarator")
            .filter(|n| n.kind() == "identifier")
        else {
            return;
        };

        let Some(returns) = self.return_type(node, &shape.return_suffix) else {
            return;
        };
        let Some(params) = self.lower_parameters(shape.declarator) else {
            self.skip(node, "function pointer parameter");
            return;
        };

        let function = FunctionModel {
            name: self.text(name_node).into(),
            returns,
            params,
        };
        self.header.add_function(function);
    }

    /// Declared return type: cv-qualifiers, the type specifier, then any
    /// `&`/`*` from the declarator.
    fn return_type(&self, node: Node, suffix: &[&str]) -> Option<String> {
        let ty = node.child_by_field_name("type")?;
        let mut decl = self.qualifiers(node);
        decl.push_str(self.text(ty));
        for s in suffix {
            decl.push(' ');
            decl.push_str(s);
        }
        Some(split_declared_type(&decl).text)
    }

    fn qualifiers(&self, node: Node) -> String {
        node.children(&mut node.walk())
            .filter(|c| c.kind() == "type_qualifier")
            .map(|c| self.text(c))
            .filter(|q| matches!(*q, "const" | "volatile"))
            .map(|q| format!("{q} "))
            .collect()
    }

    /// `None` when a parameter has a declarator we cannot render as a type,
    /// such as a function pointer.
    fn lower_parameters(&self, function_declarator: Node) -> Option<Vec<ParameterModel>> {
        let Some(list) = function_declarator.child_by_field_name("parameters") else {
            return Some(Vec::new());
        };

        let mut params = Vec::new();
        let decls = named_children(list).into_iter().filter(|c| {
            matches!(
                c.kind(),
                "parameter_declaration" | "optional_parameter_declaration"
            )
        });

        for (index, param) in decls.enumerate() {
            let Some(ty) = param.child_by_field_name("type") else {
                continue;
            };
            let declarator = param.child_by_field_name("declarator");

            // `f(void)` declares no parameters.
            if declarator.is_none() && self.text(ty) == "void" {
                continue;
            }

            let (name, suffix) = match declarator {
                Some(d) => self.parameter_declarator(d)?,
                None => (None, Vec::new()),
            };

            let mut decl = self.qualifiers(param);
            decl.push_str(self.text(ty));
            for s in suffix {
                decl.push(' ');
                decl.push_str(s);
            }

            let name = name.map_or_else(|| format!("arg{index}"), str::to_string);
            params.push(ParameterModel::new(name, &decl));
        }

        Some(params)
    }

    /// Parameter name (if any) and the `&`/`*` suffix of its declarator.
    /// `None` for function and parenthesized declarators.
    fn parameter_declarator(&self, declarator: Node) -> Option<ParamDeclarator<'a>> {
        let mut suffix = Vec::new();
        let mut current = Some(declarator);

        while let Some(node) = current {
            current = match node.kind() {
                "identifier" => return Some((Some(self.text(node)), suffix)),
                "function_declarator"
                | "abstract_function_declarator"
                | "parenthesized_declarator"
                | "abstract_parenthesized_declarator" => return None,
                "reference_declarator" | "abstract_reference_declarator" => {
                    let is_rvalue = node.child(0).is_some_and(|c| c.kind() == "&&");
                    suffix.push(if is_rvalue { "&&" } else { "&" });
                    node.named_child(0)
                }
                "pointer_declarator" | "abstract_pointer_declarator" | "array_declarator"
                | "abstract_array_declarator" => {
                    suffix.push("*");
                    node.child_by_field_name("declarator")
                }
                _ => None,
            };
        }

        Some((None, suffix))
    }

    fn lower_enum(&mut self, node: Node, alias: Option<&str>) -> Option<EnumModel> {
        let body = node.child_by_field_name("body")?;
        let name = match node.child_by_field_name("name") {
            Some(n) => self.text(n),
            None => match alias {
                Some(alias) => alias,
                None => {
                    self.skip(node, "anonymous enum");
                    return None;
                }
            },
        };

        let values: Vec<&str> = named_children(body)
            .into_iter()
            .filter(|c| c.kind() == "enumerator")
            .filter_map(|c| c.child_by_field_name("name"))
            .map(|n| self.text(n))
            .collect();

        Some(EnumModel::new(name, values))
    }

    fn report_syntax_errors(&mut self, node: Node) {
        if node.is_error() {
            let diag = Diagnostic::error(format!(
                "could not parse line {}",
                self.line(node)
            ))
            .with_span(self.span(node))
            .with_label("unparsable");
            self.diagnostics.push(diag);
            return;
        }
        if node.is_missing() {
            let diag = Diagnostic::error(format!(
                "missing `{}` at line {}",
                node.kind(),
                self.line(node)
            ))
            .with_span(self.span(node))
            .with_label("expected here");
            self.diagnostics.push(diag);
            return;
        }

        let children: Vec<Node> = node.children(&mut node.walk()).collect();
        for child in children {
            if child.has_error() || child.is_missing() {
                self.report_syntax_errors(child);
            }
        }
    }
}
