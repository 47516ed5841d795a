//! Method rewrite hooks.
//!
//! A hook inspects the original method and mutates a [`HookContext`] that
//! describes the wrapper to synthesize. Hooks run in the order they were
//! registered and all of them run; the method is wrapped if any fired.

use cxxbind_model::{MethodModel, ParameterModel};
use smol_str::SmolStr;
use tracing::trace;

use crate::RETURN_VALUE;

/// The mutable description of one method's binding, threaded through hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookContext {
    /// Name the binding is exposed under.
    pub method_name: SmolStr,
    /// Parameters the wrapper lambda takes after the instance.
    pub in_params: Vec<ParameterModel>,
    /// Locals returned from the wrapper, in tuple order.
    pub ret_names: Vec<SmolStr>,
    /// Statements run before the wrapped call.
    pub pre: Vec<String>,
    /// Statements run after the wrapped call.
    pub post: Vec<String>,
}

impl HookContext {
    /// Fresh context for `method`: all parameters as inputs and, unless the
    /// method returns `void`, the call's return value as the only result.
    pub fn seed(method: &MethodModel) -> Self {
        let ret_names = if method.returns_void() {
            Vec::new()
        } else {
            vec![SmolStr::new_static(RETURN_VALUE)]
        };

        Self {
            method_name: method.name.clone(),
            in_params: method.params.clone(),
            ret_names,
            pre: Vec::new(),
            post: Vec::new(),
        }
    }

    pub fn returns_value(&self) -> bool {
        self.ret_names.iter().any(|n| n == RETURN_VALUE)
    }
}

/// A rewrite rule applied to every non-constructor, non-destructor method.
pub trait MethodHook {
    /// Short name used in configuration and logs.
    fn name(&self) -> &str {
        "custom"
    }

    /// Mutate `ctx` for `method` of `class_name`. Returns whether anything was rewritten.
    fn rewrite(&self, class_name: &str, method: &MethodModel, ctx: &mut HookContext) -> bool;
}

impl<F> MethodHook for F
where
    F: Fn(&str, &MethodModel, &mut HookContext) -> bool,
{
    fn rewrite(&self, class_name: &str, method: &MethodModel, ctx: &mut HookContext) -> bool {
        self(class_name, method, ctx)
    }
}

/// Treats every reference parameter as an output parameter.
///
/// The parameter is dropped from the wrapper's inputs, declared as a local of
/// its raw type, passed to the call by name, and appended to the results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceOutHook;

impl MethodHook for ReferenceOutHook {
    fn name(&self) -> &str {
        "reference_out"
    }

    fn rewrite(&self, _class_name: &str, method: &MethodModel, ctx: &mut HookContext) -> bool {
        let refs: Vec<&ParameterModel> = method.reference_params().collect();
        if refs.is_empty() {
            return false;
        }

        ctx.in_params.retain(|p| !p.is_reference);
        ctx.pre
            .extend(refs.iter().map(|p| format!("{} {}", p.raw_type, p.name)));
        ctx.ret_names.extend(refs.iter().map(|p| p.name.clone()));
        true
    }
}

/// Converts a status-code return type into a checked call.
///
/// The status value is no longer returned; a check function that raises on
/// failure is called on it after the wrapped call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelErrorHook {
    pub type_name: String,
    pub check_fn: String,
}

impl SentinelErrorHook {
    pub fn new(type_name: impl Into<String>, check_fn: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            check_fn: check_fn.into(),
        }
    }
}

impl Default for SentinelErrorHook {
    fn default() -> Self {
        Self::new("CTR_Code", "CheckCTRCode")
    }
}

impl MethodHook for SentinelErrorHook {
    fn name(&self) -> &str {
        "sentinel_error"
    }

    fn rewrite(&self, _class_name: &str, method: &MethodModel, ctx: &mut HookContext) -> bool {
        if method.returns != self.type_name {
            return false;
        }

        ctx.ret_names.retain(|n| n != RETURN_VALUE);
        ctx.post.push(format!("{}({RETURN_VALUE})", self.check_fn));
        true
    }
}

/// What running a [`HookSet`] over one method produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutcome {
    pub modified: bool,
    pub context: HookContext,
}

/// An ordered list of hooks.
#[derive(Default)]
pub struct HookSet {
    hooks: Vec<Box<dyn MethodHook>>,
}

impl HookSet {
    /// A set with no hooks; every method binds directly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference-out followed by the default status-code hook.
    pub fn standard() -> Self {
        Self::new()
            .with(ReferenceOutHook)
            .with(SentinelErrorHook::default())
    }

    pub fn with(mut self, hook: impl MethodHook + 'static) -> Self {
        self.push(hook);
        self
    }

    pub fn push(&mut self, hook: impl MethodHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    /// Run every hook, in order, over a fresh context for `method`.
    pub fn run(&self, class_name: &str, method: &MethodModel) -> HookOutcome {
        let mut context = HookContext::seed(method);
        let mut modified = false;

        for hook in &self.hooks {
            if hook.rewrite(class_name, method, &mut context) {
                trace!(hook = hook.name(), class = class_name, method = %method.name, "hook fired");
                modified = true;
            }
        }

        HookOutcome { modified, context }
    }
}

impl std::fmt::Debug for HookSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
