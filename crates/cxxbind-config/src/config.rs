//! Configuration types (`cxxbind.toml` format).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use cxxbind_codegen::{HookSet, ReferenceOutHook, SentinelErrorHook};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// File name looked up by [`BindConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "cxxbind.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindConfig {
    /// Module name and headers.
    #[serde(default)]
    pub module: ModuleConfig,

    /// Method hooks and their settings.
    #[serde(default)]
    pub hooks: HooksConfig,

    /// Fail on the first syntax error instead of skipping the region.
    #[serde(default)]
    pub strict: bool,
}

/// The extension module being generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Python module name (e.g. `wpilib`).
    #[serde(default)]
    pub name: Option<String>,

    /// Headers to bind, relative to the working directory.
    #[serde(default)]
    pub headers: Vec<PathBuf>,

    /// Prefix for generated `#include` lines. When set, includes use the
    /// header's file name under this prefix instead of the path as given.
    #[serde(default)]
    pub include_prefix: Option<String>,
}

impl ModuleConfig {
    /// Text placed between `<` and `>` in the include line for `header`.
    pub fn include_for(&self, header: &Path) -> String {
        match (&self.include_prefix, header.file_name()) {
            (Some(prefix), Some(file)) => format!("{prefix}{}", file.to_string_lossy()),
            _ => header.to_string_lossy().into_owned(),
        }
    }
}

/// Hook selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Hook names in the order they run.
    #[serde(default = "default_order")]
    pub order: Vec<String>,

    /// Settings for the `sentinel_error` hook.
    #[serde(default)]
    pub sentinel_error: SentinelConfig,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
            sentinel_error: SentinelConfig::default(),
        }
    }
}

fn default_order() -> Vec<String> {
    vec![
        HookKind::ReferenceOut.name().to_string(),
        HookKind::SentinelError.name().to_string(),
    ]
}

/// Status-code type and the check function that raises on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentinelConfig {
    #[serde(default = "default_sentinel_type")]
    pub type_name: String,

    #[serde(default = "default_check_fn")]
    pub check_fn: String,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            type_name: default_sentinel_type(),
            check_fn: default_check_fn(),
        }
    }
}

fn default_sentinel_type() -> String {
    "CTR_Code".to_string()
}

fn default_check_fn() -> String {
    "CheckCTRCode".to_string()
}

/// The built-in hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    ReferenceOut,
    SentinelError,
}

impl HookKind {
    pub fn name(self) -> &'static str {
        match self {
            HookKind::ReferenceOut => "reference_out",
            HookKind::SentinelError => "sentinel_error",
        }
    }
}

impl FromStr for HookKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reference_out" => Ok(HookKind::ReferenceOut),
            "sentinel_error" => Ok(HookKind::SentinelError),
            other => Err(ConfigError::UnknownHook(other.to_string())),
        }
    }
}

impl BindConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BindConfig = toml::from_str(&content)?;
        config.hook_kinds()?;
        Ok(config)
    }

    /// Load `cxxbind.toml` from `dir` if it exists.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::from_file(&path).map(Some)
    }

    /// The configured hooks, validated, in run order.
    pub fn hook_kinds(&self) -> Result<Vec<HookKind>> {
        let mut kinds = Vec::with_capacity(self.hooks.order.len());
        for name in &self.hooks.order {
            let kind: HookKind = name.parse()?;
            if kinds.contains(&kind) {
                return Err(ConfigError::DuplicateHook(name.clone()));
            }
            kinds.push(kind);
        }
        Ok(kinds)
    }

    /// Instantiate the configured hooks.
    pub fn build_hooks(&self) -> Result<HookSet> {
        let mut hooks = HookSet::new();
        for kind in self.hook_kinds()? {
            match kind {
                HookKind::ReferenceOut => hooks.push(ReferenceOutHook),
                HookKind::SentinelError => hooks.push(SentinelErrorHook::new(
                    self.hooks.sentinel_error.type_name.clone(),
                    self.hooks.sentinel_error.check_fn.clone(),
                )),
            }
        }
        Ok(hooks)
    }
}
