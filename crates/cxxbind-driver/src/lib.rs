use cxxbind_codegen::{emit_module, HeaderUnit, HookSet};
use cxxbind_common::{DiagnosticLevel, SourceMap};
use cxxbind_config::BindConfig;
use cxxbind_model::HeaderModel;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Orchestrates the pipeline: read headers, lower them, emit the module.
pub struct Driver {
    source_map: SourceMap,
    config: BindConfig,
    hooks: HookSet,
}

impl Driver {
    /// A driver with the default configuration.
    pub fn new() -> Self {
        Self {
            source_map: SourceMap::new(),
            config: BindConfig::default(),
            hooks: HookSet::standard(),
        }
    }

    /// A driver using `config` for hooks, includes and strictness.
    pub fn with_config(config: BindConfig) -> Result<Self> {
        let hooks = config.build_hooks().into_diagnostic()?;
        debug!(hooks = ?hooks, "configured method hooks");
        Ok(Self {
            source_map: SourceMap::new(),
            config,
            hooks,
        })
    }

    /// Replace the hook set, e.g. with custom hooks built in code.
    pub fn set_hooks(&mut self, hooks: HookSet) {
        self.hooks = hooks;
    }

    /// Parse a single header into its structural model.
    pub fn parse_header(&self, path: impl AsRef<Path>) -> Result<HeaderModel> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e))?;

        let source_id = self.source_map.add_file(path, content)?;
        let source = self
            .source_map
            .get(source_id)
            .ok_or_else(|| miette::miette!("Source file not found"))?;

        let lowered = if self.config.strict {
            cxxbind_frontend::parse_file_strict(&source)?
        } else {
            cxxbind_frontend::parse_file(&source)?
        };

        for diag in &lowered.diagnostics {
            let header = path.display();
            match diag.level {
                DiagnosticLevel::Error | DiagnosticLevel::Warning => {
                    warn!(header = %header, "{}", diag.message)
                }
                DiagnosticLevel::Info => debug!(header = %header, "{}", diag.message),
            }
        }

        info!(
            header = %path.display(),
            classes = lowered.header.classes.len(),
            enums = lowered.header.enums.len(),
            "parsed header"
        );
        Ok(lowered.header)
    }

    /// Generate the complete module source for `module_name` from `headers`.
    pub fn generate(&self, module_name: &str, headers: &[PathBuf]) -> Result<String> {
        let mut units = Vec::with_capacity(headers.len());
        for header in headers {
            let model = self.parse_header(header)?;
            units.push(HeaderUnit::new(self.config.module.include_for(header), model));
        }

        info!(module = module_name, headers = units.len(), "emitting module");
        Ok(emit_module(module_name, &units, &self.hooks))
    }

    /// Generate using the module name and headers from the configuration.
    pub fn generate_configured(&self) -> Result<String> {
        let name = self.config.module.name.as_deref().ok_or_else(|| {
            miette::miette!(
                help = "set `module.name` in cxxbind.toml or pass it on the command line",
                "No module name configured"
            )
        })?;
        if self.config.module.headers.is_empty() {
            return Err(miette::miette!("No headers configured"));
        }
        self.generate(name, &self.config.module.headers)
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    pub fn hooks(&self) -> &HookSet {
        &self.hooks
    }

    /// Get a reference to the source map.
    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_header_file() {
        let mut file = NamedTempFile::with_suffix(".h").unwrap();
        writeln!(file, "class Widget {{ public: int GetValue(); }};").unwrap();

        let driver = Driver::new();
        let header = driver.parse_header(file.path()).unwrap();

        assert_eq!(header.classes.len(), 1);
        assert_eq!(driver.source_map().len(), 1);
    }

    #[test]
    fn test_rejects_non_header() {
        let mut file = NamedTempFile::with_suffix(".cpp").unwrap();
        writeln!(file, "int main() {{ return 0; }}").unwrap();

        assert!(Driver::new().parse_header(file.path()).is_err());
    }

    #[test]
    fn test_strict_config_fails_on_syntax_error() {
        let mut file = NamedTempFile::with_suffix(".h").unwrap();
        writeln!(file, "class Widget {{ public: int GetValue( ; }};").unwrap();

        assert!(Driver::new().parse_header(file.path()).is_ok());

        let config = BindConfig {
            strict: true,
            ..BindConfig::default()
        };
        let driver = Driver::with_config(config).unwrap();
        assert!(driver.parse_header(file.path()).is_err());
    }

    #[test]
    fn test_generate_configured_requires_name() {
        let err = Driver::new().generate_configured().unwrap_err();
        assert!(err.to_string().contains("No module name"));
    }
}
