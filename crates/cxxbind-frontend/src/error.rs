use cxxbind_common::{Diagnostic, SourceFile};
use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors that stop a header from being used.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum HeaderError {
    /// tree-sitter could not make sense of part of the header.
    #[error("{path}: {message}")]
    #[diagnostic(
        code(cxxbind::frontend::syntax),
        help(
            "macros that expand to declarations are a common cause; \
             set `strict = false` in cxxbind.toml to skip the region"
        )
    )]
    Syntax {
        path: String,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{label}")]
        span: Option<SourceSpan>,
        label: String,
    },
}

impl HeaderError {
    pub fn syntax(source: &SourceFile, diag: &Diagnostic) -> Self {
        let path = source.path.display().to_string();
        HeaderError::Syntax {
            src: NamedSource::new(path.clone(), source.content.clone()),
            path,
            message: diag.message.clone(),
            span: diag.span,
            label: diag.label.clone(),
        }
    }
}
