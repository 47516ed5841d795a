mod span;
mod source;
mod diagnostic;

pub use span::Span;
pub use source::{is_header_path, SourceFile, SourceId, SourceMap};
pub use diagnostic::{Diagnostic, DiagnosticLevel};
