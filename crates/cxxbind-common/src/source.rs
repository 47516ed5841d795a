use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Unique identifier for a header loaded into a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u32);

impl SourceId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }
}

const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "h++"];

/// Whether `path` carries one of the C++ header extensions we accept.
pub fn is_header_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| HEADER_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// A header with its contents.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: SourceId,
    pub path: PathBuf,
    pub content: String,
    line_starts: Vec<u32>,
}

impl SourceFile {
    pub fn new(id: SourceId, path: PathBuf, content: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i as u32 + 1))
            .collect();

        Self {
            id,
            path,
            content,
            line_starts,
        }
    }

    /// Build an anonymous source, mostly for tests and in-memory headers.
    pub fn anonymous(content: impl Into<String>) -> Self {
        Self::new(SourceId::new(0), PathBuf::from("<memory>.h"), content.into())
    }

    /// Get line and column (0-indexed) from byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line];
        (line as u32, col)
    }

    /// Get the content of a specific line.
    pub fn line(&self, line: u32) -> &str {
        let start = self.line_starts[line as usize] as usize;
        let end = self
            .line_starts
            .get(line as usize + 1)
            .map(|&e| e as usize)
            .unwrap_or(self.content.len());
        self.content[start..end].trim_end_matches('\n')
    }
}

/// Registry of all headers seen by one driver.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: RwLock<Vec<SourceFile>>,
    path_to_id: RwLock<FxHashMap<PathBuf, SourceId>>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: String) -> miette::Result<SourceId> {
        let path = path.as_ref().to_path_buf();

        if !is_header_path(&path) {
            return Err(miette::miette!(
                help = "expected one of: .h, .hh, .hpp, .hxx, .h++",
                "Not a C++ header: {}",
                path.display()
            ));
        }

        let mut files = self
            .files
            .write()
            .map_err(|_| miette::miette!("Source map lock poisoned"))?;
        let mut path_to_id = self
            .path_to_id
            .write()
            .map_err(|_| miette::miette!("Source map lock poisoned"))?;

        if let Some(&id) = path_to_id.get(&path) {
            files[id.0 as usize] = SourceFile::new(id, path, content);
            return Ok(id);
        }

        let id = SourceId(files.len() as u32);
        let file = SourceFile::new(id, path.clone(), content);
        files.push(file);
        path_to_id.insert(path, id);

        Ok(id)
    }

    pub fn get(&self, id: SourceId) -> Option<SourceFile> {
        let files = self.files.read().ok()?;
        files.get(id.0 as usize).cloned()
    }

    pub fn get_by_path(&self, path: impl AsRef<Path>) -> Option<SourceFile> {
        let id = {
            let path_to_id = self.path_to_id.read().ok()?;
            *path_to_id.get(path.as_ref())?
        };
        self.get(id)
    }

    pub fn len(&self) -> usize {
        self.files.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
