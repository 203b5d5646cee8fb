//! File names and contents of a checked program.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::base::{FileId, TextRange};

/// One source file as the checker saw it.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// File name as given by the collaborator (usually tree-relative).
    pub name: Arc<str>,
    pub text: Arc<str>,
}

/// Maps file ids to names and text.
///
/// Ids are assigned in insertion order and never reused.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    files: IndexMap<FileId, SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file and return its id.
    pub fn add(&mut self, name: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> FileId {
        let id = FileId::new(self.files.len() as u32);
        self.files.insert(
            id,
            SourceFile {
                name: name.into(),
                text: text.into(),
            },
        );
        id
    }

    pub fn get(&self, file: FileId) -> Option<&SourceFile> {
        self.files.get(&file)
    }

    /// The file name, or `""` for an unknown id.
    pub fn name(&self, file: FileId) -> &str {
        self.files.get(&file).map(|f| &*f.name).unwrap_or("")
    }

    pub fn text(&self, file: FileId) -> &str {
        self.files.get(&file).map(|f| &*f.text).unwrap_or("")
    }

    /// The source text covered by `range`, if it lies inside the file.
    pub fn slice(&self, file: FileId, range: TextRange) -> Option<&str> {
        self.text(file).get(std::ops::Range::<usize>::from(range))
    }

    /// Final path component of the file name.
    pub fn base_name(&self, file: FileId) -> &str {
        let name = self.name(file);
        Path::new(name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(name)
    }

    /// Base name without the `.go` extension, used in scope labels.
    pub fn stripped_name(&self, file: FileId) -> &str {
        let base = self.base_name(file);
        base.strip_suffix(".go").unwrap_or(base)
    }

    /// Directory part of the file name; `.` when there is none.
    pub fn dir(&self, file: FileId) -> String {
        match Path::new(self.name(file)).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
            _ => ".".to_owned(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> + '_ {
        self.files.iter().map(|(&id, file)| (id, file))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
