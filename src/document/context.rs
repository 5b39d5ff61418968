// ABOUTME: DocumentContext - read-only file metadata supplied by the host app.
// ABOUTME: Carries the file name and the raw markdown source snapshot.

/// Read-only metadata about the document being edited.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    /// Name of the open file, if it has one.
    pub file_name: Option<String>,

    /// Raw markdown source as last loaded or saved.
    pub content: String,
}

impl DocumentContext {
    /// Create a context for a named file.
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            content: content.into(),
        }
    }

    /// Create a context for a document that has never been saved.
    pub fn untitled(content: impl Into<String>) -> Self {
        Self {
            file_name: None,
            content: content.into(),
        }
    }

    /// File name for display, falling back to "Untitled".
    pub fn display_name(&self) -> &str {
        match self.file_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Untitled",
        }
    }
}
