// ABOUTME: Defines the Document trait - the interface to a live rich-text
// ABOUTME: document, plus the text block, leaf, and selection types it exposes.

use crate::error::DocumentError;

/// A text-bearing leaf node and its structural start position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLeaf {
    pub pos: usize,
    pub text: String,
}

impl TextLeaf {
    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A textblock (paragraph, heading, ...) and the leaves inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// Position of the first inline slot, just inside the opening boundary.
    pub content_start: usize,

    /// Position just before the closing boundary.
    pub content_end: usize,

    pub leaves: Vec<TextLeaf>,
}

impl TextBlock {
    /// Concatenated text of all leaves.
    pub fn text(&self) -> String {
        self.leaves.iter().map(|l| l.text.as_str()).collect()
    }
}

/// A selection between two structural positions. Collapsed when `from == to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub from: usize,
    pub to: usize,
}

impl Selection {
    pub fn new(from: usize, to: usize) -> Self {
        Self {
            from: from.min(to),
            to: from.max(to),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// A live rich-text document.
///
/// Structural positions count node boundaries as well as characters, so they
/// drift away from offsets into the flattened text as soon as a document has
/// more than one block. Use [`text_offset_to_position`](super::text_offset_to_position)
/// to go from one to the other.
pub trait Document: Send {
    /// Textblocks in document order.
    fn text_blocks(&self) -> Vec<TextBlock>;

    /// Total structural size of the document content.
    fn content_size(&self) -> usize;

    /// The current selection.
    fn selection(&self) -> Selection;

    /// Flattened text between two structural positions, blocks separated by `\n`.
    fn text_between(&self, from: usize, to: usize) -> String;

    /// Delete `from..to` and insert `text` there as a single undoable step.
    fn replace_range(&mut self, from: usize, to: usize, text: &str) -> Result<(), DocumentError>;

    /// The whole document flattened to text, blocks joined by `\n`.
    fn text_content(&self) -> String {
        self.text_blocks()
            .iter()
            .map(TextBlock::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
