// ABOUTME: RichDocument - an in-memory structural document with blocks, marked
// ABOUTME: text runs, a selection, and a snapshot-based undo history.

use super::{Document, Selection, TextBlock, TextLeaf};
use crate::error::DocumentError;

/// Inline formatting applied to a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mark {
    Bold,
    Italic,
    Code,
    Link { href: String },
}

/// A run of text sharing one set of marks. This is a text leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub marks: Vec<Mark>,
}

impl TextRun {
    /// Create an unformatted run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// Create a run carrying the given marks.
    pub fn marked(text: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        Self {
            text: text.into(),
            marks: marks.into_iter().collect(),
        }
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }
}

/// The kind of a textblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    CodeBlock,
    BlockQuote,
}

/// A textblock. Occupies its text length plus two boundary positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<TextRun>,
}

impl Block {
    /// Create a block, dropping empty runs and merging neighbours with equal marks.
    pub fn new(kind: BlockKind, runs: Vec<TextRun>) -> Self {
        Self {
            kind,
            runs: normalize(runs),
        }
    }

    /// Create an unformatted paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, vec![TextRun::plain(text)])
    }

    /// Create an unformatted heading.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(BlockKind::Heading(level), vec![TextRun::plain(text)])
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Text length in characters.
    pub fn len(&self) -> usize {
        self.runs.iter().map(TextRun::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn size(&self) -> usize {
        self.len() + 2
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    blocks: Vec<Block>,
    selection: Selection,
}

/// In-memory rich-text document.
///
/// Always holds at least one block. Every [`Document::replace_range`] call
/// records exactly one undo entry.
#[derive(Debug, Clone)]
pub struct RichDocument {
    blocks: Vec<Block>,
    selection: Selection,
    history: Vec<Snapshot>,
}

impl RichDocument {
    /// Create an empty document (one empty paragraph).
    pub fn new() -> Self {
        Self::from_blocks(Vec::new())
    }

    /// Create a document from blocks.
    pub fn from_blocks(mut blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            blocks.push(Block::paragraph(""));
        }
        Self {
            blocks,
            selection: Selection::default(),
            history: Vec::new(),
        }
    }

    /// Create a document with one plain paragraph per line of `text`.
    pub fn from_text(text: &str) -> Self {
        Self::from_blocks(text.split('\n').map(Block::paragraph).collect())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Set the selection, clamped to the document.
    pub fn set_selection(&mut self, from: usize, to: usize) {
        let size = self.content_size();
        self.selection = Selection::new(from.min(size), to.min(size));
    }

    /// Revert the most recent edit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.blocks = snapshot.blocks;
                self.selection = snapshot.selection;
                true
            }
            None => false,
        }
    }

    /// Number of edits that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.history.len()
    }

    /// Resolve a structural position to (block index, character offset).
    /// Boundary positions snap to the nearest text slot of their block.
    fn resolve(&self, pos: usize) -> (usize, usize) {
        let mut start = 0;
        for (index, block) in self.blocks.iter().enumerate() {
            let content_start = start + 1;
            if pos <= content_start + block.len() {
                return (index, pos.saturating_sub(content_start));
            }
            start += block.size();
        }
        let last = self.blocks.len() - 1;
        (last, self.blocks[last].len())
    }

    fn position_of(&self, block: usize, offset: usize) -> usize {
        let before: usize = self.blocks[..block].iter().map(Block::size).sum();
        before + 1 + offset
    }
}

impl Default for RichDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for RichDocument {
    fn text_blocks(&self) -> Vec<TextBlock> {
        let mut start = 0;
        self.blocks
            .iter()
            .map(|block| {
                let content_start = start + 1;
                let mut pos = content_start;
                let leaves = block
                    .runs
                    .iter()
                    .map(|run| {
                        let leaf = TextLeaf {
                            pos,
                            text: run.text.clone(),
                        };
                        pos += run.len();
                        leaf
                    })
                    .collect();
                start += block.size();
                TextBlock {
                    content_start,
                    content_end: pos,
                    leaves,
                }
            })
            .collect()
    }

    fn content_size(&self) -> usize {
        self.blocks.iter().map(Block::size).sum()
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn text_between(&self, from: usize, to: usize) -> String {
        let size = self.content_size();
        let sel = Selection::new(from.min(size), to.min(size));
        let (start_block, start_offset) = self.resolve(sel.from);
        let (end_block, end_offset) = self.resolve(sel.to);

        if start_block == end_block {
            return char_slice(&self.blocks[start_block].text(), start_offset, end_offset);
        }

        let first = &self.blocks[start_block];
        let mut parts = vec![char_slice(&first.text(), start_offset, first.len())];
        parts.extend(self.blocks[start_block + 1..end_block].iter().map(Block::text));
        parts.push(char_slice(&self.blocks[end_block].text(), 0, end_offset));
        parts.join("\n")
    }

    fn replace_range(&mut self, from: usize, to: usize, text: &str) -> Result<(), DocumentError> {
        let size = self.content_size();
        if from > to || to > size {
            return Err(DocumentError::InvalidRange { from, to, size });
        }

        let (start_block, start_offset) = self.resolve(from);
        let (end_block, end_offset) = self.resolve(to);

        self.history.push(Snapshot {
            blocks: self.blocks.clone(),
            selection: self.selection,
        });

        let first = &self.blocks[start_block];
        let last = &self.blocks[end_block];
        let marks = inherited_marks(&first.runs, start_offset);
        let mut head = slice_runs(&first.runs, 0, start_offset);
        let mut tail = slice_runs(&last.runs, end_offset, last.len());
        let (first_kind, last_kind) = (first.kind, last.kind);

        // Each newline in the inserted text starts a new block.
        let segments: Vec<&str> = text.split('\n').collect();
        let count = segments.len();
        let mut replacement = Vec::with_capacity(count);
        for (index, segment) in segments.iter().enumerate() {
            let mut runs = std::mem::take(&mut head);
            runs.push(TextRun::marked(*segment, marks.clone()));
            let kind = if index == 0 {
                first_kind
            } else if index == count - 1 {
                last_kind
            } else {
                BlockKind::Paragraph
            };
            if index == count - 1 {
                runs.append(&mut tail);
            }
            replacement.push(Block::new(kind, runs));
        }

        self.blocks.splice(start_block..=end_block, replacement);

        let inserted = segments[count - 1].chars().count();
        let caret = if count == 1 {
            self.position_of(start_block, start_offset + inserted)
        } else {
            self.position_of(start_block + count - 1, inserted)
        };
        self.selection = Selection::new(caret, caret);
        Ok(())
    }
}

fn normalize(runs: Vec<TextRun>) -> Vec<TextRun> {
    let mut out: Vec<TextRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(prev) if prev.marks == run.marks => prev.text.push_str(&run.text),
            _ => out.push(run),
        }
    }
    out
}

fn slice_runs(runs: &[TextRun], from: usize, to: usize) -> Vec<TextRun> {
    let mut out = Vec::new();
    let mut start = 0;
    for run in runs {
        let end = start + run.len();
        let lo = from.max(start);
        let hi = to.min(end);
        if lo < hi {
            out.push(TextRun::marked(
                char_slice(&run.text, lo - start, hi - start),
                run.marks.clone(),
            ));
        }
        start = end;
    }
    out
}

/// Marks that text typed at `offset` picks up: those of the preceding
/// character (or the first character at the block start). Links do not extend.
fn inherited_marks(runs: &[TextRun], offset: usize) -> Vec<Mark> {
    let target = offset.saturating_sub(1);
    let mut start = 0;
    for run in runs {
        let end = start + run.len();
        if target < end {
            return run
                .marks
                .iter()
                .filter(|m| !matches!(m, Mark::Link { .. }))
                .cloned()
                .collect();
        }
        start = end;
    }
    Vec::new()
}

fn char_slice(text: &str, from: usize, to: usize) -> String {
    text.chars().skip(from).take(to.saturating_sub(from)).collect()
}
