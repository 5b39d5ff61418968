// ABOUTME: Maps offsets in a document's flattened text to structural positions.
// ABOUTME: Walks text leaves in order, counting block separators as one character.

use super::Document;

/// Translate a character offset into the flattened text of `doc` into a
/// structural document position.
///
/// Leaves are walked in order with a running count of consumed characters;
/// the first leaf that extends past `offset` contains it. The `\n` between two
/// textblocks is one flattened character with no leaf of its own, so an offset
/// sitting right at the end of a block resolves to that block's text end.
/// Offsets past every leaf (the end of the document) fall back to
/// [`Document::content_size`].
pub fn text_offset_to_position<D: Document + ?Sized>(doc: &D, offset: usize) -> usize {
    let blocks = doc.text_blocks();
    let last = blocks.len().saturating_sub(1);
    let mut consumed = 0;

    for (index, block) in blocks.iter().enumerate() {
        for leaf in &block.leaves {
            let len = leaf.len();
            if consumed + len > offset {
                return leaf.pos + (offset - consumed);
            }
            consumed += len;
        }

        if index < last {
            if offset == consumed {
                return block.content_end;
            }
            consumed += 1;
        }
    }

    doc.content_size()
}

/// Character offset of a byte index into `text`.
pub(crate) fn char_offset(text: &str, byte_index: usize) -> usize {
    text[..byte_index].chars().count()
}
