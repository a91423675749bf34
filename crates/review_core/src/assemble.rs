use crate::{Choice, Paragraph, SelectionStore};

/// Separator placed between paragraphs in assembled text.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Builds the final text from paragraphs and the reviewer's choices.
///
/// A CHANGED paragraph contributes its edited text only when `After` was
/// chosen; everything else, including CHANGED paragraphs without a choice,
/// falls back to the original text.
pub fn assemble(paragraphs: &[Paragraph], selections: &SelectionStore) -> String {
    paragraphs
        .iter()
        .enumerate()
        .map(|(index, paragraph)| {
            if paragraph.is_changed() && selections.get(index) == Some(Choice::After) {
                paragraph.after.as_str()
            } else {
                paragraph.before.as_str()
            }
        })
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}
