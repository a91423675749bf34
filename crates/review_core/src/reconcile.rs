use std::slice;

use crate::Paragraph;

/// Presentation-level grouping of paragraphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderItem {
    /// A single CHANGED paragraph the reviewer decides on.
    Changed {
        paragraph: Paragraph,
        original_index: usize,
    },
    /// A contiguous run of non-CHANGED paragraphs, anchored at the index of
    /// its first paragraph.
    UnchangedGroup {
        paragraphs: Vec<Paragraph>,
        original_index: usize,
    },
}

impl RenderItem {
    pub fn original_index(&self) -> usize {
        match self {
            RenderItem::Changed { original_index, .. }
            | RenderItem::UnchangedGroup { original_index, .. } => *original_index,
        }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        match self {
            RenderItem::Changed { paragraph, .. } => slice::from_ref(paragraph),
            RenderItem::UnchangedGroup { paragraphs, .. } => paragraphs,
        }
    }

    /// Source indices covered by this item.
    pub fn index_range(&self) -> std::ops::Range<usize> {
        let start = self.original_index();
        start..start + self.paragraphs().len()
    }
}

/// Partitions paragraphs into contiguous render items in a single forward pass.
///
/// Concatenating the paragraphs of the returned items reproduces the input
/// exactly, in order.
pub fn reconcile(paragraphs: &[Paragraph]) -> Vec<RenderItem> {
    let mut items = Vec::new();
    let mut pending: Vec<Paragraph> = Vec::new();
    let mut pending_start = 0;

    for (index, paragraph) in paragraphs.iter().enumerate() {
        if paragraph.is_changed() {
            flush_group(&mut items, &mut pending, pending_start);
            items.push(RenderItem::Changed {
                paragraph: paragraph.clone(),
                original_index: index,
            });
        } else {
            if pending.is_empty() {
                pending_start = index;
            }
            pending.push(paragraph.clone());
        }
    }
    flush_group(&mut items, &mut pending, pending_start);

    items
}

fn flush_group(items: &mut Vec<RenderItem>, pending: &mut Vec<Paragraph>, start: usize) {
    if pending.is_empty() {
        return;
    }
    items.push(RenderItem::UnchangedGroup {
        paragraphs: std::mem::take(pending),
        original_index: start,
    });
}
