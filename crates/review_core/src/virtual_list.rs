//! Windowed review list: header, render items and an export footer addressed
//! by stable keys, with only the visible slice materialized.

use std::ops::Range;

use crate::{EditMode, Paragraph, RenderItem};

/// Items materialized above and below the viewport.
pub const DEFAULT_OVERSCAN: usize = 3;

/// Summary metadata shown above the paragraphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryHeader {
    pub mode: EditMode,
    pub article_title: Option<String>,
    pub section_title: Option<String>,
    pub article_url: Option<String>,
    pub total_paragraphs: usize,
    pub changed_count: usize,
}

/// Export affordance, present once every decision has been made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFooter {
    pub changed_count: usize,
    pub accepted_count: usize,
}

/// One row of the logical list. Rendering dispatches on this tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListItem {
    Header(SummaryHeader),
    Changed {
        paragraph: Paragraph,
        original_index: usize,
    },
    UnchangedGroup {
        paragraphs: Vec<Paragraph>,
        original_index: usize,
    },
    Footer(ExportFooter),
}

impl From<RenderItem> for ListItem {
    fn from(item: RenderItem) -> Self {
        match item {
            RenderItem::Changed {
                paragraph,
                original_index,
            } => ListItem::Changed {
                paragraph,
                original_index,
            },
            RenderItem::UnchangedGroup {
                paragraphs,
                original_index,
            } => ListItem::UnchangedGroup {
                paragraphs,
                original_index,
            },
        }
    }
}

/// Position-independent identity of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKey {
    Header,
    Paragraph(usize),
    Footer,
}

impl ListItem {
    pub fn key(&self) -> ItemKey {
        match self {
            ListItem::Header(_) => ItemKey::Header,
            ListItem::Changed { original_index, .. }
            | ListItem::UnchangedGroup { original_index, .. } => {
                ItemKey::Paragraph(*original_index)
            }
            ListItem::Footer(_) => ItemKey::Footer,
        }
    }
}

/// Height estimates, in terminal rows or any other uniform unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowMetrics {
    pub header_rows: u32,
    pub footer_rows: u32,
    pub collapsed_group_rows: u32,
    /// Columns available to each side of a changed paragraph.
    pub wrap_columns: u32,
    /// Rows added to every changed paragraph for its label and spacing.
    pub changed_chrome_rows: u32,
}

impl Default for RowMetrics {
    fn default() -> Self {
        Self {
            header_rows: 4,
            footer_rows: 2,
            collapsed_group_rows: 1,
            wrap_columns: 80,
            changed_chrome_rows: 2,
        }
    }
}

impl RowMetrics {
    fn height_of(&self, item: &ListItem) -> u32 {
        match item {
            ListItem::Header(_) => self.header_rows,
            ListItem::Footer(_) => self.footer_rows,
            ListItem::UnchangedGroup { .. } => self.collapsed_group_rows,
            ListItem::Changed { paragraph, .. } => {
                let before = wrapped_rows(&paragraph.before, self.wrap_columns);
                let after = wrapped_rows(&paragraph.after, self.wrap_columns);
                before.max(after) + self.changed_chrome_rows
            }
        }
        .max(1)
    }
}

fn wrapped_rows(text: &str, columns: u32) -> u32 {
    let columns = columns.max(1) as usize;
    text.split('\n')
        .map(|line| {
            let chars = line.chars().count();
            if chars == 0 {
                1
            } else {
                chars.div_ceil(columns) as u32
            }
        })
        .sum::<u32>()
        .max(1)
}

/// Scroll position and size of the host's viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub top: u32,
    pub height: u32,
    pub overscan: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            top: 0,
            height: 40,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

/// Host-side rendering strategy, one method per item variant.
pub trait RowRenderer {
    type Row;

    fn header(&mut self, header: &SummaryHeader) -> Self::Row;
    fn changed(&mut self, original_index: usize, paragraph: &Paragraph) -> Self::Row;
    fn unchanged_group(&mut self, original_index: usize, paragraphs: &[Paragraph]) -> Self::Row;
    fn footer(&mut self, footer: &ExportFooter) -> Self::Row;
}

/// The logical list plus a prefix table of item offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualList {
    items: Vec<ListItem>,
    metrics: RowMetrics,
    // offsets[i] is the top of item i; offsets[len] is the total height.
    offsets: Vec<u32>,
}

impl Default for VirtualList {
    fn default() -> Self {
        Self::new(RowMetrics::default())
    }
}

impl VirtualList {
    pub fn new(metrics: RowMetrics) -> Self {
        Self {
            items: Vec::new(),
            metrics,
            offsets: vec![0],
        }
    }

    /// Replaces the header and body. Any footer is dropped.
    pub fn set_content(&mut self, header: Option<SummaryHeader>, body: Vec<RenderItem>) {
        self.items.clear();
        self.items.extend(header.map(ListItem::Header));
        self.items.extend(body.into_iter().map(ListItem::from));
        self.rebuild_offsets();
    }

    /// Adds, replaces or removes the footer. Earlier items keep their index
    /// and offset.
    pub fn set_footer(&mut self, footer: Option<ExportFooter>) {
        if matches!(self.items.last(), Some(ListItem::Footer(_))) {
            self.items.pop();
            self.offsets.pop();
        }
        if let Some(footer) = footer {
            let item = ListItem::Footer(footer);
            let top = self.total_height();
            self.offsets.push(top + self.metrics.height_of(&item));
            self.items.push(item);
        }
    }

    pub fn has_footer(&self) -> bool {
        matches!(self.items.last(), Some(ListItem::Footer(_)))
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.rebuild_offsets();
    }

    pub fn set_metrics(&mut self, metrics: RowMetrics) {
        if self.metrics != metrics {
            self.metrics = metrics;
            self.rebuild_offsets();
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, index: usize) -> Option<&ListItem> {
        self.items.get(index)
    }

    pub fn key(&self, index: usize) -> Option<ItemKey> {
        self.items.get(index).map(ListItem::key)
    }

    /// Index of the item with `key`, if present.
    pub fn index_of(&self, key: ItemKey) -> Option<usize> {
        match key {
            ItemKey::Header => matches!(self.items.first(), Some(ListItem::Header(_))).then_some(0),
            ItemKey::Footer => self.has_footer().then(|| self.items.len() - 1),
            ItemKey::Paragraph(original_index) => self
                .items
                .binary_search_by(|item| item.key().cmp(&ItemKey::Paragraph(original_index)))
                .ok(),
        }
    }

    pub fn total_height(&self) -> u32 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Top offset of item `index`; the total height for `index == len()`.
    pub fn item_top(&self, index: usize) -> u32 {
        self.offsets
            .get(index)
            .copied()
            .unwrap_or_else(|| self.total_height())
    }

    fn item_at(&self, y: u32) -> usize {
        // First item whose bottom edge lies below `y`.
        let bottoms = &self.offsets[1..];
        bottoms
            .partition_point(|bottom| *bottom <= y)
            .min(self.items.len().saturating_sub(1))
    }

    /// Items intersecting the viewport, widened by `overscan` on both sides.
    pub fn visible_range(&self, top: u32, height: u32, overscan: usize) -> Range<usize> {
        if self.items.is_empty() {
            return 0..0;
        }
        let first = self.item_at(top);
        let last = self.item_at(top.saturating_add(height.max(1)) - 1);
        let start = first.saturating_sub(overscan);
        let end = last
            .saturating_add(1)
            .saturating_add(overscan)
            .min(self.items.len());
        start..end.max(start)
    }

    /// Renders only the items in the viewport window.
    pub fn materialize<R: RowRenderer>(
        &self,
        viewport: Viewport,
        renderer: &mut R,
    ) -> Vec<(ItemKey, R::Row)> {
        let range = self.visible_range(viewport.top, viewport.height, viewport.overscan);
        self.items[range]
            .iter()
            .map(|item| (item.key(), render_item(item, renderer)))
            .collect()
    }

    fn rebuild_offsets(&mut self) {
        self.offsets.clear();
        self.offsets.push(0);
        let mut total = 0u32;
        for item in &self.items {
            total = total.saturating_add(self.metrics.height_of(item));
            self.offsets.push(total);
        }
    }
}

fn render_item<R: RowRenderer>(item: &ListItem, renderer: &mut R) -> R::Row {
    match item {
        ListItem::Header(header) => renderer.header(header),
        ListItem::Changed {
            paragraph,
            original_index,
        } => renderer.changed(*original_index, paragraph),
        ListItem::UnchangedGroup {
            paragraphs,
            original_index,
        } => renderer.unchanged_group(*original_index, paragraphs),
        ListItem::Footer(footer) => renderer.footer(footer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_rows_counts_lines_and_wraps() {
        assert_eq!(wrapped_rows("", 10), 1);
        assert_eq!(wrapped_rows("0123456789", 10), 1);
        assert_eq!(wrapped_rows("0123456789a", 10), 2);
        assert_eq!(wrapped_rows("ab\n\ncd", 10), 3);
    }

    #[test]
    fn item_at_finds_containing_item() {
        let mut list = VirtualList::new(RowMetrics::default());
        list.offsets = vec![0, 4, 5, 9];
        list.items = vec![
            ListItem::Footer(ExportFooter {
                changed_count: 0,
                accepted_count: 0,
            });
            3
        ];
        assert_eq!(list.item_at(0), 0);
        assert_eq!(list.item_at(3), 0);
        assert_eq!(list.item_at(4), 1);
        assert_eq!(list.item_at(5), 2);
        assert_eq!(list.item_at(100), 2);
    }
}
