use pretty_assertions::assert_eq;
use review_core::{
    reconcile, EditMode, ExportFooter, ItemKey, Paragraph, ParagraphStatus, RowMetrics,
    RowRenderer, SummaryHeader, Viewport, VirtualList,
};

#[derive(Default)]
struct CountingRenderer {
    calls: Vec<String>,
}

impl RowRenderer for CountingRenderer {
    type Row = String;

    fn header(&mut self, _header: &SummaryHeader) -> String {
        self.calls.push("header".to_string());
        "header".to_string()
    }

    fn changed(&mut self, original_index: usize, _paragraph: &Paragraph) -> String {
        let row = format!("changed:{original_index}");
        self.calls.push(row.clone());
        row
    }

    fn unchanged_group(&mut self, original_index: usize, paragraphs: &[Paragraph]) -> String {
        let row = format!("group:{original_index}x{}", paragraphs.len());
        self.calls.push(row.clone());
        row
    }

    fn footer(&mut self, _footer: &ExportFooter) -> String {
        self.calls.push("footer".to_string());
        "footer".to_string()
    }
}

fn header(total: usize, changed: usize) -> SummaryHeader {
    SummaryHeader {
        mode: EditMode::Copyedit,
        article_title: Some("Article".to_string()),
        section_title: Some("Section".to_string()),
        article_url: None,
        total_paragraphs: total,
        changed_count: changed,
    }
}

// Every changed paragraph is one wrapped line plus chrome: 3 rows.
fn metrics() -> RowMetrics {
    RowMetrics {
        header_rows: 2,
        footer_rows: 2,
        collapsed_group_rows: 1,
        wrap_columns: 40,
        changed_chrome_rows: 2,
    }
}

fn alternating(count: usize) -> Vec<Paragraph> {
    (0..count)
        .map(|i| {
            if i % 2 == 0 {
                Paragraph::new(format!("p{i}"), format!("p{i}!"), ParagraphStatus::Changed)
            } else {
                Paragraph::new(format!("p{i}"), format!("p{i}"), ParagraphStatus::Unchanged)
            }
        })
        .collect()
}

fn build(count: usize) -> VirtualList {
    let paragraphs = alternating(count);
    let mut list = VirtualList::new(metrics());
    list.set_content(Some(header(count, count.div_ceil(2))), reconcile(&paragraphs));
    list
}

#[test]
fn offsets_follow_estimated_heights() {
    let list = build(4);
    // header(2) changed(3) group(1) changed(3) group(1)
    assert_eq!(list.len(), 5);
    assert_eq!(list.item_top(0), 0);
    assert_eq!(list.item_top(1), 2);
    assert_eq!(list.item_top(2), 5);
    assert_eq!(list.item_top(3), 6);
    assert_eq!(list.total_height(), 10);
}

#[test]
fn visible_range_applies_overscan_and_clamps() {
    let list = build(200);
    // rows 0..2 header, then pairs of 4 rows per (changed, group).
    let range = list.visible_range(2 + 4 * 50, 8, 3);
    assert_eq!(range, 98..108);

    assert_eq!(list.visible_range(0, 5, 3), 0..5);
    let end = list.len();
    assert_eq!(list.visible_range(list.total_height() + 100, 10, 3), end - 4..end);
}

#[test]
fn materialize_renders_only_the_window() {
    let list = build(10_000);
    let mut renderer = CountingRenderer::default();

    let rows = list.materialize(
        Viewport {
            top: 0,
            height: 6,
            overscan: 0,
        },
        &mut renderer,
    );

    assert_eq!(
        renderer.calls,
        vec!["header", "changed:0", "group:1x1"]
    );
    assert_eq!(
        rows.iter().map(|(key, _)| *key).collect::<Vec<_>>(),
        vec![ItemKey::Header, ItemKey::Paragraph(0), ItemKey::Paragraph(1)]
    );
}

#[test]
fn footer_toggle_keeps_earlier_items_in_place() {
    let mut list = build(6);
    let before: Vec<(Option<ItemKey>, u32)> =
        (0..list.len()).map(|i| (list.key(i), list.item_top(i))).collect();

    list.set_footer(Some(ExportFooter {
        changed_count: 3,
        accepted_count: 1,
    }));
    assert!(list.has_footer());
    assert_eq!(list.index_of(ItemKey::Footer), Some(list.len() - 1));
    let after: Vec<(Option<ItemKey>, u32)> = (0..list.len() - 1)
        .map(|i| (list.key(i), list.item_top(i)))
        .collect();
    assert_eq!(after, before);

    list.set_footer(None);
    assert!(!list.has_footer());
    assert_eq!(list.len(), before.len());
}

#[test]
fn index_of_finds_paragraph_keys() {
    let list = build(7);
    assert_eq!(list.index_of(ItemKey::Header), Some(0));
    assert_eq!(list.index_of(ItemKey::Paragraph(4)), Some(5));
    assert_eq!(list.index_of(ItemKey::Paragraph(99)), None);
    assert_eq!(list.index_of(ItemKey::Footer), None);
}

#[test]
fn empty_list_has_empty_window() {
    let list = VirtualList::default();
    assert_eq!(list.visible_range(0, 40, 3), 0..0);
    assert_eq!(list.total_height(), 0);
}
