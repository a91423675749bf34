use chrono::{DateTime, Local, Utc};
use review_core::{
    process_wrappable_urls, strip_wrap_markers, Choice, ExportFooter, Paragraph, ParagraphStatus,
    PhaseView, ReviewViewModel, RowRenderer, SelectionStore, SummaryHeader, WRAP_MARKER,
};
use review_engine::{SectionHeadings, TaskDetail, TaskPage, TaskSummary};

use super::constants::*;

/// Plain-text rows for the review list, one `Vec<String>` per list item.
pub struct TerminalRenderer<'a> {
    selections: &'a SelectionStore,
    columns: usize,
}

impl<'a> TerminalRenderer<'a> {
    pub fn new(selections: &'a SelectionStore) -> Self {
        Self {
            selections,
            columns: WRAP_COLUMNS,
        }
    }
}

impl RowRenderer for TerminalRenderer<'_> {
    type Row = Vec<String>;

    fn header(&mut self, header: &SummaryHeader) -> Self::Row {
        let mut lines = vec![RULE.to_string()];
        match (&header.article_title, &header.section_title) {
            (Some(article), Some(section)) => lines.push(format!("{article} / {section}")),
            (Some(article), None) => lines.push(article.clone()),
            _ => lines.push("Pasted content".to_string()),
        }
        if let Some(url) = &header.article_url {
            lines.push(format!("{INDENT}{url}"));
        }
        lines.push(format!(
            "{INDENT}mode {}, {} paragraphs, {} changed",
            header.mode, header.total_paragraphs, header.changed_count
        ));
        lines.push(RULE.to_string());
        lines
    }

    fn changed(&mut self, original_index: usize, paragraph: &Paragraph) -> Self::Row {
        let choice = self.selections.get(original_index);
        let label = match choice {
            Some(Choice::After) => "keep edit",
            Some(Choice::Before) => "keep original",
            None => "undecided",
        };
        let mut lines = vec![format!("#{original_index} changed [{label}]")];

        let (before, after) = process_wrappable_urls(&paragraph.before, &paragraph.after);
        let width = self.columns.saturating_sub(BEFORE_PREFIX.len());
        push_prefixed(&mut lines, BEFORE_PREFIX, &wrap_text(&before, width));
        push_prefixed(&mut lines, AFTER_PREFIX, &wrap_text(&after, width));
        if !paragraph.status_details.trim().is_empty() {
            lines.push(format!("{INDENT}({})", paragraph.status_details.trim()));
        }
        lines.push(String::new());
        lines
    }

    fn unchanged_group(&mut self, original_index: usize, paragraphs: &[Paragraph]) -> Self::Row {
        let last = original_index + paragraphs.len().saturating_sub(1);
        let span = if last == original_index {
            format!("#{original_index}")
        } else {
            format!("#{original_index}-{last}")
        };
        let noted: Vec<String> = [
            ParagraphStatus::Rejected,
            ParagraphStatus::Skipped,
            ParagraphStatus::Errored,
        ]
        .into_iter()
        .filter_map(|status| {
            let count = paragraphs.iter().filter(|p| p.status == status).count();
            (count > 0).then(|| format!("{count} {}", status.as_str().to_lowercase()))
        })
        .collect();
        let mut line = format!("{span} not changed ({} paragraphs", paragraphs.len());
        if !noted.is_empty() {
            line.push_str(", ");
            line.push_str(&noted.join(", "));
        }
        line.push(')');
        vec![line]
    }

    fn footer(&mut self, footer: &ExportFooter) -> Self::Row {
        vec![
            RULE.to_string(),
            format!(
                "{} of {} edits accepted",
                footer.accepted_count, footer.changed_count
            ),
        ]
    }
}

fn push_prefixed(lines: &mut Vec<String>, prefix: &str, wrapped: &[String]) {
    for (i, line) in wrapped.iter().enumerate() {
        if i == 0 {
            lines.push(format!("{prefix}{line}"));
        } else {
            lines.push(format!("{INDENT}{line}"));
        }
    }
}

fn visible_width(text: &str) -> usize {
    text.chars().filter(|c| *c != WRAP_MARKER).count()
}

// Splits `chunk` into pieces of at most `columns` visible characters.
fn split_long(chunk: &str, columns: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut width = 0;
    for (offset, ch) in chunk.char_indices() {
        if ch == WRAP_MARKER {
            continue;
        }
        if width == columns {
            pieces.push(&chunk[start..offset]);
            start = offset;
            width = 0;
        }
        width += 1;
    }
    pieces.push(&chunk[start..]);
    pieces
}

/// Greedy wrap at spaces and [`WRAP_MARKER`] positions. Markers never reach
/// the output.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut width = 0;
        for chunk in raw_line.split_inclusive(|c: char| c == ' ' || c == WRAP_MARKER) {
            for piece in split_long(chunk, columns) {
                let piece_width = visible_width(piece.trim_end_matches(' '));
                if width > 0 && width + piece_width > columns {
                    lines.push(strip_wrap_markers(current.trim_end()));
                    current.clear();
                    width = 0;
                }
                current.push_str(piece);
                width += visible_width(piece);
            }
        }
        lines.push(strip_wrap_markers(current.trim_end()));
    }
    lines
}

/// One-line summary of where the review stands, if there is anything to say.
pub fn status_line(view: &ReviewViewModel) -> Option<String> {
    if let Some(error) = &view.inline_error {
        return Some(error.clone());
    }
    match &view.phase {
        PhaseView::Idle => None,
        PhaseView::Submitting => Some(format!("Submitting {} request...", view.mode)),
        PhaseView::Polling { task_id } => Some(match &view.progress {
            Some(progress) => progress.label(),
            None => format!("Waiting for task {task_id}"),
        }),
        PhaseView::Ready => Some(format!(
            "Ready: {} changed, {} accepted",
            view.changed_count, view.accepted_count
        )),
        PhaseView::Failed { .. } => view.error_banner.clone(),
    }
}

pub fn format_headings(headings: &SectionHeadings) -> Vec<String> {
    let mut lines = vec![headings.article_title.clone()];
    if !headings.article_url.is_empty() {
        lines.push(format!("{INDENT}{}", headings.article_url));
    }
    if headings.headings.is_empty() {
        lines.push(format!("{INDENT}(no sections)"));
    }
    for heading in &headings.headings {
        let depth = heading.level.saturating_sub(2) as usize;
        lines.push(format!("{INDENT}{}{}", "  ".repeat(depth), heading.text));
    }
    lines
}

fn local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn task_target(article: Option<&str>, section: Option<&str>) -> String {
    match (article, section) {
        (Some(article), Some(section)) => format!("{article} / {section}"),
        (Some(article), None) => article.to_string(),
        _ => "pasted content".to_string(),
    }
}

fn format_task_row(task: &TaskSummary) -> String {
    let changes = task
        .changes_count
        .map(|count| format!(", {count} changed"))
        .unwrap_or_default();
    format!(
        "{id}  {created}  {status:<8} {mode:<9} {target}{changes}",
        id = task.id,
        created = local_time(&task.created_at),
        status = task.status.as_str(),
        mode = task.editing_mode,
        target = task_target(task.article_title.as_deref(), task.section_title.as_deref()),
        changes = changes
    )
}

pub fn format_task_page(page: &TaskPage) -> Vec<String> {
    let mut lines: Vec<String> = page.results.iter().map(format_task_row).collect();
    if lines.is_empty() {
        lines.push("No tasks match.".to_string());
    }
    let p = &page.pagination;
    lines.push(format!(
        "page {} of {} ({} tasks)",
        p.page,
        p.total_pages.max(1),
        format_with_commas(p.total_count)
    ));
    lines
}

pub fn format_task_detail(task: &TaskDetail) -> Vec<String> {
    let mut lines = vec![
        format!("task      {}", task.id),
        format!("status    {}", task.status),
        format!("mode      {}", task.editing_mode),
        format!(
            "target    {}",
            task_target(task.article_title.as_deref(), task.section_title.as_deref())
        ),
        format!("created   {}", local_time(&task.created_at)),
    ];
    if let Some(started) = &task.started_at {
        lines.push(format!("started   {}", local_time(started)));
    }
    if let Some(completed) = &task.completed_at {
        lines.push(format!("completed {}", local_time(completed)));
    }
    match (&task.llm_provider, &task.llm_model) {
        (Some(provider), Some(model)) => lines.push(format!("model     {provider} {model}")),
        (Some(provider), None) => lines.push(format!("model     {provider}")),
        _ => {}
    }
    if let Some(error) = &task.error_message {
        lines.push(format!("error     {error}"));
    }
    if let Some(outcome) = task.outcome() {
        let changed = outcome.paragraphs.iter().filter(|p| p.is_changed()).count();
        lines.push(format!(
            "result    {} paragraphs, {} changed",
            outcome.paragraphs.len(),
            changed
        ));
    }
    lines
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
