use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Longest article or section title the backend accepts.
pub const MAX_TITLE_LEN: usize = 255;

const RAW_CONTENT_EXPORT_NAME: &str = "edited-content.txt";
const MAX_STEM_LEN: usize = 80;

/// Editing mode requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    Brevity,
    #[default]
    Copyedit,
}

impl EditMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EditMode::Brevity => "brevity",
            EditMode::Copyedit => "copyedit",
        }
    }
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brevity" => Ok(EditMode::Brevity),
            "copyedit" => Ok(EditMode::Copyedit),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// Input problems caught before anything is sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Enter an article title or paste content to edit.")]
    MissingTarget,
    #[error("Article title is required.")]
    MissingArticleTitle,
    #[error("Section title is required.")]
    MissingSectionTitle,
    #[error("Content to edit is empty.")]
    EmptyContent,
    #[error("Provide either an article section or raw content, not both.")]
    AmbiguousTarget,
    #[error("{field} must be at most {max} characters.")]
    TooLong { field: &'static str, max: usize },
    #[error("Invalid editing mode '{0}'. Must be 'brevity' or 'copyedit'.")]
    UnknownMode(String),
}

/// What to edit: a section of an article, or raw content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Section {
        article_title: String,
        section_title: String,
    },
    Content(String),
}

impl EditTarget {
    pub fn section(article_title: impl Into<String>, section_title: impl Into<String>) -> Self {
        EditTarget::Section {
            article_title: article_title.into(),
            section_title: section_title.into(),
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        EditTarget::Content(content.into())
    }

    /// Builds a target from the raw form fields. Exactly one of the two input
    /// shapes must be filled in.
    pub fn from_inputs(
        article_title: &str,
        section_title: &str,
        content: &str,
    ) -> Result<Self, ValidationError> {
        let article = article_title.trim();
        let section = section_title.trim();
        let has_section_input = !article.is_empty() || !section.is_empty();
        let has_content = !content.trim().is_empty();

        let target = match (has_section_input, has_content) {
            (true, true) => return Err(ValidationError::AmbiguousTarget),
            (false, false) => return Err(ValidationError::MissingTarget),
            (false, true) => EditTarget::Content(content.to_string()),
            (true, false) => EditTarget::section(article, section),
        };
        target.validate()?;
        Ok(target)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            EditTarget::Section {
                article_title,
                section_title,
            } => {
                check_title("Article title", article_title, ValidationError::MissingArticleTitle)?;
                check_title("Section title", section_title, ValidationError::MissingSectionTitle)
            }
            EditTarget::Content(content) => {
                if content.trim().is_empty() {
                    Err(ValidationError::EmptyContent)
                } else {
                    Ok(())
                }
            }
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            EditTarget::Section { .. } => "section",
            EditTarget::Content(_) => "content",
        }
    }

    /// File name for an exported result: `{article}--{section}.txt`.
    pub fn suggested_export_name(&self) -> String {
        match self {
            EditTarget::Section {
                article_title,
                section_title,
            } => export_name_for(Some(article_title), Some(section_title)),
            EditTarget::Content(_) => RAW_CONTENT_EXPORT_NAME.to_string(),
        }
    }
}

fn check_title(
    field: &'static str,
    value: &str,
    missing: ValidationError,
) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing);
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TITLE_LEN,
        });
    }
    Ok(())
}

/// Export file name from optional provenance titles.
pub(crate) fn export_name_for(article: Option<&str>, section: Option<&str>) -> String {
    match (article, section) {
        (Some(article), Some(section)) => {
            format!("{}--{}.txt", sanitize_stem(article), sanitize_stem(section))
        }
        (Some(article), None) => format!("{}.txt", sanitize_stem(article)),
        _ => RAW_CONTENT_EXPORT_NAME.to_string(),
    }
}

fn sanitize_stem(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_forbidden(c) || c.is_whitespace() { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut stem: String = compacted
        .trim_matches(&['_', '.'][..])
        .chars()
        .take(MAX_STEM_LEN)
        .collect();
    if stem.is_empty() {
        stem = "untitled".to_string();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_inputs_are_trimmed() {
        let target = EditTarget::from_inputs("  Apollo ", " History", "").unwrap();
        assert_eq!(target, EditTarget::section("Apollo", "History"));
    }

    #[test]
    fn exactly_one_target_shape_is_required() {
        assert_eq!(
            EditTarget::from_inputs("", "", "   "),
            Err(ValidationError::MissingTarget)
        );
        assert_eq!(
            EditTarget::from_inputs("Apollo", "", "some text"),
            Err(ValidationError::AmbiguousTarget)
        );
        assert_eq!(
            EditTarget::from_inputs("", "History", ""),
            Err(ValidationError::MissingArticleTitle)
        );
        assert_eq!(
            EditTarget::from_inputs("Apollo", " ", ""),
            Err(ValidationError::MissingSectionTitle)
        );
    }

    #[test]
    fn raw_content_is_kept_verbatim() {
        let target = EditTarget::from_inputs("", "", "  Para one.\n\nPara two.").unwrap();
        assert_eq!(target, EditTarget::content("  Para one.\n\nPara two."));
        assert_eq!(target.kind_label(), "content");
    }

    #[test]
    fn overlong_titles_are_rejected() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(
            EditTarget::section(long, "History").validate(),
            Err(ValidationError::TooLong {
                field: "Article title",
                max: MAX_TITLE_LEN
            })
        );
    }

    #[test]
    fn mode_parses_from_path_segment() {
        assert_eq!("Brevity".parse::<EditMode>(), Ok(EditMode::Brevity));
        assert_eq!(EditMode::Copyedit.as_str(), "copyedit");
        assert!("summarize".parse::<EditMode>().is_err());
    }

    #[test]
    fn export_names_are_filesystem_safe() {
        let name = EditTarget::section("AC/DC: Live?", "Early years").suggested_export_name();
        assert_eq!(name, "AC_DC_Live--Early_years.txt");
        assert_eq!(
            EditTarget::content("text").suggested_export_name(),
            "edited-content.txt"
        );
        assert_eq!(export_name_for(Some("CON"), None), "CON_.txt");
    }
}
