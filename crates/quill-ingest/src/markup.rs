//! Markup fragments for uploaded files.
//!
//! Every fragment ends with a blank line so fragments can be concatenated in
//! any order without merging into each other.

use quill_core::FileCategory;

use crate::classifier::code_language;
use crate::record::FileRecord;

/// Stand-in URL used before an upload is confirmed. Never authoritative.
pub const PLACEHOLDER_URL: &str = "quill-upload-placeholder";

/// What a fragment should point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupTarget<'a> {
    Placeholder,
    Url(&'a str),
}

impl<'a> MarkupTarget<'a> {
    fn href(self) -> &'a str {
        match self {
            MarkupTarget::Placeholder => PLACEHOLDER_URL,
            MarkupTarget::Url(url) => url,
        }
    }
}

/// Fragment for a record.
pub fn to_markup(record: &FileRecord, target: MarkupTarget<'_>) -> String {
    render(
        record.category(),
        record.name(),
        &record.file().content_type,
        target,
    )
}

/// Fragment from raw parts.
pub fn render(
    category: FileCategory,
    filename: &str,
    content_type: &str,
    target: MarkupTarget<'_>,
) -> String {
    let href = target.href();
    match category {
        FileCategory::Image => format!("![{}]({})\n\n", filename, href),
        FileCategory::Video => format!(
            "<video width=\"600\" height=\"400\" controls>\n  <source src=\"{}\" type=\"{}\">\n  Your browser does not support the video tag.\n</video>\n\n",
            href, content_type
        ),
        FileCategory::Code => {
            let mut fragment = format!(
                "```{}\n// Code content from {}\n```\n\n",
                code_language(filename),
                filename
            );
            if let MarkupTarget::Url(url) = target {
                fragment.push_str(&format!("[{}]({})\n\n", filename, url));
            }
            fragment
        }
        FileCategory::Other => format!("[File: {}]({})\n\n", filename, href),
    }
}

/// Concatenate confirmed fragments in record order.
///
/// Records without a remote URL are skipped.
pub fn markup_for_records<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a FileRecord>,
{
    records
        .into_iter()
        .filter_map(|record| {
            record
                .remote_url()
                .map(|url| to_markup(record, MarkupTarget::Url(url)))
        })
        .collect()
}

pub fn contains_placeholder(text: &str) -> bool {
    text.contains(PLACEHOLDER_URL)
}
