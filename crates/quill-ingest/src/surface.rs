//! Host text surface.
//!
//! Offsets are byte offsets into the text. Out-of-range or mid-character
//! offsets are clamped down to the nearest valid boundary before splicing.

use std::ops::Range;

/// An editable document with a caret / selection.
pub trait TextSurface: Send {
    fn text(&self) -> &str;

    /// Current selection as `[start, end)`; `start == end` is a plain caret.
    fn selection(&self) -> Range<usize>;

    /// Replace the whole text and place the caret.
    fn set_text(&mut self, text: String, caret: usize);

    /// Replace the selection with `insertion` and put the caret after it.
    fn insert_at_cursor(&mut self, insertion: &str) {
        let text = self.text();
        let selection = self.selection();
        let start = floor_char_boundary(text, selection.start.min(selection.end));
        let end = floor_char_boundary(text, selection.end.max(selection.start));

        let mut spliced = String::with_capacity(text.len() + insertion.len());
        spliced.push_str(&text[..start]);
        spliced.push_str(insertion);
        spliced.push_str(&text[end..]);

        self.set_text(spliced, start + insertion.len());
    }
}

/// Largest char boundary `<= index`, clamped to the text length.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// In-memory document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    selection: Range<usize>,
}

impl TextBuffer {
    /// Buffer with the caret at the end of `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let end = text.len();
        Self {
            text,
            selection: end..end,
        }
    }

    pub fn set_caret(&mut self, offset: usize) {
        self.selection = offset..offset;
    }

    pub fn select(&mut self, range: Range<usize>) {
        self.selection = range;
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl TextSurface for TextBuffer {
    fn text(&self) -> &str {
        &self.text
    }

    fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    fn set_text(&mut self, text: String, caret: usize) {
        self.text = text;
        self.selection = caret..caret;
    }
}
