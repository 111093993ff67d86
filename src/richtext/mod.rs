//! Rich-text model for the toolbar variant of editable text.
//!
//! Formatting is an explicit list of [`FormattingSpan`]s. Commands are a
//! closed enum applied functionally over a char range, producing a new list.
//! The stored value is the markup produced by [`SpanList::serialize`].

pub mod fonts;
pub mod markup;

pub use fonts::{FontCache, FontFace, FontLoader, FontState, NoopFontLoader};

#[cfg(test)]
pub(crate) use fonts::testing;

use std::ops::Range;

use serde::{Deserialize, Serialize};

// ============================================================================
// FormattingSpan
// ============================================================================

/// A run of text sharing one set of formatting attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingSpan {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
}

impl FormattingSpan {
    /// An unformatted span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_font(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    /// True if both spans carry identical formatting.
    fn same_format(&self, other: &Self) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.color == other.color
            && self.font_family == other.font_family
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Splits at a char offset into (head, tail) with the same formatting.
    fn split_at_char(&self, at: usize) -> (Self, Self) {
        let byte = self
            .text
            .char_indices()
            .nth(at)
            .map_or(self.text.len(), |(i, _)| i);
        let mut head = self.clone();
        let mut tail = self.clone();
        head.text = self.text[..byte].to_string();
        tail.text = self.text[byte..].to_string();
        (head, tail)
    }
}

// ============================================================================
// Command
// ============================================================================

/// The formatting commands the toolbar can execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Toggles bold over the selection.
    Bold,
    /// Toggles italic over the selection.
    Italic,
    /// Sets the text color; `None` restores the inherited color.
    SetColor(Option<String>),
    /// Sets the font family; `None` restores the inherited font.
    SetFont(Option<String>),
}

// ============================================================================
// SpanList
// ============================================================================

/// An ordered, normalized sequence of spans.
///
/// Normalized means no empty spans and no two adjacent spans with identical
/// formatting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpanList(Vec<FormattingSpan>);

impl SpanList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a normalized list from arbitrary spans.
    pub fn from_spans(spans: impl IntoIterator<Item = FormattingSpan>) -> Self {
        let mut out: Vec<FormattingSpan> = Vec::new();
        for span in spans {
            if span.text.is_empty() {
                continue;
            }
            match out.last_mut() {
                Some(last) if last.same_format(&span) => last.text.push_str(&span.text),
                _ => out.push(span),
            }
        }
        Self(out)
    }

    /// A single unformatted span (or nothing, for empty text).
    pub fn from_plain(text: &str) -> Self {
        Self::from_spans([FormattingSpan::plain(text)])
    }

    /// Parses stored markup. See [`markup::parse`].
    pub fn parse(markup: &str) -> Self {
        markup::parse(markup)
    }

    /// Produces the stored markup. See [`markup::serialize`].
    pub fn serialize(&self) -> String {
        markup::serialize(self)
    }

    pub fn spans(&self) -> &[FormattingSpan] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The visible text with formatting discarded.
    pub fn plain_text(&self) -> String {
        self.0.iter().map(|s| s.text.as_str()).collect()
    }

    /// Visible length in chars.
    pub fn char_len(&self) -> usize {
        self.0.iter().map(FormattingSpan::char_len).sum()
    }

    /// Applies `command` to the chars in `range`, returning the new list.
    ///
    /// A collapsed or out-of-bounds range returns the list unchanged.
    pub fn apply(&self, range: Range<usize>, command: &Command) -> Self {
        let len = self.char_len();
        let range = range.start.min(len)..range.end.min(len);
        if range.is_empty() {
            return self.clone();
        }

        let (before, selected, after) = self.partition(range);
        let selected = match command {
            Command::Bold => {
                let on = !selected.iter().all(|s| s.bold);
                map_spans(selected, |s| s.bold = on)
            }
            Command::Italic => {
                let on = !selected.iter().all(|s| s.italic);
                map_spans(selected, |s| s.italic = on)
            }
            Command::SetColor(color) => map_spans(selected, |s| s.color = color.clone()),
            Command::SetFont(font) => map_spans(selected, |s| s.font_family = font.clone()),
        };

        Self::from_spans(before.into_iter().chain(selected).chain(after))
    }

    /// Clears `font_family` wherever it equals `family`.
    ///
    /// Returns `None` if no span used that family.
    pub fn without_font(&self, family: &str) -> Option<Self> {
        if !self.uses_font(family) {
            return None;
        }
        Some(Self::from_spans(self.0.iter().cloned().map(|mut s| {
            if s.font_family.as_deref() == Some(family) {
                s.font_family = None;
            }
            s
        })))
    }

    pub fn uses_font(&self, family: &str) -> bool {
        self.0.iter().any(|s| s.font_family.as_deref() == Some(family))
    }

    /// Splits into spans before, inside, and after `range`.
    fn partition(
        &self,
        range: Range<usize>,
    ) -> (Vec<FormattingSpan>, Vec<FormattingSpan>, Vec<FormattingSpan>) {
        let mut before = Vec::new();
        let mut inside = Vec::new();
        let mut after = Vec::new();
        let mut offset = 0;

        for span in &self.0 {
            let len = span.char_len();
            let (start, end) = (offset, offset + len);
            offset = end;

            if end <= range.start {
                before.push(span.clone());
            } else if start >= range.end {
                after.push(span.clone());
            } else {
                let (head, rest) = span.split_at_char(range.start.saturating_sub(start));
                let (mid, tail) = rest.split_at_char(range.end.min(end) - start.max(range.start));
                before.push(head);
                inside.push(mid);
                after.push(tail);
            }
        }

        (before, inside, after)
    }
}

impl From<Vec<FormattingSpan>> for SpanList {
    fn from(spans: Vec<FormattingSpan>) -> Self {
        Self::from_spans(spans)
    }
}

fn map_spans(spans: Vec<FormattingSpan>, f: impl Fn(&mut FormattingSpan)) -> Vec<FormattingSpan> {
    spans
        .into_iter()
        .map(|mut s| {
            f(&mut s);
            s
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalization_merges_and_drops_empty() {
        let list = SpanList::from_spans([
            FormattingSpan::plain("a"),
            FormattingSpan::plain(""),
            FormattingSpan::plain("b"),
            FormattingSpan::plain("c").bold(),
        ]);
        assert_eq!(
            list.spans(),
            &[FormattingSpan::plain("ab"), FormattingSpan::plain("c").bold()]
        );
    }

    #[test]
    fn bold_over_middle_of_span() {
        let list = SpanList::from_plain("Hello world").apply(6..11, &Command::Bold);
        assert_eq!(
            list.spans(),
            &[
                FormattingSpan::plain("Hello "),
                FormattingSpan::plain("world").bold(),
            ]
        );
        assert_eq!(list.plain_text(), "Hello world");
    }

    #[test]
    fn bold_toggles_off_when_fully_bold() {
        let list = SpanList::from_plain("abc").apply(0..3, &Command::Bold);
        let list = list.apply(1..2, &Command::Bold);
        assert_eq!(
            list.spans(),
            &[
                FormattingSpan::plain("a").bold(),
                FormattingSpan::plain("b"),
                FormattingSpan::plain("c").bold(),
            ]
        );
    }

    #[test]
    fn mixed_selection_turns_italic_on() {
        let list = SpanList::from_spans([
            FormattingSpan::plain("ab").italic(),
            FormattingSpan::plain("cd"),
        ])
        .apply(1..3, &Command::Italic);
        assert_eq!(
            list.spans(),
            &[FormattingSpan::plain("abc").italic(), FormattingSpan::plain("d")]
        );
    }

    #[test]
    fn collapsed_selection_is_noop() {
        let list = SpanList::from_plain("abc");
        assert_eq!(list.apply(2..2, &Command::Bold), list);
        assert_eq!(list.apply(5..9, &Command::Bold), list);
    }

    #[test]
    fn multibyte_chars_split_cleanly() {
        let red = Command::SetColor(Some("#FF0000".into()));
        let list = SpanList::from_plain("héllo").apply(1..2, &red);
        assert_eq!(list.spans()[1], FormattingSpan::plain("é").with_color("#FF0000"));
    }

    #[test]
    fn font_revert() {
        let lobster = Command::SetFont(Some("Lobster".into()));
        let list = SpanList::from_plain("abcdef").apply(0..3, &lobster);
        assert!(list.uses_font("Lobster"));
        assert_eq!(list.without_font("Lobster").unwrap(), SpanList::from_plain("abcdef"));
        assert!(list.without_font("Arial").is_none());
    }
}
