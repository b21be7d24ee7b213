//! Styled lines and width-aware text helpers.

use crossterm::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn display_width(s: &str) -> usize {
    s.width()
}

pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Cuts `s` to at most `max_width` columns, ending in `…` when cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let target_width = max_width - 1;
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = char_width(ch);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push('…');
    result
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub reverse: bool,
}

impl Style {
    pub fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Default::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn on(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

/// One terminal row made of styled spans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn raw(text: impl Into<String>) -> Self {
        Self::styled(text, Style::default())
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            spans: vec![Span {
                text: text.into(),
                style,
            }],
        }
    }

    pub fn push(mut self, text: impl Into<String>, style: Style) -> Self {
        self.spans.push(Span {
            text: text.into(),
            style,
        });
        self
    }

    /// Plain text of the line, styles dropped.
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Truncates to `width` columns, then pads with spaces to exactly `width`.
    pub fn fit(self, width: usize) -> Self {
        let mut spans = Vec::with_capacity(self.spans.len() + 1);
        let mut used = 0;
        for span in self.spans {
            if used >= width {
                break;
            }
            let text = truncate_to_width(&span.text, width - used);
            used += display_width(&text);
            spans.push(Span {
                text,
                style: span.style,
            });
        }
        if used < width {
            spans.push(Span {
                text: " ".repeat(width - used),
                style: Style::default(),
            });
        }
        Self { spans }
    }
}

/// Places `left` and `right` side by side; `left` is fitted to `left_width`.
pub fn side_by_side(left: Vec<Line>, right: Vec<Line>, left_width: usize) -> Vec<Line> {
    let rows = left.len().max(right.len());
    let mut left = left.into_iter();
    let mut right = right.into_iter();

    (0..rows)
        .map(|_| {
            let mut line = left.next().unwrap_or_default().fit(left_width);
            line.spans.push(Span {
                text: "│".to_string(),
                style: Style::fg(Color::DarkGrey),
            });
            if let Some(r) = right.next() {
                line.spans.extend(r.spans);
            }
            line
        })
        .collect()
}
