//! Text segmentation into animatable spans.
//!
//! A text block is rewritten as `<span>` elements, one per character or one
//! per word, so stagger steps can address each piece individually. In
//! character mode whitespace gets its own span, like any other character.
//! In word mode whitespace runs stay as plain text between the spans.

/// How a text block is split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Segmentation {
    #[default]
    Chars,
    Words,
}

/// A segmented text block: the span contents plus the markup that replaces
/// the element's inner HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmented {
    pub pieces: Vec<String>,
    pub html: String,
}

impl Segmented {
    /// Number of spans produced.
    pub fn span_count(&self) -> usize {
        self.pieces.len()
    }
}

/// Split `text` into spans.
pub fn segment(text: &str, mode: Segmentation) -> Segmented {
    let mut pieces = Vec::new();
    let mut html = String::with_capacity(text.len() * 14);

    match mode {
        Segmentation::Chars => {
            for c in text.chars() {
                let piece = c.to_string();
                push_span(&mut html, &piece);
                pieces.push(piece);
            }
        }
        Segmentation::Words => {
            let mut word = String::new();
            for c in text.chars() {
                if c.is_whitespace() {
                    if !word.is_empty() {
                        push_span(&mut html, &word);
                        pieces.push(std::mem::take(&mut word));
                    }
                    escape_into(&mut html, c);
                } else {
                    word.push(c);
                }
            }
            if !word.is_empty() {
                push_span(&mut html, &word);
                pieces.push(word);
            }
        }
    }

    Segmented { pieces, html }
}

fn push_span(html: &mut String, piece: &str) {
    html.push_str("<span>");
    for c in piece.chars() {
        escape_into(html, c);
    }
    html.push_str("</span>");
}

fn escape_into(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(c),
    }
}
