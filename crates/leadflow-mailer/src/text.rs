// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text derivation from HTML bodies.
//!
//! Communication records store a text rendition for search and previews.

const WRAP_WIDTH: usize = 78;

/// Derives a plain-text rendition of an HTML body.
///
/// Falls back to a crude tag strip if the HTML is too broken for the
/// converter.
pub fn plain_text_of(html: &str) -> String {
    html2text::from_read(html.as_bytes(), WRAP_WIDTH)
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|_| strip_tags(html))
}

/// Last-resort conversion: drop tags, collapse whitespace.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_simple_html() {
        let text = plain_text_of("<p>Hello <strong>Ana</strong></p>");
        assert!(text.contains("Hello"));
        assert!(text.contains("Ana"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn strip_tags_collapses_whitespace() {
        assert_eq!(
            strip_tags("<p>Hello</p>   <p>there</p>"),
            "Hello there"
        );
    }

    #[test]
    fn empty_html_yields_empty_text() {
        assert!(plain_text_of("").is_empty());
    }
}
