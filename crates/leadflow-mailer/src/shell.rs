// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Branded HTML email shell.
//!
//! Wraps a generated body fragment into a complete standalone HTML document
//! (header, content area, signature, footer). Substitution uses placeholder
//! tokens that cannot collide with HTML/CSS syntax -- the document is full
//! of braces, so brace-style placeholders are off the table.

/// Body placeholder token inside [`SHELL`].
const BODY_TOKEN: &str = "__EMAIL_BODY_CONTENT__";

/// Sender display-name placeholder token inside [`SHELL`].
const SENDER_TOKEN: &str = "__SENDER_FULL_NAME__";

/// Title placeholder token inside [`SHELL`].
const TITLE_TOKEN: &str = "__EMAIL_TITLE__";

const SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta http-equiv="X-UA-Compatible" content="ie=edge">
    <title>__EMAIL_TITLE__</title>
    <style>
        body { margin: 0; padding: 0; width: 100% !important; -webkit-text-size-adjust: 100%; background-color: #f0f7ff; font-family: 'Inter', 'Helvetica Neue', Arial, sans-serif; }
        .email-container { width: 100%; max-width: 640px; margin: 40px auto; background-color: #ffffff; border-radius: 12px; overflow: hidden; border: 1px solid #dee2e6; box-shadow: 0 4px 12px rgba(0,0,0,0.05); }
        .header { background-color: #005ea6; padding: 25px 30px; text-align: center; }
        .header h1 { margin: 10px 0 0 0; font-size: 26px; font-weight: 700; color: #ffffff; }
        .content { padding: 35px 40px; color: #333333; font-size: 16px; line-height: 1.7; }
        .content p { margin: 0 0 18px 0; }
        .content strong { font-weight: 600; color: #333333; }
        .content a { color: #007bff; text-decoration: underline; font-weight: 600; }
        .signature { margin-top: 25px; padding-top: 15px; border-top: 1px solid #dee2e6; }
        .signature p { margin: 0 0 5px 0; font-size: 15px; line-height: 1.5; font-weight: 600; color: #005ea6; }
        .footer { background-color: #f0f7ff; padding: 20px 30px; text-align: center; font-size: 13px; color: #777777; border-top: 1px solid #dee2e6; }
        .footer a { color: #007bff; text-decoration: none; }
        @media only screen and (max-width: 640px) {
            .email-container { width: 95% !important; margin: 20px auto !important; border-radius: 8px; }
            .content { padding: 25px 20px; font-size: 15px; }
            .header { padding: 20px; }
            .header h1 { font-size: 22px; }
            .footer { padding: 15px 20px; font-size: 12px; }
        }
    </style>
</head>
<body style="background-color: #f0f7ff;">
    <div class="email-container">
        <div class="header">
            <h1 style="color: #ffffff;">Leadflow</h1>
        </div>
        <div class="content">
            __EMAIL_BODY_CONTENT__
            <div class="signature">
                <p style="color: #005ea6;"><strong style="color: #005ea6;">__SENDER_FULL_NAME__</strong></p>
            </div>
        </div>
        <div class="footer">
            <p style="margin: 0;"><small>Sent with Leadflow</small></p>
        </div>
    </div>
</body>
</html>
"#;

/// Wraps a body fragment into the branded shell.
///
/// Pure string transformation: same inputs, same output, no side effects.
pub fn render_shell(subject: &str, body_html: &str, sender_name: &str) -> String {
    SHELL
        .replace(TITLE_TOKEN, &escape_text(subject))
        .replace(BODY_TOKEN, body_html)
        .replace(SENDER_TOKEN, &escape_text(sender_name))
}

/// Minimal HTML text escaping for values substituted into text positions.
fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_tokens() {
        let html = render_shell("Quarterly intro", "<p>Hello Ana</p>", "Sam Doe");
        assert!(html.contains("<title>Quarterly intro</title>"));
        assert!(html.contains("<p>Hello Ana</p>"));
        assert!(html.contains("Sam Doe"));
        assert!(!html.contains(BODY_TOKEN));
        assert!(!html.contains(SENDER_TOKEN));
        assert!(!html.contains(TITLE_TOKEN));
    }

    #[test]
    fn css_braces_survive_substitution() {
        let html = render_shell("s", "<p>b</p>", "n");
        assert!(html.contains(".email-container { width: 100%;"));
        assert!(html.contains("@media only screen and (max-width: 640px)"));
    }

    #[test]
    fn is_a_complete_document() {
        let html = render_shell("s", "<p>b</p>", "n");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("</html>"));
    }

    #[test]
    fn title_and_sender_are_escaped() {
        let html = render_shell("Tips & <tricks>", "<p>b</p>", "A <B> & C");
        assert!(html.contains("<title>Tips &amp; &lt;tricks&gt;</title>"));
        assert!(html.contains("A &lt;B&gt; &amp; C"));
    }

    #[test]
    fn body_fragment_is_inserted_verbatim() {
        let body = "<p>Line one</p><ul><li>item</li></ul>";
        let html = render_shell("s", body, "n");
        assert!(html.contains(body));
    }
}
