//! Markup codec for [`SpanList`].
//!
//! Each span serializes as
//! `<span style="color: C; font-family: 'F'"><b><i>text</i></b></span>`,
//! omitting wrappers it does not need; newlines become `<br>`. The parser
//! accepts that form plus what editable hosts commonly produce: `strong`/`em`,
//! `div`/`p` line breaks, inline `font-weight`/`font-style`, and unknown tags,
//! whose text is kept and formatting ignored.

use super::{FormattingSpan, SpanList};

// ============================================================================
// Serialize
// ============================================================================

/// Renders spans as markup. Adjacent spans are expected to be merged already.
pub fn serialize(spans: &SpanList) -> String {
    let mut out = String::new();
    for span in spans.spans() {
        let mut declarations = Vec::new();
        if let Some(color) = &span.color {
            declarations.push(format!("color: {}", escape(color)));
        }
        if let Some(font) = &span.font_family {
            declarations.push(format!("font-family: '{}'", escape(&font.replace('\'', ""))));
        }

        if !declarations.is_empty() {
            out.push_str(&format!("<span style=\"{}\">", declarations.join("; ")));
        }
        if span.bold {
            out.push_str("<b>");
        }
        if span.italic {
            out.push_str("<i>");
        }

        for (i, line) in span.text.split('\n').enumerate() {
            if i > 0 {
                out.push_str("<br>");
            }
            out.push_str(&escape(line));
        }

        if span.italic {
            out.push_str("</i>");
        }
        if span.bold {
            out.push_str("</b>");
        }
        if !declarations.is_empty() {
            out.push_str("</span>");
        }
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Parse
// ============================================================================

#[derive(Debug, Clone, Default)]
struct Format {
    bold: bool,
    italic: bool,
    color: Option<String>,
    font_family: Option<String>,
}

struct Frame {
    tag: String,
    format: Format,
}

/// Parses markup into spans. Never fails: malformed input degrades to text.
pub fn parse(markup: &str) -> SpanList {
    let mut spans = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut text_so_far = String::new();
    let mut rest = markup;

    let current = |stack: &[Frame]| stack.last().map(|f| f.format.clone()).unwrap_or_default();

    while !rest.is_empty() {
        let Some(lt) = rest.find('<') else {
            push_text(&mut spans, &mut text_so_far, &current(&stack), &decode(rest));
            break;
        };
        if lt > 0 {
            push_text(&mut spans, &mut text_so_far, &current(&stack), &decode(&rest[..lt]));
        }
        let Some(gt) = rest[lt..].find('>') else {
            // Unterminated tag: treat the remainder as text.
            push_text(&mut spans, &mut text_so_far, &current(&stack), &decode(&rest[lt..]));
            break;
        };

        let tag = &rest[lt + 1..lt + gt];
        rest = &rest[lt + gt + 1..];

        let closing = tag.starts_with('/');
        let body = tag.trim_start_matches('/').trim_end_matches('/').trim();
        let (name, attrs) = match body.find(char::is_whitespace) {
            Some(i) => (&body[..i], &body[i..]),
            None => (body, ""),
        };
        let name = name.to_ascii_lowercase();

        if closing {
            if let Some(pos) = stack.iter().rposition(|f| f.tag == name) {
                stack.truncate(pos);
            }
            continue;
        }

        match name.as_str() {
            "br" => push_text(&mut spans, &mut text_so_far, &current(&stack), "\n"),
            "div" | "p" => {
                if !text_so_far.is_empty() && !text_so_far.ends_with('\n') {
                    push_text(&mut spans, &mut text_so_far, &current(&stack), "\n");
                }
                stack.push(Frame {
                    tag: name,
                    format: current(&stack),
                });
            }
            _ if tag.ends_with('/') => {}
            _ => {
                let mut format = current(&stack);
                match name.as_str() {
                    "b" | "strong" => format.bold = true,
                    "i" | "em" => format.italic = true,
                    "span" | "font" => apply_style(&mut format, attrs),
                    _ => {}
                }
                stack.push(Frame { tag: name, format });
            }
        }
    }

    SpanList::from_spans(spans)
}

fn push_text(spans: &mut Vec<FormattingSpan>, seen: &mut String, format: &Format, text: &str) {
    if text.is_empty() {
        return;
    }
    seen.push_str(text);
    spans.push(FormattingSpan {
        text: text.to_string(),
        bold: format.bold,
        italic: format.italic,
        color: format.color.clone(),
        font_family: format.font_family.clone(),
    });
}

/// Reads `style="..."` declarations into `format`.
fn apply_style(format: &mut Format, attrs: &str) {
    let Some(style) = attribute_value(attrs, "style") else {
        return;
    };
    for declaration in style.split(';') {
        let Some((prop, value)) = declaration.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match prop.trim().to_ascii_lowercase().as_str() {
            "color" if !value.is_empty() => format.color = Some(value.to_string()),
            "font-family" => {
                let first = value.split(',').next().unwrap_or("").trim();
                let family = first.trim_matches(|c| c == '\'' || c == '"').trim();
                if !family.is_empty() {
                    format.font_family = Some(family.to_string());
                }
            }
            "font-weight" => {
                format.bold = matches!(value, "bold" | "bolder" | "600" | "700" | "800" | "900");
            }
            "font-style" => format.italic = value == "italic" || value == "oblique",
            _ => {}
        }
    }
}

/// Extracts a double- or single-quoted attribute value, entity-decoded.
fn attribute_value(attrs: &str, name: &str) -> Option<String> {
    let mut rest = attrs;
    while let Some(i) = rest.find(name) {
        let after = rest[i + name.len()..].trim_start();
        let boundary_ok = i == 0 || rest[..i].ends_with(char::is_whitespace);
        if let (true, Some(after_eq)) = (boundary_ok, after.strip_prefix('=')) {
            let after_eq = after_eq.trim_start();
            let quote = after_eq.chars().next()?;
            if quote == '"' || quote == '\'' {
                let inner = &after_eq[1..];
                let end = inner.find(quote)?;
                return Some(decode(&inner[..end]));
            }
        }
        rest = &rest[i + name.len()..];
    }
    None
}

fn decode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            };
            c.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn serializes_nested_wrappers() {
        let list = SpanList::from_spans([
            FormattingSpan::plain("Hi "),
            FormattingSpan::plain("there")
                .bold()
                .italic()
                .with_color("#FF0000")
                .with_font("Lobster"),
        ]);
        assert_eq!(
            list.serialize(),
            "Hi <span style=\"color: #FF0000; font-family: 'Lobster'\"><b><i>there</i></b></span>"
        );
    }

    #[test]
    fn escapes_and_line_breaks() {
        let list = SpanList::from_plain("a < b & \"c\"\nd");
        let markup = list.serialize();
        assert_eq!(markup, "a &lt; b &amp; &quot;c&quot;<br>d");
        assert_eq!(parse(&markup), list);
    }

    #[test]
    fn parses_own_output() {
        let list = SpanList::from_spans([
            FormattingSpan::plain("x").with_font("Open Sans"),
            FormattingSpan::plain("y").bold(),
            FormattingSpan::plain("z").italic().with_color("rgb(1, 2, 3)"),
        ]);
        assert_eq!(parse(&list.serialize()), list);
    }

    #[test]
    fn parses_host_flavoured_markup() {
        let list = parse(
            "<div>one</div><div><strong>two</strong> <em>three</em></div>\
             <span style=\"font-weight: 700; font-family: &quot;Fira Sans&quot;, sans-serif\">four</span>\
             <u>five</u>",
        );
        assert_eq!(
            list.spans(),
            &[
                FormattingSpan::plain("one\n"),
                FormattingSpan::plain("two").bold(),
                FormattingSpan::plain(" "),
                FormattingSpan::plain("three").italic(),
                FormattingSpan::plain("four").bold().with_font("Fira Sans"),
                FormattingSpan::plain("five"),
            ]
        );
    }

    #[test]
    fn tolerates_broken_markup() {
        assert_eq!(parse("a</b>b").plain_text(), "ab");
        assert_eq!(parse("x <y").plain_text(), "x <y");
        assert_eq!(parse("&bogus; &#65;&#x42;&nbsp;").plain_text(), "&bogus; AB ");
    }
}
