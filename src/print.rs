//! Printable HTML output for a [`Document`].
//!
//! Produces a self-contained page with inline CSS, one `<section>` per printed
//! page, ready to be sent to a printer from any browser.

use crate::libsoru::document::{Block, Document, Size, Span, Weight};
use crate::theme::Theme;
use log::info;
use std::io;
use std::path::Path;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Point size of each text size, matching the printed layout.
pub fn point_size(size: Size) -> f32 {
    match size {
        Size::Title => 16.0,
        Size::Question => 12.0,
        Size::Option => 10.0,
        Size::Small => 9.0,
    }
}

fn span_html(span: &Span, theme: &Theme) -> String {
    let mut style = format!(
        "color: {}; font-size: {}pt;",
        theme.tone(span.tone),
        point_size(span.size)
    );
    if span.weight == Weight::Strong {
        style.push_str(" font-weight: bold;");
    }
    if span.italic {
        style.push_str(" font-style: italic;");
    }
    format!(
        "<span style=\"{}\">{}</span>",
        style,
        html_escape(&span.text)
    )
}

pub fn generate_html(document: &Document, theme: &Theme, lines_per_page: usize) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<title>Soru Bankası</title>\n");
    html.push_str("<style>\n");
    html.push_str(&format!(
        "body {{ font-family: \"Segoe UI\", Arial, sans-serif; background: {}; }}\n",
        theme.white
    ));
    html.push_str(".page { page-break-after: always; }\n");
    html.push_str(".page:last-child { page-break-after: auto; }\n");
    html.push_str(".line { white-space: pre-wrap; margin: 0; }\n");
    html.push_str(".separator { height: 1em; }\n");
    html.push_str("</style>\n</head>\n<body>\n");

    for page in document.paginate(lines_per_page) {
        html.push_str(&format!("<section class=\"page\" id=\"page-{}\">\n", page.number));
        for block in page.blocks {
            if *block == Block::Separator {
                html.push_str("<div class=\"separator\"></div>\n");
                continue;
            }
            html.push_str("<p class=\"line\">");
            for span in block.spans() {
                html.push_str(&span_html(&span, theme));
            }
            html.push_str("</p>\n");
        }
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

pub fn write_html(
    document: &Document,
    theme: &Theme,
    lines_per_page: usize,
    path: &Path,
) -> io::Result<()> {
    let html = generate_html(document, theme, lines_per_page);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    info!(
        "[Print] Wrote {} questions to {:?}",
        document.question_count(),
        path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libsoru::question::QuestionRecord;

    fn document() -> Document {
        Document::from_records(&[QuestionRecord {
            id: 4,
            text: "Is 1 < 2 & 3 > 2?".into(),
            options: ["Yes", "No", "", "", ""].map(String::from),
            correct_index: Some(0),
            category: "Logic".into(),
        }])
    }

    #[test]
    fn html_contains_escaped_questions_and_emphasis() {
        let theme = Theme::default();
        let html = generate_html(&document(), &theme, 40);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Question 1 (ID: 4): "));
        assert!(html.contains("Is 1 &lt; 2 &amp; 3 &gt; 2?"));
        assert!(html.contains("color: #C00000; font-size: 10pt; font-weight: bold;"));
        assert!(html.contains("Category: Logic"));
        assert_eq!(html.matches("<section class=\"page\"").count(), 1);
    }

    #[test]
    fn one_section_per_page() {
        let html = generate_html(&document(), &Theme::default(), 2);
        let pages = document().paginate(2).len();
        assert_eq!(html.matches("<section class=\"page\"").count(), pages);
    }

    #[test]
    fn html_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("print.html");

        write_html(&document(), &Theme::default(), 40, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Soru Bankası - Question List"));
    }
}
