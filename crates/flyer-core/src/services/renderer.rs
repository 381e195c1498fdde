//! Flyer markup rendering
//!
//! The renderer is a collaborator behind a trait so the pipeline can be
//! exercised without producing real markup. The shipped implementation
//! fills a fixed A4 flyer layout.

use crate::content::escape_text;
use crate::error::Result;
use flyer_types::RenderContext;
use std::fmt::Write;

/// Turns a render context into document-ready markup. Must not fail for
/// any well-formed context, including one with all-empty optional fields.
pub trait FlyerRenderer: Send + Sync {
    fn render(&self, context: &RenderContext) -> Result<String>;
}

/// Built-in single-page flyer layout
pub struct HtmlFlyerRenderer;

impl FlyerRenderer for HtmlFlyerRenderer {
    fn render(&self, context: &RenderContext) -> Result<String> {
        let mut html = String::with_capacity(8 * 1024);

        html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
        html.push_str(
            "<style>\
             body { font-family: Georgia, serif; margin: 0; padding: 24px; }\
             h1 { font-size: 28px; margin-bottom: 4px; }\
             .meta { color: #444; font-size: 13px; margin-bottom: 16px; }\
             .cover { float: right; max-width: 220px; margin: 0 0 12px 16px; }\
             .section h2 { font-size: 16px; border-bottom: 1px solid #999; }\
             table.variants { width: 100%; border-collapse: collapse; font-size: 13px; }\
             table.variants td, table.variants th { border: 1px solid #ccc; padding: 4px 8px; }\
             .footer { margin-top: 24px; font-size: 11px; color: #777; }\
             </style></head><body>",
        );

        let _ = write!(html, "<h1>{}</h1>", escape_text(&context.product_title));

        if !context.author.is_empty() {
            let _ = write!(html, "<div class=\"meta\">by {}</div>", escape_text(&context.author));
        }

        if !context.product_image.is_empty() {
            let _ = write!(
                html,
                "<img class=\"cover\" src=\"{}\" alt=\"cover\">",
                escape_text(&context.product_image)
            );
        }

        html.push_str("<div class=\"meta\">");
        for (label, value) in [
            ("Category", &context.product_category),
            ("Subject", &context.subject),
            ("Publisher", &context.publisher),
            ("Imprint", &context.publisher_imprint),
            ("Published", &context.publishing_date),
            ("Pages", &context.pages),
            ("Volume", &context.volume),
            ("Edition", &context.edition),
            ("ISBN", &context.isbn),
            ("Price", &context.price),
        ] {
            if !value.is_empty() {
                let _ = write!(html, "<div>{}: {}</div>", label, escape_text(value));
            }
        }
        html.push_str("</div>");

        // The three rich-text sections arrive pre-truncated and already
        // well-formed; they are inserted verbatim.
        for (heading, fragment) in [
            ("About the Book", &context.book_desc),
            ("About the Author", &context.about_author),
            ("Table of Contents", &context.toc),
        ] {
            if !fragment.is_empty() {
                let _ = write!(
                    html,
                    "<div class=\"section\"><h2>{}</h2>{}</div>",
                    heading, fragment
                );
            }
        }

        if !context.variants.is_empty() {
            html.push_str(
                "<table class=\"variants\"><tr><th>ISBN</th><th>Format</th>\
                 <th>Price</th><th>Edition</th></tr>",
            );
            for variant in &context.variants {
                let _ = write!(
                    html,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape_text(&variant.isbn),
                    escape_text(&variant.title),
                    escape_text(&variant.price),
                    escape_text(&variant.edition),
                );
            }
            html.push_str("</table>");
        }

        let _ = write!(
            html,
            "<div class=\"footer\">&copy; {} — visit our website for the full catalog</div>",
            context.current_year
        );
        html.push_str("</body></html>");

        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyer_types::VariantLine;

    #[test]
    fn test_render_never_fails_on_empty_context() {
        let html = HtmlFlyerRenderer.render(&RenderContext::default()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</body></html>"));
    }

    #[test]
    fn test_render_includes_fields_and_escapes() {
        let context = RenderContext {
            product_title: "Tom & Jerry <Unabridged>".to_string(),
            author: "A. Author".to_string(),
            isbn: "ISBN9".to_string(),
            book_desc: "<p>desc</p>".to_string(),
            variants: vec![VariantLine {
                isbn: "ISBN9".to_string(),
                title: "Hardcover".to_string(),
                price: "10.00".to_string(),
                edition: String::new(),
            }],
            current_year: 2025,
            ..Default::default()
        };
        let html = HtmlFlyerRenderer.render(&context).unwrap();

        assert!(html.contains("Tom &amp; Jerry &lt;Unabridged&gt;"));
        assert!(html.contains("by A. Author"));
        // Pre-truncated fragments go in unescaped
        assert!(html.contains("<p>desc</p>"));
        assert!(html.contains("<td>Hardcover</td>"));
        assert!(html.contains("2025"));
    }

    #[test]
    fn test_empty_sections_omitted() {
        let html = HtmlFlyerRenderer.render(&RenderContext::default()).unwrap();
        assert!(!html.contains("About the Book"));
        assert!(!html.contains("<table"));
    }
}
