//! Rich-text to HTML rendering

use super::blocks::{Block, Document, Inline, List, ListKind};
use crate::helpers::{html_escape, safe_href};
use crate::theme::{Theme, ThemeClasses};

/// Renders a [`Document`] to themed HTML
pub struct BlockRenderer {
    classes: ThemeClasses,
}

impl BlockRenderer {
    /// Create a renderer for a theme
    pub fn new(theme: Theme) -> Self {
        Self {
            classes: theme.classes(),
        }
    }

    /// Render a whole document
    pub fn render(&self, doc: &Document) -> String {
        let mut out = String::new();
        for block in &doc.blocks {
            self.render_block(block, &mut out);
        }
        out
    }

    fn render_block(&self, block: &Block, out: &mut String) {
        let c = &self.classes;
        match block {
            Block::Heading { level, content } => {
                let (tag, class) = match level {
                    1 => ("h1", c.h1),
                    2 => ("h2", c.h2),
                    _ => ("h3", c.h3),
                };
                self.wrap(tag, class, content, out);
            }
            Block::Paragraph(content) => self.wrap("p", c.paragraph, content, out),
            Block::Blockquote(content) => self.wrap("blockquote", c.blockquote, content, out),
            Block::List(list) => self.render_list(list, out),
            Block::Unknown { kind, text } => {
                if text.is_empty() {
                    tracing::debug!("Skipping unsupported block type {:?}", kind);
                } else {
                    out.push_str(&format!(
                        r#"<p class="{}">{}</p>"#,
                        c.paragraph,
                        text_html(text)
                    ));
                }
            }
        }
    }

    fn wrap(&self, tag: &str, class: &str, content: &[Inline], out: &mut String) {
        out.push_str(&format!(r#"<{} class="{}">"#, tag, class));
        self.render_inlines(content, out);
        out.push_str(&format!("</{}>", tag));
    }

    fn render_list(&self, list: &List, out: &mut String) {
        let (tag, class) = match list.kind {
            ListKind::Bullet => ("ul", self.classes.bullet_list),
            ListKind::Number => ("ol", self.classes.number_list),
        };
        out.push_str(&format!(r#"<{} class="{}">"#, tag, class));
        for item in &list.items {
            out.push_str(&format!(r#"<li class="{}">"#, self.classes.list_item));
            self.render_inlines(&item.content, out);
            for child in &item.children {
                self.render_list(child, out);
            }
            out.push_str("</li>");
        }
        out.push_str(&format!("</{}>", tag));
    }

    fn render_inlines(&self, content: &[Inline], out: &mut String) {
        for inline in content {
            self.render_inline(inline, out);
        }
    }

    fn render_inline(&self, inline: &Inline, out: &mut String) {
        let c = &self.classes;
        match inline {
            Inline::Text(text) => out.push_str(&text_html(text)),
            Inline::Bold(children) => {
                out.push_str(&format!(r#"<strong class="{}">"#, c.strong));
                self.render_inlines(children, out);
                out.push_str("</strong>");
            }
            Inline::Italic(children) => {
                out.push_str(&format!(r#"<em class="{}">"#, c.em));
                self.render_inlines(children, out);
                out.push_str("</em>");
            }
            Inline::Link { href, children } => match safe_href(href) {
                Some(href) => {
                    let external = href.starts_with("http://") || href.starts_with("https://");
                    let rel = if external {
                        r#" target="_blank" rel="noopener noreferrer""#
                    } else {
                        ""
                    };
                    out.push_str(&format!(
                        r#"<a href="{}" class="{}"{}>"#,
                        html_escape(href),
                        c.link,
                        rel
                    ));
                    self.render_inlines(children, out);
                    out.push_str("</a>");
                }
                None => self.render_inlines(children, out),
            },
            Inline::Unknown { children, .. } => self.render_inlines(children, out),
        }
    }
}

/// Escape text and keep soft line breaks
fn text_html(text: &str) -> String {
    html_escape(text).replace('\n', "<br/>")
}
