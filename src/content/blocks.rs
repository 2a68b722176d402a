//! Rich-text body model
//!
//! The store delivers article bodies as a flat array of typed blocks with
//! spans, decorators and annotation definitions. Parsing into [`Document`]
//! is total: anything unrecognised becomes an `Unknown` node instead of an
//! error, so one odd block can never take the rest of an article down.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A parsed rich-text body
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// One top-level block
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Heading, level 1 to 3
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    Blockquote(Vec<Inline>),
    List(List),
    /// A block type this renderer does not know; keeps whatever text it had
    Unknown { kind: String, text: String },
}

/// A run of consecutive list items of the same kind
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub kind: ListKind,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Number,
}

/// A list item with optional nested lists
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub content: Vec<Inline>,
    pub children: Vec<List>,
}

/// Inline content within a block
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Bold(Vec<Inline>),
    Italic(Vec<Inline>),
    Link { href: String, children: Vec<Inline> },
    /// A mark this renderer does not know; children render unwrapped
    Unknown { mark: String, children: Vec<Inline> },
}

impl Document {
    /// Parse a raw body value
    pub fn parse(value: &Value) -> Self {
        let Some(items) = value.as_array() else {
            if !value.is_null() {
                tracing::debug!("Rich-text body is not an array, rendering nothing");
            }
            return Self::default();
        };

        let mut blocks = Vec::new();
        let mut pending_list: Vec<PendingItem> = Vec::new();

        for item in items {
            let Some(obj) = item.as_object() else {
                flush_list(&mut pending_list, &mut blocks);
                blocks.push(Block::Unknown {
                    kind: String::new(),
                    text: item.as_str().unwrap_or_default().to_string(),
                });
                continue;
            };

            let kind = obj.get("_type").and_then(Value::as_str).unwrap_or_default();
            if kind != "block" {
                flush_list(&mut pending_list, &mut blocks);
                blocks.push(Block::Unknown {
                    kind: kind.to_string(),
                    text: collect_text(item),
                });
                continue;
            }

            let content = parse_inlines(obj);

            if let Some(list_type) = obj.get("listItem").and_then(Value::as_str) {
                let kind = match list_type {
                    "number" => ListKind::Number,
                    _ => ListKind::Bullet,
                };
                let level = obj
                    .get("level")
                    .and_then(Value::as_u64)
                    .unwrap_or(1)
                    .max(1) as usize;
                pending_list.push(PendingItem {
                    kind,
                    level,
                    content,
                });
                continue;
            }

            flush_list(&mut pending_list, &mut blocks);

            let style = obj.get("style").and_then(Value::as_str).unwrap_or("normal");
            let block = match style {
                "h1" => Block::Heading { level: 1, content },
                "h2" => Block::Heading { level: 2, content },
                "h3" => Block::Heading { level: 3, content },
                "blockquote" => Block::Blockquote(content),
                _ => Block::Paragraph(content),
            };
            blocks.push(block);
        }

        flush_list(&mut pending_list, &mut blocks);
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text of the whole document, blocks separated by blank lines
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        for block in &self.blocks {
            let text = match block {
                Block::Heading { content, .. }
                | Block::Paragraph(content)
                | Block::Blockquote(content) => inline_text(content),
                Block::List(list) => list_text(list),
                Block::Unknown { text, .. } => text.clone(),
            };
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join("\n\n")
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self::parse(&value)
    }
}

struct PendingItem {
    kind: ListKind,
    level: usize,
    content: Vec<Inline>,
}

fn flush_list(pending: &mut Vec<PendingItem>, blocks: &mut Vec<Block>) {
    if pending.is_empty() {
        return;
    }
    let items = std::mem::take(pending);
    blocks.extend(nest_lists(items).into_iter().map(Block::List));
}

/// Group flat list items into lists, nesting deeper levels under the
/// preceding item
fn nest_lists(items: Vec<PendingItem>) -> Vec<List> {
    let base = items.first().map(|i| i.level).unwrap_or(1);
    let mut lists: Vec<List> = Vec::new();
    let mut iter = items.into_iter().peekable();

    while let Some(item) = iter.next() {
        let mut nested = Vec::new();
        while let Some(child) = iter.next_if(|next| next.level > base) {
            nested.push(child);
        }
        let children = if nested.is_empty() {
            Vec::new()
        } else {
            nest_lists(nested)
        };

        let list_item = ListItem {
            content: item.content,
            children,
        };
        match lists.last_mut() {
            Some(list) if list.kind == item.kind => list.items.push(list_item),
            _ => lists.push(List {
                kind: item.kind,
                items: vec![list_item],
            }),
        }
    }

    lists
}

/// Frame of the mark stack while building inline trees
struct Frame {
    mark: Option<String>,
    children: Vec<Inline>,
}

/// Build nested inline content from a block's spans
///
/// Marks open in the order listed on each span. Adjacent spans that share a
/// leading run of marks share the wrappers for that run.
fn parse_inlines(block: &Map<String, Value>) -> Vec<Inline> {
    let empty = Vec::new();
    let children = block
        .get("children")
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let mark_defs = block
        .get("markDefs")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let mut stack = vec![Frame {
        mark: None,
        children: Vec::new(),
    }];

    for child in children {
        let text = match child.get("text").and_then(Value::as_str) {
            Some(text) => text.to_string(),
            None => collect_text(child),
        };
        let marks: Vec<String> = child
            .get("marks")
            .and_then(Value::as_array)
            .map(|marks| {
                marks
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let common = stack[1..]
            .iter()
            .zip(&marks)
            .take_while(|(frame, mark)| frame.mark.as_deref() == Some(mark.as_str()))
            .count();

        while stack.len() > common + 1 {
            close_frame(&mut stack, mark_defs);
        }
        for mark in &marks[common..] {
            stack.push(Frame {
                mark: Some(mark.clone()),
                children: Vec::new(),
            });
        }

        if let Some(top) = stack.last_mut() {
            top.children.push(Inline::Text(text));
        }
    }

    while stack.len() > 1 {
        close_frame(&mut stack, mark_defs);
    }

    stack.pop().map(|root| root.children).unwrap_or_default()
}

fn close_frame(stack: &mut Vec<Frame>, mark_defs: &[Value]) {
    let Some(frame) = stack.pop() else {
        return;
    };
    let inline = resolve_mark(frame.mark.as_deref().unwrap_or_default(), frame.children, mark_defs);
    if let Some(parent) = stack.last_mut() {
        parent.children.push(inline);
    }
}

/// Turn a decorator name or annotation key into an inline wrapper
fn resolve_mark(mark: &str, children: Vec<Inline>, mark_defs: &[Value]) -> Inline {
    match mark {
        "strong" => return Inline::Bold(children),
        "em" => return Inline::Italic(children),
        _ => {}
    }

    let def = mark_defs
        .iter()
        .find(|def| def.get("_key").and_then(Value::as_str) == Some(mark));

    match def {
        Some(def) if def.get("_type").and_then(Value::as_str) == Some("link") => Inline::Link {
            href: def
                .get("href")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            children,
        },
        Some(def) => Inline::Unknown {
            mark: def
                .get("_type")
                .and_then(Value::as_str)
                .unwrap_or(mark)
                .to_string(),
            children,
        },
        None => Inline::Unknown {
            mark: mark.to_string(),
            children,
        },
    }
}

/// Best-effort text of an arbitrary node
fn collect_text(value: &Value) -> String {
    match value {
        Value::String(_) => String::new(),
        Value::Object(obj) => {
            if let Some(text) = obj.get("text").and_then(Value::as_str) {
                return text.to_string();
            }
            obj.get("children")
                .and_then(Value::as_array)
                .map(|children| children.iter().map(collect_text).collect())
                .unwrap_or_default()
        }
        _ => String::new(),
    }
}

/// Plain text of inline content
pub fn inline_text(content: &[Inline]) -> String {
    let mut out = String::new();
    for inline in content {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Bold(children)
            | Inline::Italic(children)
            | Inline::Link { children, .. }
            | Inline::Unknown { children, .. } => out.push_str(&inline_text(children)),
        }
    }
    out
}

fn list_text(list: &List) -> String {
    list.items
        .iter()
        .map(|item| {
            let mut text = inline_text(&item.content);
            for child in &item.children {
                text.push('\n');
                text.push_str(&list_text(child));
            }
            text
        })
        .collect::<Vec<_>>()
        .join("\n")
}
