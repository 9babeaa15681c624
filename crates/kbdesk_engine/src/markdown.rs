//! Rendering of chat turns: bot replies are Markdown, user text is literal.

use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

fn bot_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Renders a bot reply to HTML. A single newline is a line break and raw HTML
/// in the reply is shown as text instead of being interpreted.
pub fn render_bot_html(markdown: &str) -> String {
    let events = Parser::new_ext(markdown, bot_options()).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

/// Renders user text as escaped HTML; no markup is interpreted.
pub fn render_user_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    html::push_html(&mut out, std::iter::once(Event::Text(text.into())));
    out
}

/// Renders a bot reply as plain terminal lines.
pub fn render_bot_terminal(markdown: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut list_stack: Vec<Option<u64>> = Vec::new();
    let mut in_code_block = false;

    for event in Parser::new_ext(markdown, bot_options()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush(&mut current, &mut lines);
                current.push_str(&"#".repeat(level as usize));
                current.push(' ');
            }
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::Paragraph) => {
                flush(&mut current, &mut lines);
            }
            Event::Start(Tag::Strong) | Event::End(TagEnd::Strong) => current.push_str("**"),
            Event::Start(Tag::Emphasis) | Event::End(TagEnd::Emphasis) => current.push('_'),
            Event::Start(Tag::Strikethrough) | Event::End(TagEnd::Strikethrough) => {
                current.push('~')
            }
            Event::Start(Tag::List(start)) => {
                flush(&mut current, &mut lines);
                list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                flush(&mut current, &mut lines);
                list_stack.pop();
            }
            Event::Start(Tag::Item) => {
                flush(&mut current, &mut lines);
                let indent = "  ".repeat(list_stack.len().saturating_sub(1));
                let marker = match list_stack.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                current.push_str(&indent);
                current.push_str(&marker);
            }
            Event::End(TagEnd::Item) => flush(&mut current, &mut lines),
            Event::Start(Tag::CodeBlock(kind)) => {
                flush(&mut current, &mut lines);
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        lines.push(format!("[{lang}]"));
                    }
                }
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
            }
            Event::Text(text) if in_code_block => {
                for line in text.lines() {
                    lines.push(format!("    {line}"));
                }
            }
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                current.push_str(&text)
            }
            Event::Code(code) => {
                current.push('`');
                current.push_str(&code);
                current.push('`');
            }
            Event::TaskListMarker(done) => current.push_str(if done { "[x] " } else { "[ ] " }),
            Event::SoftBreak | Event::HardBreak => flush(&mut current, &mut lines),
            Event::End(TagEnd::TableCell) => current.push_str(" | "),
            Event::End(TagEnd::TableHead) | Event::End(TagEnd::TableRow) => {
                flush(&mut current, &mut lines)
            }
            Event::Rule => {
                flush(&mut current, &mut lines);
                lines.push("----".to_string());
            }
            _ => {}
        }
    }
    flush(&mut current, &mut lines);
    lines
}

fn flush(current: &mut String, lines: &mut Vec<String>) {
    let line = current.trim_end();
    if !line.is_empty() {
        lines.push(line.to_string());
    }
    current.clear();
}
