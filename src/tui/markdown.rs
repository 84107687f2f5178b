//! Markdown to terminal lines
//!
//! A pure function over the `pulldown-cmark` event stream. Block structure
//! (lists, quotes, code blocks) becomes line prefixes; inline markup becomes
//! span styles. Wrapping is left to the paragraph widget.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use std::mem;

const BULLET: &str = "• ";
const QUOTE_BAR: &str = "│ ";
const RULE_WIDTH: usize = 24;

/// Render Markdown into styled lines. `base_style` applies to all text;
/// markup styles are patched on top.
pub fn render_markdown(text: &str, base_style: Style) -> Vec<Line<'static>> {
    let mut renderer = Renderer::new(base_style);
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS) {
        renderer.event(event);
    }
    renderer.finish()
}

struct Renderer {
    base: Style,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// One entry per open list: the next number for ordered lists
    lists: Vec<Option<u64>>,
    pending_marker: Option<String>,
    quote_depth: usize,
    link_targets: Vec<String>,
    in_code_block: bool,
}

impl Renderer {
    fn new(base: Style) -> Self {
        Self {
            base,
            lines: Vec::new(),
            current: Vec::new(),
            styles: Vec::new(),
            lists: Vec::new(),
            pending_marker: None,
            quote_depth: 0,
            link_targets: Vec::new(),
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(self.base)
    }

    fn code_style(&self) -> Style {
        self.base.fg(Color::Magenta)
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    self.code_text(&text);
                } else {
                    self.push_text(&text, self.style());
                }
            }
            Event::Code(code) => self.push_text(&code, self.code_style()),
            Event::Html(html) => self.raw_block(&html),
            Event::InlineHtml(html) => self.push_text(&html, self.style()),
            Event::SoftBreak => self.push_text(" ", self.style()),
            Event::HardBreak => self.break_line(),
            Event::Rule => {
                self.flush();
                let rule = "─".repeat(RULE_WIDTH);
                self.push_text(&rule, self.base.add_modifier(Modifier::DIM));
                self.gap();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_text(marker, self.style());
            }
            Event::FootnoteReference(label) => self.push_text(&format!("[^{label}]"), self.style()),
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.push_text(&math, self.code_style());
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.flush();
                let mut style = Style::new().add_modifier(Modifier::BOLD);
                if level == HeadingLevel::H1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
                self.push_style(Style::new().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.push_text(&lang, self.base.add_modifier(Modifier::DIM));
                        self.flush();
                    }
                }
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => BULLET.to_string(),
                };
                self.pending_marker = Some(format!("{indent}{marker}"));
            }
            Tag::Emphasis => self.push_style(Style::new().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::new().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.push_style(Style::new().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.link_targets.push(dest_url.into_string());
                self.push_style(Style::new().add_modifier(Modifier::UNDERLINED));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::HtmlBlock => self.gap(),
            TagEnd::Heading(_) => {
                self.pop_style();
                self.gap();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.pop_style();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    self.gap();
                }
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.gap();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.gap();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link | TagEnd::Image => {
                self.pop_style();
                if let Some(url) = self.link_targets.pop().filter(|u| !u.is_empty()) {
                    self.push_text(&format!(" ({url})"), self.style());
                }
            }
            _ => {}
        }
    }

    /// Prefix for a fresh line: quote bars, then a list marker or its indent
    fn line_prefix(&mut self) -> Vec<Span<'static>> {
        let mut prefix = Vec::new();
        if self.quote_depth > 0 {
            prefix.push(Span::styled(
                QUOTE_BAR.repeat(self.quote_depth),
                self.base.add_modifier(Modifier::DIM),
            ));
        }
        if let Some(marker) = self.pending_marker.take() {
            prefix.push(Span::styled(marker, self.base));
        } else if !self.lists.is_empty() {
            prefix.push(Span::raw("  ".repeat(self.lists.len())));
        }
        prefix
    }

    fn push_text(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        if self.current.is_empty() {
            self.current = self.line_prefix();
        }
        self.current.push(Span::styled(text.to_string(), style));
    }

    /// Code and raw HTML keep their own line breaks
    fn code_text(&mut self, text: &str) {
        let style = self.code_style();
        for line in text.lines() {
            if self.current.is_empty() {
                self.current = self.line_prefix();
            }
            self.current.push(Span::styled(format!("  {line}"), style));
            self.break_line();
        }
    }

    fn raw_block(&mut self, text: &str) {
        for line in text.lines() {
            self.push_text(line, self.style());
            self.flush();
        }
    }

    /// End the current line, emitting it even if it holds only a prefix
    fn break_line(&mut self) {
        if self.current.is_empty() {
            self.current = self.line_prefix();
        }
        self.lines.push(Line::from(mem::take(&mut self.current)));
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(mem::take(&mut self.current)));
        }
    }

    /// Blank separator between blocks, never doubled
    fn gap(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}
