//! Terminal rendering of transcripts.
//!
//! User turns are printed as they were typed. Assistant turns are markdown
//! and get converted to styled terminal text first.

use little_chat_model::{Role, Turn};
use owo_colors::{OwoColorize, Style};
use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag};

/// The bar drawn in front of every line of a turn.
pub const BAR_CHAR: &str = "▎";

const RULE_WIDTH: usize = 24;

/// Renders one turn, prefixing every line with a bar tinted by role.
pub fn render_turn(turn: &Turn, colored: bool) -> String {
    let (icon, bar_style, body) = match turn.role() {
        Role::User => (
            "🧑 ",
            Style::new().bright_magenta(),
            turn.content().to_owned(),
        ),
        Role::Assistant => (
            "🤖 ",
            Style::new().bright_cyan(),
            render_markdown(turn.content(), colored),
        ),
    };
    let bar = if colored {
        BAR_CHAR.style(bar_style).to_string()
    } else {
        BAR_CHAR.to_owned()
    };

    let mut rendered = String::new();
    for (idx, line) in body.lines().enumerate() {
        if idx > 0 {
            rendered.push('\n');
            rendered.push_str(&bar);
            rendered.push_str("   ");
        } else {
            rendered.push_str(&bar);
            rendered.push_str(icon);
        }
        rendered.push_str(line);
    }
    rendered
}

/// Converts markdown to terminal text.
///
/// With `colored` unset, the structure (bullets, indentation, code block
/// layout) is kept but no escape sequences are emitted. Input that renders
/// to nothing is returned unchanged.
pub fn render_markdown(markdown: &str, colored: bool) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = Renderer::new(colored);
    for event in Parser::new_ext(markdown, options) {
        renderer.handle(event);
    }
    let rendered = renderer.finish();
    if rendered.trim().is_empty() {
        markdown.to_owned()
    } else {
        rendered
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Inline {
    Strong,
    Emphasis,
    Strikethrough,
    Link,
    Heading,
}

/// Tags currently open, innermost last.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Open {
    Paragraph,
    Heading,
    BlockQuote,
    CodeBlock,
    List,
    Item,
    Inline(Inline),
    // Autolinks already show their target.
    Link(Option<String>),
    TableRow,
    TableCell,
    Other,
}

struct Renderer {
    out: String,
    colored: bool,
    open: Vec<Open>,
    inline: Vec<Inline>,
    // Next number of each open list, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
    at_line_start: bool,
}

impl Renderer {
    fn new(colored: bool) -> Self {
        Self {
            out: String::new(),
            colored,
            open: Vec::new(),
            inline: Vec::new(),
            lists: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            at_line_start: true,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => {
                if let Some(open) = self.open.pop() {
                    self.end(open);
                }
            }
            Event::Text(text) => {
                if self.in_code_block {
                    self.push_code_block(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => {
                let code = if self.colored {
                    code.style(Style::new().yellow()).to_string()
                } else {
                    format!("`{code}`")
                };
                self.begin_line();
                self.out.push_str(&code);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_text(&html);
            }
            Event::SoftBreak | Event::HardBreak => self.end_line(),
            Event::Rule => {
                self.end_line();
                let rule = "─".repeat(RULE_WIDTH);
                self.push_styled(&rule, Style::new().dimmed());
                self.blank_line();
            }
            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(name) => {
                self.push_text(&format!("[{name}]"));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph => Open::Paragraph,
            Tag::Heading { level, .. } => {
                self.end_line();
                self.inline.push(Inline::Heading);
                self.push_text(&format!("{} ", "#".repeat(level as usize)));
                Open::Heading
            }
            Tag::BlockQuote(_) => {
                self.end_line();
                self.quote_depth += 1;
                Open::BlockQuote
            }
            Tag::CodeBlock(kind) => {
                self.end_line();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.push_styled(&lang, Style::new().dimmed());
                        self.end_line();
                    }
                }
                self.in_code_block = true;
                Open::CodeBlock
            }
            Tag::List(start) => {
                self.end_line();
                self.lists.push(start);
                Open::List
            }
            Tag::Item => {
                self.start_item();
                Open::Item
            }
            Tag::Strong => self.open_inline(Inline::Strong),
            Tag::Emphasis => self.open_inline(Inline::Emphasis),
            Tag::Strikethrough => self.open_inline(Inline::Strikethrough),
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                self.inline.push(Inline::Link);
                let target = match link_type {
                    LinkType::Autolink | LinkType::Email => None,
                    _ => Some(dest_url.into_string()),
                };
                Open::Link(target)
            }
            Tag::TableHead | Tag::TableRow => {
                self.end_line();
                Open::TableRow
            }
            Tag::TableCell => Open::TableCell,
            _ => Open::Other,
        };
        self.open.push(open);
    }

    fn end(&mut self, open: Open) {
        match open {
            Open::Paragraph => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.end_line();
                }
            }
            Open::Heading => {
                self.inline.pop();
                self.blank_line();
            }
            Open::BlockQuote => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank_line();
            }
            Open::CodeBlock => {
                self.in_code_block = false;
                self.blank_line();
            }
            Open::List => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.end_line();
                }
            }
            Open::Item => self.end_line(),
            Open::Inline(_) => {
                self.inline.pop();
            }
            Open::Link(target) => {
                self.inline.pop();
                if let Some(target) = target {
                    self.push_styled(&format!(" ({target})"), Style::new().dimmed());
                }
            }
            Open::TableRow => self.end_line(),
            Open::TableCell => self.push_text("  "),
            Open::Other => {}
        }
    }

    fn open_inline(&mut self, inline: Inline) -> Open {
        self.inline.push(inline);
        Open::Inline(inline)
    }

    fn start_item(&mut self) {
        self.end_line();
        self.write_quote_bars();
        let depth = self.lists.len().saturating_sub(1);
        self.out.push_str(&"  ".repeat(depth));
        let bullet = match self.lists.last_mut() {
            Some(Some(next)) => {
                let bullet = format!("{next}. ");
                *next += 1;
                bullet
            }
            _ => "• ".to_owned(),
        };
        if self.colored {
            self.out
                .push_str(&bullet.style(Style::new().bright_cyan()).to_string());
        } else {
            self.out.push_str(&bullet);
        }
        self.at_line_start = false;
    }

    /// Pushes inline text, which may span several lines.
    fn push_text(&mut self, text: &str) {
        for (idx, segment) in text.split('\n').enumerate() {
            if idx > 0 {
                self.end_line();
            }
            if segment.is_empty() {
                continue;
            }
            self.begin_line();
            let painted = self.paint(segment);
            self.out.push_str(&painted);
        }
    }

    fn push_styled(&mut self, text: &str, style: Style) {
        self.begin_line();
        if self.colored {
            self.out.push_str(&text.style(style).to_string());
        } else {
            self.out.push_str(text);
        }
    }

    /// Pushes code block content, indenting every line including empty
    /// ones.
    fn push_code_block(&mut self, text: &str) {
        for line in text.split_inclusive('\n') {
            let line = line.strip_suffix('\n').unwrap_or(line);
            self.begin_line();
            self.out.push_str("    ");
            if self.colored {
                self.out
                    .push_str(&line.style(Style::new().green()).to_string());
            } else {
                self.out.push_str(line);
            }
            self.out.push('\n');
            self.at_line_start = true;
        }
    }

    fn paint(&self, text: &str) -> String {
        if !self.colored || self.inline.is_empty() {
            return text.to_owned();
        }
        let mut style = Style::new();
        for inline in &self.inline {
            style = match inline {
                Inline::Strong => style.bold(),
                Inline::Emphasis => style.italic(),
                Inline::Strikethrough => style.strikethrough(),
                Inline::Link => style.underline().bright_blue(),
                Inline::Heading => style.bold().bright_white(),
            };
        }
        text.style(style).to_string()
    }

    fn begin_line(&mut self) {
        if !self.at_line_start {
            return;
        }
        self.write_quote_bars();
        // Continuation lines of a list item line up with the item text.
        self.out.push_str(&"  ".repeat(self.lists.len()));
        self.at_line_start = false;
    }

    fn write_quote_bars(&mut self) {
        for _ in 0..self.quote_depth {
            if self.colored {
                self.out.push_str(&"│ ".style(Style::new().dimmed()).to_string());
            } else {
                self.out.push_str("│ ");
            }
        }
    }

    fn end_line(&mut self) {
        if !self.at_line_start {
            self.out.push('\n');
            self.at_line_start = true;
        }
    }

    fn blank_line(&mut self) {
        self.end_line();
        if !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        self.out.trim_end().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(markdown: &str) -> String {
        render_markdown(markdown, false)
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(plain("Hello\n\nWorld"), "Hello\n\nWorld");
        assert_eq!(plain("one\ntwo"), "one\ntwo");
    }

    #[test]
    fn test_inline_markup_is_stripped() {
        assert_eq!(
            plain("Some **bold**, *italic* and ~~gone~~ text"),
            "Some bold, italic and gone text"
        );
        assert_eq!(plain("Run `cargo doc` now"), "Run `cargo doc` now");
    }

    #[test]
    fn test_lists() {
        assert_eq!(plain("- apples\n- pears"), "• apples\n• pears");
        assert_eq!(plain("3. three\n4. four"), "3. three\n4. four");
        assert_eq!(
            plain("- fruit\n  - apple\n  - pear\n- veg"),
            "• fruit\n  • apple\n  • pear\n• veg"
        );
        assert_eq!(plain("- [x] done\n- [ ] todo"), "• [x] done\n• [ ] todo");
    }

    #[test]
    fn test_list_followed_by_paragraph() {
        assert_eq!(plain("- a\n- b\n\nAfter"), "• a\n• b\n\nAfter");
    }

    #[test]
    fn test_code_block() {
        let rendered = plain("Look:\n\n```rust\nfn main() {\n\n}\n```\n\nDone");
        assert_eq!(rendered, "Look:\n\nrust\n    fn main() {\n    \n    }\n\nDone");
    }

    #[test]
    fn test_heading_and_rule() {
        assert_eq!(plain("## Title\n\nBody"), "## Title\n\nBody");
        assert_eq!(
            plain("above\n\n---\n\nbelow"),
            format!("above\n\n{}\n\nbelow", "─".repeat(RULE_WIDTH))
        );
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(plain("> quoted\n> text"), "│ quoted\n│ text");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            plain("See [the docs](https://docs.rs)"),
            "See the docs (https://docs.rs)"
        );
        assert_eq!(plain("<https://docs.rs>"), "https://docs.rs");
    }

    #[test]
    fn test_blank_input_is_kept() {
        assert_eq!(plain(""), "");
        assert_eq!(plain("   "), "   ");
    }

    #[test]
    fn test_colored_output_has_escapes() {
        let rendered = render_markdown("**bold**", true);
        assert!(rendered.contains("\u{1b}["));
        assert!(rendered.contains("bold"));
        assert!(!rendered.contains("**"));
    }

    #[test]
    fn test_render_user_turn_is_literal() {
        let turn = Turn::user("**not bold**\nsecond line");
        assert_eq!(
            render_turn(&turn, false),
            "▎🧑 **not bold**\n▎   second line"
        );
    }

    #[test]
    fn test_render_assistant_turn() {
        let turn = Turn::assistant("Hi there\n\n- one\n- two");
        assert_eq!(
            render_turn(&turn, false),
            "▎🤖 Hi there\n▎   \n▎   • one\n▎   • two"
        );
    }
}
