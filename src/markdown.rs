// src/markdown.rs
//
// Renders bot message bodies (markdown) into ratatui lines, and splits
// joined visualization payloads. Pure formatting, no state machine.

use crate::constants::VISUALIZATION_SEPARATOR;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const CODE_COLOR: Color = Color::Rgb(209, 154, 102);
const HEADING_COLOR: Color = Color::Rgb(137, 180, 250);
const LINK_COLOR: Color = Color::Rgb(116, 199, 236);
const TABLE_BORDER_COLOR: Color = Color::DarkGray;

/// Splits a joined visualization payload into its individual images.
pub fn split_visualizations(raw: &str) -> Vec<String> {
    raw.split(VISUALIZATION_SEPARATOR)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders markdown into styled terminal lines.
pub fn render_markdown(text: &str, base_style: Style) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut renderer = Renderer::new(base_style);
    for event in Parser::new_ext(text, options) {
        renderer.handle(event);
    }
    renderer.finish()
}

struct Renderer {
    base_style: Style,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    bold_depth: usize,
    italic_depth: usize,
    heading: Option<HeadingLevel>,
    in_code_block: bool,
    link_dest: Option<String>,
    list_stack: Vec<Option<u64>>,
    // Table capture: cells are collected as plain text, then laid out with
    // unicode-aware column widths once the table ends.
    table_rows: Vec<Vec<String>>,
    table_current_row: Option<Vec<String>>,
    table_cell: Option<String>,
}

impl Renderer {
    fn new(base_style: Style) -> Self {
        Self {
            base_style,
            lines: Vec::new(),
            spans: Vec::new(),
            bold_depth: 0,
            italic_depth: 0,
            heading: None,
            in_code_block: false,
            link_dest: None,
            list_stack: Vec::new(),
            table_rows: Vec::new(),
            table_current_row: None,
            table_cell: None,
        }
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if self.table_cell.is_some() {
                    self.text(&code);
                } else {
                    self.spans.push(Span::styled(
                        code.to_string(),
                        Style::default().fg(CODE_COLOR),
                    ));
                }
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(30),
                    Style::default().fg(TABLE_BORDER_COLOR),
                )));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                // Embedded HTML is passed through verbatim, dimmed.
                for html_line in html.lines() {
                    self.spans.push(Span::styled(
                        html_line.to_string(),
                        self.base_style.add_modifier(Modifier::DIM),
                    ));
                    self.flush_line();
                }
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.blank_separator();
                self.heading = Some(level);
            }
            Tag::CodeBlock(kind) => {
                self.flush_line();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.lines.push(Line::from(Span::styled(
                            format!("▎ {}", lang),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.list_stack.len().saturating_sub(1);
                let marker = match self.list_stack.last_mut() {
                    Some(Some(index)) => {
                        let marker = format!("{}{}. ", "  ".repeat(depth), index);
                        *index += 1;
                        marker
                    }
                    _ => format!("{}• ", "  ".repeat(depth)),
                };
                self.spans
                    .push(Span::styled(marker, Style::default().fg(Color::DarkGray)));
            }
            Tag::Emphasis => self.italic_depth += 1,
            Tag::Strong => self.bold_depth += 1,
            Tag::Link { dest_url, .. } => self.link_dest = Some(dest_url.to_string()),
            Tag::Table(_) => {
                self.flush_line();
                self.table_rows.clear();
            }
            Tag::TableHead | Tag::TableRow => self.table_current_row = Some(Vec::new()),
            Tag::TableCell => self.table_cell = Some(String::new()),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_line();
                self.lines.push(Line::from(""));
            }
            TagEnd::Heading(_) => {
                self.heading = None;
                self.flush_line();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.flush_line();
            }
            TagEnd::List(_) => {
                self.list_stack.pop();
                self.flush_line();
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Emphasis => self.italic_depth = self.italic_depth.saturating_sub(1),
            TagEnd::Strong => self.bold_depth = self.bold_depth.saturating_sub(1),
            TagEnd::Link => {
                if let Some(dest) = self.link_dest.take() {
                    self.spans.push(Span::styled(
                        format!(" ({})", dest),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            TagEnd::TableCell => {
                if let (Some(cell), Some(row)) =
                    (self.table_cell.take(), self.table_current_row.as_mut())
                {
                    row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                if let Some(row) = self.table_current_row.take() {
                    self.table_rows.push(row);
                }
            }
            TagEnd::Table => self.emit_table(),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(cell) = self.table_cell.as_mut() {
            cell.push_str(text);
            return;
        }

        if self.in_code_block {
            for code_line in text.lines() {
                self.lines.push(Line::from(vec![
                    Span::styled("▎ ".to_string(), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        code_line.to_string(),
                        Style::default().fg(CODE_COLOR),
                    ),
                ]));
            }
            return;
        }

        self.spans
            .push(Span::styled(text.to_string(), self.current_style()));
    }

    fn current_style(&self) -> Style {
        if let Some(level) = self.heading {
            let style = Style::default()
                .fg(HEADING_COLOR)
                .add_modifier(Modifier::BOLD);
            return match level {
                HeadingLevel::H1 | HeadingLevel::H2 => style.add_modifier(Modifier::UNDERLINED),
                _ => style,
            };
        }

        let mut style = self.base_style;
        if self.link_dest.is_some() {
            style = style.fg(LINK_COLOR).add_modifier(Modifier::UNDERLINED);
        }
        if self.bold_depth > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic_depth > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }

    fn flush_line(&mut self) {
        if !self.spans.is_empty() {
            let spans = std::mem::take(&mut self.spans);
            self.lines.push(Line::from(spans));
        }
    }

    fn blank_separator(&mut self) {
        self.flush_line();
        if matches!(self.lines.last(), Some(last) if last.width() > 0) {
            self.lines.push(Line::from(""));
        }
    }

    fn emit_table(&mut self) {
        let rows = std::mem::take(&mut self.table_rows);
        if rows.is_empty() {
            return;
        }

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let border_style = Style::default().fg(TABLE_BORDER_COLOR);
        for (row_idx, row) in rows.iter().enumerate() {
            let mut spans = vec![Span::styled("│ ".to_string(), border_style)];
            for (i, width) in widths.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let padding = width.saturating_sub(cell.width());
                let style = if row_idx == 0 {
                    self.base_style.add_modifier(Modifier::BOLD)
                } else {
                    self.base_style
                };
                spans.push(Span::styled(cell.to_string(), style));
                spans.push(Span::raw(" ".repeat(padding)));
                spans.push(Span::styled(" │ ".to_string(), border_style));
            }
            self.lines.push(Line::from(spans));

            if row_idx == 0 {
                let rule: String = widths
                    .iter()
                    .map(|w| format!("┼{}", "─".repeat(w + 2)))
                    .collect();
                self.lines.push(Line::from(Span::styled(
                    format!("{}┼", rule),
                    border_style,
                )));
            }
        }
        self.lines.push(Line::from(""));
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while matches!(self.lines.last(), Some(line) if line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}
