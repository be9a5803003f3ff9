use crate::markdown::render_markdown;
use crate::upload::FileKind;
use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
}

/// Client-side description of an uploaded file attached to a message.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub filename: String,
    pub kind: FileKind,
    pub columns: Vec<String>,
    pub row_count: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub visualizations: Vec<String>,
    pub file_info: Option<FileInfo>,
    /// Presentation only: the typing effect is still revealing `text`.
    pub is_streaming: bool,
    /// The real response hasn't arrived; show a thinking placeholder.
    pub loading_indicator: bool,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Role::Bot, text)
    }

    /// The synchronously-inserted stand-in that a real response later
    /// replaces in place, looked up by id.
    pub fn placeholder() -> Self {
        let mut message = Self::new(Role::Bot, "");
        message.loading_indicator = true;
        message
    }

    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            visualizations: Vec::new(),
            file_info: None,
            is_streaming: false,
            loading_indicator: false,
            timestamp: Local::now(),
        }
    }

    pub fn with_file_info(mut self, file_info: FileInfo) -> Self {
        self.file_info = Some(file_info);
        self
    }

    /// Renders the message as transcript lines. `streaming_prefix` is the
    /// partial text to show instead of the full body while the typing
    /// effect runs.
    pub fn render(&self, area: Rect, streaming_prefix: Option<&str>) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let base_style = self.base_style();

        self.render_header(&mut lines, base_style);

        if self.loading_indicator {
            lines.push(Line::from(vec![
                Span::styled("│ ".to_string(), base_style),
                Span::styled(
                    "● ● ●  thinking...".to_string(),
                    base_style.add_modifier(Modifier::DIM),
                ),
            ]));
        } else {
            self.render_body(&mut lines, area, base_style, streaming_prefix);
            self.render_visualizations(&mut lines, base_style);
        }

        lines.push(Line::from(Span::styled(
            format!("{}╰─", self.indent()),
            base_style,
        )));
        lines
    }

    fn base_style(&self) -> Style {
        match self.role {
            Role::User => Style::default().fg(Color::Rgb(255, 223, 128)),
            Role::Bot => Style::default().fg(Color::Rgb(144, 238, 144)),
        }
    }

    fn indent(&self) -> &'static str {
        match self.role {
            Role::User => "  ",
            Role::Bot => "",
        }
    }

    fn render_header(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        let who = match self.role {
            Role::User => "you",
            Role::Bot => "aura",
        };
        lines.push(Line::from(vec![
            Span::styled(self.indent().to_string(), style),
            Span::styled("┌─".to_string(), style),
            Span::styled(
                format!("{} {}", self.timestamp.format("%H:%M"), who),
                style.add_modifier(Modifier::DIM),
            ),
        ]));
    }

    fn render_body(
        &self,
        lines: &mut Vec<Line<'static>>,
        area: Rect,
        style: Style,
        streaming_prefix: Option<&str>,
    ) {
        let indent = self.indent();

        let body = match streaming_prefix {
            Some(prefix) if self.is_streaming => prefix,
            _ => self.text.as_str(),
        };

        match self.role {
            // User text is plain; wrap it to the pane width.
            Role::User => {
                let wrap_width = (area.width as usize).saturating_sub(6);
                for wrapped in wrap(body, wrap_width.max(10)) {
                    lines.push(Line::from(vec![
                        Span::styled(indent.to_string(), style),
                        Span::styled("│ ".to_string(), style),
                        Span::styled(wrapped.to_string(), style),
                    ]));
                }
            }
            // Bot text is markdown.
            Role::Bot => {
                for rendered in render_markdown(body, style) {
                    let mut spans = vec![Span::styled("│ ".to_string(), style)];
                    spans.extend(rendered.spans);
                    lines.push(Line::from(spans));
                }
                if self.is_streaming {
                    if let Some(last) = lines.last_mut() {
                        last.spans
                            .push(Span::styled("▌".to_string(), style.add_modifier(Modifier::BOLD)));
                    }
                }
            }
        }
    }

    fn render_visualizations(&self, lines: &mut Vec<Line<'static>>, style: Style) {
        if self.visualizations.is_empty() || self.is_streaming {
            return;
        }
        for (i, _) in self.visualizations.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled("│ ".to_string(), style),
                Span::styled(
                    format!(
                        "▦ visualization {}/{} (ctrl+o to open)",
                        i + 1,
                        self.visualizations.len()
                    ),
                    Style::default()
                        .fg(Color::Rgb(116, 199, 236))
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(0, 0, 80, 24)
    }

    fn text_of(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_placeholder_shows_thinking() {
        let message = ChatMessage::placeholder();
        assert!(message.loading_indicator);
        let rendered = text_of(&message.render(area(), None));
        assert!(rendered.contains("thinking"));
    }

    #[test]
    fn test_streaming_prefix_replaces_body() {
        let mut message = ChatMessage::bot("the full response text");
        message.is_streaming = true;
        let rendered = text_of(&message.render(area(), Some("the full")));
        assert!(rendered.contains("the full"));
        assert!(!rendered.contains("response text"));
    }

    #[test]
    fn test_settled_message_renders_full_body() {
        let message = ChatMessage::bot("hello there");
        let rendered = text_of(&message.render(area(), None));
        assert!(rendered.contains("hello there"));
    }

    #[test]
    fn test_visualizations_listed_once_settled() {
        let mut message = ChatMessage::bot("chart below");
        message.visualizations = vec!["data:image/png;base64,AAA".to_string()];
        let rendered = text_of(&message.render(area(), None));
        assert!(rendered.contains("visualization 1/1"));
    }
}
