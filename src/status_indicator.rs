use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// One-line status strip between the transcript and the input: a spinner
/// while a request is in flight, plus the knowledge base badge.
#[derive(Debug, Default)]
pub struct StatusIndicator {
    thinking: bool,
    status_text: String,
    spinner_idx: usize,
}

const SPINNER_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];

impl StatusIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_thinking(&mut self, thinking: bool) {
        self.thinking = thinking;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status_text = status.into();
    }

    pub fn update_spinner(&mut self) {
        self.spinner_idx = self.spinner_idx.wrapping_add(1);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, kb_active: bool) {
        let spinner = if self.thinking {
            SPINNER_FRAMES[self.spinner_idx % SPINNER_FRAMES.len()]
        } else {
            " "
        };

        let status_text = if !self.status_text.is_empty() {
            self.status_text.as_str()
        } else if self.thinking {
            "Thinking..."
        } else {
            ""
        };

        let mut spans = vec![
            Span::styled(spinner, Style::default().fg(Color::Gray)),
            Span::raw(" "),
            Span::styled(status_text, Style::default().fg(Color::DarkGray)),
        ];

        if kb_active {
            let used: usize = spans.iter().map(|s| s.content.len()).sum();
            let badge = " KB ";
            let pad = (area.width as usize).saturating_sub(used + badge.len() + 1);
            spans.push(Span::raw(" ".repeat(pad)));
            spans.push(Span::styled(
                badge,
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Rgb(144, 238, 144))
                    .add_modifier(Modifier::BOLD),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
