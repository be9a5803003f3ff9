use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
    Frame,
};

#[derive(Debug)]
pub struct SplashScreen {
    pub selected_idx: usize,
    pub menu_items: Vec<&'static str>,
}

impl SplashScreen {
    pub fn new() -> Self {
        Self {
            selected_idx: 0,
            menu_items: vec!["open assistant", "quit"],
        }
    }

    pub fn draw(&self, f: &mut Frame, area: ratatui::layout::Rect) {
        let vsplit = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(20),
                Constraint::Length(7),
                Constraint::Length(6),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(area);

        let ascii_art = r#"
 ▄▄▄· ▄• ▄▌ ▄▄▄   ▄▄▄·
▐█ ▀█ █▪██▌ ▀▄ █·▐█ ▀█
▄█▀▀█ █▌▐█▌ ▐▀▀▄ ▄█▀▀█
▐█ ▪▐▌▐█▄█▌ ▐█•█▌▐█ ▪▐▌
 ▀  ▀  ▀▀▀  .▀  ▀ ▀  ▀
document intelligence assistant
    "#;

        let ascii_par = Paragraph::new(ascii_art)
            .alignment(Alignment::Center)
            .block(Block::default())
            .wrap(Wrap { trim: true });
        f.render_widget(ascii_par, vsplit[1]);

        let blurbs = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Ask me anything, or upload files to analyze.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "▤ document analysis (PDF)   ▦ data analytics (CSV)   ⌂ knowledge base",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center);
        f.render_widget(blurbs, vsplit[2]);

        let mut menu_lines = Vec::new();
        for (i, item) in self.menu_items.iter().enumerate() {
            let selected = i == self.selected_idx;
            let style = if selected {
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            menu_lines.push(Line::from(Span::styled(
                format!("{} {}", if selected { "▶" } else { " " }, item),
                style,
            )));
        }
        let menu_par = Paragraph::new(menu_lines)
            .alignment(Alignment::Center)
            .block(Block::default());
        f.render_widget(menu_par, vsplit[3]);
    }

    pub fn handle_input(&mut self, key: crossterm::event::KeyEvent) -> Option<SplashScreenAction> {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Down) => {
                self.selected_idx = (self.selected_idx + 1) % self.menu_items.len();
                None
            }
            (KeyModifiers::NONE, KeyCode::Up) => {
                if self.selected_idx == 0 {
                    self.selected_idx = self.menu_items.len() - 1;
                } else {
                    self.selected_idx -= 1;
                }
                None
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                match self.menu_items[self.selected_idx] {
                    "quit" => Some(SplashScreenAction::Quit),
                    "open assistant" => Some(SplashScreenAction::OpenChat),
                    _ => None,
                }
            }
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(SplashScreenAction::Quit),
            _ => None,
        }
    }
}

impl Default for SplashScreen {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub enum SplashScreenAction {
    Quit,
    OpenChat,
}
