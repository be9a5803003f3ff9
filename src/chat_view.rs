use crate::app::App;
use crate::upload::validate_upload;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
    Frame,
};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use unicode_width::UnicodeWidthStr;
use uuid::Uuid;

pub fn draw_chat(f: &mut Frame, app: &mut App) {
    let size = f.area();
    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
        .margin(1)
        .split(size);

    let chat_vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(horizontal_chunks[0]);

    draw_messages(f, app, chat_vertical_chunks[0]);

    let kb_active = app.session.use_knowledge_base();
    app.status_indicator
        .render(f, chat_vertical_chunks[1], kb_active);

    draw_input(f, app, chat_vertical_chunks[2]);
    draw_logs(f, app, horizontal_chunks[1], size);
}

fn draw_messages(f: &mut Frame, app: &mut App, area: Rect) {
    let streaming_owner = app.typing.message_id();
    let streaming_prefix = app.typing.visible_prefix();

    let mut lines = Vec::new();
    for message in app.session.history() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        let prefix = if streaming_owner == Some(message.id) {
            Some(streaming_prefix.as_str())
        } else {
            None
        };
        lines.extend(message.render(area, prefix));
    }

    let total_lines = lines.len() as u16;
    let max_scroll = total_lines.saturating_sub(area.height);
    if app.chat_scroll > max_scroll {
        app.chat_scroll = max_scroll;
    }

    let msgs_para = Paragraph::new(lines)
        .block(Block::default())
        .wrap(Wrap { trim: true });
    f.render_widget(msgs_para.scroll((app.chat_scroll, 0)), area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let separator = "─".repeat(area.width as usize);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator.clone(),
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        },
    );

    // Path-entry mode replaces the draft line while choosing a file.
    let (prefix, prefix_style, text) = match &app.upload_prompt {
        Some(path) => (
            "⇪ path: ",
            Style::default().fg(Color::Yellow),
            path.as_str(),
        ),
        None => (
            "→ ",
            Style::default().fg(Color::DarkGray),
            app.session.draft(),
        ),
    };

    let input = Line::from(vec![
        Span::styled(prefix, prefix_style),
        Span::styled(text, Style::default().fg(Color::White)),
    ]);

    let prefix_width = prefix.width() as u16;
    let visible_width = area.width.saturating_sub(prefix_width);
    let text_width = text.width() as u16;
    let scroll_offset = text_width.saturating_sub(visible_width);

    f.render_widget(
        Paragraph::new(input).scroll((0, scroll_offset)),
        Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: 1,
        },
    );

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            x: area.x,
            y: area.y + area.height - 1,
            width: area.width,
            height: 1,
        },
    );

    let cursor_x = area.x + prefix_width + text_width - scroll_offset;
    f.set_cursor_position((cursor_x, area.y + 1));
}

fn draw_logs(f: &mut Frame, app: &App, area: Rect, size: Rect) {
    let vsep: String = "│".repeat(size.height.saturating_sub(2) as usize);
    f.render_widget(
        Paragraph::new(Span::raw(vsep)).style(Style::default().fg(Color::DarkGray)),
        Rect {
            x: area.x.saturating_sub(1),
            y: 1,
            width: 1,
            height: size.height.saturating_sub(2),
        },
    );

    let log_lines: Vec<Line> = app
        .logs
        .entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::DarkGray)),
                Span::raw(entry.as_str()),
            ])
        })
        .collect();

    let total_log_lines = log_lines.len() as u16;
    let max_log_scroll = total_log_lines.saturating_sub(area.height);
    let logs_scroll = app.logs_scroll.min(max_log_scroll);

    let logs_para = Paragraph::new(log_lines)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    f.render_widget(logs_para.scroll((logs_scroll, 0)), area);
}

/// Drives one chat query end to end. The app lock is held only to mutate
/// state, never across the network call.
pub async fn run_query_task(app: Arc<Mutex<App>>, placeholder_id: Uuid, query: String) {
    let (client, kb_flag) = {
        let mut guard = app.lock().await;
        guard.logs.add("Sending query to backend...");
        guard.status_indicator.set_thinking(true);
        (guard.client.clone(), guard.session.use_knowledge_base())
    };

    let result = client.generate_response(&query, kb_flag).await;

    let mut guard = app.lock().await;
    match &result {
        Ok(answer) => {
            guard
                .logs
                .add(format!("Response received ({} chars)", answer.response.len()));
            if answer.visualization.is_some() {
                guard.logs.add("Visualization payload attached");
            }
        }
        Err(e) => guard.logs.add(format!("Query failed: {}", e)),
    }

    let settle_after = guard.session.finish_query(placeholder_id, result);
    guard.status_indicator.set_thinking(false);
    guard.chat_scroll = u16::MAX; // clamped to bottom on next draw

    if let Some(delay) = settle_after {
        let state = &mut *guard;
        if let Some(message) = state.session.message(placeholder_id) {
            state.typing.set_target(placeholder_id, &message.text);
        }

        // The streaming flag is settled on a timer sized to the text, not
        // by the reveal itself.
        let app_clone = app.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut guard = app_clone.lock().await;
            guard.session.settle_streaming(placeholder_id);
            if guard.typing.message_id() == Some(placeholder_id) {
                guard.typing.clear();
            }
        });
        guard.track_task(handle);
    }
}

/// Drives one file upload end to end: read and validate without the lock,
/// then the same begin/finish protocol as queries.
pub async fn run_upload_task(app: Arc<Mutex<App>>, path: PathBuf) {
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let mut guard = app.lock().await;
            guard.logs.add(format!("Upload failed: {}", e));
            guard
                .session
                .reject_upload(format!("Could not read **{}**: {}", path.display(), e));
            return;
        }
    };

    let file = match validate_upload(&path, bytes) {
        Ok(file) => file,
        Err(reason) => {
            let mut guard = app.lock().await;
            guard.logs.add("Upload rejected by client-side checks");
            guard.session.reject_upload(reason.to_string());
            guard.chat_scroll = u16::MAX;
            return;
        }
    };

    let (client, placeholder_id) = {
        let mut guard = app.lock().await;
        guard.logs.add(format!(
            "Uploading {} ({} bytes)...",
            file.filename,
            file.bytes.len()
        ));
        guard.status_indicator.set_thinking(true);
        (guard.client.clone(), guard.session.begin_upload(&file))
    };

    match file.kind {
        crate::upload::FileKind::Pdf => {
            let result = client.upload_pdf(&file.filename, file.bytes).await;
            let mut guard = app.lock().await;
            match &result {
                Ok(_) => guard.logs.add("PDF indexed; knowledge base mode on"),
                Err(e) => guard.logs.add(format!("PDF upload failed: {}", e)),
            }
            guard
                .session
                .finish_pdf_upload(placeholder_id, &file.filename, result);
            guard.status_indicator.set_thinking(false);
            guard.chat_scroll = u16::MAX;
        }
        crate::upload::FileKind::Csv => {
            let result = client.upload_csv(&file.filename, file.bytes).await;
            let mut guard = app.lock().await;
            match &result {
                Ok(answer) => guard
                    .logs
                    .add(format!("CSV registered with file id {}", answer.file_id)),
                Err(e) => guard.logs.add(format!("CSV upload failed: {}", e)),
            }
            guard
                .session
                .finish_csv_upload(placeholder_id, &file.filename, result);
            guard.status_indicator.set_thinking(false);
            guard.chat_scroll = u16::MAX;
        }
    }
}

/// Fires the server-side wipe that follows a confirmed reset of a session
/// holding PDF documents.
pub async fn run_delete_files_task(app: Arc<Mutex<App>>) {
    let client = {
        let guard = app.lock().await;
        guard.client.clone()
    };

    let result = client.delete_all_files().await;

    let mut guard = app.lock().await;
    match result {
        Ok(answer) => guard.logs.add(format!("Backend: {}", answer.message)),
        Err(e) => guard.logs.add(format!("Delete-all-files failed: {}", e)),
    }
}
