use crate::app::{App, AppScreen};
use crate::chat_view::{run_delete_files_task, run_query_task, run_upload_task};
use crate::ui::confirm::ConfirmAction;
use crate::visualization::open_visualization;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub fn handle_chat_input(key: KeyEvent, app: &mut App, app_arc: Arc<Mutex<App>>) {
    if app.confirm.is_some() {
        handle_confirm_input(key, app, app_arc);
        return;
    }

    if app.upload_prompt.is_some() {
        handle_upload_prompt_input(key, app, app_arc);
        return;
    }

    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            // Tuck the assistant away; session state survives reopening.
            app.screen = AppScreen::Splash;
        }
        (_, KeyCode::Enter) => {
            // The send control is disabled while a request is in flight.
            if app.session.is_loading() {
                return;
            }
            if let Some((id, query)) = app.session.begin_query_from_draft() {
                app.chat_scroll = u16::MAX;
                let task = app_arc.clone();
                let handle = tokio::spawn(async move {
                    run_query_task(task, id, query).await;
                });
                app.track_task(handle);
            }
        }
        (_, KeyCode::Backspace) => app.session.draft_pop(),
        (_, KeyCode::PageUp) => app.scroll_up(),
        (_, KeyCode::PageDown) => app.scroll_down(),
        (KeyModifiers::CONTROL, KeyCode::Char(c)) => handle_control_key(c, app),
        (_, KeyCode::Char(c)) => app.session.draft_push(c),
        _ => {}
    }
}

fn handle_control_key(c: char, app: &mut App) {
    match c {
        'c' => app.confirm = Some(ConfirmAction::Quit),
        'k' => {
            let enabled = app.session.toggle_knowledge_base();
            app.logs.add(if enabled {
                "Knowledge base mode on"
            } else {
                "Knowledge base mode off"
            });
        }
        'n' => {
            // New conversation. When PDF documents were uploaded this
            // session, the reset also wipes them server-side, so it has to
            // be confirmed first.
            if app.session.has_pdf_document() {
                app.confirm = Some(ConfirmAction::ResetConversation);
            } else {
                app.session.reset();
                app.typing.clear();
                app.chat_scroll = 0;
                app.logs.add("Conversation cleared");
            }
        }
        'u' => app.upload_prompt = Some(String::new()),
        'o' => open_latest_visualization(app),
        _ => {}
    }
}

fn handle_confirm_input(key: KeyEvent, app: &mut App, app_arc: Arc<Mutex<App>>) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            match app.confirm.take() {
                Some(ConfirmAction::Quit) => app.should_quit = true,
                Some(ConfirmAction::ResetConversation) => {
                    app.session.reset();
                    app.typing.clear();
                    app.chat_scroll = 0;
                    app.logs.add("Conversation cleared; deleting uploaded files...");
                    let task = app_arc.clone();
                    let handle = tokio::spawn(async move {
                        run_delete_files_task(task).await;
                    });
                    app.track_task(handle);
                }
                None => {}
            }
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.confirm = None;
        }
        _ => {}
    }
}

fn handle_upload_prompt_input(key: KeyEvent, app: &mut App, app_arc: Arc<Mutex<App>>) {
    match key.code {
        KeyCode::Esc => {
            app.upload_prompt = None;
        }
        KeyCode::Enter => {
            if let Some(path) = app.upload_prompt.take() {
                let path = path.trim().to_string();
                if path.is_empty() {
                    return;
                }
                let task = app_arc.clone();
                let handle = tokio::spawn(async move {
                    run_upload_task(task, PathBuf::from(path)).await;
                });
                app.track_task(handle);
            }
        }
        KeyCode::Backspace => {
            if let Some(path) = app.upload_prompt.as_mut() {
                path.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(path) = app.upload_prompt.as_mut() {
                path.push(c);
            }
        }
        _ => {}
    }
}

fn open_latest_visualization(app: &mut App) {
    let latest = app
        .session
        .history()
        .iter()
        .rev()
        .find(|m| !m.visualizations.is_empty());

    let Some(message) = latest else {
        app.logs.add("No visualization to open");
        return;
    };

    for data_url in message.visualizations.clone() {
        match open_visualization(&data_url) {
            Ok(path) => app.logs.add(format!("Opened {}", path.display())),
            Err(e) => app.logs.add(format!("Could not open visualization: {}", e)),
        }
    }
}
