use crate::api::BackendClient;
use crate::chat::ChatSession;
use crate::log_view::LogView;
use crate::splash_screen::SplashScreen;
use crate::status_indicator::StatusIndicator;
use crate::streaming::TypingEffect;
use crate::ui::confirm::ConfirmAction;
use tokio::task::JoinHandle;

/// Which surface is on screen. The assistant is either tucked away behind
/// the welcome screen or open as the chat surface; this enum is the single
/// owner of that state and gets passed down explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Splash,
    Chat,
}

pub struct App {
    pub screen: AppScreen,
    pub splash_screen: SplashScreen,
    pub session: ChatSession,
    pub client: BackendClient,
    pub typing: TypingEffect,
    pub status_indicator: StatusIndicator,
    pub logs: LogView,
    pub chat_scroll: u16,
    pub logs_scroll: u16,
    /// Some while the user is typing a file path to upload.
    pub upload_prompt: Option<String>,
    /// Some while a confirmation overlay is blocking input.
    pub confirm: Option<ConfirmAction>,
    pending_tasks: Vec<JoinHandle<()>>,
    pub should_quit: bool,
}

impl App {
    pub fn new(client: BackendClient) -> Self {
        Self {
            screen: AppScreen::Splash,
            splash_screen: SplashScreen::new(),
            session: ChatSession::new(),
            client,
            typing: TypingEffect::new(),
            status_indicator: StatusIndicator::new(),
            logs: LogView::new(),
            chat_scroll: 0,
            logs_scroll: 0,
            upload_prompt: None,
            confirm: None,
            pending_tasks: Vec::new(),
            should_quit: false,
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Registers an in-flight request task so it can be cancelled when the
    /// app shuts down, instead of leaking a write-after-teardown.
    pub fn track_task(&mut self, handle: JoinHandle<()>) {
        self.pending_tasks.retain(|h| !h.is_finished());
        self.pending_tasks.push(handle);
    }

    pub fn abort_pending_tasks(&mut self) {
        for handle in self.pending_tasks.drain(..) {
            handle.abort();
        }
    }
}
