const MAX_LOG_ENTRIES: usize = 200;

/// Bounded activity feed shown in the side pane of the chat screen.
#[derive(Debug, Default)]
pub struct LogView {
    pub entries: Vec<String>,
}

impl LogView {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        log::info!("{}", entry);
        self.entries.push(entry);
        if self.entries.len() > MAX_LOG_ENTRIES {
            self.entries.remove(0);
        }
    }
}
