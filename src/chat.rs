// src/chat.rs
//
// Conversation controller. Owns the transcript, the draft, the knowledge
// base flag, and the active file handle. Network work happens through the
// composed async operations at the bottom; every state change funnels
// through the synchronous begin/finish pairs so the UI can hold its lock
// only briefly and tests can drive the protocol directly.

use crate::api::BackendClient;
use crate::chat_message::{ChatMessage, FileInfo};
use crate::errors::{AuraError, AuraResult};
use crate::markdown::split_visualizations;
use crate::models::{BackendMessage, CsvUploadResponse, QueryResponse};
use crate::streaming::estimated_reveal_duration;
use crate::upload::{csv_summary_markdown, validate_upload, FileKind, ValidatedFile};
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct ChatSession {
    history: Vec<ChatMessage>,
    draft: String,
    use_knowledge_base: bool,
    active_file_id: Option<String>,
    is_loading: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn message(&self, id: Uuid) -> Option<&ChatMessage> {
        self.history.iter().find(|m| m.id == id)
    }

    fn message_mut(&mut self, id: Uuid) -> Option<&mut ChatMessage> {
        self.history.iter_mut().find(|m| m.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn use_knowledge_base(&self) -> bool {
        self.use_knowledge_base
    }

    pub fn toggle_knowledge_base(&mut self) -> bool {
        self.use_knowledge_base = !self.use_knowledge_base;
        self.use_knowledge_base
    }

    pub fn active_file_id(&self) -> Option<&str> {
        self.active_file_id.as_deref()
    }

    pub fn has_pdf_document(&self) -> bool {
        self.history
            .iter()
            .any(|m| matches!(&m.file_info, Some(info) if info.kind == FileKind::Pdf))
    }

    // --- draft -----------------------------------------------------------

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_push(&mut self, c: char) {
        self.draft.push(c);
    }

    pub fn draft_pop(&mut self) {
        self.draft.pop();
    }

    // --- send ------------------------------------------------------------

    /// Sync phase of a send: appends the user message, clears the draft,
    /// and inserts the bot placeholder whose id keys the in-flight request.
    /// Whitespace-only input is a no-op.
    pub fn begin_query(&mut self, text: &str) -> Option<Uuid> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.history.push(ChatMessage::user(text));
        self.draft.clear();
        self.is_loading = true;

        let placeholder = ChatMessage::placeholder();
        let id = placeholder.id;
        self.history.push(placeholder);
        Some(id)
    }

    /// Takes the current draft and starts a send with it.
    pub fn begin_query_from_draft(&mut self) -> Option<(Uuid, String)> {
        let text = self.draft.trim().to_string();
        let id = self.begin_query(&text)?;
        Some((id, text))
    }

    /// Completion phase: the placeholder is replaced in place, found by id
    /// so a later send cannot shift it. Returns the reveal timeout the
    /// owner should wait before settling the streaming flag.
    pub fn finish_query(
        &mut self,
        id: Uuid,
        result: AuraResult<QueryResponse>,
    ) -> Option<Duration> {
        self.is_loading = false;

        let message = self.message_mut(id)?;
        message.loading_indicator = false;

        match result {
            Ok(answer) => {
                message.text = answer.response;
                message.visualizations = answer
                    .visualization
                    .as_deref()
                    .map(split_visualizations)
                    .unwrap_or_default();
                message.is_streaming = true;
                Some(estimated_reveal_duration(&message.text))
            }
            Err(e) => {
                message.text = query_error_markdown(&e);
                message.is_streaming = false;
                None
            }
        }
    }

    pub fn settle_streaming(&mut self, id: Uuid) {
        if let Some(message) = self.message_mut(id) {
            message.is_streaming = false;
        }
    }

    // --- upload ----------------------------------------------------------

    /// Validation rejection: exactly one inline bot message, nothing sent.
    pub fn reject_upload(&mut self, reason: String) {
        self.history.push(ChatMessage::bot(reason));
    }

    /// Sync phase of an accepted upload: the user message describing the
    /// upload plus the bot placeholder for the outcome.
    pub fn begin_upload(&mut self, file: &ValidatedFile) -> Uuid {
        self.history.push(
            ChatMessage::user(format!("📎 Uploaded {}", file.filename)).with_file_info(FileInfo {
                filename: file.filename.clone(),
                kind: file.kind,
                columns: Vec::new(),
                row_count: None,
            }),
        );
        self.is_loading = true;

        let placeholder = ChatMessage::placeholder();
        let id = placeholder.id;
        self.history.push(placeholder);
        id
    }

    /// PDF uploads don't return a file handle; success turns the knowledge
    /// base on so follow-up questions are grounded in the document.
    pub fn finish_pdf_upload(
        &mut self,
        id: Uuid,
        filename: &str,
        result: AuraResult<BackendMessage>,
    ) {
        self.is_loading = false;

        let kb_enabled = result.is_ok();
        if let Some(message) = self.message_mut(id) {
            message.loading_indicator = false;
            message.text = match result {
                Ok(answer) => format!(
                    "{}\n\nKnowledge base mode is now active. Answers will be grounded in \
                     your uploaded documents.",
                    answer.message
                ),
                Err(e) => upload_error_markdown(filename, &e),
            };
        }
        if kb_enabled {
            self.use_knowledge_base = true;
        }
    }

    pub fn finish_csv_upload(
        &mut self,
        id: Uuid,
        filename: &str,
        result: AuraResult<CsvUploadResponse>,
    ) {
        self.is_loading = false;

        match result {
            Ok(answer) => {
                self.active_file_id = Some(answer.file_id.clone());
                if let Some(message) = self.message_mut(id) {
                    message.loading_indicator = false;
                    message.text = csv_summary_markdown(&answer);
                    message.file_info = Some(FileInfo {
                        filename: answer.filename.clone(),
                        kind: FileKind::Csv,
                        columns: answer.columns.clone(),
                        row_count: Some(answer.rows),
                    });
                }
            }
            Err(e) => {
                if let Some(message) = self.message_mut(id) {
                    message.loading_indicator = false;
                    message.text = upload_error_markdown(filename, &e);
                }
            }
        }
    }

    // --- reset -----------------------------------------------------------

    /// Clears the whole session. The knowledge base flag sticks when a PDF
    /// was uploaded this session, so knowledge mode survives a new
    /// conversation against the same document set. Returns whether a PDF
    /// was present, which is what gates the server-side delete.
    pub fn reset(&mut self) -> bool {
        let had_pdf = self.has_pdf_document();
        self.history.clear();
        self.draft.clear();
        self.active_file_id = None;
        self.is_loading = false;
        if !had_pdf {
            self.use_knowledge_base = false;
        }
        had_pdf
    }

    // --- composed operations ---------------------------------------------

    /// Full send: begin, call the backend through the fallback policy,
    /// finish. Returns the streaming settle timeout on success.
    pub async fn send_message(
        &mut self,
        client: &BackendClient,
        text: &str,
    ) -> Option<Duration> {
        let id = self.begin_query(text)?;
        let result = client
            .generate_response(text.trim(), self.use_knowledge_base)
            .await;
        self.finish_query(id, result)
    }

    /// Full upload: read, validate (no network on rejection), send to the
    /// type-specific endpoint, finish. All outcomes land in the transcript.
    pub async fn upload_file(&mut self, client: &BackendClient, path: &Path) {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.reject_upload(format!("Could not read **{}**: {}", path.display(), e));
                return;
            }
        };

        let file = match validate_upload(path, bytes) {
            Ok(file) => file,
            Err(reason) => {
                self.reject_upload(reason.to_string());
                return;
            }
        };

        let id = self.begin_upload(&file);
        match file.kind {
            FileKind::Pdf => {
                let result = client.upload_pdf(&file.filename, file.bytes).await;
                self.finish_pdf_upload(id, &file.filename, result);
            }
            FileKind::Csv => {
                let result = client.upload_csv(&file.filename, file.bytes).await;
                self.finish_csv_upload(id, &file.filename, result);
            }
        }
    }

    /// Full reset. The caller is responsible for confirming with the user
    /// before invoking this when `has_pdf_document()`, since the
    /// server-side delete is destructive.
    pub async fn reset_chat(
        &mut self,
        client: &BackendClient,
    ) -> Option<AuraResult<BackendMessage>> {
        if self.reset() {
            Some(client.delete_all_files().await)
        } else {
            None
        }
    }
}

fn query_error_markdown(e: &AuraError) -> String {
    format!(
        "## Error Processing Query\n\nI encountered an error while processing your request. \
         Please try again later.\n\nDetails: {}",
        e.user_details()
    )
}

fn upload_error_markdown(filename: &str, e: &AuraError) -> String {
    format!(
        "## Upload Failed\n\nI couldn't process **{}**.\n\nDetails: {}",
        filename,
        e.user_details()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat_message::Role;
    use serde_json::json;
    use std::time::Duration as StdDuration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(uri: &str) -> BackendClient {
        BackendClient::new(uri, StdDuration::from_secs(5))
    }

    async fn mock_generate(server: &MockServer, response: &str) {
        Mock::given(method("POST"))
            .and(path("/generate-response/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": response
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_send_appends_user_and_bot_pair() {
        let server = MockServer::start().await;
        mock_generate(&server, "Hi! How can I help?").await;

        let mut session = ChatSession::new();
        let settle = session
            .send_message(&test_client(&server.uri()), "Hello")
            .await;

        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].role, Role::User);
        assert_eq!(session.history()[0].text, "Hello");
        assert_eq!(session.history()[1].role, Role::Bot);
        assert_eq!(session.history()[1].text, "Hi! How can I help?");
        assert!(session.history()[1].is_streaming);
        assert!(!session.history()[1].loading_indicator);
        assert!(!session.is_loading());
        assert!(settle.is_some());

        let id = session.history()[1].id;
        session.settle_streaming(id);
        assert!(!session.history()[1].is_streaming);
    }

    #[tokio::test]
    async fn test_send_whitespace_is_noop() {
        let server = MockServer::start().await;

        let mut session = ChatSession::new();
        let settle = session
            .send_message(&test_client(&server.uri()), "   \n\t ")
            .await;

        assert!(settle.is_none());
        assert!(session.history().is_empty());
        assert!(!session.is_loading());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_total_failure_surfaces_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-response/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(2) // primary + alternate-header fallback
            .mount(&server)
            .await;

        let mut session = ChatSession::new();
        session
            .send_message(&test_client(&server.uri()), "Hello")
            .await;

        assert_eq!(session.history().len(), 2);
        let bot = &session.history()[1];
        assert!(bot.text.contains("Error"));
        assert!(bot.text.contains("Details:"));
        assert!(!bot.loading_indicator);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_send_fallback_transport_recovers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate-response/"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mock_generate(&server, "recovered").await;

        let mut session = ChatSession::new();
        session
            .send_message(&test_client(&server.uri()), "Hello")
            .await;

        assert_eq!(session.history()[1].text, "recovered");
    }

    #[tokio::test]
    async fn test_concurrent_sends_resolve_into_their_own_slots() {
        let mut session = ChatSession::new();
        let first = session.begin_query("one").unwrap();
        let second = session.begin_query("two").unwrap();

        // Second answer lands before the first; ids keep the slots honest.
        session.finish_query(
            second,
            Ok(QueryResponse {
                response: "answer two".to_string(),
                visualization: None,
            }),
        );
        session.finish_query(
            first,
            Ok(QueryResponse {
                response: "answer one".to_string(),
                visualization: None,
            }),
        );

        assert_eq!(session.history()[1].text, "answer one");
        assert_eq!(session.history()[3].text, "answer two");
    }

    #[tokio::test]
    async fn test_visualizations_split_from_response() {
        let mut session = ChatSession::new();
        let id = session.begin_query("chart this").unwrap();
        session.finish_query(
            id,
            Ok(QueryResponse {
                response: "2 visualizations generated".to_string(),
                visualization: Some(
                    "data:image/png;base64,AAA||VISUALIZATION_SEPARATOR||data:image/png;base64,BBB"
                        .to_string(),
                ),
            }),
        );

        assert_eq!(session.history()[1].visualizations.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_unsupported_extension_one_message_no_network() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"some notes").unwrap();

        let mut session = ChatSession::new();
        session.upload_file(&test_client(&server.uri()), &path).await;

        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].role, Role::Bot);
        assert_eq!(
            session.history()[0].text,
            "Only PDF and CSV files are supported for analysis."
        );
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_malformed_pdf_rejected_without_network() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let mut session = ChatSession::new();
        session.upload_file(&test_client(&server.uri()), &path).await;

        assert_eq!(session.history().len(), 1);
        assert!(session.history()[0].text.contains("valid PDF"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_oversized_pdf_rejected_without_network() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.pdf");
        let mut bytes = b"%PDF-1.7".to_vec();
        bytes.resize(5 * 1024 * 1024 + 1, 0);
        std::fs::write(&path, &bytes).unwrap();

        let mut session = ChatSession::new();
        session.upload_file(&test_client(&server.uri()), &path).await;

        assert_eq!(session.history().len(), 1);
        assert!(session.history()[0].text.contains("5 MB"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_csv_success_renders_summary() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-csv/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "file_id": "f-42",
                "filename": "report.csv",
                "rows": 200,
                "columns": ["name", "age", "city", "score", "tier"],
                "preview": [
                    {"name": "a", "age": 1, "city": "x", "score": 10, "tier": "gold"},
                    {"name": "b", "age": 2, "city": "y", "score": 20, "tier": "silver"}
                ]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, b"name,age,city,score,tier\n").unwrap();

        let mut session = ChatSession::new();
        session.upload_file(&test_client(&server.uri()), &path).await;

        assert_eq!(session.history().len(), 2);
        assert!(session.history()[0].text.contains("report.csv"));
        let summary = &session.history()[1];
        assert!(summary.text.contains("200 rows"));
        assert!(summary.text.contains("5 columns"));
        assert_eq!(session.active_file_id(), Some("f-42"));
        assert!(!session.use_knowledge_base());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_upload_pdf_success_enables_knowledge_base() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-pdf/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Document indexed"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.pdf");
        std::fs::write(&path, b"%PDF-1.4 content").unwrap();

        let mut session = ChatSession::new();
        assert!(!session.use_knowledge_base());
        session.upload_file(&test_client(&server.uri()), &path).await;

        assert!(session.use_knowledge_base());
        assert!(session.history()[1].text.contains("Document indexed"));
        assert!(session.active_file_id().is_none());
    }

    #[tokio::test]
    async fn test_upload_failure_cites_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload-csv/"))
            .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, b"a,b\n1,2\n").unwrap();

        let mut session = ChatSession::new();
        session.upload_file(&test_client(&server.uri()), &path).await;

        let bot = &session.history()[1];
        assert!(bot.text.contains("Upload Failed"));
        assert!(bot.text.contains("data.csv"));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_reset_without_pdf_clears_everything() {
        let mut session = ChatSession::new();
        session.draft_push('h');
        session.begin_query("hello");
        session.toggle_knowledge_base();

        let had_pdf = session.reset();

        assert!(!had_pdf);
        assert!(session.history().is_empty());
        assert!(session.draft().is_empty());
        assert!(session.active_file_id().is_none());
        assert!(!session.use_knowledge_base());
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_reset_preserves_knowledge_base_when_pdf_in_history() {
        let mut session = ChatSession::new();
        let file = ValidatedFile {
            filename: "manual.pdf".to_string(),
            kind: FileKind::Pdf,
            bytes: b"%PDF-1.4".to_vec(),
        };
        let id = session.begin_upload(&file);
        session.finish_pdf_upload(
            id,
            "manual.pdf",
            Ok(BackendMessage {
                message: "indexed".to_string(),
            }),
        );
        assert!(session.use_knowledge_base());

        let had_pdf = session.reset();

        assert!(had_pdf);
        assert!(session.history().is_empty());
        assert!(session.use_knowledge_base());
        assert!(session.active_file_id().is_none());
    }

    #[tokio::test]
    async fn test_reset_chat_issues_delete_only_with_pdf_present() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/delete-all-files/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "All files deleted"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());

        // No PDF: no delete request.
        let mut session = ChatSession::new();
        session.begin_query("hello");
        assert!(session.reset_chat(&client).await.is_none());

        // PDF present: exactly one delete request.
        let file = ValidatedFile {
            filename: "manual.pdf".to_string(),
            kind: FileKind::Pdf,
            bytes: b"%PDF-1.4".to_vec(),
        };
        session.begin_upload(&file);
        let outcome = session.reset_chat(&client).await;
        assert!(matches!(outcome, Some(Ok(_))));
    }

    #[tokio::test]
    async fn test_toggle_knowledge_base_flips_flag() {
        let mut session = ChatSession::new();
        assert!(session.toggle_knowledge_base());
        assert!(!session.toggle_knowledge_base());
    }

    #[tokio::test]
    async fn test_draft_editing_and_send_from_draft() {
        let mut session = ChatSession::new();
        for c in "hi!".chars() {
            session.draft_push(c);
        }
        session.draft_pop();
        assert_eq!(session.draft(), "hi");

        let (_, text) = session.begin_query_from_draft().unwrap();
        assert_eq!(text, "hi");
        assert!(session.draft().is_empty());
        assert_eq!(session.history().len(), 2);
    }
}
