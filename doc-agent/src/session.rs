// ABOUTME: Editing session - one file loaded as a rich document, the chat so far,
// ABOUTME: and the glue that runs each prompt through the agent loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use margin::prelude::*;
use margin::tool::tool_definitions;
use tokio_util::sync::CancellationToken;

const SYSTEM_PROMPT: &str = "You are an editing assistant working inside the user's document. \
Use read_document and search_document to look before you change anything, and edit_document to \
make precise replacements. Keep answers short and say what you changed.";

pub struct Session {
    path: PathBuf,
    document: RichDocument,
    context: DocumentContext,
    history: Vec<Message>,
    dirty: bool,
}

impl Session {
    /// Load a file. The file name is shown to the model.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        Ok(Self {
            document: RichDocument::from_text(&content),
            context: DocumentContext {
                file_name,
                content,
            },
            path,
            history: Vec::new(),
            dirty: false,
        })
    }

    pub fn text(&self) -> String {
        self.document.text_content()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Build the request for the next prompt, carrying earlier exchanges.
    pub fn request(&self, model: &str, prompt: &str) -> Request {
        Request::new(model)
            .system(SYSTEM_PROMPT)
            .messages(self.history.iter().cloned())
            .message(Message::user(prompt))
            .tools(tool_definitions())
    }

    /// Run one prompt to completion against the document.
    pub async fn ask(
        &mut self,
        client: Arc<dyn LlmClient>,
        model: &str,
        prompt: &str,
        max_iterations: usize,
        cancel: CancellationToken,
        on_status: impl Fn(&str) + Send + Sync + 'static,
    ) -> Result<AgentOutcome> {
        let agent = AgentLoop::new(client, self.request(model, prompt))
            .max_iterations(max_iterations)
            .cancel_token(cancel)
            .on_status(on_status);

        let depth = self.document.undo_depth();
        let result = {
            let mut executor = create_tool_executor(&mut self.document, self.context.clone());
            agent.run(&mut executor).await
        };
        // Edits made before an abort or error still count.
        self.sync_after_edits(depth);

        let outcome = result?;
        self.history.push(Message::user(prompt));
        self.history.push(Message::assistant(outcome.text.clone()));
        Ok(outcome)
    }

    /// Revert the most recent edit.
    pub fn undo(&mut self) -> bool {
        if !self.document.undo() {
            return false;
        }
        self.context.content = self.document.text_content();
        self.dirty = true;
        true
    }

    /// Write the document back to its file.
    pub fn save(&mut self) -> Result<()> {
        let text = self.document.text_content();
        std::fs::write(&self.path, &text)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        self.dirty = false;
        tracing::info!(path = %self.path.display(), bytes = text.len(), "saved document");
        Ok(())
    }

    fn sync_after_edits(&mut self, depth_before: usize) {
        if self.document.undo_depth() != depth_before {
            self.context.content = self.document.text_content();
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Write;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use margin::llm::TextStream;
    use serde_json::{Value, json};

    use super::*;

    struct Scripted(Mutex<VecDeque<ToolCompletionResponse>>);

    impl Scripted {
        fn edit_then_answer(find: &str, replace: &str) -> Arc<Self> {
            Arc::new(Self(Mutex::new(VecDeque::from(vec![
                ToolCompletionResponse {
                    text: None,
                    tool_calls: vec![ToolCall::new(
                        "c1",
                        "edit_document",
                        json!({"find": find, "replace": replace}),
                    )],
                    raw_assistant_message: json!({"role": "assistant"}),
                },
                ToolCompletionResponse {
                    text: Some("Done.".to_string()),
                    tool_calls: vec![],
                    raw_assistant_message: json!({"role": "assistant"}),
                },
            ]))))
        }
    }

    #[async_trait]
    impl LlmClient for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _req: &Request) -> Result<String, LlmError> {
            Ok(String::new())
        }

        fn complete_stream(&self, _req: &Request) -> TextStream {
            Box::pin(futures::stream::empty())
        }

        async fn validate_key(&self) -> Result<bool, LlmError> {
            Ok(true)
        }

        fn as_tool_calling(&self) -> Option<&dyn ToolCalling> {
            Some(self)
        }
    }

    #[async_trait]
    impl ToolCalling for Scripted {
        async fn generate_with_tools(
            &self,
            _req: &Request,
            _history: &[Value],
        ) -> Result<ToolCompletionResponse, LlmError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(LlmError::EmptyResponse)
        }

        fn format_tool_results(&self, results: &[ToolResult]) -> ToolResultTurns {
            ToolResultTurns::Many(results.iter().map(|r| json!({"content": r.content})).collect())
        }
    }

    fn temp_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_ask_edits_and_saves() {
        let file = temp_file("Line one\nLine two has teh typo\n");
        let mut session = Session::open(file.path()).unwrap();

        let outcome = session
            .ask(
                Scripted::edit_then_answer("teh", "the"),
                "scripted",
                "Fix the typo",
                8,
                CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(outcome.text, "Done.");
        assert!(session.is_dirty());
        assert_eq!(session.text(), "Line one\nLine two has the typo\n");

        session.save().unwrap();
        assert!(!session.is_dirty());
        assert_eq!(
            std::fs::read_to_string(file.path()).unwrap(),
            "Line one\nLine two has the typo\n"
        );
    }

    #[tokio::test]
    async fn test_history_carries_into_next_request() {
        let file = temp_file("draft");
        let mut session = Session::open(file.path()).unwrap();

        session
            .ask(
                Scripted::edit_then_answer("draft", "final"),
                "scripted",
                "Finish it",
                8,
                CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap();

        let request = session.request("scripted", "Thanks");
        let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(request.messages[2].content, "Done.");
        assert_eq!(request.tools.len(), 4);
    }

    #[tokio::test]
    async fn test_undo_reverts_agent_edit() {
        let file = temp_file("keep this");
        let mut session = Session::open(file.path()).unwrap();

        session
            .ask(
                Scripted::edit_then_answer("keep", "drop"),
                "scripted",
                "Change it",
                8,
                CancellationToken::new(),
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(session.text(), "drop this");
        assert!(session.undo());
        assert_eq!(session.text(), "keep this");
        assert!(!session.undo());
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::open(dir.path().join("nope.md")).err().unwrap();
        assert!(err.to_string().contains("Failed to read"));
    }
}
