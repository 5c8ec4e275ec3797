//! One user's conversation over one set of uploaded documents.
//!
//! A session owns the recorded upload set, the document context built from
//! it and the conversation history. Replacing the upload replaces the
//! context and clears the history in the same step; nothing else clears
//! the context.

use std::sync::Arc;

use docchat_core::document::{Document, UploadSet};
use docchat_core::error::{Error, ExtractionError};
use docchat_core::message::{ConversationHistory, Message};
use tracing::{debug, info};

use crate::context::ContextAssembler;
use crate::responder::ChatResponder;

/// What `load_documents` did with an upload.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// No documents were supplied; the session is unchanged.
    Empty,
    /// The same files, in the same order, are already loaded.
    Unchanged,
    /// A new context was built and the history was cleared.
    Loaded(LoadReport),
}

/// Summary of a successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub processed: Vec<String>,
    pub failures: Vec<(String, ExtractionError)>,
    pub context_chars: usize,
}

/// Per-user chat state with its injected collaborators.
pub struct Session {
    assembler: Arc<ContextAssembler>,
    responder: Arc<ChatResponder>,
    upload: UploadSet,
    context: String,
    history: ConversationHistory,
}

impl Session {
    pub fn new(assembler: Arc<ContextAssembler>, responder: Arc<ChatResponder>) -> Self {
        Self {
            assembler,
            responder,
            upload: UploadSet::default(),
            context: String::new(),
            history: ConversationHistory::new(),
        }
    }

    /// Load an upload, rebuilding the context only when the upload set changed.
    pub fn load_documents(&mut self, documents: Vec<Document>) -> Result<UploadOutcome, Error> {
        if documents.is_empty() {
            return Ok(UploadOutcome::Empty);
        }

        let upload = UploadSet::from_documents(&documents);
        if upload == self.upload {
            debug!(documents = upload.len(), "Upload set unchanged");
            return Ok(UploadOutcome::Unchanged);
        }

        let assembled = self.assembler.assemble(&documents)?;
        let report = LoadReport {
            context_chars: assembled.char_len(),
            processed: assembled.processed,
            failures: assembled.failures,
        };

        self.upload = upload;
        self.context = assembled.context;
        self.history.clear();

        info!(
            documents = report.processed.len(),
            failed = report.failures.len(),
            "Loaded new upload set"
        );
        Ok(UploadOutcome::Loaded(report))
    }

    /// Ask a question about the loaded documents.
    ///
    /// The model sees the turns before this question. The question and its
    /// answer are then recorded together; on failure an apology is recorded
    /// as the answer and the error is returned.
    pub async fn ask(&mut self, question: &str) -> Result<String, Error> {
        if !self.has_context() {
            return Err(Error::NoDocumentContext);
        }

        let reply = self
            .responder
            .respond(question, &self.context, &self.history)
            .await;
        self.history.push(Message::user(question));

        match reply {
            Ok(answer) => {
                self.history.push(Message::assistant(answer.clone()));
                Ok(answer)
            }
            Err(e) => {
                self.history
                    .push(Message::assistant(format!("Sorry, I encountered an error: {e}")));
                Err(e)
            }
        }
    }

    /// Summarize the loaded documents. Does not touch the history.
    pub async fn summarize(&self) -> Result<String, Error> {
        if !self.has_context() {
            return Err(Error::NoDocumentContext);
        }
        self.responder.summarize(&self.context).await
    }

    /// Forget the conversation, keeping the documents.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn document_context(&self) -> &str {
        &self.context
    }

    /// Names of the documents in the recorded upload set.
    pub fn documents(&self) -> Vec<&str> {
        self.upload.names()
    }

    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{docx_document, ScriptedProvider};
    use docchat_core::error::{ModelOperation, ProviderError};
    use docchat_core::message::Role;

    fn session_with(provider: Arc<ScriptedProvider>) -> Session {
        Session::new(
            Arc::new(ContextAssembler::default()),
            Arc::new(ChatResponder::with_defaults(provider, "gpt-4o")),
        )
    }

    fn loaded(session: &mut Session, documents: Vec<Document>) -> LoadReport {
        match session.load_documents(documents).unwrap() {
            UploadOutcome::Loaded(report) => report,
            other => panic!("expected a load, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ask_without_documents_fails() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let mut session = session_with(provider.clone());

        let err = session.ask("Anything?").await.unwrap_err();
        assert!(matches!(err, Error::NoDocumentContext));
        assert!(session.history().is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn ask_records_question_and_answer() {
        let provider = Arc::new(ScriptedProvider::answers(&["It is due Friday."]));
        let mut session = session_with(provider.clone());
        loaded(&mut session, vec![docx_document("plan.docx", &["Report due Friday."])]);

        let answer = session.ask("When is the report due?").await.unwrap();
        assert_eq!(answer, "It is due Friday.");

        let turns = session.history().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "When is the report due?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "It is due Friday.");

        // The new question is sent once, after the (empty) prior history.
        let request = &provider.requests()[0];
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[0].content.contains("--- Content from plan.docx ---"));
    }

    #[tokio::test]
    async fn failed_answer_records_apology() {
        let provider = Arc::new(ScriptedProvider::failing(ProviderError::Timeout(
            "120s".into(),
        )));
        let mut session = session_with(provider);
        loaded(&mut session, vec![docx_document("a.docx", &["Alpha."])]);

        let err = session.ask("q").await.unwrap_err();
        assert!(matches!(
            err,
            Error::ModelRequestFailed {
                operation: ModelOperation::Response,
                ..
            }
        ));

        let last = session.history().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(
            last.content,
            "Sorry, I encountered an error: Error generating response: Request timed out: 120s"
        );
    }

    #[tokio::test]
    async fn only_three_prior_turns_are_sent() {
        let provider = Arc::new(ScriptedProvider::answers(&["a1", "a2", "a3"]));
        let mut session = session_with(provider.clone());
        loaded(&mut session, vec![docx_document("a.docx", &["Alpha."])]);

        session.ask("q1").await.unwrap();
        session.ask("q2").await.unwrap();
        session.ask("q3").await.unwrap();

        let third = &provider.requests()[2];
        let contents: Vec<&str> = third.messages[1..]
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["a1", "q2", "a2", "q3"]);

        // The question being asked is never duplicated into the history sent.
        let first = &provider.requests()[0];
        assert_eq!(first.messages.len(), 2);
        assert_eq!(session.history().len(), 6);
    }

    #[tokio::test]
    async fn new_upload_resets_context_and_history_together() {
        let provider = Arc::new(ScriptedProvider::answers(&["first"]));
        let mut session = session_with(provider);
        loaded(&mut session, vec![docx_document("a.docx", &["Alpha."])]);
        session.ask("q").await.unwrap();
        assert_eq!(session.history().len(), 2);

        loaded(&mut session, vec![docx_document("b.docx", &["Beta."])]);
        assert!(session.history().is_empty());
        assert!(session.document_context().contains("Beta."));
        assert!(!session.document_context().contains("Alpha."));
        assert_eq!(session.documents(), vec!["b.docx"]);
    }

    #[tokio::test]
    async fn identical_upload_is_unchanged() {
        let provider = Arc::new(ScriptedProvider::answers(&["ok"]));
        let mut session = session_with(provider);
        loaded(&mut session, vec![docx_document("a.docx", &["Alpha."])]);
        session.ask("q").await.unwrap();

        let outcome = session
            .load_documents(vec![docx_document("a.docx", &["Alpha."])])
            .unwrap();
        assert_eq!(outcome, UploadOutcome::Unchanged);
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn reordered_upload_is_a_new_set() {
        let mut session = session_with(Arc::new(ScriptedProvider::new(vec![])));
        let a = docx_document("a.docx", &["Alpha."]);
        let b = docx_document("b.docx", &["Beta."]);
        loaded(&mut session, vec![a.clone(), b.clone()]);

        let report = loaded(&mut session, vec![b, a]);
        assert_eq!(report.processed, vec!["b.docx", "a.docx"]);
        assert!(session.document_context().starts_with("--- Content from b.docx ---"));
    }

    #[test]
    fn empty_upload_changes_nothing() {
        let mut session = session_with(Arc::new(ScriptedProvider::new(vec![])));
        loaded(&mut session, vec![docx_document("a.docx", &["Alpha."])]);

        assert_eq!(session.load_documents(vec![]).unwrap(), UploadOutcome::Empty);
        assert!(session.has_context());
        assert_eq!(session.documents(), vec!["a.docx"]);
    }

    #[test]
    fn partial_failure_still_loads() {
        let mut session = session_with(Arc::new(ScriptedProvider::new(vec![])));
        let report = loaded(
            &mut session,
            vec![
                docx_document("a.docx", &["Alpha."]),
                Document::new("broken.pdf", b"not a pdf".to_vec()),
                docx_document("c.docx", &["Gamma."]),
            ],
        );

        assert_eq!(report.processed, vec!["a.docx", "c.docx"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "broken.pdf");
        assert!(session.document_context().contains("Alpha."));
        assert!(session.document_context().contains("Gamma."));
        assert_eq!(session.documents(), vec!["a.docx", "broken.pdf", "c.docx"]);
    }

    #[tokio::test]
    async fn all_failed_upload_keeps_previous_state() {
        let provider = Arc::new(ScriptedProvider::answers(&["ok"]));
        let mut session = session_with(provider);
        loaded(&mut session, vec![docx_document("a.docx", &["Alpha."])]);
        session.ask("q").await.unwrap();
        let context_before = session.document_context().to_string();

        let err = session
            .load_documents(vec![
                Document::new("x.txt", b"x".to_vec()),
                Document::new("y.csv", b"y".to_vec()),
            ])
            .unwrap_err();

        assert!(matches!(err, Error::AllDocumentsFailed { attempted: 2, .. }));
        assert_eq!(session.document_context(), context_before);
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.documents(), vec!["a.docx"]);
    }

    #[tokio::test]
    async fn clear_history_keeps_context() {
        let provider = Arc::new(ScriptedProvider::answers(&["ok"]));
        let mut session = session_with(provider);
        loaded(&mut session, vec![docx_document("a.docx", &["Alpha."])]);
        session.ask("q").await.unwrap();

        session.clear_history();
        assert!(session.history().is_empty());
        assert!(session.has_context());
    }

    #[tokio::test]
    async fn summarize_leaves_history_alone() {
        let provider = Arc::new(ScriptedProvider::answers(&["Summary."]));
        let mut session = session_with(provider);
        loaded(&mut session, vec![docx_document("a.docx", &["Alpha."])]);

        assert_eq!(session.summarize().await.unwrap(), "Summary.");
        assert!(session.history().is_empty());
    }
}
