//! # Model-backed Judges
//!
//! Bridges from the judge capabilities to an external language-model
//! transport. The transport itself (rate limiting, retries, cost tracking)
//! lives outside this crate behind two small traits:
//!
//! - [`StructuredCaller`]: one system prompt plus one content string in,
//!   one JSON value out. Backs [`PromptJudge`] for chunk questions.
//! - [`ChatCaller`]: a message list in, one reply string out. Backs
//!   [`ConversationJudge`] for verification graphs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use ordscope_core::JudgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::executor::Transcript;
use crate::graph::GraphNode;
use crate::judge::{ChunkJudge, GraphJudge};

// ---------------------------------------------------------------------------
// Structured single-shot calls
// ---------------------------------------------------------------------------

/// Transport that returns a parsed JSON response.
#[async_trait]
pub trait StructuredCaller: Send + Sync {
    /// Send `content` under the `system` instructions.
    async fn call(&self, system: &str, content: &str) -> Result<Value, JudgeError>;
}

/// Chunk judge that asks a model for a JSON object and reads `response[key]`.
///
/// Every `{key}` in the system prompt is replaced by the question key. A
/// missing or non-boolean value reads as `false`.
#[derive(Debug, Clone)]
pub struct PromptJudge<C> {
    caller: C,
    system_prompt: String,
}

impl<C: StructuredCaller> PromptJudge<C> {
    /// Wrap `caller` with a system prompt template.
    pub fn new(caller: C, system_prompt: impl Into<String>) -> Self {
        Self {
            caller,
            system_prompt: system_prompt.into(),
        }
    }

    /// The underlying transport.
    pub fn caller(&self) -> &C {
        &self.caller
    }

    /// The system prompt with `{key}` filled in.
    pub fn system_prompt_for(&self, key: &str) -> String {
        self.system_prompt.replace("{key}", key)
    }
}

#[async_trait]
impl<T, C> ChunkJudge<T> for PromptJudge<C>
where
    T: AsRef<str> + ?Sized + Sync,
    C: StructuredCaller,
{
    async fn judge(&self, key: &str, chunk: &T) -> Result<bool, JudgeError> {
        let response = self
            .caller
            .call(&self.system_prompt_for(key), chunk.as_ref())
            .await?;
        let answer = response.get(key).and_then(Value::as_bool).unwrap_or(false);
        tracing::trace!(key, answer, "structured judge response");
        Ok(answer)
    }
}

// ---------------------------------------------------------------------------
// Chat conversations
// ---------------------------------------------------------------------------

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Transport that continues a chat.
#[async_trait]
pub trait ChatCaller: Send + Sync {
    /// Return the assistant's reply to `messages`.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, JudgeError>;
}

/// Graph judge that holds the subject under verification (document text or
/// URL) and replays the traversal as a chat.
///
/// The first visited node's prompt becomes the system message, followed by
/// the subject as a user message. Each later node contributes its prompt as
/// a user message and, at branch nodes, the recorded answer as an assistant
/// message.
#[derive(Debug, Clone)]
pub struct ConversationJudge<C> {
    caller: C,
    subject: String,
}

impl<C: ChatCaller> ConversationJudge<C> {
    /// Judge `subject` through `caller`.
    pub fn new(caller: C, subject: impl Into<String>) -> Self {
        Self {
            caller,
            subject: subject.into(),
        }
    }

    /// The text or URL being verified.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The underlying transport.
    pub fn caller(&self) -> &C {
        &self.caller
    }

    /// Messages sent when asking `node` after `transcript`.
    pub fn conversation(&self, node: &GraphNode, transcript: &Transcript) -> Vec<ChatMessage> {
        let mut prompts = transcript
            .iter()
            .map(|e| (e.prompt.as_str(), e.answer))
            .chain(std::iter::once((node.prompt.as_str(), None)));

        let mut messages = Vec::with_capacity(2 * transcript.len() + 2);
        if let Some((context, _)) = prompts.next() {
            messages.push(ChatMessage::new(ChatRole::System, context));
            messages.push(ChatMessage::new(ChatRole::User, self.subject.as_str()));
        }
        for (prompt, answer) in prompts {
            messages.push(ChatMessage::new(ChatRole::User, prompt));
            if let Some(answer) = answer {
                let reply = if answer { "Yes." } else { "No." };
                messages.push(ChatMessage::new(ChatRole::Assistant, reply));
            }
        }
        messages
    }
}

#[async_trait]
impl<C: ChatCaller> GraphJudge for ConversationJudge<C> {
    async fn decide(&self, node: &GraphNode, transcript: &Transcript) -> Result<bool, JudgeError> {
        let reply = self.caller.chat(&self.conversation(node, transcript)).await?;
        Ok(starts_with_yes(&reply))
    }

    async fn conclude(
        &self,
        node: &GraphNode,
        fields: &[String],
        transcript: &Transcript,
    ) -> Result<BTreeMap<String, bool>, JudgeError> {
        let reply = self.caller.chat(&self.conversation(node, transcript)).await?;
        let value: Value = serde_json::from_str(strip_code_fence(&reply))
            .map_err(|e| JudgeError::MalformedResponse(format!("{e}: {reply}")))?;
        let Value::Object(object) = value else {
            return Err(JudgeError::MalformedResponse(format!(
                "expected a JSON object, got: {reply}"
            )));
        };

        Ok(fields
            .iter()
            .filter_map(|f| object.get(f).and_then(Value::as_bool).map(|b| (f.clone(), b)))
            .collect())
    }
}

/// `true` if the reply opens with "yes", ignoring case and any leading
/// whitespace or punctuation.
pub fn starts_with_yes(reply: &str) -> bool {
    reply
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .get(..3)
        .is_some_and(|head| head.eq_ignore_ascii_case("yes"))
}

/// The body of a fenced code block (```json ... ```), or the trimmed input
/// when there is no fence.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let body = &trimmed[start + 3..];
    let body = body.strip_prefix("json").unwrap_or(body);
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::graph::{Edge, TERMINAL};

    struct FixedResponse(Value);

    #[async_trait]
    impl StructuredCaller for FixedResponse {
        async fn call(&self, system: &str, _content: &str) -> Result<Value, JudgeError> {
            assert!(!system.contains("{key}"));
            Ok(self.0.clone())
        }
    }

    /// Replies from a queue and keeps every conversation it was sent.
    struct QueuedChat {
        replies: Mutex<Vec<String>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl QueuedChat {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatCaller for QueuedChat {
        async fn chat(&self, messages: &[ChatMessage]) -> Result<String, JudgeError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| JudgeError::Transport("no reply queued".into()))
        }
    }

    fn node(id: &str, prompt: &str, edge: Option<Edge>) -> GraphNode {
        GraphNode {
            id: id.into(),
            prompt: prompt.into(),
            edge,
        }
    }

    #[tokio::test]
    async fn prompt_judge_reads_key() {
        let judge = PromptJudge::new(
            FixedResponse(json!({"summary": "s", "legal_text": true})),
            "Return '{key}'.",
        );
        assert_eq!(judge.system_prompt_for("legal_text"), "Return 'legal_text'.");
        assert!(judge.judge("legal_text", "Section 1.").await.unwrap());
        assert!(!judge.judge("other", "Section 1.").await.unwrap());
    }

    #[tokio::test]
    async fn prompt_judge_non_boolean_is_false() {
        let judge = PromptJudge::new(FixedResponse(json!({"k": "yes"})), "{key}");
        assert!(!judge.judge("k", &"text".to_string()).await.unwrap());
    }

    #[test]
    fn yes_detection() {
        assert!(starts_with_yes("Yes, it does."));
        assert!(starts_with_yes("  **YES** the text"));
        assert!(starts_with_yes("yes"));
        assert!(!starts_with_yes("No, yes is not right"));
        assert!(!starts_with_yes("Ye"));
        assert!(!starts_with_yes(""));
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fence("```json\n{\"a\": true}\n```"), "{\"a\": true}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[tokio::test]
    async fn conversation_replays_transcript() {
        let chat = QueuedChat::new(&["Yes, statewide."]);
        let judge = ConversationJudge::new(chat, "DOCUMENT TEXT");

        let init = node("init", "context", Some(Edge::Unconditional("ask".into())));
        let ask = node(
            "ask",
            "statewide?",
            Some(Edge::Branch {
                yes: TERMINAL.into(),
                no: "next".into(),
            }),
        );
        let next = node("next", "county?", None);

        let mut transcript = Transcript::new();
        transcript.push(&init, None);
        transcript.push(&ask, Some(false));

        assert!(judge.decide(&next, &transcript).await.unwrap());
        let sent = judge.caller.seen.lock().unwrap()[0].clone();
        let roles: Vec<ChatRole> = sent.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                ChatRole::System,
                ChatRole::User,
                ChatRole::User,
                ChatRole::Assistant,
                ChatRole::User
            ]
        );
        assert_eq!(sent[1].content, "DOCUMENT TEXT");
        assert_eq!(sent[3].content, "No.");
        assert_eq!(sent[4].content, "county?");
    }

    #[tokio::test]
    async fn conclude_parses_fenced_json() {
        let chat = QueuedChat::new(&[
            "```json\n{\"explanation\": \"ok\", \"correct_state\": true, \"correct_city\": \"maybe\"}\n```",
        ]);
        let judge = ConversationJudge::new(chat, "https://example.gov/golden");
        let terminal = node(TERMINAL, "aggregate", None);
        let fields = vec!["correct_state".to_string(), "correct_city".to_string()];

        let out = judge
            .conclude(&terminal, &fields, &Transcript::new())
            .await
            .unwrap();
        assert_eq!(out, BTreeMap::from([("correct_state".to_string(), true)]));
    }

    #[tokio::test]
    async fn conclude_rejects_non_objects() {
        let judge = ConversationJudge::new(QueuedChat::new(&["[true]"]), "text");
        let terminal = node(TERMINAL, "aggregate", None);
        let err = judge
            .conclude(&terminal, &[], &Transcript::new())
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::MalformedResponse(_)));

        let judge = ConversationJudge::new(QueuedChat::new(&["not json"]), "text");
        let err = judge
            .conclude(&terminal, &[], &Transcript::new())
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::MalformedResponse(_)));
    }
}
