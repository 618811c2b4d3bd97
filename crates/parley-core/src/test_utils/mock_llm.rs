use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::core_types::{LLMResponse, Message};
use crate::errors::ChatError;
use crate::llm::LLM;

/// In-process [`LLM`] that replays scripted replies and records every prompt.
///
/// Once the script runs out it keeps answering with the fallback reply.
#[derive(Clone)]
pub struct MockLLM {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    fallback: String,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockLLM {
    pub fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            fallback: "mock reply".to_string(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock that always answers with `reply`.
    pub fn replying(reply: &str) -> Self {
        let mut mock = Self::new(Vec::new());
        mock.fallback = reply.to_string();
        mock
    }

    /// A mock whose first call fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(message.to_string())])
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LLM for MockLLM {
    async fn generate(&self, messages: Vec<Message>) -> Result<LLMResponse, ChatError> {
        self.requests.lock().unwrap().push(messages);
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()));

        match next {
            Ok(content) => Ok(LLMResponse {
                content: Some(content),
                finish_reason: Some("stop".to_string()),
                usage: None,
            }),
            Err(message) => Err(ChatError::LLMError(message)),
        }
    }
}
