use std::sync::{Arc, Mutex};
use std::time::Duration;

use ytdigest::{ChatMessage, CompletionClient};

#[derive(Clone)]
pub struct MockCompletions {
    pub reply: String,
    pub delay: Duration,
    pub calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
    pub fail_with: Option<String>,
}

impl MockCompletions {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::new("")
        }
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl CompletionClient for MockCompletions {
    async fn complete(&self, messages: &[ChatMessage]) -> eyre::Result<String> {
        self.calls.lock().unwrap().push(messages.to_vec());
        tokio::time::sleep(self.delay).await;
        if let Some(ref msg) = self.fail_with {
            return Err(eyre::eyre!("{}", msg));
        }
        Ok(self.reply.clone())
    }
}
