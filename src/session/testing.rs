//! Test doubles for session and server tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::conversation::{ConversationStore, DEFAULT_PERSONALITY, MemorySlot};
use crate::llm::{CompletionClient, CompletionError, CompletionRequest};
use crate::session::assistant::{Assistant, AssistantSettings};

/// Completion client answering from a script and recording every request.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Duration,
}

impl ScriptedClient {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        })
    }

    /// Like [`Self::new`], but every call blocks for `delay` first.
    pub fn with_delay(replies: Vec<Result<String, CompletionError>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            delay,
        })
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl CompletionClient for ScriptedClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        std::thread::sleep(self.delay);
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::MalformedResponse))
    }
}

pub fn settings() -> AssistantSettings {
    AssistantSettings {
        model: "test/model".to_string(),
        max_tokens: 64,
        context_window: 10,
    }
}

/// Assistant over in-memory slots; returns the log slot for inspection.
pub fn assistant_with(client: Arc<ScriptedClient>) -> (Assistant, MemorySlot) {
    let log = MemorySlot::new();
    let store =
        ConversationStore::with_slots(log.clone(), MemorySlot::new(), DEFAULT_PERSONALITY).unwrap();
    (Assistant::new(store, client, settings()), log)
}
