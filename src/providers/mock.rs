/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with tagged text
 * - `MockProvider::echo()` - Returns the user text unchanged (offline dry runs)
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Succeeds with blank output
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{CompletionProvider, CompletionRequest, CompletionResponse};
use crate::errors::ProviderError;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, prefixing the user text with `[TRANSLATED]`
    Working,
    /// Returns the user text unchanged
    Echo,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns a blank candidate
    Empty,
    /// Returns no candidates at all
    NoCandidates,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
///
/// Clones share the request counter and the request log.
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock provider that returns its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that sleeps before answering
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator, used by the succeeding behaviors
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Last user message of a request
    pub fn user_text(request: &CompletionRequest) -> String {
        request
            .conversation()
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    fn success_text(&self, request: &CompletionRequest, tagged: bool) -> String {
        if let Some(generator) = self.custom_response {
            return generator(request);
        }
        let text = Self::user_text(request);
        if tagged { format!("[TRANSLATED] {}", text) } else { text }
    }

    fn respond(&self, request: &CompletionRequest, tagged: bool) -> CompletionResponse {
        let text = self.success_text(request, tagged);
        CompletionResponse {
            prompt_tokens: Some(Self::user_text(request).len() as u64),
            completion_tokens: Some(text.len() as u64 / 2),
            candidates: vec![text],
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(&request, true)),

            MockBehavior::Echo => Ok(self.respond(&request, false)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.respond(&request, true))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(CompletionResponse {
                candidates: vec!["  \n".to_string()],
                prompt_tokens: Some(0),
                completion_tokens: Some(0),
            }),

            MockBehavior::NoCandidates => Ok(CompletionResponse::default()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.respond(&request, true))
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
