//! Shared test helpers for engine tests.

use std::sync::Mutex;
use taskweave_core::generator::Generator;

/// A mock generator that returns a sequence of scripted responses.
///
/// Each call to `generate` returns the next response in the queue and records
/// the prompt. Panics if more calls are made than responses provided.
pub struct SequentialMockGenerator {
    responses: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl SequentialMockGenerator {
    pub fn new<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Generator for SequentialMockGenerator {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn generate(&self, prompt: &str) -> String {
        let mut prompts = self.prompts.lock().unwrap();
        let index = prompts.len();
        if index >= self.responses.len() {
            panic!(
                "SequentialMockGenerator: no more responses (call #{}, have {})",
                index,
                self.responses.len()
            );
        }
        prompts.push(prompt.to_string());
        self.responses[index].clone()
    }
}

/// A generator answering through a closure over the prompt.
pub struct FnGenerator<F>(pub F);

#[async_trait::async_trait]
impl<F> Generator for FnGenerator<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn name(&self) -> &str {
        "fn_mock"
    }

    async fn generate(&self, prompt: &str) -> String {
        (self.0)(prompt)
    }
}

/// Which engine prompt this is, judged by its opening line.
pub fn prompt_kind(prompt: &str) -> &'static str {
    let first = prompt.lines().next().unwrap_or_default().to_lowercase();
    if first.starts_with("break down") {
        "plan"
    } else if first.starts_with("execute") {
        "execute"
    } else if first.starts_with("reflect") {
        "reflect"
    } else {
        "other"
    }
}
