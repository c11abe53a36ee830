//! In-memory [`HttpClient`] for exercising lookups without a network.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Replays scripted transport results in order and records every request.
///
/// When the script runs out, the `repeating` response is returned if one was
/// set, otherwise a transport error.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    repeating: Option<Result<HttpResponse, HttpError>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    /// Script of `(status, body)` responses.
    pub fn statuses(statuses: &[(u16, &str)]) -> Self {
        Self::new(
            statuses
                .iter()
                .map(|(status, body)| Ok(HttpResponse::new(*status, *body)))
                .collect(),
        )
    }

    /// Answers every call with the same result.
    pub fn repeating(response: Result<HttpResponse, HttpError>) -> Self {
        Self {
            repeating: Some(response),
            ..Self::default()
        }
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        lock(&self.requests).push(request);
        let response = lock(&self.responses)
            .pop_front()
            .or_else(|| self.repeating.clone())
            .unwrap_or_else(|| Err(HttpError::new("connection failed: script exhausted")));
        Box::pin(async move { response })
    }
}
