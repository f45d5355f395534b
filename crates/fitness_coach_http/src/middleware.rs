//! Cross-cutting wrappers around the generative client and the router.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use fitness_coach::{CoachError, GenerativeClient, PromptRequest};
use tracing::{Instrument, debug};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Times every upstream call, logs the outcome at debug level and records
/// `coach_upstream_seconds` / `coach_upstream_errors_total`.
#[derive(Clone)]
pub struct LoggingMiddleware<C: GenerativeClient> {
    inner: Arc<C>,
}

impl<C: GenerativeClient> LoggingMiddleware<C> {
    pub fn new(client: C) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }
}

#[async_trait]
impl<C: GenerativeClient> GenerativeClient for LoggingMiddleware<C> {
    async fn generate(&self, request: &PromptRequest) -> Result<String, CoachError> {
        let start = Instant::now();
        debug!(kind = ?request.kind, "starting upstream generate");

        let result = self.inner.generate(request).await;

        let duration = start.elapsed();
        metrics::histogram!("coach_upstream_seconds").record(duration.as_secs_f64());
        match &result {
            Ok(text) => debug!(?duration, chars = text.len(), "upstream generate completed"),
            Err(e) => {
                metrics::counter!("coach_upstream_errors_total", "kind" => e.kind()).increment(1);
                debug!(?duration, error = %e, "upstream generate failed");
            }
        }
        result
    }
}

/// Wrap each request in a span carrying a fresh request id, echoed back in
/// the `x-request-id` response header.
pub async fn request_span(req: Request, next: Next) -> Response {
    let id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path()
    );
    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitness_coach::prompt::TemplateKind;

    struct Failing;

    #[async_trait]
    impl GenerativeClient for Failing {
        async fn generate(&self, _request: &PromptRequest) -> Result<String, CoachError> {
            Err(CoachError::NoResponse)
        }
    }

    struct Echo;

    #[async_trait]
    impl GenerativeClient for Echo {
        async fn generate(&self, request: &PromptRequest) -> Result<String, CoachError> {
            Ok(request.text.clone())
        }
    }

    #[tokio::test]
    async fn passes_results_through() {
        let prompt = PromptRequest::new(TemplateKind::General, "hello");
        let ok = LoggingMiddleware::new(Echo).generate(&prompt).await.unwrap();
        assert!(ok.ends_with("hello"));

        let err = LoggingMiddleware::new(Failing)
            .generate(&prompt)
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::NoResponse));
    }
}
