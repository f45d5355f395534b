//! One chat turn: gate, template, single upstream call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{self, QueryClass};
use crate::metrics::MetricsResult;
use crate::profile::{UserDetails, blank_opt};
use crate::prompt::build_prompt;
use crate::{CoachError, GenerativeClient};

/// Returned verbatim, with a success status, for out-of-domain input.
pub const REFUSAL: &str = "I can help only with fitness-related questions like workouts, \
nutrition, calories, macros, protein goals, and training plans. Ask me anything in that domain!";

/// Chat request body. Every field is optional; unknown fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachRequest {
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub workout_type: Option<String>,
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_details: Option<UserDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<MetricsResult>,
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, deserialize_with = "blank_opt", skip_serializing_if = "Option::is_none")]
    pub user_input: Option<String>,
}

impl CoachRequest {
    pub fn question(input: impl Into<String>) -> Self {
        Self {
            user_input: Some(input.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachReply {
    pub response: String,
    #[serde(skip)]
    pub class: Option<QueryClass>,
}

/// Answers chat requests with a [`GenerativeClient`].
#[derive(Clone)]
pub struct Coach {
    client: Arc<dyn GenerativeClient>,
}

impl Coach {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self { client }
    }

    /// Classify, refuse or prompt, and call upstream at most once.
    pub async fn respond(&self, request: &CoachRequest) -> Result<CoachReply, CoachError> {
        let input = request.user_input.as_deref().unwrap_or_default();
        let class = classifier::classify(input);
        metrics::counter!("coach_queries_total", "class" => class.as_str()).increment(1);

        if !class.in_domain() {
            info!("refusing out-of-domain question");
            return Ok(CoachReply {
                response: REFUSAL.to_string(),
                class: Some(class),
            });
        }

        let prompt = build_prompt(class, request);
        debug!(?class, kind = ?prompt.kind, chars = prompt.text.len(), "prompt built");

        let response = self.client.generate(&prompt).await?;
        Ok(CoachReply {
            response,
            class: Some(class),
        })
    }
}
