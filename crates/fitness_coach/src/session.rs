//! Stateful chat on top of [`Coach`].
//!
//! A session remembers workout preferences mentioned in earlier messages,
//! attaches the user's form data and computed targets to every request, and
//! turns failures into messages fit for the chat window. After the backend
//! reports throttling, the session answers from [`crate::canned`] for the
//! rest of its life.

use crate::canned::canned_reply;
use crate::coach::{Coach, CoachRequest};
use crate::metrics::MetricsResult;
use crate::preferences::{WorkoutPreferences, detect_preferences};
use crate::profile::UserDetails;
use crate::CoachError;

pub const WELCOME: &str = "Hi! I'm your Fitness AI assistant. Now that you've calculated your \
nutrition needs, ask me for personalized workout routines, nutrition advice, or any \
fitness-related questions!";

pub const RATE_LIMITED_MESSAGE: &str =
    "Too many requests. Please wait a few minutes before trying again.";
pub const UNAVAILABLE_MESSAGE: &str =
    "The AI service is temporarily unavailable. Please try again in a few minutes.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, I couldn't process your request at the moment. Please try again later.";

/// Who produced a chat reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplySource {
    Coach,
    Canned,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub source: ReplySource,
}

pub struct ChatSession {
    coach: Coach,
    preferences: WorkoutPreferences,
    user_details: Option<UserDetails>,
    results: Option<MetricsResult>,
    offline: bool,
}

impl ChatSession {
    pub fn new(coach: Coach) -> Self {
        Self {
            coach,
            preferences: WorkoutPreferences::default(),
            user_details: None,
            results: None,
            offline: false,
        }
    }

    pub fn with_profile(mut self, details: UserDetails, results: Option<MetricsResult>) -> Self {
        self.user_details = Some(details);
        self.results = results;
        self
    }

    /// Opening message shown before the user types anything.
    pub fn welcome(&self) -> ChatReply {
        ChatReply {
            text: WELCOME.to_string(),
            source: ReplySource::Coach,
        }
    }

    pub fn preferences(&self) -> &WorkoutPreferences {
        &self.preferences
    }

    /// True once throttling has switched the session to canned replies.
    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Handle one user message. Blank input is ignored.
    pub async fn send(&mut self, text: &str) -> Option<ChatReply> {
        if text.trim().is_empty() {
            return None;
        }

        // preferences found in this message already apply to this turn
        self.preferences.merge_missing(detect_preferences(text));

        if self.offline {
            return Some(ChatReply {
                text: canned_reply(text).to_string(),
                source: ReplySource::Canned,
            });
        }

        let request = CoachRequest {
            workout_type: self.preferences.workout_type.clone(),
            location: self.preferences.location.clone(),
            user_details: self.user_details.clone(),
            results: self.results,
            difficulty: self.preferences.difficulty.clone(),
            user_input: Some(text.to_string()),
        };

        match self.coach.respond(&request).await {
            Ok(reply) => Some(ChatReply {
                text: reply.response,
                source: ReplySource::Coach,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "chat turn failed");
                Some(ChatReply {
                    text: self.failure_message(&err).to_string(),
                    source: ReplySource::Error,
                })
            }
        }
    }

    fn failure_message(&mut self, err: &CoachError) -> &'static str {
        if err.is_rate_limited() {
            self.offline = true;
            RATE_LIMITED_MESSAGE
        } else if err.status() >= 500 {
            UNAVAILABLE_MESSAGE
        } else {
            GENERIC_FAILURE_MESSAGE
        }
    }
}
