//! Voice-platform request and response envelopes.
//!
//! Only the fields the skill reads are modeled on the way in; anything else
//! in the event is ignored. An event that lacks a required field, or has an
//! unknown request type, fails to deserialize.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct SkillEvent {
    pub session: Session,
    pub request: SkillRequest,
}

impl SkillEvent {
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub new: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    pub application: Application,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum SkillRequest {
    #[serde(rename = "LaunchRequest")]
    Launch(RequestInfo),
    #[serde(rename = "IntentRequest")]
    Intent(IntentRequest),
    #[serde(rename = "SessionEndedRequest")]
    SessionEnded(SessionEndedRequest),
}

impl SkillRequest {
    pub fn request_id(&self) -> &str {
        match self {
            SkillRequest::Launch(r) => &r.request_id,
            SkillRequest::Intent(r) => &r.request_id,
            SkillRequest::SessionEnded(r) => &r.request_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    pub request_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub request_id: String,
    pub intent: Intent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedRequest {
    pub request_id: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

impl Intent {
    /// The slot's value, if the user filled it with something non-blank.
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)?
            .value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeechType {
    PlainText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardType {
    Simple,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResponse {
    pub version: String,
    pub session_attributes: serde_json::Map<String, serde_json::Value>,
    pub response: Speechlet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Speechlet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    pub should_end_session: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub kind: SpeechType,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    #[serde(rename = "type")]
    pub kind: CardType,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: RepromptSpeech,
}

/// Like [`OutputSpeech`], but `text` is `null` when there is nothing to repeat.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepromptSpeech {
    #[serde(rename = "type")]
    pub kind: SpeechType,
    pub text: Option<String>,
}

impl SkillResponse {
    /// A spoken response with a matching simple card.
    pub fn speech(
        title: &str,
        text: impl Into<String>,
        reprompt: Option<&str>,
        should_end_session: bool,
    ) -> Self {
        let text = text.into();
        Self::wrap(Speechlet {
            card: Some(Card {
                kind: CardType::Simple,
                title: title.to_string(),
                content: text.clone(),
            }),
            output_speech: Some(OutputSpeech {
                kind: SpeechType::PlainText,
                text,
            }),
            reprompt: Some(Reprompt {
                output_speech: RepromptSpeech {
                    kind: SpeechType::PlainText,
                    text: reprompt.map(str::to_string),
                },
            }),
            should_end_session,
        })
    }

    /// Acknowledges a request with nothing to say.
    pub fn acknowledge() -> Self {
        Self::wrap(Speechlet {
            output_speech: None,
            card: None,
            reprompt: None,
            should_end_session: true,
        })
    }

    /// Replaces the card body, keeping the spoken text.
    pub fn with_card_content(mut self, content: impl Into<String>) -> Self {
        if let Some(card) = self.response.card.as_mut() {
            card.content = content.into();
        }
        self
    }

    pub fn speech_text(&self) -> Option<&str> {
        self.response
            .output_speech
            .as_ref()
            .map(|s| s.text.as_str())
    }

    pub fn should_end_session(&self) -> bool {
        self.response.should_end_session
    }

    fn wrap(response: Speechlet) -> Self {
        Self {
            version: "1.0".to_string(),
            session_attributes: serde_json::Map::new(),
            response,
        }
    }
}
