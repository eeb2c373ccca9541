//! Intent routing and session control.
//!
//! One event in, one response out. The only state that survives between
//! invocations lives in the [`PreferenceStore`].

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::envelope::{Intent, SkillEvent, SkillRequest, SkillResponse};
use crate::composer::compose;
use crate::error::SkillError;
use crate::resolver::{Resolution, StationResolver};
use crate::services::{ArrivalFeed, PreferenceStore, StationDirectory};
use crate::types::{Direction, Line};

pub const DIRECTION_SLOT: &str = "Direction";
pub const LINE_SLOT: &str = "StationLine";
pub const STATION_SLOT: &str = "StationName";

const WELCOME_TITLE: &str = "Welcome";
const WELCOME_WITH_STATION: &str = "Welcome to the CTA tracker. \
    You can request the next train time by saying, when is the next northbound train";
const WELCOME_WITHOUT_STATION: &str = "Welcome to the CTA tracker. \
    What station are you interested in? \
    You can say, I'm on the red line, sheridan station";
const WELCOME_REPROMPT: &str = "Please ask for the next northbound train time by saying, \
    when is the next northbound train";
const ASK_DIRECTION: &str = "Please specify a direction. I'll remember it for next time. \
    You can say, when is the next northbound train";
const ASK_STATION: &str = "Please set your home station first. \
    You can say, I live at the blue line belmont station.";
const ASK_LINE_AND_STATION: &str = "Please tell me your line and station. \
    You can say, I'm on the red line, sheridan station";
const INVALID_DIRECTION: &str = "I can only look up northbound or southbound trains. \
    You can say, when is the next northbound train";
const FEED_APOLOGY: &str = "Sorry, I couldn't get train times from the CTA right now. \
    Please try again in a moment.";
const STORE_APOLOGY: &str = "Sorry, I couldn't save that right now. Please try again in a moment.";
const DIRECTORY_APOLOGY: &str = "Sorry, I couldn't look up stations right now. \
    Please try again in a moment.";
const GOODBYE: &str = "Goodbye.";

/// The intents this skill understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentName {
    NextTrain,
    SetFavoriteStation,
    Help,
    Stop,
}

impl FromStr for IntentName {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WhensNextTrainIntent" => Ok(IntentName::NextTrain),
            "SetFavoriteStationIntent" => Ok(IntentName::SetFavoriteStation),
            "AMAZON.HelpIntent" => Ok(IntentName::Help),
            "AMAZON.StopIntent" | "AMAZON.CancelIntent" => Ok(IntentName::Stop),
            other => Err(SkillError::InvalidIntent(other.to_string())),
        }
    }
}

/// The skill: routes events to handlers over injected collaborators.
pub struct Skill {
    application_id: String,
    preferences: Arc<dyn PreferenceStore>,
    stations: Arc<dyn StationDirectory>,
    arrivals: Arc<dyn ArrivalFeed>,
}

impl Skill {
    pub fn new(
        application_id: impl Into<String>,
        preferences: Arc<dyn PreferenceStore>,
        stations: Arc<dyn StationDirectory>,
        arrivals: Arc<dyn ArrivalFeed>,
    ) -> Self {
        Self {
            application_id: application_id.into(),
            preferences,
            stations,
            arrivals,
        }
    }

    /// Parses a raw event and handles it.
    pub async fn handle_json(&self, body: &[u8]) -> Result<SkillResponse, SkillError> {
        let event = SkillEvent::from_slice(body)?;
        self.handle(&event).await
    }

    /// Handles one event.
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned (see [`SkillError::is_fatal`]): the
    /// event is malformed, is for another application, or names an unknown
    /// intent. Everything else becomes a spoken response.
    #[tracing::instrument(
        skip_all,
        fields(
            request_id = %event.request.request_id(),
            user_id = %event.session.user.user_id
        )
    )]
    pub async fn handle(&self, event: &SkillEvent) -> Result<SkillResponse, SkillError> {
        let session = &event.session;
        if session.application.application_id != self.application_id {
            warn!(application_id = %session.application.application_id, "Rejecting request for another application");
            return Err(SkillError::InvalidApplication {
                actual: session.application.application_id.clone(),
            });
        }

        if session.new {
            info!(session_id = session.session_id.as_deref().unwrap_or_default(), "Session started");
        }

        let user_id = session.user.user_id.as_str();
        match &event.request {
            SkillRequest::Launch(_) => {
                info!("Launch");
                Ok(self.welcome(user_id).await)
            }
            SkillRequest::Intent(req) => self.on_intent(user_id, &req.intent).await,
            SkillRequest::SessionEnded(req) => {
                info!(reason = req.reason.as_deref().unwrap_or_default(), "Session ended");
                Ok(SkillResponse::acknowledge())
            }
        }
    }

    async fn on_intent(&self, user_id: &str, intent: &Intent) -> Result<SkillResponse, SkillError> {
        let name: IntentName = intent.name.parse()?;
        info!(intent = %intent.name, "Intent");

        let result = match name {
            IntentName::NextTrain => self.next_train(user_id, intent).await,
            IntentName::SetFavoriteStation => self.set_favorite_station(user_id, intent).await,
            IntentName::Help => Ok(self.welcome(user_id).await),
            IntentName::Stop => Ok(SkillResponse::speech(&intent.name, GOODBYE, None, true)),
        };

        match result {
            Err(e) if !e.is_fatal() => {
                match &e {
                    SkillError::Feed(feed) if feed.is_transport() => {
                        warn!(error = %e, "Arrivals feed unreachable")
                    }
                    SkillError::Feed(_) | SkillError::Store(_) | SkillError::Directory(_) => {
                        error!(error = ?e, "Answering with an apology")
                    }
                    _ => info!(error = %e, "Answering with a correction"),
                }
                Ok(correction(&intent.name, &e))
            }
            other => other,
        }
    }

    async fn welcome(&self, user_id: &str) -> SkillResponse {
        let text = match self.preferences.get_favorite_station(user_id).await {
            Some(_) => WELCOME_WITH_STATION,
            None => WELCOME_WITHOUT_STATION,
        };
        SkillResponse::speech(WELCOME_TITLE, text, Some(WELCOME_REPROMPT), false)
    }

    async fn next_train(&self, user_id: &str, intent: &Intent) -> Result<SkillResponse, SkillError> {
        let direction = match intent.slot_value(DIRECTION_SLOT) {
            Some(spoken) => {
                let direction = Direction::from_spoken(spoken)?;
                self.preferences
                    .set_direction(user_id, direction)
                    .await
                    .map_err(SkillError::Store)?;
                debug!(direction = %direction, "Direction remembered");
                Some(direction)
            }
            None => self.preferences.get_last_direction(user_id).await,
        };

        let Some(direction) = direction else {
            return Ok(SkillResponse::speech(&intent.name, ASK_DIRECTION, None, false));
        };
        let Some(station) = self.preferences.get_favorite_station(user_id).await else {
            return Ok(SkillResponse::speech(&intent.name, ASK_STATION, None, false));
        };

        let arrivals = self
            .arrivals
            .fetch_arrivals(&station.station_id, direction)
            .await?;
        info!(
            station_id = %station.station_id,
            direction = %direction,
            count = arrivals.len(),
            "Arrivals fetched"
        );

        let text = compose(direction, &station.station_name, &arrivals);
        Ok(SkillResponse::speech(&intent.name, text, None, true))
    }

    async fn set_favorite_station(
        &self,
        user_id: &str,
        intent: &Intent,
    ) -> Result<SkillResponse, SkillError> {
        let line = intent
            .slot_value(LINE_SLOT)
            .ok_or(SkillError::MissingSlot(LINE_SLOT))?;
        let spoken = intent
            .slot_value(STATION_SLOT)
            .ok_or(SkillError::MissingSlot(STATION_SLOT))?;

        let resolver = StationResolver::new(self.stations.as_ref(), self.preferences.as_ref());
        let response = match resolver.set_favorite(user_id, line, spoken).await? {
            Resolution::Saved(station) => SkillResponse::speech(
                &intent.name,
                format!(
                    "Saved your home station as {}. To get arrival times, you can ask, \
                     when is the next northbound train coming?",
                    station.station_name
                ),
                None,
                false,
            ),
            Resolution::NoMatch => SkillResponse::speech(
                &intent.name,
                format!(
                    "I couldn't find a station called {spoken} on the {} line. Please try again.",
                    line.to_lowercase()
                ),
                None,
                false,
            ),
            Resolution::Ambiguous(candidates) => {
                let names: Vec<&str> = candidates.iter().map(|c| c.station_name.as_str()).collect();
                SkillResponse::speech(
                    &intent.name,
                    format!(
                        "I found {} stations matching {spoken}: {}. \
                         Please try again with the full station name.",
                        candidates.len(),
                        spoken_list(&names)
                    ),
                    None,
                    false,
                )
                .with_card_content(serde_json::to_string(&candidates).unwrap_or_default())
            }
        };
        Ok(response)
    }
}

/// Spoken answer for a recoverable error. The session stays open.
fn correction(title: &str, error: &SkillError) -> SkillResponse {
    let text = match error {
        SkillError::UnknownLine(line) => {
            let lines: Vec<&str> = Line::ALL.iter().map(|l| l.name()).collect();
            format!(
                "I don't know the {line} line. You can choose the {} line.",
                spoken_list(&lines).replace(", and ", ", or ")
            )
        }
        SkillError::InvalidDirection(_) => INVALID_DIRECTION.to_string(),
        SkillError::MissingSlot(_) => ASK_LINE_AND_STATION.to_string(),
        SkillError::Feed(_) => FEED_APOLOGY.to_string(),
        SkillError::Store(_) => STORE_APOLOGY.to_string(),
        SkillError::Directory(_) => DIRECTORY_APOLOGY.to_string(),
        // Fatal; never answered.
        SkillError::InvalidApplication { .. }
        | SkillError::InvalidIntent(_)
        | SkillError::MalformedEvent(_) => String::new(),
    };
    SkillResponse::speech(title, text, None, false)
}

/// "a", "a and b", "a, b, and c".
fn spoken_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => one.to_string(),
        [first, second] => format!("{first} and {second}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}
