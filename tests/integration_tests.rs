use async_trait::async_trait;
use cta_tracker::error::{FeedError, SkillError};
use cta_tracker::infra::csv_stations::CsvStationDirectory;
use cta_tracker::infra::memory::MemoryPreferenceStore;
use cta_tracker::parser::parse_arrivals;
use cta_tracker::services::{ArrivalFeed, PreferenceStore, StationDirectory};
use cta_tracker::skill::{Skill, SkillResponse};
use cta_tracker::types::{ArrivalRecord, Direction, Line, StationCandidate};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

const APP_ID: &str = "amzn1.ask.skill.cta-tracker";
const USER: &str = "amzn1.ask.account.NEWUSER";
const SHERIDAN_XML: &str = include_str!("fixtures/ttarrivals_sheridan.xml");

/// Serves arrivals from a canned Train Tracker response and records calls.
struct FixtureFeed {
    xml: Option<&'static str>,
    calls: Mutex<Vec<(String, Direction)>>,
}

impl FixtureFeed {
    fn new(xml: &'static str) -> Self {
        Self {
            xml: Some(xml),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A feed whose provider is always down.
    fn down() -> Self {
        Self {
            xml: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, Direction)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArrivalFeed for FixtureFeed {
    async fn fetch_arrivals(
        &self,
        station_id: &str,
        direction: Direction,
    ) -> Result<Vec<ArrivalRecord>, FeedError> {
        self.calls
            .lock()
            .unwrap()
            .push((station_id.to_string(), direction));
        match self.xml {
            Some(xml) => parse_arrivals(xml, direction),
            None => Err(FeedError::Status(reqwest::StatusCode::BAD_GATEWAY)),
        }
    }
}

/// A store whose writes always fail, as when the table is throttled.
struct ReadOnlyStore {
    favorite: Option<StationCandidate>,
}

#[async_trait]
impl PreferenceStore for ReadOnlyStore {
    async fn get_favorite_station(&self, _user_id: &str) -> Option<StationCandidate> {
        self.favorite.clone()
    }

    async fn get_last_direction(&self, _user_id: &str) -> Option<Direction> {
        None
    }

    async fn set_direction(&self, _user_id: &str, _direction: Direction) -> anyhow::Result<()> {
        anyhow::bail!("throttled")
    }

    async fn set_favorite_station(
        &self,
        _user_id: &str,
        _station: &StationCandidate,
    ) -> anyhow::Result<()> {
        anyhow::bail!("throttled")
    }
}

struct UnavailableDirectory;

#[async_trait]
impl StationDirectory for UnavailableDirectory {
    async fn stations_on_line(&self, _line: Line) -> anyhow::Result<Vec<StationCandidate>> {
        anyhow::bail!("scan failed")
    }
}

struct Harness {
    skill: Skill,
    prefs: Arc<MemoryPreferenceStore>,
    feed: Arc<FixtureFeed>,
}

fn harness_with(feed: FixtureFeed) -> Harness {
    let prefs = Arc::new(MemoryPreferenceStore::new());
    let feed = Arc::new(feed);
    let stations = Arc::new(
        CsvStationDirectory::from_reader(include_str!("fixtures/stops.csv").as_bytes()).unwrap(),
    );
    let skill = Skill::new(APP_ID, prefs.clone(), stations, feed.clone());
    Harness { skill, prefs, feed }
}

fn harness() -> Harness {
    harness_with(FixtureFeed::new(SHERIDAN_XML))
}

fn event(request: Value) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "version": "1.0",
        "session": {
            "new": false,
            "sessionId": "amzn1.echo-api.session.0000",
            "application": { "applicationId": APP_ID },
            "user": { "userId": USER }
        },
        "request": request
    }))
    .unwrap()
}

fn intent(name: &str, slots: &[(&str, &str)]) -> Vec<u8> {
    let slots: serde_json::Map<String, Value> = slots
        .iter()
        .map(|(k, v)| (k.to_string(), json!({ "name": k, "value": v })))
        .collect();
    event(json!({
        "type": "IntentRequest",
        "requestId": "amzn1.echo-api.request.0002",
        "intent": { "name": name, "slots": slots }
    }))
}

fn next_train(direction: Option<&str>) -> Vec<u8> {
    match direction {
        Some(d) => intent("WhensNextTrainIntent", &[("Direction", d)]),
        None => intent("WhensNextTrainIntent", &[]),
    }
}

fn text(resp: &SkillResponse) -> &str {
    resp.speech_text().expect("response has speech")
}

async fn save_sheridan(h: &Harness) {
    h.prefs
        .set_favorite_station(USER, &StationCandidate::new("40080", "Sheridan"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_launch_without_favorite_asks_for_station() {
    let h = harness();
    let resp = h
        .skill
        .handle_json(include_bytes!("fixtures/launch_event.json"))
        .await
        .unwrap();

    assert!(text(&resp).contains("What station are you interested in?"));
    assert!(!resp.should_end_session());

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["version"], "1.0");
    assert_eq!(json["response"]["card"]["title"], "Welcome");
    assert!(json["response"]["reprompt"]["outputSpeech"]["text"].is_string());
}

#[tokio::test]
async fn test_launch_and_help_with_favorite_offer_next_train() {
    let h = harness();
    save_sheridan(&h).await;

    let launch = h
        .skill
        .handle_json(&event(json!({ "type": "LaunchRequest", "requestId": "r1" })))
        .await
        .unwrap();
    assert!(text(&launch).contains("when is the next northbound train"));
    assert!(!text(&launch).contains("What station"));

    let help = h
        .skill
        .handle_json(&intent("AMAZON.HelpIntent", &[]))
        .await
        .unwrap();
    assert_eq!(help, launch);
}

#[tokio::test]
async fn test_set_favorite_unique_match_is_saved() {
    let h = harness();
    let resp = h
        .skill
        .handle_json(&intent(
            "SetFavoriteStationIntent",
            &[("StationLine", "red"), ("StationName", "sheridan")],
        ))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("Saved your home station as Sheridan."));
    assert!(!resp.should_end_session());
    assert_eq!(
        h.prefs.get_favorite_station(USER).await,
        Some(StationCandidate::new("40080", "Sheridan"))
    );
}

#[tokio::test]
async fn test_set_favorite_ambiguous_lists_candidates_and_saves_nothing() {
    let h = harness();
    let resp = h
        .skill
        .handle_json(&intent(
            "SetFavoriteStationIntent",
            &[("StationLine", "Red"), ("StationName", "o")],
        ))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("I found 3 stations matching o:"));
    assert!(text(&resp).contains("Belmont, Howard, and Addison"));
    assert!(!resp.should_end_session());

    let card = resp.response.card.as_ref().unwrap();
    let listed: Vec<StationCandidate> = serde_json::from_str(&card.content).unwrap();
    assert_eq!(
        listed,
        vec![
            StationCandidate::new("41320", "Belmont"),
            StationCandidate::new("40900", "Howard"),
            StationCandidate::new("41420", "Addison"),
        ]
    );
    assert_eq!(h.prefs.get_favorite_station(USER).await, None);
}

#[tokio::test]
async fn test_set_favorite_no_match() {
    let h = harness();
    let resp = h
        .skill
        .handle_json(&intent(
            "SetFavoriteStationIntent",
            &[("StationLine", "blue"), ("StationName", "sheridan")],
        ))
        .await
        .unwrap();

    assert!(text(&resp).contains("couldn't find a station called sheridan on the blue line"));
    assert!(!resp.should_end_session());
    assert_eq!(h.prefs.get_favorite_station(USER).await, None);
}

#[tokio::test]
async fn test_set_favorite_unknown_line_is_spoken_correction() {
    let h = harness();
    let resp = h
        .skill
        .handle_json(&intent(
            "SetFavoriteStationIntent",
            &[("StationLine", "teal"), ("StationName", "sheridan")],
        ))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("I don't know the teal line."));
    assert!(!resp.should_end_session());
}

#[tokio::test]
async fn test_set_favorite_missing_slot_prompts() {
    let h = harness();
    let resp = h
        .skill
        .handle_json(&intent("SetFavoriteStationIntent", &[("StationLine", "red")]))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("Please tell me your line and station."));
    assert!(!resp.should_end_session());
}

#[tokio::test]
async fn test_next_train_without_any_direction_prompts() {
    let h = harness();
    save_sheridan(&h).await;

    let resp = h.skill.handle_json(&next_train(None)).await.unwrap();

    assert!(text(&resp).starts_with("Please specify a direction."));
    assert!(!resp.should_end_session());
    assert!(h.feed.calls().is_empty());
}

#[tokio::test]
async fn test_next_train_without_favorite_prompts_and_remembers_direction() {
    let h = harness();
    let resp = h
        .skill
        .handle_json(&next_train(Some("northbound")))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("Please set your home station first."));
    assert!(!resp.should_end_session());
    assert_eq!(
        h.prefs.get_last_direction(USER).await,
        Some(Direction::Northbound)
    );
}

#[tokio::test]
async fn test_next_train_reads_first_three_and_closes_session() {
    let h = harness();
    save_sheridan(&h).await;

    let resp = h
        .skill
        .handle_json(&next_train(Some("northbound")))
        .await
        .unwrap();

    assert_eq!(
        text(&resp),
        "Northbound trains arriving at Sheridan in 3 minutes, 7 minutes, and 12 minutes."
    );
    assert!(!text(&resp).contains("20"));
    assert!(resp.should_end_session());
    assert_eq!(
        h.feed.calls(),
        vec![("40080".to_string(), Direction::Northbound)]
    );
}

#[tokio::test]
async fn test_stored_direction_is_used_when_none_spoken() {
    let h = harness();
    save_sheridan(&h).await;
    h.prefs
        .set_direction(USER, Direction::Southbound)
        .await
        .unwrap();

    let resp = h.skill.handle_json(&next_train(None)).await.unwrap();

    assert_eq!(
        text(&resp),
        "Southbound trains arriving at Sheridan in 1 minute and 15 minutes."
    );
    assert_eq!(
        h.feed.calls(),
        vec![("40080".to_string(), Direction::Southbound)]
    );
}

#[tokio::test]
async fn test_spoken_direction_overrides_and_replaces_stored() {
    let h = harness();
    save_sheridan(&h).await;
    h.prefs
        .set_direction(USER, Direction::Southbound)
        .await
        .unwrap();

    h.skill
        .handle_json(&next_train(Some("Northbound")))
        .await
        .unwrap();

    assert_eq!(
        h.feed.calls(),
        vec![("40080".to_string(), Direction::Northbound)]
    );
    assert_eq!(
        h.prefs.get_last_direction(USER).await,
        Some(Direction::Northbound)
    );
}

#[tokio::test]
async fn test_invalid_spoken_direction_is_corrected_without_saving() {
    let h = harness();
    save_sheridan(&h).await;
    h.prefs
        .set_direction(USER, Direction::Southbound)
        .await
        .unwrap();

    let resp = h
        .skill
        .handle_json(&next_train(Some("eastbound")))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("I can only look up northbound or southbound trains."));
    assert!(!resp.should_end_session());
    assert!(h.feed.calls().is_empty());
    assert_eq!(
        h.prefs.get_last_direction(USER).await,
        Some(Direction::Southbound)
    );
}

#[tokio::test]
async fn test_no_trains_in_direction() {
    let h = harness_with(FixtureFeed::new(
        "<ctatt><errCd>0</errCd><eta><trDr>1</trDr>\
         <prdt>20160314 08:30:05</prdt><arrT>20160314 08:33:05</arrT></eta></ctatt>",
    ));
    save_sheridan(&h).await;

    let resp = h
        .skill
        .handle_json(&next_train(Some("southbound")))
        .await
        .unwrap();

    assert_eq!(text(&resp), "No southbound trains found.");
    assert!(resp.should_end_session());
}

#[tokio::test]
async fn test_feed_failure_apologizes_instead_of_reporting_no_trains() {
    let h = harness_with(FixtureFeed::down());
    save_sheridan(&h).await;

    let resp = h
        .skill
        .handle_json(&next_train(Some("northbound")))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("Sorry, I couldn't get train times"));
    assert!(!text(&resp).contains("No northbound trains"));
    assert!(!resp.should_end_session());
}

#[tokio::test]
async fn test_malformed_feed_apologizes() {
    let h = harness_with(FixtureFeed::new("<ctatt><eta>"));
    save_sheridan(&h).await;

    let resp = h
        .skill
        .handle_json(&next_train(Some("northbound")))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("Sorry, I couldn't get train times"));
}

#[tokio::test]
async fn test_stop_intent_says_goodbye() {
    let h = harness();
    let resp = h
        .skill
        .handle_json(&intent("AMAZON.StopIntent", &[]))
        .await
        .unwrap();

    assert_eq!(text(&resp), "Goodbye.");
    assert!(resp.should_end_session());
}

#[tokio::test]
async fn test_session_ended_is_silent_acknowledgment() {
    let h = harness();
    let resp = h
        .skill
        .handle_json(&event(json!({
            "type": "SessionEndedRequest",
            "requestId": "r3",
            "reason": "USER_INITIATED"
        })))
        .await
        .unwrap();

    assert_eq!(resp, SkillResponse::acknowledge());
}

#[tokio::test]
async fn test_wrong_application_is_rejected_before_anything_else() {
    let h = harness();
    let mut body: Value = serde_json::from_slice(&next_train(Some("northbound"))).unwrap();
    body["session"]["application"]["applicationId"] = json!("amzn1.ask.skill.someone-else");

    let err = h
        .skill
        .handle_json(&serde_json::to_vec(&body).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, SkillError::InvalidApplication { .. }));
    assert!(err.is_fatal());
    assert_eq!(h.prefs.get_last_direction(USER).await, None);
}

#[tokio::test]
async fn test_unknown_intent_is_fatal() {
    let h = harness();
    let err = h
        .skill
        .handle_json(&intent("OrderPizzaIntent", &[]))
        .await
        .unwrap_err();

    assert!(matches!(err, SkillError::InvalidIntent(name) if name == "OrderPizzaIntent"));
}

#[tokio::test]
async fn test_malformed_event_is_fatal() {
    let h = harness();
    let err = h.skill.handle_json(b"{\"session\": {}}").await.unwrap_err();
    assert!(matches!(err, SkillError::MalformedEvent(_)));
}

#[tokio::test]
async fn test_failed_direction_write_apologizes() {
    let feed = Arc::new(FixtureFeed::new(SHERIDAN_XML));
    let store = ReadOnlyStore {
        favorite: Some(StationCandidate::new("40080", "Sheridan")),
    };
    let stations = Arc::new(
        CsvStationDirectory::from_reader(include_str!("fixtures/stops.csv").as_bytes()).unwrap(),
    );
    let skill = Skill::new(APP_ID, Arc::new(store), stations, feed.clone());

    let resp = skill
        .handle_json(&next_train(Some("northbound")))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("Sorry, I couldn't save that right now."));
    assert!(!resp.should_end_session());
    assert!(feed.calls().is_empty());
}

#[tokio::test]
async fn test_failed_favorite_write_apologizes() {
    let stations = Arc::new(
        CsvStationDirectory::from_reader(include_str!("fixtures/stops.csv").as_bytes()).unwrap(),
    );
    let skill = Skill::new(
        APP_ID,
        Arc::new(ReadOnlyStore { favorite: None }),
        stations,
        Arc::new(FixtureFeed::new(SHERIDAN_XML)),
    );

    let resp = skill
        .handle_json(&intent(
            "SetFavoriteStationIntent",
            &[("StationLine", "red"), ("StationName", "sheridan")],
        ))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("Sorry, I couldn't save that right now."));
    assert!(!resp.should_end_session());
}

#[tokio::test]
async fn test_unavailable_directory_apologizes() {
    let prefs = Arc::new(MemoryPreferenceStore::new());
    let skill = Skill::new(
        APP_ID,
        prefs.clone(),
        Arc::new(UnavailableDirectory),
        Arc::new(FixtureFeed::new(SHERIDAN_XML)),
    );

    let resp = skill
        .handle_json(&intent(
            "SetFavoriteStationIntent",
            &[("StationLine", "red"), ("StationName", "sheridan")],
        ))
        .await
        .unwrap();

    assert!(text(&resp).starts_with("Sorry, I couldn't look up stations right now."));
    assert!(!resp.should_end_session());
    assert_eq!(prefs.get_favorite_station(USER).await, None);
}
