//! Error taxonomy for the skill.
//!
//! [`SkillError`] is what the router deals in. Some variants abort the
//! invocation outright; the rest are turned into a spoken correction so the
//! voice session never dead-ends silently. [`FeedError`] covers everything
//! that can go wrong between asking the Train Tracker for arrivals and having
//! a parsed list in hand.

use thiserror::Error;

/// Failures while fetching or parsing the arrivals feed.
///
/// None of these mean "no trains". An empty arrival list is a normal result.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The provider could not be reached, or the connection failed mid-read.
    #[error("transit feed unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success HTTP status.
    #[error("transit feed returned HTTP {0}")]
    Status(reqwest::StatusCode),

    /// The provider answered, but reported an error code in the payload.
    #[error("transit feed error {code}: {message}")]
    Provider { code: String, message: String },

    /// The payload was not well-formed XML.
    #[error("malformed transit feed: {0}")]
    Xml(#[from] roxmltree::Error),

    /// An `<eta>` element was missing a field we need.
    #[error("arrival entry is missing <{0}>")]
    MissingField(&'static str),

    #[error("unparseable arrival timestamp {value:?}: {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Estimated arrival before the prediction was made.
    #[error("arrival at {arrival} precedes prediction at {predicted}")]
    NegativeInterval {
        predicted: chrono::NaiveDateTime,
        arrival: chrono::NaiveDateTime,
    },
}

impl FeedError {
    /// `true` for failures reaching the provider, `false` for bad payloads.
    pub fn is_transport(&self) -> bool {
        matches!(self, FeedError::Transport(_) | FeedError::Status(_))
    }
}

/// Errors raised while handling one skill invocation.
#[derive(Debug, Error)]
pub enum SkillError {
    /// The request was addressed to a different skill.
    #[error("invalid application id {actual:?}")]
    InvalidApplication { actual: String },

    #[error("invalid intent {0:?}")]
    InvalidIntent(String),

    /// The inbound event did not match the envelope schema.
    #[error("malformed event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    #[error("unknown line {0:?}")]
    UnknownLine(String),

    #[error("invalid direction {0:?}")]
    InvalidDirection(String),

    /// A required slot was absent or empty.
    #[error("missing slot {0}")]
    MissingSlot(&'static str),

    #[error(transparent)]
    Feed(#[from] FeedError),

    /// A preference write failed.
    #[error("preference store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("station directory error: {0}")]
    Directory(#[source] anyhow::Error),
}

impl SkillError {
    /// Fatal errors abort the invocation with no response body.
    ///
    /// Everything else is answered with a spoken correction or apology.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SkillError::InvalidApplication { .. }
                | SkillError::InvalidIntent(_)
                | SkillError::MalformedEvent(_)
        )
    }
}
