//! The voice skill: envelopes in and out, and the router between them.

pub mod envelope;
pub mod router;

pub use envelope::{SkillEvent, SkillRequest, SkillResponse};
pub use router::{IntentName, Skill};
