//! Traits for the collaborators the skill talks to.
//!
//! Each is built once per process and handed to the router, so tests and
//! local runs can swap in in-memory versions.

pub mod arrivals;
pub mod preferences;
pub mod stations;

pub use arrivals::ArrivalFeed;
pub use preferences::PreferenceStore;
pub use stations::StationDirectory;
