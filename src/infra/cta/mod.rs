//! CTA Train Tracker arrivals API.

pub mod client;

pub use client::CtaArrivalsClient;
