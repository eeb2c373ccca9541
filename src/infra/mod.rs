//! Concrete collaborators: AWS-backed stores, the CTA feed client, and
//! local stand-ins for running without AWS.

pub mod csv_stations;
pub mod cta;
pub mod dynamo;
pub mod keys;
pub mod memory;
