//! Library half of the Plant binary, split out so `hils-controller`'s
//! integration test can spawn a Plant loop in-process against a real
//! localhost UDP socket pair without shelling out to a child process.

pub mod config;
pub mod impairment;
pub mod logdir;
pub mod physics;
pub mod server;
pub mod telemetry;
