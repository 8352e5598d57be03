//! Library half of the Controller binary, split out so an integration test
//! can drive a real Controller tick loop against an in-process Plant loop
//! over a genuine localhost UDP socket pair.

pub mod client;
pub mod config;
pub mod logdir;
pub mod pid;
pub mod telemetry;
pub mod timing;
