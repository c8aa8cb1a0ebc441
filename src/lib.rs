//! Storm Arena: a two-actor, real-time battle engine drawn in the terminal.

pub mod choreography;
pub mod compute;
pub mod config;
pub mod display;
pub mod effects;
pub mod engine;
pub mod entities;
pub mod error;
pub mod logging;
pub mod random;
pub mod scene;
pub mod scheduler;
