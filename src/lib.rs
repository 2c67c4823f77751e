//! Group Walk - per-round group movement for simulated device networks
//!
//! Devices in fixed-size groups roam a street map: leaders pick random
//! targets, followers trail their leader at a personal offset.

pub mod core;
pub mod movement;
pub mod simulation;
pub mod spatial;
