//! # cadence-detectors
//!
//! Pure pattern detectors over one scope's outcome data. Each detector
//! takes rows already fetched from the outcome store, applies its own
//! admission gate, and returns `None` when the data is insufficient —
//! never an error, so a thin scope simply keeps its previous pattern.

pub mod confidence;
pub mod how;
pub mod lift;
pub mod what;
pub mod when;
pub mod who;
