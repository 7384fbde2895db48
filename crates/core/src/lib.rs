//! Deterministic layout engine for chronological events on a horizontal
//! timeline.
//!
//! ```text
//!   events ──▶ dispatch ──▶ degrade ──▶ position ──▶ metrics ──▶ LayoutResult
//!              (half-columns) (card tiers) (pixels +    (telemetry)
//!                                          collisions)
//! ```
//!
//! The whole pipeline is one shot per [`LayoutEngine::layout`] call:
//! single-threaded, synchronous, side-effect-free. Identical input always
//! produces an identical result.

pub mod capacity;
pub mod collision;
pub mod degrade;
pub mod dispatch;
pub mod engine;
pub mod input;
pub mod metrics;
pub mod position;

pub use engine::{ConfigError, LayoutEngine};
