//! Shared data contract between the chronocard layout engine and its
//! consumers (renderers, bridges, debug overlays).
//!
//! ```text
//!   events ──▶ LayoutEngine ──▶ LayoutResult ──▶ Renderer
//!              (chronocard-core)   (this crate)    (excluded)
//! ```
//!
//! Everything here is plain serializable data: the engine produces it,
//! consumers read it, nobody mutates it after the fact.

pub mod card;
pub mod config;
pub mod event;
pub mod layout;
pub mod types;

pub use card::{CardSize, CardType};
pub use config::{LayoutConfig, ViewWindow};
pub use event::TimelineEvent;
pub use layout::{
    Anchor, CapacityMetrics, Cluster, DegradationRecord, LayoutMetrics, LayoutResult,
    PositionedCard, Side, Utilization,
};
pub use types::{Point, Rect};
