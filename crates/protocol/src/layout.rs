use serde::{Deserialize, Serialize};

use crate::card::CardType;
use crate::event::TimelineEvent;
use crate::types::Rect;

/// Which side of the timeline axis a half-column (and its cards) lives on.
/// Assigned once at dispatch and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Above,
    Below,
}

impl Side {
    /// Outward direction along Y: negative above the axis, positive below.
    pub fn sign(self) -> f64 {
        match self {
            Self::Above => -1.0,
            Self::Below => 1.0,
        }
    }
}

/// One visible card: exactly one event, concrete pixel placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedCard {
    pub id: String,
    pub event: TimelineEvent,
    /// Horizontal center.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub card_type: CardType,
    /// Id of the half-column this card belongs to. Cards sharing a
    /// cluster id share their X position.
    pub cluster_id: String,
}

impl PositionedCard {
    /// Bounding box, with `y` as the top edge.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x - self.width / 2.0, self.y, self.width, self.height)
    }
}

/// A marker pinned to the axis at an event's exact temporal position.
///
/// Per-event anchors carry `is_cluster_group = false`; each half-column
/// additionally emits one aggregate anchor (`is_cluster_group = true`) for
/// legacy consumers. A half-column's overflow count rides on its last
/// per-event anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: String,
    pub event_id: String,
    pub x: f64,
    pub y: f64,
    pub side: Side,
    pub visible_count: usize,
    pub overflow_count: usize,
    pub is_cluster_group: bool,
}

/// Legacy per-half-column record for back-compat consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub side: Side,
    pub center_x: f64,
    pub card_type: CardType,
    /// Visible (carded) events in this half-column.
    pub event_count: usize,
    /// Events represented only by the overflow badge.
    pub overflow_count: usize,
    pub anchor: Anchor,
}

/// Placement-slot usage across the whole layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Utilization {
    pub total_slots: u32,
    pub used_slots: u32,
    pub percentage: f64,
}

/// Read-only snapshot of the capacity model's cell accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CapacityMetrics {
    pub total_cells: u32,
    pub used_cells: u32,
    pub available_cells: u32,
    /// Used cells as a percentage of total.
    pub utilization: f64,
    pub cells_per_side: u32,
    pub placements_per_side: u32,
}

/// One degradation transition, recorded for observability only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegradationRecord {
    pub group_id: String,
    pub event_count: usize,
    pub from: CardType,
    pub to: CardType,
    /// Cells saved by the transition, summed over visible cards.
    pub space_saved: u32,
}

/// Derived telemetry for debug overlays. Never required for correctness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    pub column_count: usize,
    pub above_columns: usize,
    pub below_columns: usize,
    /// Smallest gap between adjacent half-column centers on one side.
    pub min_pitch: f64,
    pub mean_pitch: f64,
    pub full_cards: usize,
    pub compact_cards: usize,
    pub title_only_cards: usize,
    pub degraded_columns: usize,
    pub transitions: Vec<DegradationRecord>,
    pub capacity: CapacityMetrics,
}

/// The engine's sole output. Consumers treat it as immutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub cards: Vec<PositionedCard>,
    pub anchors: Vec<Anchor>,
    pub clusters: Vec<Cluster>,
    pub utilization: Utilization,
    pub metrics: LayoutMetrics,
}

impl LayoutResult {
    /// The well-defined result for degenerate input (no events).
    pub fn empty() -> Self {
        Self::default()
    }
}
