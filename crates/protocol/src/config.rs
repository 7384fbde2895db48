use serde::{Deserialize, Serialize};

use crate::card::{CardSize, CardType};
use crate::types::Rect;

/// Immutable per-engine configuration, constructed by the embedding layer
/// and fixed for the lifetime of a `LayoutEngine`.
///
/// The viewport dimensions and card sizes drive everything downstream:
/// viewport height sets the per-side cell budget (clamped to `[4, 8]`),
/// and the full-card width plus `column_buffer` sets the adaptive
/// half-column width, i.e. how far apart two events must be to get their
/// own half-columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Y position of the central timeline axis.
    pub axis_y: f64,
    pub full_size: CardSize,
    pub compact_size: CardSize,
    pub title_size: CardSize,
    /// Horizontal margin reserved on the left (navigation rail lives here).
    pub margin_left: f64,
    pub margin_right: f64,
    /// Gap between the axis and the nearest card edge above it.
    pub above_axis_margin: f64,
    /// Gap below the axis — larger than above, date labels render there.
    pub below_axis_margin: f64,
    /// Vertical gap between stacked cards in one half-column.
    pub card_spacing: f64,
    /// Distance from the axis to per-event anchors.
    pub anchor_offset: f64,
    /// Added to the full-card width to form the adaptive half-column width.
    pub column_buffer: f64,
    /// Reserved top-left UI area (breadcrumb / minimap). Collision nudges
    /// never push a card into it.
    pub safe_zone: Rect,
    /// Upper bound on collision-resolution passes.
    pub max_resolution_passes: usize,
    /// Opt-in: upgrade card tiers one step when global cell utilization is
    /// low. Off by default so the fixed density tiers stay canonical.
    pub promote_when_sparse: bool,
}

impl LayoutConfig {
    /// Default configuration sized for the given viewport, axis centered.
    pub fn for_viewport(width: f64, height: f64) -> Self {
        Self {
            viewport_width: width,
            viewport_height: height,
            axis_y: height / 2.0,
            full_size: CardSize::new(256.0, 150.0),
            compact_size: CardSize::new(200.0, 90.0),
            title_size: CardSize::new(168.0, 44.0),
            margin_left: 72.0,
            margin_right: 48.0,
            above_axis_margin: 32.0,
            below_axis_margin: 56.0,
            card_spacing: 12.0,
            anchor_offset: 25.0,
            column_buffer: 24.0,
            safe_zone: Rect::new(0.0, 0.0, 260.0, 80.0),
            max_resolution_passes: 6,
            promote_when_sparse: false,
        }
    }

    pub fn card_size(&self, card_type: CardType) -> CardSize {
        match card_type {
            CardType::Full => self.full_size,
            CardType::Compact => self.compact_size,
            CardType::TitleOnly => self.title_size,
        }
    }

    /// Horizontal extent reserved per half-column.
    pub fn adaptive_column_width(&self) -> f64 {
        self.full_size.width + self.column_buffer
    }

    /// Width of the band events are projected into.
    pub fn usable_width(&self) -> f64 {
        self.viewport_width - self.margin_left - self.margin_right
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::for_viewport(1280.0, 800.0)
    }
}

/// Zoomed sub-range of the full temporal range, as fractions in `[0, 1]`.
/// Omitted or `{0, 1}` means the full range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewWindow {
    pub view_start: f64,
    pub view_end: f64,
}

impl ViewWindow {
    pub fn new(view_start: f64, view_end: f64) -> Self {
        Self {
            view_start,
            view_end,
        }
    }

    /// Whether this window actually restricts anything.
    pub fn is_full(&self) -> bool {
        self.view_start <= 0.0 && self.view_end >= 1.0
    }
}
