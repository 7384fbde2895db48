use thiserror::Error;
use tracing::debug;

use chronocard_protocol::{LayoutConfig, LayoutResult, TimelineEvent, ViewWindow};

use crate::capacity::{CapacityModel, PROMOTION_UTILIZATION_THRESHOLD};
use crate::collision::resolve_collisions;
use crate::degrade::degrade_columns;
use crate::dispatch::{DispatchEngine, TimeRange, sort_events};
use crate::metrics::compute_metrics;
use crate::position::{PositioningEngine, clamp_to_viewport, sync_cluster_centers};

/// Fraction of the event span added as padding on each end of the
/// temporal range.
const RANGE_PADDING: f64 = 0.02;
/// Padding applied when all events share one instant (ms).
const DEGENERATE_RANGE_PADDING: f64 = 1_000.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("viewport dimensions must be positive, got {width}×{height}")]
    NonPositiveViewport { width: f64, height: f64 },
    #[error("axis y {axis_y} lies outside the viewport height {height}")]
    AxisOutsideViewport { axis_y: f64, height: f64 },
    #[error("horizontal margins leave no usable width")]
    MarginsExceedViewport,
}

/// The orchestrator: owns the pipeline components and sequences
/// dispatch → degrade → position → metrics for each call.
///
/// One engine per thread; nothing survives between [`Self::layout`] calls
/// except the immutable config. Identical `(events, view_window)` input
/// always yields a bit-identical result.
#[derive(Debug)]
pub struct LayoutEngine {
    config: LayoutConfig,
    capacity: CapacityModel,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Result<Self, ConfigError> {
        if config.viewport_width <= 0.0 || config.viewport_height <= 0.0 {
            return Err(ConfigError::NonPositiveViewport {
                width: config.viewport_width,
                height: config.viewport_height,
            });
        }
        if config.axis_y < 0.0 || config.axis_y > config.viewport_height {
            return Err(ConfigError::AxisOutsideViewport {
                axis_y: config.axis_y,
                height: config.viewport_height,
            });
        }
        if config.usable_width() <= 0.0 {
            return Err(ConfigError::MarginsExceedViewport);
        }
        let capacity = CapacityModel::new(&config);
        Ok(Self { config, capacity })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Run the full pipeline over `events`, optionally restricted to a
    /// zoomed view window. Input is read-only; the result is fresh.
    pub fn layout(
        &mut self,
        events: &[TimelineEvent],
        view_window: Option<ViewWindow>,
    ) -> LayoutResult {
        if events.is_empty() {
            return LayoutResult::empty();
        }

        let mut sorted = events.to_vec();
        sort_events(&mut sorted);

        let full_range = padded_range(&sorted);
        let range = match view_window {
            Some(window) if !window.is_full() => {
                let range = window_range(full_range, window);
                sorted.retain(|e| range.contains(e.ts));
                range
            }
            _ => full_range,
        };
        if sorted.is_empty() {
            return LayoutResult::empty();
        }

        self.capacity.reset();

        let mut columns = DispatchEngine::new(&self.config, range).dispatch(&sorted);
        debug!(events = sorted.len(), columns = columns.len(), "dispatched");

        let (mut cards, stats) = degrade_columns(&mut columns);
        debug!(
            cards = cards.len(),
            degraded = stats.transitions.len(),
            "degraded"
        );

        clamp_to_viewport(&self.config, &mut columns, &mut cards);

        for column in &columns {
            self.capacity.initialize_column(&column.id, column.side);
        }
        for card in &cards {
            self.capacity
                .allocate(&card.column_id, card.side, card.card_type);
        }
        if self.config.promote_when_sparse {
            let promoted = self
                .capacity
                .apply_promotion(&mut cards, PROMOTION_UTILIZATION_THRESHOLD);
            debug!(promoted, "applied sparse promotion");
        }

        let mut placed = PositioningEngine::new(&self.config, range).position(&columns, &cards);
        resolve_collisions(&mut placed.cards, &self.config);
        sync_cluster_centers(&mut placed);
        debug!(
            cards = placed.cards.len(),
            anchors = placed.anchors.len(),
            "positioned"
        );

        let (utilization, metrics) =
            compute_metrics(&columns, &placed.cards, &stats, &self.capacity);

        LayoutResult {
            cards: placed.cards,
            anchors: placed.anchors,
            clusters: placed.clusters,
            utilization,
            metrics,
        }
    }
}

/// Temporal range spanning the sorted events, padded ~2% per end.
fn padded_range(sorted: &[TimelineEvent]) -> TimeRange {
    let start = sorted.first().map_or(0.0, |e| e.ts);
    let end = sorted.last().map_or(0.0, |e| e.ts);
    let span = end - start;
    let pad = if span > 0.0 {
        span * RANGE_PADDING
    } else {
        DEGENERATE_RANGE_PADDING
    };
    TimeRange::new(start - pad, end + pad)
}

/// Fractional sub-range of the full range for a zoomed view.
fn window_range(full: TimeRange, window: ViewWindow) -> TimeRange {
    let start_frac = window.view_start.clamp(0.0, 1.0);
    let end_frac = window.view_end.clamp(start_frac, 1.0);
    TimeRange::new(
        full.start + start_frac * full.span(),
        full.start + end_frac * full.span(),
    )
}
