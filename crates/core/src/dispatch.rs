use chronocard_protocol::{CardType, LayoutConfig, Side, TimelineEvent};

/// Upper bound on primary events per half-column; later arrivals go to
/// the column's overflow list.
pub const MAX_EVENTS_PER_COLUMN: usize = 8;
/// Fraction of the adaptive column width enforced as minimum pitch
/// between adjacent half-column centers on one side.
pub const MIN_PITCH_FACTOR: f64 = 0.75;

/// Closed temporal range the layout maps onto the horizontal band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, ts: f64) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// A spatial/temporal bucket of events on one side of the axis.
///
/// Created by dispatch, trimmed by degradation, consumed by positioning.
/// The side never changes after creation.
#[derive(Debug, Clone)]
pub struct HalfColumn {
    pub id: String,
    pub side: Side,
    /// Primary (candidate-visible) events, chronological.
    pub events: Vec<TimelineEvent>,
    /// Events represented only by the overflow badge.
    pub overflow: Vec<TimelineEvent>,
    pub start_x: f64,
    pub end_x: f64,
    pub center_x: f64,
    /// Tier chosen by degradation; `Full` until then.
    pub card_type: CardType,
    min_ts: f64,
    max_ts: f64,
}

impl HalfColumn {
    fn seed(id: String, side: Side, event: TimelineEvent, center_x: f64, half_width: f64) -> Self {
        let ts = event.ts;
        Self {
            id,
            side,
            events: vec![event],
            overflow: Vec::new(),
            start_x: center_x - half_width,
            end_x: center_x + half_width,
            center_x,
            card_type: CardType::Full,
            min_ts: ts,
            max_ts: ts,
        }
    }

    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.start_x && x <= self.end_x
    }

    pub fn event_count(&self) -> usize {
        self.events.len() + self.overflow.len()
    }

    fn set_center(&mut self, center_x: f64) {
        let half_width = (self.end_x - self.start_x) / 2.0;
        self.center_x = center_x;
        self.start_x = center_x - half_width;
        self.end_x = center_x + half_width;
    }

    fn absorb(&mut self, event: TimelineEvent, config: &LayoutConfig, range: &TimeRange) {
        self.min_ts = self.min_ts.min(event.ts);
        self.max_ts = self.max_ts.max(event.ts);
        self.events.push(event);
        // Recenter on the midpoint of the column's temporal extent.
        let mid_ts = (self.min_ts + self.max_ts) / 2.0;
        self.set_center(project_x(config, range, mid_ts));
    }
}

/// Project a timestamp onto the usable horizontal band, clamped so a
/// centered full-width card never crosses the margins.
pub fn project_x(config: &LayoutConfig, range: &TimeRange, ts: f64) -> f64 {
    let span = range.span().max(f64::EPSILON);
    let frac = ((ts - range.start) / span).clamp(0.0, 1.0);
    let x = config.margin_left + frac * config.usable_width();
    let half_card = config.full_size.width / 2.0;
    let lo = config.margin_left + half_card;
    let hi = (config.viewport_width - config.margin_right - half_card).max(lo);
    x.clamp(lo, hi)
}

/// Deterministic total order: timestamp, then id, then title.
pub fn sort_events(events: &mut [TimelineEvent]) {
    events.sort_by(|a, b| {
        a.ts.total_cmp(&b.ts)
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| a.title.cmp(&b.title))
    });
}

/// Partitions sorted events into half-columns above and below the axis.
#[derive(Debug)]
pub struct DispatchEngine<'a> {
    config: &'a LayoutConfig,
    range: TimeRange,
}

impl<'a> DispatchEngine<'a> {
    pub fn new(config: &'a LayoutConfig, range: TimeRange) -> Self {
        Self { config, range }
    }

    /// Assign each event to a half-column. Events alternate sides by
    /// chronological index; each side keeps its own independent column
    /// pool. Input must already be sorted (see [`sort_events`]).
    pub fn dispatch(&self, events: &[TimelineEvent]) -> Vec<HalfColumn> {
        let half_width = self.config.adaptive_column_width() / 2.0;
        let mut above: Vec<HalfColumn> = Vec::new();
        let mut below: Vec<HalfColumn> = Vec::new();

        for (index, event) in events.iter().enumerate() {
            let side = if index % 2 == 0 {
                Side::Above
            } else {
                Side::Below
            };
            let x = project_x(self.config, &self.range, event.ts);
            let (own, other) = match side {
                Side::Above => (&mut above, &mut below),
                Side::Below => (&mut below, &mut above),
            };

            if let Some(column) = own.iter_mut().find(|c| c.contains_x(x)) {
                if column.events.len() < MAX_EVENTS_PER_COLUMN {
                    column.absorb(event.clone(), self.config, &self.range);
                } else {
                    column.overflow.push(event.clone());
                }
                continue;
            }

            // A capped column at the same X on the opposite side takes the
            // event as overflow rather than spawning an overlapping column.
            if let Some(column) = other
                .iter_mut()
                .find(|c| c.contains_x(x) && c.events.len() >= MAX_EVENTS_PER_COLUMN)
            {
                column.overflow.push(event.clone());
                continue;
            }

            let index = own.len();
            let id = match side {
                Side::Above => format!("above-{index}"),
                Side::Below => format!("below-{index}"),
            };
            own.push(HalfColumn::seed(id, side, event.clone(), x, half_width));
        }

        self.ensure_spatial_separation(&mut above);
        self.ensure_spatial_separation(&mut below);

        let mut columns = above;
        columns.append(&mut below);
        columns
    }

    /// Enforce minimum pitch between adjacent columns on one side:
    /// shift the later column right while room remains before the right
    /// margin, otherwise merge it into the earlier column's overflow.
    fn ensure_spatial_separation(&self, columns: &mut Vec<HalfColumn>) {
        columns.sort_by(|a, b| a.center_x.total_cmp(&b.center_x).then_with(|| a.id.cmp(&b.id)));
        let min_pitch = MIN_PITCH_FACTOR * self.config.adaptive_column_width();
        let right_limit = self.config.viewport_width
            - self.config.margin_right
            - self.config.full_size.width / 2.0;

        let mut kept: Vec<HalfColumn> = Vec::with_capacity(columns.len());
        for mut column in columns.drain(..) {
            if let Some(prev) = kept.last_mut() {
                let gap = column.center_x - prev.center_x;
                if gap < min_pitch {
                    let target = prev.center_x + min_pitch;
                    if target <= right_limit {
                        column.set_center(target);
                    } else {
                        // No room: fold the whole column into the
                        // neighbor's overflow and drop it.
                        prev.overflow.append(&mut column.events);
                        prev.overflow.append(&mut column.overflow);
                        continue;
                    }
                }
            }
            if column.events.is_empty() && column.overflow.is_empty() {
                continue;
            }
            kept.push(column);
        }
        *columns = kept;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LayoutConfig {
        LayoutConfig::default()
    }

    fn events(timestamps: &[f64]) -> Vec<TimelineEvent> {
        timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| TimelineEvent::new(format!("e{i}"), ts, format!("event {i}")))
            .collect()
    }

    fn dispatch(config: &LayoutConfig, timestamps: &[f64]) -> Vec<HalfColumn> {
        let mut evs = events(timestamps);
        sort_events(&mut evs);
        let range = TimeRange::new(
            timestamps.iter().cloned().fold(f64::INFINITY, f64::min) - 100.0,
            timestamps.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 100.0,
        );
        DispatchEngine::new(config, range).dispatch(&evs)
    }

    #[test]
    fn sort_breaks_ties_by_id_then_title() {
        let mut evs = vec![
            TimelineEvent::new("b", 10.0, "z"),
            TimelineEvent::new("a", 10.0, "y"),
            TimelineEvent::new("c", 5.0, "x"),
        ];
        sort_events(&mut evs);
        let ids: Vec<_> = evs.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn projection_clamps_to_card_margins() {
        let cfg = config();
        let range = TimeRange::new(0.0, 1_000.0);
        let half_card = cfg.full_size.width / 2.0;
        let left = project_x(&cfg, &range, 0.0);
        let right = project_x(&cfg, &range, 1_000.0);
        assert!((left - (cfg.margin_left + half_card)).abs() < f64::EPSILON);
        assert!(
            (right - (cfg.viewport_width - cfg.margin_right - half_card)).abs() < f64::EPSILON
        );
        // Out-of-range timestamps clamp rather than escape the band.
        assert!((project_x(&cfg, &range, -500.0) - left).abs() < f64::EPSILON);
    }

    #[test]
    fn events_alternate_sides_by_chronological_index() {
        let cfg = config();
        // Spread far apart so each event seeds its own column.
        let columns = dispatch(&cfg, &[0.0, 1_000_000.0, 2_000_000.0, 3_000_000.0]);
        let above: Vec<_> = columns.iter().filter(|c| c.side == Side::Above).collect();
        let below: Vec<_> = columns.iter().filter(|c| c.side == Side::Below).collect();
        assert_eq!(above.len(), 2);
        assert_eq!(below.len(), 2);
    }

    #[test]
    fn column_ids_are_indexed_per_side() {
        let cfg = config();
        let columns = dispatch(&cfg, &[0.0, 1_000_000.0, 2_000_000.0, 3_000_000.0]);
        let mut ids: Vec<&str> = columns.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["above-0", "above-1", "below-0", "below-1"]);
    }

    #[test]
    fn adjacent_events_share_a_column() {
        let cfg = config();
        // Three near-identical timestamps: indices 0 and 2 land above.
        let columns = dispatch(&cfg, &[0.0, 1.0, 2.0]);
        let above: Vec<_> = columns.iter().filter(|c| c.side == Side::Above).collect();
        assert_eq!(above.len(), 1);
        assert_eq!(above[0].events.len(), 2);
    }

    #[test]
    fn capped_column_overflows_instead_of_splitting() {
        let cfg = config();
        // 20 events in one tight burst: 10 per side, 8 primary + 2 overflow.
        let timestamps: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let columns = dispatch(&cfg, &timestamps);
        assert_eq!(columns.len(), 2);
        for column in &columns {
            assert_eq!(column.events.len(), MAX_EVENTS_PER_COLUMN);
            assert_eq!(column.overflow.len(), 2);
        }
    }

    #[test]
    fn column_recenters_on_temporal_midpoint() {
        let cfg = config();
        let range = TimeRange::new(0.0, 1_000_000.0);
        let engine = DispatchEngine::new(&cfg, range);
        // Indices 0 and 2 land above and share one column.
        let mut evs = events(&[500_000.0, 500_100.0, 500_200.0]);
        sort_events(&mut evs);
        let columns = engine.dispatch(&evs);
        let above = columns.iter().find(|c| c.side == Side::Above).unwrap();
        assert_eq!(above.events.len(), 2);
        let mid = project_x(&cfg, &range, 500_100.0);
        assert!((above.center_x - mid).abs() < 1.0);
    }

    /// Map a desired unclamped X back to a timestamp for `range` [0, 1000].
    fn ts_for_x(cfg: &LayoutConfig, x: f64) -> f64 {
        (x - cfg.margin_left) / cfg.usable_width() * 1000.0
    }

    #[test]
    fn spatial_separation_shifts_near_columns_apart() {
        let cfg = config();
        let range = TimeRange::new(0.0, 1_000.0);
        let adaptive = cfg.adaptive_column_width();
        // Two above-side columns 0.65 adaptive widths apart: distinct
        // bands, but closer than the 0.75 minimum pitch.
        let x1 = 500.0;
        let x2 = x1 + 0.65 * adaptive;
        let mut evs = events(&[
            ts_for_x(&cfg, x1),
            ts_for_x(&cfg, x1) + 0.1,
            ts_for_x(&cfg, x2),
            ts_for_x(&cfg, x2) + 0.1,
        ]);
        sort_events(&mut evs);
        let columns = DispatchEngine::new(&cfg, range).dispatch(&evs);
        let mut above: Vec<_> = columns.iter().filter(|c| c.side == Side::Above).collect();
        above.sort_by(|a, b| a.center_x.total_cmp(&b.center_x));
        assert_eq!(above.len(), 2);
        let gap = above[1].center_x - above[0].center_x;
        assert!(
            (gap - MIN_PITCH_FACTOR * adaptive).abs() < 1e-6,
            "gap={gap}"
        );
    }

    #[test]
    fn spatial_separation_merges_when_no_room_remains() {
        let cfg = config();
        let range = TimeRange::new(0.0, 1_000.0);
        let adaptive = cfg.adaptive_column_width();
        let right_limit = cfg.viewport_width - cfg.margin_right - cfg.full_size.width / 2.0;
        // Second column is too close and cannot shift right without
        // crossing the margin, so it folds into the first as overflow.
        let x1 = right_limit - 0.7 * adaptive;
        let x2 = right_limit - 0.1 * adaptive;
        let mut evs = events(&[
            ts_for_x(&cfg, x1),
            ts_for_x(&cfg, x1) + 0.1,
            ts_for_x(&cfg, x2),
            ts_for_x(&cfg, x2) + 0.1,
        ]);
        sort_events(&mut evs);
        let columns = DispatchEngine::new(&cfg, range).dispatch(&evs);
        let above: Vec<_> = columns.iter().filter(|c| c.side == Side::Above).collect();
        assert_eq!(above.len(), 1);
        assert_eq!(above[0].events.len(), 1);
        assert_eq!(above[0].overflow.len(), 1);
    }

    #[test]
    fn no_event_is_lost_in_dispatch() {
        let cfg = config();
        let timestamps: Vec<f64> = (0..57).map(|i| (i * i) as f64).collect();
        let columns = dispatch(&cfg, &timestamps);
        let total: usize = columns.iter().map(HalfColumn::event_count).sum();
        assert_eq!(total, 57);
    }
}
