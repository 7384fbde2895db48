use std::collections::HashMap;

use chronocard_protocol::{CapacityMetrics, CardType, LayoutConfig, Side};

use crate::degrade::LogicalCard;

pub const MIN_CELLS_PER_SIDE: u32 = 4;
pub const MAX_CELLS_PER_SIDE: u32 = 8;
pub const PLACEMENTS_PER_SIDE: u32 = 4;
/// Below this global cell utilization, `apply_promotion` may upgrade tiers.
pub const PROMOTION_UTILIZATION_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, Copy, Default)]
struct SideBudget {
    total_cells: u32,
    used_cells: u32,
    total_placements: u32,
    used_placements: u32,
}

impl SideBudget {
    fn remaining_cells(&self) -> u32 {
        self.total_cells.saturating_sub(self.used_cells)
    }

    fn remaining_placements(&self) -> u32 {
        self.total_placements.saturating_sub(self.used_placements)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ColumnBudget {
    above: SideBudget,
    below: SideBudget,
}

impl ColumnBudget {
    fn side(&self, side: Side) -> &SideBudget {
        match side {
            Side::Above => &self.above,
            Side::Below => &self.below,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideBudget {
        match side {
            Side::Above => &mut self.above,
            Side::Below => &mut self.below,
        }
    }
}

/// Per-column cell and placement-slot accounting.
///
/// Cells are the abstract currency of vertical space: a side of a column
/// holds between [`MIN_CELLS_PER_SIDE`] and [`MAX_CELLS_PER_SIDE`] cells
/// depending on viewport height, and each card tier consumes its
/// footprint. Placement slots cap how many cards a side can hold
/// regardless of tier. All no-capacity outcomes are `false`/`None`,
/// never a panic.
#[derive(Debug)]
pub struct CapacityModel {
    cells_per_side: u32,
    columns: HashMap<String, ColumnBudget>,
}

impl CapacityModel {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            cells_per_side: cells_for_viewport(config),
            columns: HashMap::new(),
        }
    }

    pub fn cells_per_side(&self) -> u32 {
        self.cells_per_side
    }

    /// Register a half-column, giving its own side a fresh cell budget and
    /// placement pool. The opposite side stays zeroed — a half-column only
    /// ever occupies one side.
    pub fn initialize_column(&mut self, id: &str, side: Side) {
        let mut budget = ColumnBudget::default();
        *budget.side_mut(side) = SideBudget {
            total_cells: self.cells_per_side,
            used_cells: 0,
            total_placements: PLACEMENTS_PER_SIDE,
            used_placements: 0,
        };
        self.columns.insert(id.to_string(), budget);
    }

    /// Whether one more card of the given tier fits on this column side.
    pub fn can_fit(&self, id: &str, side: Side, card_type: CardType) -> bool {
        let Some(column) = self.columns.get(id) else {
            return false;
        };
        let budget = column.side(side);
        budget.remaining_cells() >= card_type.footprint() && budget.remaining_placements() > 0
    }

    /// Consume one placement slot and the tier's cell footprint.
    /// Returns the placement index, or `None` (no side effect) when the
    /// card does not fit.
    pub fn allocate(&mut self, id: &str, side: Side, card_type: CardType) -> Option<u32> {
        if !self.can_fit(id, side, card_type) {
            return None;
        }
        let budget = self.columns.get_mut(id)?.side_mut(side);
        let index = budget.used_placements;
        budget.used_placements += 1;
        budget.used_cells += card_type.footprint();
        Some(index)
    }

    /// Walk the cascade best-to-worst and return the first tier whose
    /// total footprint for `event_count` cards fits the remaining cells.
    pub fn best_fit_card_type(
        &self,
        id: &str,
        side: Side,
        event_count: usize,
    ) -> Option<CardType> {
        let column = self.columns.get(id)?;
        let remaining = column.side(side).remaining_cells();
        for tier in [CardType::Full, CardType::Compact, CardType::TitleOnly] {
            let needed = event_count as u32 * tier.footprint();
            if needed <= remaining {
                return Some(tier);
            }
        }
        None
    }

    /// Aggregate snapshot across all registered columns.
    pub fn global_metrics(&self) -> CapacityMetrics {
        let mut total = 0u32;
        let mut used = 0u32;
        for column in self.columns.values() {
            for budget in [&column.above, &column.below] {
                total += budget.total_cells;
                used += budget.used_cells;
            }
        }
        CapacityMetrics {
            total_cells: total,
            used_cells: used,
            available_cells: total.saturating_sub(used),
            utilization: percentage(used, total),
            cells_per_side: self.cells_per_side,
            placements_per_side: PLACEMENTS_PER_SIDE,
        }
    }

    /// Snapshot for a single column, if registered.
    pub fn column_metrics(&self, id: &str) -> Option<CapacityMetrics> {
        let column = self.columns.get(id)?;
        let mut total = 0u32;
        let mut used = 0u32;
        for budget in [&column.above, &column.below] {
            total += budget.total_cells;
            used += budget.used_cells;
        }
        Some(CapacityMetrics {
            total_cells: total,
            used_cells: used,
            available_cells: total.saturating_sub(used),
            utilization: percentage(used, total),
            cells_per_side: self.cells_per_side,
            placements_per_side: PLACEMENTS_PER_SIDE,
        })
    }

    /// Placement-slot usage across all columns: `(used, total)`.
    pub fn placement_usage(&self) -> (u32, u32) {
        let mut used = 0u32;
        let mut total = 0u32;
        for column in self.columns.values() {
            for budget in [&column.above, &column.below] {
                used += budget.used_placements;
                total += budget.total_placements;
            }
        }
        (used, total)
    }

    /// When global utilization sits below `threshold`, upgrade cards one
    /// cascade step toward full, in input order, until a promotion budget
    /// of half the available cells is spent. Returns how many cards were
    /// promoted.
    pub fn apply_promotion(&mut self, cards: &mut [LogicalCard], threshold: f64) -> usize {
        let metrics = self.global_metrics();
        if metrics.total_cells == 0 || metrics.utilization >= threshold {
            return 0;
        }
        let mut budget = metrics.available_cells / 2;
        let mut promoted = 0;
        for card in cards.iter_mut() {
            let Some(next) = card.card_type.promote() else {
                continue;
            };
            let extra = next.footprint() - card.card_type.footprint();
            if extra > budget {
                continue;
            }
            if self.grow(&card.column_id, card.side, extra) {
                card.card_type = next;
                budget -= extra;
                promoted += 1;
            }
        }
        promoted
    }

    pub fn reset(&mut self) {
        self.columns.clear();
    }

    /// Enlarge an existing allocation by `extra` cells if the side has room.
    fn grow(&mut self, id: &str, side: Side, extra: u32) -> bool {
        let Some(column) = self.columns.get_mut(id) else {
            return false;
        };
        let budget = column.side_mut(side);
        if budget.remaining_cells() < extra {
            return false;
        }
        budget.used_cells += extra;
        true
    }
}

/// Cells available on one side of the axis, derived from viewport height
/// in units of the smallest card, clamped to `[4, 8]`.
fn cells_for_viewport(config: &LayoutConfig) -> u32 {
    let unit = config.title_size.height + config.card_spacing;
    let side_height = (config.viewport_height / 2.0 - config.below_axis_margin).max(0.0);
    let cells = if unit > 0.0 {
        (side_height / unit).floor() as u32
    } else {
        MIN_CELLS_PER_SIDE
    };
    cells.clamp(MIN_CELLS_PER_SIDE, MAX_CELLS_PER_SIDE)
}

fn percentage(used: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(used) / f64::from(total) * 100.0
    }
}
