use chronocard_protocol::{CardType, LayoutMetrics, PositionedCard, Side, Utilization};

use crate::capacity::CapacityModel;
use crate::degrade::DegradationStats;
use crate::dispatch::HalfColumn;

/// Derive read-only telemetry from the finished layout. Only ever reads;
/// the layout is done by the time this runs.
pub fn compute_metrics(
    columns: &[HalfColumn],
    cards: &[PositionedCard],
    stats: &DegradationStats,
    capacity: &CapacityModel,
) -> (Utilization, LayoutMetrics) {
    let above: Vec<f64> = side_centers(columns, Side::Above);
    let below: Vec<f64> = side_centers(columns, Side::Below);

    let mut gaps: Vec<f64> = Vec::new();
    collect_gaps(&above, &mut gaps);
    collect_gaps(&below, &mut gaps);
    let min_pitch = gaps.iter().cloned().fold(f64::INFINITY, f64::min);
    let mean_pitch = if gaps.is_empty() {
        0.0
    } else {
        gaps.iter().sum::<f64>() / gaps.len() as f64
    };

    let (used_slots, total_slots) = capacity.placement_usage();
    let utilization = Utilization {
        total_slots,
        used_slots,
        percentage: if total_slots == 0 {
            0.0
        } else {
            f64::from(used_slots) / f64::from(total_slots) * 100.0
        },
    };

    let metrics = LayoutMetrics {
        column_count: columns.len(),
        above_columns: above.len(),
        below_columns: below.len(),
        min_pitch: if min_pitch.is_finite() { min_pitch } else { 0.0 },
        mean_pitch,
        full_cards: count_tier(cards, CardType::Full),
        compact_cards: count_tier(cards, CardType::Compact),
        title_only_cards: count_tier(cards, CardType::TitleOnly),
        degraded_columns: stats.transitions.len(),
        transitions: stats.transitions.clone(),
        capacity: capacity.global_metrics(),
    };

    (utilization, metrics)
}

fn side_centers(columns: &[HalfColumn], side: Side) -> Vec<f64> {
    let mut centers: Vec<f64> = columns
        .iter()
        .filter(|c| c.side == side)
        .map(|c| c.center_x)
        .collect();
    centers.sort_by(f64::total_cmp);
    centers
}

fn collect_gaps(centers: &[f64], gaps: &mut Vec<f64>) {
    for pair in centers.windows(2) {
        gaps.push(pair[1] - pair[0]);
    }
}

fn count_tier(cards: &[PositionedCard], tier: CardType) -> usize {
    cards.iter().filter(|c| c.card_type == tier).count()
}
