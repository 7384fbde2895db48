//! End-to-end scenarios over the full pipeline: burst density, overflow
//! badges, side independence, and viewport-driven cell budgets.

use chronocard_core::LayoutEngine;
use chronocard_protocol::{CardType, LayoutConfig, LayoutResult, Side, TimelineEvent};

fn engine() -> LayoutEngine {
    LayoutEngine::new(LayoutConfig::default()).unwrap()
}

fn burst(n: usize) -> Vec<TimelineEvent> {
    // One shared instant: the engine pads the degenerate range on both
    // sides, so everything projects to one half-column band per side.
    // Sort order falls back to the ids.
    (0..n)
        .map(|i| TimelineEvent::new(format!("e{i:02}"), 1_000.0, format!("event {i}")))
        .collect()
}

#[test]
fn zero_events() {
    let result = engine().layout(&[], None);
    assert_eq!(result, LayoutResult::empty());
    assert_eq!(result.utilization.total_slots, 0);
    assert_eq!(result.utilization.used_slots, 0);
    assert_eq!(result.utilization.percentage, 0.0);
}

#[test]
fn single_event() {
    let result = engine().layout(&burst(1), None);
    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.cards.len(), 1);
    assert_eq!(result.cards[0].card_type, CardType::Full);
    let individual: Vec<_> = result
        .anchors
        .iter()
        .filter(|a| !a.is_cluster_group)
        .collect();
    assert_eq!(individual.len(), 1);
    assert_eq!(individual[0].overflow_count, 0);
    assert_eq!(result.clusters[0].overflow_count, 0);
}

#[test]
fn three_adjacent_events_per_side_degrade_to_compact() {
    // Six adjacent events: alternation puts three on each side.
    let result = engine().layout(&burst(6), None);
    assert_eq!(result.clusters.len(), 2);
    for cluster in &result.clusters {
        assert_eq!(cluster.card_type, CardType::Compact);
        assert_eq!(cluster.event_count, 3);
        assert_eq!(cluster.overflow_count, 0);
    }
    assert_eq!(result.cards.len(), 6);
    assert!(result.cards.iter().all(|c| c.card_type == CardType::Compact));
}

#[test]
fn ten_adjacent_events_per_side_go_title_only_with_overflow() {
    // Twenty adjacent events: ten per side → title-only, 8 visible, 2 over.
    // An 1100px viewport gives the eight-card stack room on both sides.
    let mut tall = LayoutEngine::new(LayoutConfig::for_viewport(1280.0, 1_100.0)).unwrap();
    let result = tall.layout(&burst(20), None);
    assert_eq!(result.clusters.len(), 2);
    for cluster in &result.clusters {
        assert_eq!(cluster.card_type, CardType::TitleOnly);
        assert_eq!(cluster.event_count, 8);
        assert_eq!(cluster.overflow_count, 2);
        assert_eq!(cluster.event_count + cluster.overflow_count, 10);
    }
    for side in [Side::Above, Side::Below] {
        let side_anchors: Vec<_> = result
            .anchors
            .iter()
            .filter(|a| !a.is_cluster_group && a.side == side)
            .collect();
        assert_eq!(side_anchors.len(), 8);
        // Overflow badge rides on the last anchor only.
        assert_eq!(side_anchors.last().unwrap().overflow_count, 2);
        assert!(
            side_anchors[..side_anchors.len() - 1]
                .iter()
                .all(|a| a.overflow_count == 0)
        );
    }
}

#[test]
fn near_identical_timestamps_stay_on_independent_sides() {
    let events = vec![
        TimelineEvent::new("a", 5_000.0, "first"),
        TimelineEvent::new("b", 5_000.001, "second"),
    ];
    let result = engine().layout(&events, None);
    assert_eq!(result.clusters.len(), 2);
    let sides: Vec<Side> = result.clusters.iter().map(|c| c.side).collect();
    assert!(sides.contains(&Side::Above));
    assert!(sides.contains(&Side::Below));
    for cluster in &result.clusters {
        assert_eq!(cluster.event_count, 1);
        assert_eq!(cluster.overflow_count, 0);
    }
    let individual = result.anchors.iter().filter(|a| !a.is_cluster_group);
    assert_eq!(individual.count(), 2);
}

#[test]
fn smaller_viewport_recomputes_and_clamps_cells_per_side() {
    let events = burst(6);

    let mut tall = LayoutEngine::new(LayoutConfig::for_viewport(1280.0, 900.0)).unwrap();
    let tall_result = tall.layout(&events, None);
    assert_eq!(tall_result.metrics.capacity.cells_per_side, 7);

    let mut short = LayoutEngine::new(LayoutConfig::for_viewport(1280.0, 360.0)).unwrap();
    let short_result = short.layout(&events, None);
    // Clamped to the floor of 4 despite the much smaller height.
    assert_eq!(short_result.metrics.capacity.cells_per_side, 4);

    let mut huge = LayoutEngine::new(LayoutConfig::for_viewport(1280.0, 4_000.0)).unwrap();
    let huge_result = huge.layout(&events, None);
    assert_eq!(huge_result.metrics.capacity.cells_per_side, 8);
}

#[test]
fn cards_stay_inside_the_viewport() {
    // Sixteen events in one burst: eight per side, more than the default
    // 800px viewport can stack. The excess must overflow, not escape.
    let cfg = LayoutConfig::default();
    let result = engine().layout(&burst(16), None);
    assert!(!result.cards.is_empty());
    for card in &result.cards {
        let r = card.rect();
        assert!(
            r.y >= 0.0 && r.bottom() <= cfg.viewport_height,
            "card {} leaves the viewport vertically",
            card.id
        );
        assert!(r.x >= 0.0 && r.right() <= cfg.viewport_width);
    }
    // Nothing dropped: the trimmed cards are accounted as overflow.
    let routed: usize = result
        .clusters
        .iter()
        .map(|c| c.event_count + c.overflow_count)
        .sum();
    assert_eq!(routed, 16);
}

#[test]
fn overflow_events_have_no_cards_but_are_counted() {
    let result = engine().layout(&burst(20), None);
    let carded: usize = result.cards.len();
    let overflow: usize = result.clusters.iter().map(|c| c.overflow_count).sum();
    assert_eq!(carded + overflow, 20);
    // Every visible card has exactly one individual anchor.
    for card in &result.cards {
        let matching = result
            .anchors
            .iter()
            .filter(|a| !a.is_cluster_group && a.event_id == card.event.id)
            .count();
        assert_eq!(matching, 1, "event {}", card.event.id);
    }
}
