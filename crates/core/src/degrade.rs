use chronocard_protocol::{CardType, DegradationRecord, Side, TimelineEvent};

use crate::dispatch::HalfColumn;

/// A card chosen for an event before it has pixel coordinates.
#[derive(Debug, Clone)]
pub struct LogicalCard {
    pub event: TimelineEvent,
    pub card_type: CardType,
    pub column_id: String,
    pub side: Side,
}

/// Per-tier counters and transition records, collected for the metrics
/// stage. Pure observability — dropping this would not change the layout.
#[derive(Debug, Clone, Default)]
pub struct DegradationStats {
    pub full_columns: usize,
    pub compact_columns: usize,
    pub title_only_columns: usize,
    pub transitions: Vec<DegradationRecord>,
}

/// Fixed three-tier density thresholds. Deliberately a lookup, not a
/// search: the visible-card cap at each tier never strands an allocated
/// card without a slot.
pub fn card_type_for(event_count: usize) -> CardType {
    match event_count {
        0..=2 => CardType::Full,
        3..=4 => CardType::Compact,
        _ => CardType::TitleOnly,
    }
}

/// Select each half-column's card tier from its total event count
/// (primary + overflow), materialize one logical card per visible event,
/// and write the remainder back as the column's new overflow so later
/// stages see an accurate remaining count.
pub fn degrade_columns(columns: &mut [HalfColumn]) -> (Vec<LogicalCard>, DegradationStats) {
    let mut cards = Vec::new();
    let mut stats = DegradationStats::default();

    for column in columns.iter_mut() {
        let event_count = column.event_count();
        let tier = card_type_for(event_count);
        column.card_type = tier;

        match tier {
            CardType::Full => stats.full_columns += 1,
            CardType::Compact => stats.compact_columns += 1,
            CardType::TitleOnly => stats.title_only_columns += 1,
        }

        // Pool primary and overflow, then split at the tier's cap.
        let mut pool: Vec<TimelineEvent> = column.events.drain(..).collect();
        pool.append(&mut column.overflow);
        let visible_count = pool.len().min(tier.max_cards());
        let remainder = pool.split_off(visible_count);
        column.events = pool;
        column.overflow = remainder;

        if tier != CardType::Full {
            let saved =
                (CardType::Full.footprint() - tier.footprint()) * column.events.len() as u32;
            stats.transitions.push(DegradationRecord {
                group_id: column.id.clone(),
                event_count,
                from: CardType::Full,
                to: tier,
                space_saved: saved,
            });
        }

        for event in &column.events {
            cards.push(LogicalCard {
                event: event.clone(),
                card_type: tier,
                column_id: column.id.clone(),
                side: column.side,
            });
        }
    }

    (cards, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{DispatchEngine, TimeRange, sort_events};
    use chronocard_protocol::LayoutConfig;

    fn column_with(n: usize) -> Vec<HalfColumn> {
        let cfg = LayoutConfig::default();
        let range = TimeRange::new(0.0, 1_000.0);
        // Tight burst on one side: even indices only.
        let mut evs: Vec<TimelineEvent> = (0..n * 2)
            .map(|i| TimelineEvent::new(format!("e{i}"), 500.0 + i as f64 * 0.001, "t"))
            .collect();
        sort_events(&mut evs);
        let columns = DispatchEngine::new(&cfg, range).dispatch(&evs);
        columns
            .into_iter()
            .filter(|c| c.side == Side::Above)
            .collect()
    }

    #[test]
    fn thresholds_select_fixed_tiers() {
        assert_eq!(card_type_for(1), CardType::Full);
        assert_eq!(card_type_for(2), CardType::Full);
        assert_eq!(card_type_for(3), CardType::Compact);
        assert_eq!(card_type_for(4), CardType::Compact);
        assert_eq!(card_type_for(5), CardType::TitleOnly);
        assert_eq!(card_type_for(40), CardType::TitleOnly);
    }

    #[test]
    fn tier_never_regresses_as_count_grows() {
        let mut previous = card_type_for(1);
        for count in 2..40 {
            let tier = card_type_for(count);
            assert!(tier >= previous, "count {count} regressed to {tier}");
            previous = tier;
        }
    }

    #[test]
    fn small_column_keeps_full_cards() {
        let mut columns = column_with(2);
        let (cards, stats) = degrade_columns(&mut columns);
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|c| c.card_type == CardType::Full));
        assert!(stats.transitions.is_empty());
        assert_eq!(stats.full_columns, 1);
    }

    #[test]
    fn mid_density_column_degrades_to_compact() {
        let mut columns = column_with(4);
        let (cards, stats) = degrade_columns(&mut columns);
        assert_eq!(cards.len(), 4);
        assert!(cards.iter().all(|c| c.card_type == CardType::Compact));
        assert_eq!(stats.transitions.len(), 1);
        assert_eq!(stats.transitions[0].to, CardType::Compact);
        // Two cells saved per visible card.
        assert_eq!(stats.transitions[0].space_saved, 8);
    }

    #[test]
    fn overflow_counts_toward_the_tier_and_gets_trimmed() {
        // Ten events on one side: dispatch caps primaries at 8, leaving 2
        // in overflow; the tier sees all 10 and title-only keeps 8 visible.
        let mut columns = column_with(10);
        assert_eq!(columns[0].events.len(), 8);
        assert_eq!(columns[0].overflow.len(), 2);
        let (cards, _) = degrade_columns(&mut columns);
        assert_eq!(columns[0].card_type, CardType::TitleOnly);
        assert_eq!(cards.len(), 8);
        assert_eq!(columns[0].overflow.len(), 2);
    }

    #[test]
    fn visible_plus_overflow_is_conserved() {
        for n in [1usize, 3, 5, 9, 16] {
            let mut columns = column_with(n);
            let before: usize = columns.iter().map(HalfColumn::event_count).sum();
            let (cards, _) = degrade_columns(&mut columns);
            let after: usize =
                cards.len() + columns.iter().map(|c| c.overflow.len()).sum::<usize>();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn visible_events_stay_chronological() {
        let mut columns = column_with(6);
        let (cards, _) = degrade_columns(&mut columns);
        let ts: Vec<f64> = cards.iter().map(|c| c.event.ts).collect();
        assert!(ts.windows(2).all(|w| w[0] <= w[1]));
    }
}
