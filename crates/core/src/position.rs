use std::collections::{HashMap, HashSet};

use chronocard_protocol::{
    Anchor, Cluster, LayoutConfig, PositionedCard, Side,
};

use crate::degrade::LogicalCard;
use crate::dispatch::{HalfColumn, TimeRange, project_x};

/// Geometry produced by the positioning stage, before collision
/// resolution.
#[derive(Debug, Clone, Default)]
pub struct PositionedLayout {
    pub cards: Vec<PositionedCard>,
    pub anchors: Vec<Anchor>,
    pub clusters: Vec<Cluster>,
}

/// Trim each half-column's visible set to the cards that physically fit
/// between the axis margin and the viewport edge. Trimmed events join the
/// column's overflow ahead of the events already there, keeping the
/// overflow chronological, and their logical cards are dropped.
pub fn clamp_to_viewport(
    config: &LayoutConfig,
    columns: &mut [HalfColumn],
    cards: &mut Vec<LogicalCard>,
) {
    for column in columns.iter_mut() {
        let available = match column.side {
            Side::Above => config.axis_y - config.above_axis_margin,
            Side::Below => config.viewport_height - config.axis_y - config.below_axis_margin,
        };
        let height = config.card_size(column.card_type).height;
        let mut used = 0.0;
        let mut fits = 0;
        while fits < column.events.len() {
            let next = if fits == 0 {
                height
            } else {
                used + config.card_spacing + height
            };
            if next > available {
                break;
            }
            used = next;
            fits += 1;
        }
        if fits < column.events.len() {
            let mut trimmed = column.events.split_off(fits);
            trimmed.append(&mut column.overflow);
            column.overflow = trimmed;
        }
    }

    let visible: HashSet<(&str, &str)> = columns
        .iter()
        .flat_map(|c| c.events.iter().map(move |e| (c.id.as_str(), e.id.as_str())))
        .collect();
    cards.retain(|card| visible.contains(&(card.column_id.as_str(), card.event.id.as_str())));
}

/// Realign each cluster record (and its aggregate anchor, including the
/// clone in the flat anchor list) with the X its cards ended up at after
/// collision nudges.
pub fn sync_cluster_centers(layout: &mut PositionedLayout) {
    for cluster in &mut layout.clusters {
        let Some(card) = layout.cards.iter().find(|c| c.cluster_id == cluster.id) else {
            continue;
        };
        cluster.center_x = card.x;
        cluster.anchor.x = card.x;
        if let Some(anchor) = layout.anchors.iter_mut().find(|a| a.id == cluster.anchor.id) {
            anchor.x = card.x;
        }
    }
}

/// Converts half-columns and their logical cards into concrete pixel
/// placements: axis anchors at exact temporal positions, cards stacked
/// outward from the axis, one legacy cluster record per half-column.
#[derive(Debug)]
pub struct PositioningEngine<'a> {
    config: &'a LayoutConfig,
    range: TimeRange,
}

impl<'a> PositioningEngine<'a> {
    pub fn new(config: &'a LayoutConfig, range: TimeRange) -> Self {
        Self { config, range }
    }

    pub fn position(&self, columns: &[HalfColumn], cards: &[LogicalCard]) -> PositionedLayout {
        let mut by_column: HashMap<&str, Vec<&LogicalCard>> = HashMap::new();
        for card in cards {
            by_column.entry(card.column_id.as_str()).or_default().push(card);
        }

        let mut layout = PositionedLayout::default();
        for column in columns {
            self.place_anchors(column, &mut layout.anchors);
            let column_cards: &[&LogicalCard] = by_column
                .get(column.id.as_str())
                .map_or(&[], Vec::as_slice);
            self.stack_cards(column, column_cards, &mut layout.cards);
            let cluster = self.cluster_record(column);
            layout.anchors.push(cluster.anchor.clone());
            layout.clusters.push(cluster);
        }
        layout
    }

    /// One anchor per visible event, pinned to the axis at the event's own
    /// temporal X (independent of the half-column center). The column's
    /// aggregate overflow count rides on the last anchor only.
    fn place_anchors(&self, column: &HalfColumn, anchors: &mut Vec<Anchor>) {
        let y = self.config.axis_y + column.side.sign() * self.config.anchor_offset;
        let visible = column.events.len();
        let last = visible.saturating_sub(1);
        for (i, event) in column.events.iter().enumerate() {
            anchors.push(Anchor {
                id: format!("anchor-{}", event.id),
                event_id: event.id.clone(),
                x: project_x(self.config, &self.range, event.ts),
                y,
                side: column.side,
                visible_count: visible,
                overflow_count: if i == last { column.overflow.len() } else { 0 },
                is_cluster_group: false,
            });
        }
    }

    /// Stack cards outward from the axis. The first card's inner edge sits
    /// at the side's asymmetric margin (date labels render below the axis,
    /// so the below margin is larger); each further card is offset by the
    /// previous card's height plus fixed spacing. Mixed tiers keep their
    /// own heights.
    fn stack_cards(
        &self,
        column: &HalfColumn,
        column_cards: &[&LogicalCard],
        out: &mut Vec<PositionedCard>,
    ) {
        let mut cursor = match column.side {
            Side::Above => self.config.axis_y - self.config.above_axis_margin,
            Side::Below => self.config.axis_y + self.config.below_axis_margin,
        };
        for card in column_cards {
            let size = self.config.card_size(card.card_type);
            let y = match column.side {
                Side::Above => cursor - size.height,
                Side::Below => cursor,
            };
            out.push(PositionedCard {
                id: format!("card-{}", card.event.id),
                event: card.event.clone(),
                x: column.center_x,
                y,
                width: size.width,
                height: size.height,
                card_type: card.card_type,
                cluster_id: column.id.clone(),
            });
            cursor += column.side.sign() * (size.height + self.config.card_spacing);
        }
    }

    /// Legacy aggregate record for back-compat consumers: one
    /// representative anchor per half-column carrying events + overflow.
    fn cluster_record(&self, column: &HalfColumn) -> Cluster {
        let first_event_id = column
            .events
            .first()
            .or_else(|| column.overflow.first())
            .map(|e| e.id.clone())
            .unwrap_or_default();
        Cluster {
            id: column.id.clone(),
            side: column.side,
            center_x: column.center_x,
            card_type: column.card_type,
            event_count: column.events.len(),
            overflow_count: column.overflow.len(),
            anchor: Anchor {
                id: format!("cluster-anchor-{}", column.id),
                event_id: first_event_id,
                x: column.center_x,
                y: self.config.axis_y + column.side.sign() * self.config.anchor_offset,
                side: column.side,
                visible_count: column.events.len(),
                overflow_count: column.overflow.len(),
                is_cluster_group: true,
            },
        }
    }
}
