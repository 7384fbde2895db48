use std::collections::{BTreeSet, HashMap};

use chronocard_protocol::{LayoutConfig, PositionedCard, Rect};

/// Spatial hash cell size for candidate-pair discovery.
const CELL_SIZE: f64 = 100.0;
/// Granularity of vertical fallback moves.
pub const VERTICAL_STEP: f64 = 12.0;

/// Post-hoc correction pass that removes any residual pixel overlap.
///
/// Earlier stages alone do not establish the no-overlap guarantee (two
/// half-columns can sit closer than a full card width), so this pass is
/// mandatory, not polish. Cards are partitioned by side of the axis;
/// within a side, colliding pairs from different half-columns are first
/// nudged apart horizontally — moving the whole half-column so cards
/// sharing a cluster keep identical X — and only same-cluster pairs or
/// infeasible nudges fall back to a vertical outward step. Whatever the
/// bounded passes leave intersecting is separated by a final vertical
/// sweep, so the side is always overlap-free on return.
pub fn resolve_collisions(cards: &mut [PositionedCard], config: &LayoutConfig) {
    let above: Vec<usize> = (0..cards.len())
        .filter(|&i| cards[i].y < config.axis_y)
        .collect();
    let below: Vec<usize> = (0..cards.len())
        .filter(|&i| cards[i].y >= config.axis_y)
        .collect();
    resolve_side(cards, &above, config, -1.0);
    resolve_side(cards, &below, config, 1.0);
}

fn resolve_side(cards: &mut [PositionedCard], side: &[usize], config: &LayoutConfig, sign: f64) {
    for _ in 0..config.max_resolution_passes {
        let pairs = colliding_pairs(cards, side);
        if pairs.is_empty() {
            break;
        }
        for (i, j) in pairs {
            // An earlier move this pass may already have separated them.
            if !cards[i].rect().intersects(&cards[j].rect()) {
                continue;
            }
            if cards[i].cluster_id != cards[j].cluster_id && try_horizontal_nudge(cards, i, j, config)
            {
                continue;
            }
            vertical_step(cards, i, j, sign);
        }
    }
    separate_residual(cards, side, config, sign);
}

/// Terminal sweep: re-stack any cards the nudge passes left intersecting,
/// inner cards first, pushing each one outward until it clears everything
/// already placed. X positions never change here, so cluster alignment
/// survives. Each move strictly increases a card's distance from the
/// axis past a placed card's outer edge, so the sweep terminates.
fn separate_residual(cards: &mut [PositionedCard], side: &[usize], config: &LayoutConfig, sign: f64) {
    if colliding_pairs(cards, side).is_empty() {
        return;
    }
    let mut order: Vec<usize> = side.to_vec();
    order.sort_by(|&a, &b| {
        inner_distance(&cards[a], config.axis_y, sign)
            .total_cmp(&inner_distance(&cards[b], config.axis_y, sign))
            .then_with(|| cards[a].x.total_cmp(&cards[b].x))
            .then_with(|| cards[a].id.cmp(&cards[b].id))
    });

    let mut placed: Vec<usize> = Vec::with_capacity(order.len());
    for idx in order {
        loop {
            let r = cards[idx].rect();
            let mut shift: Option<f64> = None;
            for &p in &placed {
                let rp = cards[p].rect();
                if r.intersects(&rp) {
                    let needed = if sign < 0.0 {
                        r.bottom() - rp.y
                    } else {
                        rp.bottom() - r.y
                    };
                    shift = Some(shift.map_or(needed, |s| s.max(needed)));
                }
            }
            let Some(needed) = shift else {
                break;
            };
            let steps = (needed / VERTICAL_STEP).ceil().max(1.0);
            cards[idx].y += sign * steps * VERTICAL_STEP;
        }
        placed.push(idx);
    }
}

fn inner_distance(card: &PositionedCard, axis_y: f64, sign: f64) -> f64 {
    if sign < 0.0 {
        axis_y - card.rect().bottom()
    } else {
        card.rect().y - axis_y
    }
}

/// Candidate pairs via a spatial hash: each card registers in every cell
/// its rect covers; only cards sharing a cell are tested. Amortized O(n)
/// instead of O(n²) pairwise checks.
fn colliding_pairs(cards: &[PositionedCard], side: &[usize]) -> Vec<(usize, usize)> {
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for &idx in side {
        let r = cards[idx].rect();
        let cx0 = (r.x / CELL_SIZE).floor() as i64;
        let cx1 = (r.right() / CELL_SIZE).floor() as i64;
        let cy0 = (r.y / CELL_SIZE).floor() as i64;
        let cy1 = (r.bottom() / CELL_SIZE).floor() as i64;
        for cx in cx0..=cx1 {
            for cy in cy0..=cy1 {
                grid.entry((cx, cy)).or_default().push(idx);
            }
        }
    }

    let mut pairs: BTreeSet<(usize, usize)> = BTreeSet::new();
    for bucket in grid.values() {
        for (a, &i) in bucket.iter().enumerate() {
            for &j in &bucket[a + 1..] {
                let (lo, hi) = if i < j { (i, j) } else { (j, i) };
                if cards[lo].rect().intersects(&cards[hi].rect()) {
                    pairs.insert((lo, hi));
                }
            }
        }
    }
    pairs.into_iter().collect()
}

/// Try to move the smaller (tie: later) card's whole half-column away
/// from the other card horizontally. Fails when any card of that column
/// would cross a viewport margin or enter the reserved safe zone.
fn try_horizontal_nudge(
    cards: &mut [PositionedCard],
    i: usize,
    j: usize,
    config: &LayoutConfig,
) -> bool {
    let area = |c: &PositionedCard| c.width * c.height;
    let (mover, other) = if area(&cards[i]) < area(&cards[j]) {
        (i, j)
    } else if area(&cards[j]) < area(&cards[i]) {
        (j, i)
    } else {
        (i.max(j), i.min(j))
    };

    let ri = cards[mover].rect();
    let rj = cards[other].rect();
    let overlap_x = ri.right().min(rj.right()) - ri.x.max(rj.x);
    let dx = if cards[mover].x >= cards[other].x {
        overlap_x + config.card_spacing
    } else {
        -(overlap_x + config.card_spacing)
    };

    let cluster = cards[mover].cluster_id.clone();
    let feasible = cards
        .iter()
        .filter(|c| c.cluster_id == cluster)
        .all(|c| {
            let moved = Rect::new(
                c.x - c.width / 2.0 + dx,
                c.y,
                c.width,
                c.height,
            );
            moved.x >= config.margin_left
                && moved.right() <= config.viewport_width - config.margin_right
                && !moved.intersects(&config.safe_zone)
        });
    if !feasible {
        return false;
    }
    for card in cards.iter_mut().filter(|c| c.cluster_id == cluster) {
        card.x += dx;
    }
    true
}

/// Push the outer card of the pair further outward, in fixed-step
/// increments, far enough to clear the overlap.
fn vertical_step(cards: &mut [PositionedCard], i: usize, j: usize, sign: f64) {
    let ri = cards[i].rect();
    let rj = cards[j].rect();
    let overlap_y = ri.bottom().min(rj.bottom()) - ri.y.max(rj.y);
    let steps = (overlap_y / VERTICAL_STEP).ceil().max(1.0);
    let outer = if sign < 0.0 {
        if ri.y <= rj.y { i } else { j }
    } else if ri.y >= rj.y {
        i
    } else {
        j
    };
    cards[outer].y += sign * steps * VERTICAL_STEP;
}
