//! Schedule / instance data model (spec §3) and random instance
//! generation, supplemented from `original_source/gen_instance.py`
//! (dropped by the distillation, not excluded by any Non-goal).

use derive_more::{From, Into};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::shapes::ShapeSet;

/// Dense index into a per-time-step table (`encoder::PlacementEncoder`'s
/// `pos_used`), following the teacher's newtype-per-index-space style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, From, Into)]
pub struct StepId(pub usize);

/// `(begin, end, shape_set)` with `0 <= begin < end`. `[begin, end)` is
/// the item's presence window.
#[derive(Clone, Debug)]
pub struct ScheduleItem {
    pub begin: usize,
    pub end: usize,
    pub shape: ShapeSet,
}

impl ScheduleItem {
    pub fn new(begin: usize, end: usize, shape: ShapeSet) -> Self {
        assert!(begin < end, "item window must be nonempty: {begin} >= {end}");
        ScheduleItem { begin, end, shape }
    }
}

/// An ordered list of schedule items plus the fixed geometry
/// parameters (spec §3).
#[derive(Clone, Debug)]
pub struct Instance {
    pub items: Vec<ScheduleItem>,
    pub height: usize,
    pub max_width: usize,
}

impl Instance {
    pub fn new(items: Vec<ScheduleItem>, height: usize, max_width: usize) -> Self {
        Instance { items, height, max_width }
    }

    /// `steps = max(end)` over items, 0 for an empty schedule.
    pub fn steps(&self) -> usize {
        self.items.iter().map(|item| item.end).max().unwrap_or(0)
    }
}

/// A schedule item as emitted to/loaded from JSON artifacts: shapes are
/// referenced by index into the caller's shape catalog rather than
/// inlined, keeping the file small and round-trippable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleItemRecord {
    pub begin: usize,
    pub end: usize,
    pub shape_index: usize,
}

/// Generate a random schedule of blocks (direct rendition of
/// `gen_instance.py`'s `random_instance`).
///
/// Greedily selects a not-yet-full time step, extends an interval
/// around it as far as the fill limit allows, picks a random duration
/// and sub-interval, and then a random shape that fits the remaining
/// margin — repeating until every step is at its fill limit.
pub fn random_instance(
    shapes: &[ShapeSet],
    steps: usize,
    max_fill: usize,
    max_duration: usize,
    seed: Option<u64>,
) -> Vec<(usize, usize, ShapeSet)> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut fill_levels = vec![0usize; steps];
    let min_shape_size = shapes
        .iter()
        .map(|s| s.orientations()[0].len())
        .min()
        .unwrap_or(0);
    let fill_limit = max_fill.saturating_sub(min_shape_size);

    let mut schedule: Vec<(usize, usize, ShapeSet)> = Vec::new();

    loop {
        let candidates: Vec<usize> = (0..steps).filter(|&i| fill_levels[i] <= fill_limit).collect();
        if candidates.is_empty() {
            break;
        }
        let selected = candidates[rng.gen_range(0..candidates.len())];

        let mut begin = selected;
        while begin > 0 && fill_levels[begin - 1] <= fill_limit {
            begin -= 1;
        }

        let mut end = selected + 1;
        while end < steps && fill_levels[end] <= fill_limit {
            end += 1;
        }

        let max_span = end - begin;
        let duration = rng.gen_range(1..=max_span).min(max_duration);

        let block_begin = begin + rng.gen_range(0..=(end - begin - duration));
        let block_end = block_begin + duration;

        let fill_level = (block_begin..block_end).map(|i| fill_levels[i]).max().unwrap();
        let margin = max_fill.saturating_sub(fill_level);

        let candidate_shapes: Vec<&ShapeSet> = shapes
            .iter()
            .filter(|s| s.orientations()[0].len() <= margin)
            .collect();
        if candidate_shapes.is_empty() {
            // No shape fits the remaining margin at this interval; this
            // step's fill level can't be moved further by this generator,
            // so stop growing the schedule rather than loop forever.
            break;
        }
        let chosen = candidate_shapes[rng.gen_range(0..candidate_shapes.len())].clone();

        let weight = chosen.orientations()[0].len();
        for i in block_begin..block_end {
            fill_levels[i] += weight;
        }

        schedule.push((block_begin, block_end, chosen));
    }

    schedule.sort_by_key(|(begin, end, _)| (*begin, *end));
    schedule
}
