//! Pure slot arithmetic. Everything here works on one day's slot list.

use std::collections::HashSet;

use chrono::NaiveTime;

use crate::models::catalog::SlotLabel;

/// Day slots that are not occupied, in day order.
///
/// With a `cutoff`, only slots starting strictly after it are kept.
pub fn free_slots(
    day_slots: &[SlotLabel],
    occupied: &HashSet<SlotLabel>,
    cutoff: Option<NaiveTime>,
) -> Vec<SlotLabel> {
    day_slots
        .iter()
        .filter(|slot| !occupied.contains(slot))
        .filter(|slot| cutoff.is_none_or(|now| slot.starts_after(now)))
        .copied()
        .collect()
}

/// Slots that can start a service spanning `needed` consecutive slots.
///
/// Consecutive means adjacent in `day_slots`; the run must be entirely free.
/// A run cannot extend past the day's last slot.
pub fn bookable_starts(day_slots: &[SlotLabel], free: &[SlotLabel], needed: usize) -> Vec<SlotLabel> {
    let needed = needed.max(1);
    let free: HashSet<&SlotLabel> = free.iter().collect();

    day_slots
        .windows(needed)
        .filter(|run| run.iter().all(|slot| free.contains(slot)))
        .map(|run| run[0])
        .collect()
}
