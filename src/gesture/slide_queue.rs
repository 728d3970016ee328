use crate::config::SLIDE_QUEUE_LEN;

const NEWEST: usize = 0;
const OLDEST: usize = SLIDE_QUEUE_LEN - 1;

/// Short history of per-tick slide deltas.
///
/// Deltas enter at the newest slot and leave from the oldest one a few ticks
/// later. Before each emission the queue is collapsed so that everything in it
/// points the same way: a finger wobbling between two channels nets out
/// instead of producing alternating up/down reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlideQueue {
    slots: [i8; SLIDE_QUEUE_LEN],
}

impl SlideQueue {
    pub const fn new() -> Self {
        Self {
            slots: [0; SLIDE_QUEUE_LEN],
        }
    }

    /// Slot 0 is the newest entry, the last slot the oldest.
    pub fn slots(&self) -> [i8; SLIDE_QUEUE_LEN] {
        self.slots
    }

    pub fn push(&mut self, delta: i8) {
        self.slots[NEWEST] = delta;
    }

    pub fn optimize(&mut self) {
        let mut positives = 0i32;
        let mut negatives = 0i32;
        for &slot in &self.slots {
            let value = i32::from(slot);
            if value > 0 {
                positives += value;
            } else {
                negatives -= value;
            }
        }

        // `side` is the minority direction; its entries are dropped and the same
        // amount is taken back out of the majority entries.
        let (side, mut correction) = if positives > negatives {
            (-1i32, negatives)
        } else {
            (1i32, positives)
        };

        for slot in &mut self.slots {
            if i32::from(*slot) * side > 0 {
                *slot = 0;
            }
        }

        for slot in self.slots.iter_mut().rev() {
            if correction == 0 {
                break;
            }
            let value = i32::from(*slot);
            let taken = correction.min(value.abs());
            *slot = (value + taken * side) as i8;
            correction -= taken;
        }
    }

    /// Pops this tick's change off the oldest end.
    pub fn emit(&mut self) -> i8 {
        let change = self.slots[OLDEST];
        self.slots.copy_within(NEWEST..OLDEST, NEWEST + 1);
        self.slots[NEWEST] = 0;
        change
    }

    pub fn reset(&mut self) {
        self.slots = [0; SLIDE_QUEUE_LEN];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(slots: [i8; SLIDE_QUEUE_LEN]) -> SlideQueue {
        SlideQueue { slots }
    }

    #[test]
    fn minority_direction_is_absorbed_oldest_first() {
        let mut q = queue([3, 0, -1, 2]);
        q.optimize();
        assert_eq!(q.slots(), [3, 0, 0, 1]);
    }

    #[test]
    fn correction_spills_into_newer_slots() {
        let mut q = queue([-4, -1, 2, -1]);
        q.optimize();
        assert_eq!(q.slots(), [-4, 0, 0, 0]);
    }

    #[test]
    fn balanced_queue_cancels_out() {
        let mut q = queue([2, 0, 0, -2]);
        q.optimize();
        assert_eq!(q.slots(), [0; SLIDE_QUEUE_LEN]);
    }

    #[test]
    fn one_directional_queue_is_untouched() {
        let mut q = queue([1, 2, 0, 3]);
        q.optimize();
        assert_eq!(q.slots(), [1, 2, 0, 3]);

        let mut q = queue([-1, 0, -5, 0]);
        q.optimize();
        assert_eq!(q.slots(), [-1, 0, -5, 0]);
    }

    #[test]
    fn pushed_delta_surfaces_after_three_shifts() {
        let mut q = SlideQueue::new();
        q.push(-5);
        let mut emitted = [0i8; 4];
        for slot in &mut emitted {
            q.optimize();
            *slot = q.emit();
        }
        assert_eq!(emitted, [0, 0, 0, -5]);
        assert_eq!(q.slots(), [0; SLIDE_QUEUE_LEN]);
    }

    #[test]
    fn jitter_nets_to_single_direction() {
        let mut q = SlideQueue::new();
        let mut emitted = std::vec::Vec::new();
        for delta in [1i8, -1, 1, 1, 0, 0, 0, 0] {
            if delta != 0 {
                q.push(delta);
            }
            q.optimize();
            emitted.push(q.emit());
        }
        assert!(emitted.iter().all(|&change| change >= 0));
        assert_eq!(emitted.iter().map(|&c| i32::from(c)).sum::<i32>(), 2);
    }
}
