use super::Tick;

/// Picks the dominant channel of a snapshot, if it stands out enough to be a
/// finger.
///
/// A contact is reported at the strongest channel only when it exceeds twice
/// the mean of all channels; uniform ambient noise never qualifies. The first
/// channel wins ties.
pub fn locate_finger(values: &[u16]) -> Option<u8> {
    let mut sum = 0u32;
    let mut max = 0u16;
    let mut max_index = 0usize;
    for (index, &value) in values.iter().enumerate() {
        sum += u32::from(value);
        if value > max {
            max = value;
            max_index = index;
        }
    }

    // max > 2 * (sum / n), kept in integers.
    let count = values.len() as u32;
    if count == 0 || u32::from(max) * count <= 2 * sum {
        return None;
    }
    u8::try_from(max_index).ok()
}

/// Bookkeeping for one continuous contact, from touch start until its release
/// has been classified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchEpisode {
    start_tick: Tick,
    moved: bool,
    touching: bool,
    release_pending: bool,
}

/// What a finished contact looked like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpisodeSummary {
    pub duration_ticks: u32,
    pub moved: bool,
}

impl TouchEpisode {
    fn begin(&mut self, now: Tick) {
        self.start_tick = now;
        self.moved = false;
        self.touching = true;
        self.release_pending = false;
    }

    fn end(&mut self) {
        self.touching = false;
        self.release_pending = true;
    }

    fn mark_moved(&mut self) {
        self.moved = true;
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }

    /// Hands a pending release to the tap classifier exactly once.
    pub fn take_release(&mut self, now: Tick) -> Option<EpisodeSummary> {
        if self.touching || !self.release_pending {
            return None;
        }
        self.release_pending = false;
        Some(EpisodeSummary {
            duration_ticks: now.wrapping_sub(self.start_tick),
            moved: self.moved,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of feeding one snapshot to the detector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Detection {
    pub position: Option<u8>,
    pub previous: Option<u8>,
    pub touch_started: bool,
}

impl Detection {
    /// Channel displacement `old - new` when the finger jumped between two
    /// distinct valid positions this tick.
    pub fn displacement(&self) -> Option<i32> {
        match (self.previous, self.position) {
            (Some(old), Some(new)) if old != new => Some(i32::from(old) - i32::from(new)),
            _ => None,
        }
    }
}

/// Turns snapshots into finger positions and keeps the touch episode current.
#[derive(Clone, Copy, Debug, Default)]
pub struct FingerPositionDetector {
    previous: Option<u8>,
    episode: TouchEpisode,
}

impl FingerPositionDetector {
    pub const fn new() -> Self {
        Self {
            previous: None,
            episode: TouchEpisode {
                start_tick: 0,
                moved: false,
                touching: false,
                release_pending: false,
            },
        }
    }

    pub fn sample(&mut self, values: &[u16], now: Tick) -> Detection {
        let position = locate_finger(values);
        let mut touch_started = false;

        match (position.is_some(), self.episode.is_touching()) {
            (true, false) => {
                self.episode.begin(now);
                touch_started = true;
            }
            (false, true) => self.episode.end(),
            _ => {}
        }

        let detection = Detection {
            position,
            previous: self.previous,
            touch_started,
        };
        if detection.displacement().is_some() {
            self.episode.mark_moved();
        }

        self.previous = position;
        detection
    }

    pub fn episode_mut(&mut self) -> &mut TouchEpisode {
        &mut self.episode
    }

    pub fn reset(&mut self) {
        self.previous = None;
        self.episode.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dominant_channel_is_reported() {
        assert_eq!(locate_finger(&[10, 10, 90, 10]), Some(2));
        assert_eq!(locate_finger(&[5, 0, 0, 0]), Some(0));
    }

    #[test]
    fn uniform_or_silent_strip_is_no_touch() {
        assert_eq!(locate_finger(&[40, 40, 40, 40]), None);
        assert_eq!(locate_finger(&[0, 0, 0, 0]), None);
        assert_eq!(locate_finger(&[]), None);
    }

    #[test]
    fn exactly_twice_the_mean_is_not_a_touch() {
        // mean = 4, max = 8
        assert_eq!(locate_finger(&[8, 4, 2, 2]), None);
        assert_eq!(locate_finger(&[9, 4, 2, 2]), Some(0));
    }

    #[test]
    fn fractional_mean_is_compared_exactly() {
        // mean = 3.75, 2 * mean = 7.5
        assert_eq!(locate_finger(&[7, 3, 3, 2]), None);
        assert_eq!(locate_finger(&[9, 3, 3, 2]), Some(0));
    }

    #[test]
    fn first_channel_wins_ties() {
        assert_eq!(locate_finger(&[0, 50, 0, 50, 0, 0, 0, 0]), Some(1));
    }

    #[test]
    fn episode_tracks_start_motion_and_release() {
        let mut detector = FingerPositionDetector::new();

        let first = detector.sample(&[0, 90, 0, 0], 7);
        assert!(first.touch_started);
        assert_eq!(first.displacement(), None);

        let moved = detector.sample(&[0, 0, 90, 0], 8);
        assert!(!moved.touch_started);
        assert_eq!(moved.displacement(), Some(-1));

        assert_eq!(detector.episode_mut().take_release(9), None);
        let released = detector.sample(&[0, 0, 0, 0], 12);
        assert_eq!(released.position, None);
        assert_eq!(released.displacement(), None);

        assert_eq!(
            detector.episode_mut().take_release(12),
            Some(EpisodeSummary {
                duration_ticks: 5,
                moved: true,
            })
        );
        assert_eq!(detector.episode_mut().take_release(13), None);
    }

    #[test]
    fn new_contact_clears_moved_flag() {
        let mut detector = FingerPositionDetector::new();
        detector.sample(&[90, 0, 0, 0], 1);
        detector.sample(&[0, 90, 0, 0], 2);
        detector.sample(&[0, 0, 0, 0], 3);
        let _ = detector.episode_mut().take_release(3);

        detector.sample(&[0, 0, 90, 0], 10);
        detector.sample(&[0, 0, 0, 0], 12);
        assert_eq!(
            detector.episode_mut().take_release(12),
            Some(EpisodeSummary {
                duration_ticks: 2,
                moved: false,
            })
        );
    }
}
