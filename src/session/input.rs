use crate::snap::SnapModifiers;

/// Control state sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputFrame {
    /// Whether input may be read this tick (e.g. no menu has focus).
    pub readable: bool,
    /// Primary (place) control.
    pub primary_held: bool,
    /// Delete control.
    pub delete_held: bool,
    /// Snap-to-grid modifier.
    pub snap_to_grid: bool,
    /// Direction/length/angle snap modifiers.
    pub modifiers: SnapModifiers,
}

/// Classified primary-control gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    None,
    /// Released before the hold threshold.
    Click,
    /// Held until the hold threshold.
    Hold,
}

/// Press/hold/click classifier with release debouncing.
#[derive(Debug, Default)]
pub struct TriggerTracker {
    ticks_held: u32,
    ignoring: bool,
    ignored_ticks: u32,
}

impl TriggerTracker {
    /// Feeds one tick of the primary control.
    pub fn update(&mut self, held: bool, hold_ticks: u32) -> Trigger {
        if self.ignoring {
            if held {
                self.ignored_ticks = self.ignored_ticks.saturating_add(1);
            } else {
                self.ignoring = false;
                self.ignored_ticks = 0;
            }
            return Trigger::None;
        }

        if held {
            self.ticks_held = self.ticks_held.saturating_add(1);
            if self.ticks_held == hold_ticks {
                return Trigger::Hold;
            }
            Trigger::None
        } else {
            let held_for = std::mem::take(&mut self.ticks_held);
            if held_for > 0 && held_for < hold_ticks {
                Trigger::Click
            } else {
                Trigger::None
            }
        }
    }

    /// Swallows the rest of the current press.
    pub fn ignore_until_release(&mut self) {
        self.ignoring = true;
        self.ignored_ticks = 0;
        self.ticks_held = 0;
    }

    #[must_use]
    pub fn is_ignoring(&self) -> bool {
        self.ignoring
    }

    /// Ticks the control has stayed down while being ignored.
    #[must_use]
    pub fn ignored_ticks(&self) -> u32 {
        self.ignored_ticks
    }

    #[must_use]
    pub fn ticks_held(&self) -> u32 {
        self.ticks_held
    }
}

/// Classified delete-control gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTrigger {
    None,
    /// Released before the clear-all threshold.
    Tap,
    /// Held until the clear-all threshold. Fires once per press.
    ClearAll,
}

#[derive(Debug, Default)]
pub struct DeleteTracker {
    ticks_held: u32,
    fired: bool,
}

impl DeleteTracker {
    /// Feeds one tick of the delete control.
    pub fn update(&mut self, held: bool, clear_ticks: u32) -> DeleteTrigger {
        if held {
            if self.fired {
                return DeleteTrigger::None;
            }
            self.ticks_held += 1;
            if self.ticks_held >= clear_ticks {
                self.fired = true;
                self.ticks_held = 0;
                return DeleteTrigger::ClearAll;
            }
            return DeleteTrigger::None;
        }

        self.fired = false;
        if std::mem::take(&mut self.ticks_held) > 0 {
            DeleteTrigger::Tap
        } else {
            DeleteTrigger::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &mut TriggerTracker, held: &[bool]) -> Vec<Trigger> {
        held.iter().map(|h| tracker.update(*h, 30)).collect()
    }

    #[test]
    fn short_press_is_a_click_on_release() {
        let mut tracker = TriggerTracker::default();
        let out = feed(&mut tracker, &[true, true, true, false]);
        assert_eq!(out, vec![Trigger::None, Trigger::None, Trigger::None, Trigger::Click]);
    }

    #[test]
    fn thirty_ticks_is_a_hold() {
        let mut tracker = TriggerTracker::default();
        for _ in 0..29 {
            assert_eq!(tracker.update(true, 30), Trigger::None);
        }
        assert_eq!(tracker.update(true, 30), Trigger::Hold);
        assert_eq!(tracker.ticks_held(), 30);
    }

    #[test]
    fn long_press_fires_one_hold_and_no_click() {
        let mut tracker = TriggerTracker::default();
        let mut held = vec![true; 65];
        held.push(false);
        let fired: Vec<Trigger> = feed(&mut tracker, &held)
            .into_iter()
            .filter(|t| *t != Trigger::None)
            .collect();
        assert_eq!(fired, vec![Trigger::Hold]);
        assert_eq!(tracker.ticks_held(), 0);
    }

    #[test]
    fn release_without_press_is_nothing() {
        let mut tracker = TriggerTracker::default();
        assert_eq!(tracker.update(false, 30), Trigger::None);
    }

    #[test]
    fn ignored_press_does_not_fire_again() {
        let mut tracker = TriggerTracker::default();
        for _ in 0..30 {
            tracker.update(true, 30);
        }
        tracker.ignore_until_release();
        for _ in 0..100 {
            assert_eq!(tracker.update(true, 30), Trigger::None);
        }
        assert_eq!(tracker.ignored_ticks(), 100);
        assert_eq!(tracker.update(false, 30), Trigger::None);
        assert!(!tracker.is_ignoring());
        assert_eq!(feed(&mut tracker, &[true, false]), vec![Trigger::None, Trigger::Click]);
    }

    #[test]
    fn delete_tap_and_hold() {
        let mut tracker = DeleteTracker::default();
        assert_eq!(tracker.update(true, 40), DeleteTrigger::None);
        assert_eq!(tracker.update(false, 40), DeleteTrigger::Tap);

        for _ in 0..39 {
            assert_eq!(tracker.update(true, 40), DeleteTrigger::None);
        }
        assert_eq!(tracker.update(true, 40), DeleteTrigger::ClearAll);
        assert_eq!(tracker.update(true, 40), DeleteTrigger::None);
        assert_eq!(tracker.update(false, 40), DeleteTrigger::None);
    }
}
