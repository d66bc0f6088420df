//! Per-switch sample history and software debounce.
//!
//! Each switch carries one byte of filter state, split into two bit-fields:
//! a saturating *settle counter* in the high bits and a shifting *sample
//! window* in the low bits. The settle counter is a cooldown that runs for a
//! few scans after every accepted transition; while it is counting up, raw
//! samples are discarded and the window is left untouched, which suppresses
//! the chatter that immediately follows a contact flip. Once the counter
//! saturates, every scan shifts the newest raw sample into the window. A
//! transition is only accepted when the whole window agrees (all pressed or
//! all released), see [`crate::scanner`].

/// Scans a switch must sit in the settle cooldown after a transition.
pub const SETTLE_SATURATION: u8 = 4;

const SETTLE_BITS: u8 = 3;
const SAMPLE_BITS: u8 = 5;

const SETTLE_SHIFT: u8 = SAMPLE_BITS;
const SETTLE_MASK: u8 = ((1 << SETTLE_BITS) - 1) << SETTLE_SHIFT;
const SAMPLE_MASK: u8 = (1 << SAMPLE_BITS) - 1;

const _: () = assert!(
    SETTLE_SATURATION <= (1 << SETTLE_BITS) - 1,
    "SETTLE_SATURATION must fit in SETTLE_BITS bits"
);
const _: () = assert!(SETTLE_BITS + SAMPLE_BITS <= 8, "bit-fields must share one byte");

/// Packed settle-counter/sample-window state of a single switch.
///
/// The zero value (empty window, zero settle count) is the power-up state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleHistory(u8);

impl SampleHistory {
    pub const fn new() -> Self {
        SampleHistory(0)
    }

    fn settle_count(self) -> u8 {
        (self.0 & SETTLE_MASK) >> SETTLE_SHIFT
    }

    fn window(self) -> u8 {
        self.0 & SAMPLE_MASK
    }

    /// Fold one raw sample in, with debounce filtering.
    ///
    /// While the settle counter is below saturation the sample is discarded
    /// and only the counter advances. At saturation the window shifts left
    /// and the new sample lands in the lowest bit.
    pub fn sample(&mut self, pressed: bool) {
        let settle = self.settle_count();
        if settle < SETTLE_SATURATION {
            self.0 = ((settle + 1) << SETTLE_SHIFT) | self.window();
        } else {
            self.0 = (settle << SETTLE_SHIFT) | (SAMPLE_MASK & (self.window() << 1)) | u8::from(pressed);
        }
    }

    /// Single-sample mode (debounce disabled): the window becomes uniformly
    /// the raw level and no settle counter is maintained.
    pub fn force(&mut self, pressed: bool) {
        self.0 = if pressed { SAMPLE_MASK } else { 0 };
    }

    /// Every tracked sample read "pressed".
    pub fn is_all_pressed(self) -> bool {
        self.window() == SAMPLE_MASK
    }

    /// Every tracked sample read "released".
    pub fn is_all_released(self) -> bool {
        self.window() == 0
    }

    /// Begin a fresh settle period: the counter is cleared, the window keeps
    /// the level that was just latched. Called on every accepted transition.
    pub fn restart_settle(&mut self) {
        self.0 = self.window();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_counter_discards_samples_until_saturated() {
        let mut history = SampleHistory::new();
        for _ in 0..SETTLE_SATURATION {
            history.sample(true);
            // Window untouched while the cooldown runs
            assert!(history.is_all_released());
        }
        assert_eq!(history.settle_count(), SETTLE_SATURATION);
    }

    #[test]
    fn window_fills_one_sample_per_scan_after_settle() {
        let mut history = SampleHistory::new();
        for _ in 0..SETTLE_SATURATION {
            history.sample(true);
        }
        for i in 0..SAMPLE_BITS {
            assert!(!history.is_all_pressed(), "converged after {} samples", i);
            history.sample(true);
        }
        assert!(history.is_all_pressed());
        // Counter stays saturated
        assert_eq!(history.settle_count(), SETTLE_SATURATION);
    }

    #[test]
    fn one_released_sample_breaks_agreement() {
        let mut history = SampleHistory::new();
        for _ in 0..SETTLE_SATURATION + SAMPLE_BITS {
            history.sample(true);
        }
        assert!(history.is_all_pressed());
        history.sample(false);
        assert!(!history.is_all_pressed());
        assert!(!history.is_all_released());
    }

    #[test]
    fn restart_settle_keeps_window() {
        let mut history = SampleHistory::new();
        for _ in 0..SETTLE_SATURATION + SAMPLE_BITS {
            history.sample(true);
        }
        history.restart_settle();
        assert_eq!(history.settle_count(), 0);
        assert!(history.is_all_pressed());
        // The next samples run the cooldown again
        history.sample(false);
        assert!(history.is_all_pressed());
    }

    #[test]
    fn force_overwrites_the_window() {
        let mut history = SampleHistory::new();
        history.force(true);
        assert!(history.is_all_pressed());
        history.force(false);
        assert!(history.is_all_released());
    }
}
