//! The matrix scanner: grid model, strobe pass and state queries.

use crate::debounce::SampleHistory;
use crate::event::{EventBuffer, INVALID_SCANCODE, Scancode, SwitchHandler};
use crate::gpio::{GpioPort, PinId, PinMode, PinState};

/// Event batch capacity used when the const parameter is left at its
/// default.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 16;

/// Latched logical state of one switch.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchState {
    /// Power-up state, left after the first stable reading and never
    /// re-entered.
    Unknown,
    Open,
    Closed,
}

#[derive(Copy, Clone, Debug)]
struct SwitchRecord {
    scancode: Scancode,
    state: SwitchState,
    history: SampleHistory,
}

/// Construction flags, immutable for the scanner's lifetime.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScannerConfig {
    /// Enable the internal pull-ups on the column pins. Disable when the
    /// board provides external pull-ups.
    pub enable_pullups: bool,
    /// Filter raw samples through the settle/window debounce logic. When
    /// disabled a single sample decides the switch state.
    pub software_debounce: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            enable_pullups: true,
            software_debounce: true,
        }
    }
}

/// Strobe scanner for a `ROWS` x `COLS` grid of momentary switches.
///
/// Scancodes are assigned row-major starting at 1; for a 3x3 grid:
///
/// ```text
///     +-----------+
///     | 1 | 2 | 3 |
///     +-----------+
///     | 4 | 5 | 6 |
///     +-----------+
///     | 7 | 8 | 9 |
///     +-----------+
/// ```
///
/// The grid is wired active-low: a closed switch connects its column line to
/// the driven-low row, so a column reading low while its row is strobed
/// means "pressed". All storage is fixed at compile time; the scanner never
/// allocates.
pub struct SwitchMatrixScanner<
    'h,
    G: GpioPort,
    const ROWS: usize,
    const COLS: usize,
    const EVENT_BUFFER_SIZE: usize = DEFAULT_EVENT_BUFFER_SIZE,
> {
    gpio: G,
    switch_map: [[SwitchRecord; COLS]; ROWS],
    row_pins: [PinId; ROWS],
    col_pins: [PinId; COLS],
    handler_closed: Option<SwitchHandler<'h>>,
    handler_open: Option<SwitchHandler<'h>>,
    column_input_mode: PinMode,
    software_debounce: bool,
    closed_events: EventBuffer<EVENT_BUFFER_SIZE>,
    opened_events: EventBuffer<EVENT_BUFFER_SIZE>,
}

impl<'h, G: GpioPort, const ROWS: usize, const COLS: usize, const EVENT_BUFFER_SIZE: usize>
    SwitchMatrixScanner<'h, G, ROWS, COLS, EVENT_BUFFER_SIZE>
{
    /// Create a scanner for the given pin assignment.
    ///
    /// Both pin lists are copied into the scanner; every switch starts in
    /// [`SwitchState::Unknown`] with an empty sample history. No pin is
    /// touched until [`setup`](Self::setup).
    pub fn new(gpio: G, row_pins: [PinId; ROWS], col_pins: [PinId; COLS], config: ScannerConfig) -> Self {
        // Evaluated during monomorphization; invalid dimensions fail the build.
        const {
            assert!(ROWS > 0, "ROWS cannot be 0");
            assert!(COLS > 0, "COLS cannot be 0");
            assert!(EVENT_BUFFER_SIZE > 0, "EVENT_BUFFER_SIZE cannot be 0");
            assert!(
                ROWS * COLS < Scancode::MAX as usize - 1,
                "grid exceeds the scancode identifier space"
            );
        }

        let mut switch_map = [[SwitchRecord {
            scancode: INVALID_SCANCODE,
            state: SwitchState::Unknown,
            history: SampleHistory::new(),
        }; COLS]; ROWS];
        let mut scancode: Scancode = 1;
        for row in switch_map.iter_mut() {
            for record in row.iter_mut() {
                record.scancode = scancode;
                scancode += 1;
            }
        }

        SwitchMatrixScanner {
            gpio,
            switch_map,
            row_pins,
            col_pins,
            handler_closed: None,
            handler_open: None,
            column_input_mode: if config.enable_pullups {
                PinMode::InputPullup
            } else {
                PinMode::Input
            },
            software_debounce: config.software_debounce,
            closed_events: EventBuffer::new(),
            opened_events: EventBuffer::new(),
        }
    }

    /// Configure pin directions and register the event handlers.
    ///
    /// Row pins go to floating input (they are only driven while strobed),
    /// column pins to the input mode chosen at construction. A `None`
    /// handler means events of that kind are silently dropped; calling
    /// `setup` again replaces both handlers.
    pub fn setup(
        &mut self,
        on_switch_closed: Option<SwitchHandler<'h>>,
        on_switch_open: Option<SwitchHandler<'h>>,
    ) {
        self.handler_closed = on_switch_closed;
        self.handler_open = on_switch_open;

        for &pin in self.row_pins.iter() {
            self.gpio.set_pin_mode(pin, PinMode::Input);
        }
        for &pin in self.col_pins.iter() {
            self.gpio.set_pin_mode(pin, self.column_input_mode);
        }
        info!("matrix ready: {} rows x {} cols", ROWS, COLS);
    }

    /// Run one full scan pass.
    ///
    /// Each row is driven low in turn while every column is sampled, then
    /// returned to high impedance. Transitions are appended to the matching
    /// event buffer; a buffer that fills mid-pass is flushed on the spot so
    /// memory stays bounded no matter how many switches flip in one pass.
    /// Both buffers are flushed before returning, so every event generated
    /// by the pass has been delivered when `scan` returns.
    pub fn scan(&mut self) {
        for row in 0..ROWS {
            let row_pin = self.row_pins[row];
            self.gpio.set_pin_mode(row_pin, PinMode::Output);
            self.gpio.write_pin(row_pin, PinState::Low);

            for col in 0..COLS {
                // Sample unconditionally so the timing per cell is identical
                // whichever debounce mode is active.
                let pressed = self.gpio.read_pin(self.col_pins[col]) == PinState::Low;
                let record = &mut self.switch_map[row][col];
                if self.software_debounce {
                    record.history.sample(pressed);
                } else {
                    record.history.force(pressed);
                }
                if Self::apply_transition(record, &mut self.closed_events, &mut self.opened_events) {
                    if self.closed_events.is_full() {
                        self.closed_events.flush(&mut self.handler_closed);
                    }
                    if self.opened_events.is_full() {
                        self.opened_events.flush(&mut self.handler_open);
                    }
                }
            }

            // Back to high impedance before the next row is strobed.
            self.gpio.set_pin_mode(row_pin, PinMode::Input);
        }

        self.closed_events.flush(&mut self.handler_closed);
        self.opened_events.flush(&mut self.handler_open);
    }

    /// Latched state for a scancode; `false` for scancode 0 or anything
    /// past the grid. Usable between scans by polling-style consumers that
    /// register no handlers.
    pub fn is_switch_closed(&self, scancode: Scancode) -> bool {
        if scancode == INVALID_SCANCODE {
            return false;
        }
        let index = (scancode - 1) as usize;
        if index >= ROWS * COLS {
            return false;
        }
        self.switch_map[index / COLS][index % COLS].state == SwitchState::Closed
    }

    /// The scancode assigned to a grid position, `None` out of range.
    pub fn scancode_at(&self, row: usize, col: usize) -> Option<Scancode> {
        if row < ROWS && col < COLS {
            Some(self.switch_map[row][col].scancode)
        } else {
            None
        }
    }

    /// Consume the scanner and hand the GPIO port back.
    pub fn release(self) -> G {
        self.gpio
    }

    /// Decide whether the cell's latched state flips, queueing the event.
    ///
    /// A window that is neither all-pressed nor all-released is still
    /// settling and produces nothing. The very first `Unknown -> Open`
    /// settle at power-up is silent (no spurious key-up at startup), while
    /// `Closed -> Open` always reports. Every accepted transition restarts
    /// the settle cooldown.
    fn apply_transition(
        record: &mut SwitchRecord,
        closed_events: &mut EventBuffer<EVENT_BUFFER_SIZE>,
        opened_events: &mut EventBuffer<EVENT_BUFFER_SIZE>,
    ) -> bool {
        if record.history.is_all_pressed() && record.state != SwitchState::Closed {
            record.state = SwitchState::Closed;
            closed_events.push(record.scancode);
            record.history.restart_settle();
            trace!("switch {} closed", record.scancode);
            true
        } else if record.history.is_all_released() && record.state != SwitchState::Open {
            let old_state = record.state;
            record.state = SwitchState::Open;
            record.history.restart_settle();
            if old_state == SwitchState::Closed {
                opened_events.push(record.scancode);
                trace!("switch {} opened", record.scancode);
                true
            } else {
                false
            }
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Port that reads every column as released; enough for the pure
    /// query-path tests.
    struct IdlePort;

    impl GpioPort for IdlePort {
        fn set_pin_mode(&mut self, _pin: PinId, _mode: PinMode) {}
        fn write_pin(&mut self, _pin: PinId, _level: PinState) {}
        fn read_pin(&mut self, _pin: PinId) -> PinState {
            PinState::High
        }
    }

    #[test]
    fn scancodes_are_dense_and_row_major() {
        let scanner: SwitchMatrixScanner<_, 2, 3> =
            SwitchMatrixScanner::new(IdlePort, [10, 11], [20, 21, 22], ScannerConfig::default());
        let mut expected: Scancode = 1;
        for row in 0..2 {
            for col in 0..3 {
                assert_eq!(scanner.scancode_at(row, col), Some(expected));
                expected += 1;
            }
        }
        assert_eq!(scanner.scancode_at(2, 0), None);
        assert_eq!(scanner.scancode_at(0, 3), None);
    }

    #[test]
    fn no_switch_is_closed_after_construction() {
        let scanner: SwitchMatrixScanner<_, 3, 3> =
            SwitchMatrixScanner::new(IdlePort, [0, 1, 2], [3, 4, 5], ScannerConfig::default());
        for scancode in 1..=9 {
            assert!(!scanner.is_switch_closed(scancode));
        }
    }

    #[test]
    fn query_is_bounds_checked() {
        let scanner: SwitchMatrixScanner<_, 2, 2> =
            SwitchMatrixScanner::new(IdlePort, [0, 1], [2, 3], ScannerConfig::default());
        assert!(!scanner.is_switch_closed(INVALID_SCANCODE));
        assert!(!scanner.is_switch_closed(5));
        assert!(!scanner.is_switch_closed(Scancode::MAX));
    }

    #[test]
    fn idle_scans_produce_no_events() {
        let mut closed = 0usize;
        let mut opened = 0usize;
        let mut on_closed = |_: &[Scancode]| closed += 1;
        let mut on_open = |_: &[Scancode]| opened += 1;
        {
            let mut scanner: SwitchMatrixScanner<_, 2, 2> =
                SwitchMatrixScanner::new(IdlePort, [0, 1], [2, 3], ScannerConfig::default());
            scanner.setup(Some(&mut on_closed), Some(&mut on_open));
            for _ in 0..20 {
                scanner.scan();
            }
        }
        // The initial Unknown -> Open settle is silent
        assert_eq!(closed, 0);
        assert_eq!(opened, 0);
    }
}
