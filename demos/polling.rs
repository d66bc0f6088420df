//! Host-runnable sketch: a scripted 2x3 grid polled from a plain loop.
//!
//! Run with `cargo run --example polling`. A real firmware would implement
//! [`GpioPort`] on top of its HAL and call `scan()` from a timer-paced loop.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use switch_matrix::{
    GpioPort, PinId, PinMode, PinState, Scancode, ScannerConfig, SwitchMatrixScanner,
};

/// Pretend matrix: a column reads low while a closed switch ties it to the
/// row currently strobed low.
#[derive(Clone, Default)]
struct ScriptedMatrix {
    closed: Rc<RefCell<HashSet<(PinId, PinId)>>>,
    driven_low: Rc<RefCell<HashSet<PinId>>>,
}

impl GpioPort for ScriptedMatrix {
    fn set_pin_mode(&mut self, pin: PinId, mode: PinMode) {
        if mode != PinMode::Output {
            self.driven_low.borrow_mut().remove(&pin);
        }
    }

    fn write_pin(&mut self, pin: PinId, level: PinState) {
        if level == PinState::Low {
            self.driven_low.borrow_mut().insert(pin);
        } else {
            self.driven_low.borrow_mut().remove(&pin);
        }
    }

    fn read_pin(&mut self, pin: PinId) -> PinState {
        let driven = self.driven_low.borrow();
        let low = self
            .closed
            .borrow()
            .iter()
            .any(|&(row, col)| col == pin && driven.contains(&row));
        if low { PinState::Low } else { PinState::High }
    }
}

const KEYMAP: [char; 6] = ['a', 'b', 'c', 'd', 'e', 'f'];

fn main() {
    env_logger::init();

    let matrix = ScriptedMatrix::default();
    let mut on_key_down = |scancodes: &[Scancode]| {
        for &scancode in scancodes {
            println!("down: '{}' (scancode {})", KEYMAP[scancode as usize - 1], scancode);
        }
    };
    let mut on_key_up = |scancodes: &[Scancode]| {
        for &scancode in scancodes {
            println!("up:   '{}' (scancode {})", KEYMAP[scancode as usize - 1], scancode);
        }
    };

    let mut scanner: SwitchMatrixScanner<ScriptedMatrix, 2, 3> = SwitchMatrixScanner::new(
        matrix.clone(),
        [14, 15],
        [2, 3, 4],
        ScannerConfig::default(),
    );
    scanner.setup(Some(&mut on_key_down), Some(&mut on_key_up));

    // Script: tap the switch at row 1, column 0 ('d') for a while.
    for pass in 0..40 {
        if pass == 5 {
            matrix.closed.borrow_mut().insert((15, 2));
        }
        if pass == 25 {
            matrix.closed.borrow_mut().remove(&(15, 2));
        }
        scanner.scan();
    }
}
