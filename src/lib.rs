//! Raw switch-matrix scanning with optional software debounce.
//!
//! A keyboard or keypad wired as a row/column grid can be resolved with only
//! `R + C` GPIO lines by strobing one row at a time and sensing every column.
//! This crate owns that loop: it samples the grid, filters contact bounce,
//! and batches stable open/closed transitions into bounded handler calls,
//! tagging each switch with a stable 1-based scancode assigned row-major.
//!
//! The crate never allocates, never blocks, and never suspends: one call to
//! [`SwitchMatrixScanner::scan`] performs exactly one pass over the grid and
//! delivers every event it generated before returning. It is meant to be
//! driven from a cooperative polling loop at a fixed period.
//!
//! The physical pin layer is injected through the [`GpioPort`] trait, so the
//! scanner runs unchanged on any HAL (or on a host-side mock in tests).
//!
//! ```ignore
//! let mut scanner: SwitchMatrixScanner<_, 2, 7> = SwitchMatrixScanner::new(
//!     port,
//!     [14, 15],                      // row pins
//!     [2, 3, 4, 5, 6, 7, 8],        // column pins
//!     ScannerConfig::default(),
//! );
//! scanner.setup(Some(&mut on_key_down), Some(&mut on_key_up));
//! loop {
//!     scanner.scan();
//!     // sleep until the next scan tick
//! }
//! ```
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod debounce;
pub mod event;
pub mod gpio;
pub mod scanner;

pub use event::{INVALID_SCANCODE, Scancode, SwitchHandler};
pub use gpio::{GpioPort, PinId, PinMode, PinState};
pub use scanner::{DEFAULT_EVENT_BUFFER_SIZE, ScannerConfig, SwitchMatrixScanner, SwitchState};
