//! The GPIO capability consumed by the scanner.
//!
//! Matrix scanning needs three primitive pin operations: switching a pin
//! between input and output, driving it, and sampling it. Rows must go back
//! to high impedance after being strobed, which rules out the owned per-pin
//! `embedded-hal` digital traits, so the whole port is injected as one trait
//! object addressed by pin id instead. Levels still use the `embedded-hal`
//! [`PinState`] vocabulary.

pub use embedded_hal::digital::PinState;

/// Platform pin identifier, as passed to the scanner's constructor.
pub type PinId = u8;

/// Direction/pull configuration of a single pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating (high impedance) input.
    Input,
    /// Input with the internal pull-up enabled.
    InputPullup,
    /// Push-pull output.
    Output,
}

/// Digital I/O port the scanner drives.
///
/// All operations are infallible: a pin read always yields one of the two
/// defined levels, and mode changes either take effect or the port
/// implementation has a bug the scanner cannot recover from. Implementations
/// must not block.
pub trait GpioPort {
    /// Configure the direction/pull mode of `pin`.
    fn set_pin_mode(&mut self, pin: PinId, mode: PinMode);

    /// Drive `pin` to `level`. Only called on row pins, and only while the
    /// pin is in [`PinMode::Output`].
    fn write_pin(&mut self, pin: PinId, level: PinState);

    /// Sample the current level of `pin`. Only called on column pins while
    /// they are in an input mode.
    fn read_pin(&mut self, pin: PinId) -> PinState;
}
