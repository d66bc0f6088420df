//! Scancodes, event handlers and the fixed-capacity event batcher.

use heapless::Vec;

/// Stable 1-based identifier of a switch, assigned row-major at
/// construction. `0` is reserved and never assigned.
pub type Scancode = u16;

/// The reserved "no such switch" scancode.
pub const INVALID_SCANCODE: Scancode = 0;

/// Handler invoked inline from [`scan`](crate::SwitchMatrixScanner::scan)
/// with a batch of 1 to `EVENT_BUFFER_SIZE` scancodes. Handlers must not
/// block: they run on the scan path and delay the current pass.
pub type SwitchHandler<'h> = &'h mut dyn FnMut(&[Scancode]);

/// Fixed-capacity scancode batch for one event kind.
///
/// The scanner flushes a buffer the moment it fills mid-pass and again
/// unconditionally at the end of every pass, so `push` can never meet a full
/// buffer and no event survives a pass.
pub(crate) struct EventBuffer<const N: usize> {
    scancodes: Vec<Scancode, N>,
}

impl<const N: usize> EventBuffer<N> {
    pub const fn new() -> Self {
        EventBuffer { scancodes: Vec::new() }
    }

    pub fn push(&mut self, scancode: Scancode) {
        if self.scancodes.push(scancode).is_err() {
            // Unreachable as long as scan() flushes at capacity; losing an
            // event is still better than corrupting the buffer.
            error!("event buffer overflow, dropping scancode {}", scancode);
        }
    }

    pub fn is_full(&self) -> bool {
        self.scancodes.is_full()
    }

    /// Deliver and clear the pending batch. Does nothing when empty; never
    /// invokes the handler with zero scancodes. The batch is dropped when no
    /// handler is registered.
    pub fn flush(&mut self, handler: &mut Option<SwitchHandler<'_>>) {
        if self.scancodes.is_empty() {
            return;
        }
        if let Some(handler) = handler.as_mut() {
            handler(self.scancodes.as_slice());
        }
        self.scancodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_delivers_batch_and_clears() {
        let mut buffer: EventBuffer<4> = EventBuffer::new();
        buffer.push(1);
        buffer.push(3);

        let mut seen: std::vec::Vec<Scancode> = std::vec::Vec::new();
        let mut calls = 0;
        {
            let mut handler = |scancodes: &[Scancode]| {
                calls += 1;
                seen.extend_from_slice(scancodes);
            };
            let mut slot: Option<SwitchHandler> = Some(&mut handler);
            buffer.flush(&mut slot);
            // Second flush is a no-op on the emptied buffer
            buffer.flush(&mut slot);
        }
        assert_eq!(calls, 1);
        assert_eq!(seen, [1, 3]);
        assert!(!buffer.is_full());
    }

    #[test]
    fn empty_flush_never_invokes_handler() {
        let mut buffer: EventBuffer<2> = EventBuffer::new();
        let mut handler = |_: &[Scancode]| panic!("handler invoked with no events");
        let mut slot: Option<SwitchHandler> = Some(&mut handler);
        buffer.flush(&mut slot);
    }

    #[test]
    fn flush_without_handler_drops_batch() {
        let mut buffer: EventBuffer<2> = EventBuffer::new();
        buffer.push(7);
        buffer.push(8);
        assert!(buffer.is_full());
        buffer.flush(&mut None);
        assert!(!buffer.is_full());
    }
}
