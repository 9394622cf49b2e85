//! Register port trait
//!
//! The device exposes exactly two registers: a 16-bit control (selector)
//! register and an 8-bit data register. Implementations own an exclusively
//! reserved, already-mapped register region for the lifetime of a session.

/// Access to the selector/data register pair.
///
/// The device keeps an internal cursor per selected blob: writing the
/// selector resets it to offset 0, and every data-register read advances
/// it by one byte. The port itself is stateless beyond the mapping.
///
/// Register I/O cannot fail once the region is mapped; an I/O fault at
/// this level is a fatal hardware condition, not a recoverable error.
pub trait SelectorPort {
    /// Issue a single 16-bit little-endian write to the control register,
    /// selecting the blob identified by `key` and resetting the device
    /// cursor to offset 0.
    fn write_selector(&mut self, key: u16);

    /// Read one byte from the data register, advancing the device cursor.
    fn read_byte(&mut self) -> u8;

    /// Read `buf.len()` sequential bytes into `buf`, in order.
    ///
    /// Semantically equivalent to `buf.len()` calls to [`read_byte`];
    /// implementations may override this when the mapping allows a
    /// tighter loop.
    ///
    /// [`read_byte`]: SelectorPort::read_byte
    fn read_bytes(&mut self, buf: &mut [u8]) {
        for slot in buf.iter_mut() {
            *slot = self.read_byte();
        }
    }
}

// Blanket impl so backends can hand the session a type-erased port
#[cfg(feature = "alloc")]
impl SelectorPort for alloc::boxed::Box<dyn SelectorPort + Send> {
    fn write_selector(&mut self, key: u16) {
        (**self).write_selector(key)
    }

    fn read_byte(&mut self) -> u8 {
        (**self).read_byte()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) {
        (**self).read_bytes(buf)
    }
}
