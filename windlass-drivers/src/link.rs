//! Receive-side frame buffer for the BLE serial link
//!
//! The UART side feeds bytes in as they arrive and marks the frame boundary
//! when the line goes idle; the control loop takes sealed frames out. The
//! hand-off is strictly one frame at a time: from the moment a frame is
//! sealed until the consumer calls [`RxFrameBuffer::restart`], every
//! arriving byte is dropped (and counted). This mirrors the bridge
//! protocol, where the host re-arms reception explicitly after each
//! command.

use heapless::Vec;
use windlass_protocol::{Frame, MAX_FRAME_LEN};

/// Single-frame receive buffer with explicit re-arm
#[derive(Debug, Default)]
pub struct RxFrameBuffer {
    assembling: Vec<u8, MAX_FRAME_LEN>,
    pending: Option<Frame>,
    /// Set when a frame seals; cleared only by `restart`
    parked: bool,
    dropped: u32,
}

impl RxFrameBuffer {
    pub const fn new() -> Self {
        Self {
            assembling: Vec::new(),
            pending: None,
            parked: false,
            dropped: 0,
        }
    }

    /// Feed one received byte.
    ///
    /// Ignored (and counted) while parked. A byte that fills the buffer
    /// seals the frame immediately rather than truncating a later one.
    pub fn push_byte(&mut self, byte: u8) {
        if self.parked {
            self.dropped += 1;
            return;
        }
        // Cannot fail: sealing on full keeps len < capacity here
        let _ = self.assembling.push(byte);
        if self.assembling.is_full() {
            self.seal();
        }
    }

    /// Mark the frame boundary (line idle). No-op when nothing has been
    /// assembled, so spurious idle events between frames are harmless.
    pub fn complete(&mut self) {
        if !self.parked && !self.assembling.is_empty() {
            self.seal();
        }
    }

    /// Take the sealed frame, if any. Reception stays parked afterward
    /// until [`restart`](Self::restart).
    pub fn take(&mut self) -> Option<Frame> {
        self.pending.take()
    }

    /// Re-arm reception for the next frame
    pub fn restart(&mut self) {
        self.assembling.clear();
        self.pending = None;
        self.parked = false;
    }

    /// Bytes dropped while parked, since power-on
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    fn seal(&mut self) {
        let bytes = core::mem::take(&mut self.assembling);
        self.pending = Some(Frame::from(bytes));
        self.parked = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(buf: &mut RxFrameBuffer, bytes: &[u8]) {
        for &b in bytes {
            buf.push_byte(b);
        }
    }

    #[test]
    fn idle_seals_a_frame() {
        let mut buf = RxFrameBuffer::new();
        feed(&mut buf, b"power");
        assert_eq!(buf.take(), None, "no frame before the boundary");

        buf.complete();
        assert_eq!(buf.take().unwrap().as_bytes(), b"power");
    }

    #[test]
    fn a_frame_is_taken_at_most_once() {
        let mut buf = RxFrameBuffer::new();
        feed(&mut buf, b"stop");
        buf.complete();

        assert!(buf.take().is_some());
        assert_eq!(buf.take(), None);
    }

    #[test]
    fn bytes_are_dropped_until_restart() {
        let mut buf = RxFrameBuffer::new();
        feed(&mut buf, b"up");
        buf.complete();

        // Still parked: the first frame has not even been taken yet
        feed(&mut buf, b"down");
        buf.complete();
        assert_eq!(buf.take().unwrap().as_bytes(), b"up");

        // Taken but not restarted: still parked
        feed(&mut buf, b"down");
        buf.complete();
        assert_eq!(buf.take(), None);
        assert_eq!(buf.dropped(), 8);

        buf.restart();
        feed(&mut buf, b"down");
        buf.complete();
        assert_eq!(buf.take().unwrap().as_bytes(), b"down");
    }

    #[test]
    fn full_buffer_seals_immediately() {
        let mut buf = RxFrameBuffer::new();
        let data = [b'x'; MAX_FRAME_LEN];
        feed(&mut buf, &data);

        // Sealed without an idle boundary, and the overflow byte is dropped
        buf.push_byte(b'y');
        let frame = buf.take().unwrap();
        assert_eq!(frame.len(), MAX_FRAME_LEN);
        assert_eq!(frame.as_bytes(), &data);
        assert_eq!(buf.dropped(), 1);
    }

    #[test]
    fn spurious_idle_between_frames_is_harmless() {
        let mut buf = RxFrameBuffer::new();
        buf.complete();
        buf.complete();
        assert_eq!(buf.take(), None);

        feed(&mut buf, b"change");
        buf.complete();
        assert_eq!(buf.take().unwrap().as_bytes(), b"change");
    }

    #[test]
    fn restart_discards_a_pending_frame() {
        let mut buf = RxFrameBuffer::new();
        feed(&mut buf, b"power");
        buf.complete();

        buf.restart();
        assert_eq!(buf.take(), None);
    }
}
