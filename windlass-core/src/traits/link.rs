//! Frame link trait
//!
//! The BLE bridge assembles inbound bytes into frames on its own (idle
//! detection on the UART); the control loop only ever polls. The hand-off
//! is single-producer/single-consumer: a frame is delivered at most once,
//! and the link may not begin assembling a new frame until the consumer has
//! signaled `restart_rx`.

use windlass_protocol::Frame;

/// The wireless serial link, as seen by the control loop
pub trait FrameLink {
    /// Take the pending frame, if a complete one has been received.
    /// Non-blocking; returns `None` both for "nothing yet" and for a
    /// truncated/garbled reception (the two are indistinguishable here).
    fn take_frame(&mut self) -> Option<Frame>;

    /// Signal that the taken frame is consumed and reception may restart.
    /// Until this is called no new frame is assembled.
    fn restart_rx(&mut self);

    /// Push bytes to the remote end (telemetry, diagnostics)
    fn send(&mut self, bytes: &[u8]);

    /// Wake the bridge module from its serial low-power sleep
    fn wake(&mut self);
}

impl<T: FrameLink + ?Sized> FrameLink for &mut T {
    fn take_frame(&mut self) -> Option<Frame> {
        (**self).take_frame()
    }

    fn restart_rx(&mut self) {
        (**self).restart_rx()
    }

    fn send(&mut self, bytes: &[u8]) {
        (**self).send(bytes)
    }

    fn wake(&mut self) {
        (**self).wake()
    }
}
