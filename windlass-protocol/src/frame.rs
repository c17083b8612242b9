//! The frame hand-off type.
//!
//! A [`Frame`] is one complete unit of received link data: an immutable byte
//! sequence plus length, boundaries drawn by the BLE bridge (idle detection),
//! not by us. The transport owns the receive buffer; it hands a `Frame` to
//! the control loop at most once, and reuses the buffer only after the loop
//! signals restart.

use heapless::Vec;

/// Maximum frame length in bytes.
///
/// Transparent-mode BLE notifications are at most one MTU; commands are a
/// handful of ASCII bytes. 64 leaves generous headroom.
pub const MAX_FRAME_LEN: usize = 64;

/// Errors constructing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Data exceeds [`MAX_FRAME_LEN`]
    TooLong,
}

/// One received frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8, MAX_FRAME_LEN>,
}

impl Frame {
    /// Copy `data` into a new frame
    pub fn new(data: &[u8]) -> Result<Self, FrameError> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(data).map_err(|_| FrameError::TooLong)?;
        Ok(Self { bytes })
    }

    /// The frame's payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the frame carries no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<Vec<u8, MAX_FRAME_LEN>> for Frame {
    /// Take over an already-bounded receive buffer without copying
    fn from(bytes: Vec<u8, MAX_FRAME_LEN>) -> Self {
        Self { bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_copies_payload() {
        let frame = Frame::new(b"power").unwrap();
        assert_eq!(frame.as_bytes(), b"power");
        assert_eq!(frame.len(), 5);
        assert!(!frame.is_empty());
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let data = [0u8; MAX_FRAME_LEN + 1];
        assert_eq!(Frame::new(&data), Err(FrameError::TooLong));
        assert!(Frame::new(&data[..MAX_FRAME_LEN]).is_ok());
    }
}
