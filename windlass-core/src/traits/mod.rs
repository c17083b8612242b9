//! Hardware abstraction traits
//!
//! These traits define the interface between the control logic and
//! hardware-specific implementations. Peripheral bring-up (clock trees,
//! pin muxing, timer/ADC/UART register setup) lives entirely behind them.

pub mod clock;
pub mod keys;
pub mod link;
pub mod panel;
pub mod pulse;
pub mod sampler;

pub use clock::{DelayMs, TimeOfDay, WallClock};
pub use keys::{KeyEvent, KeyPad};
pub use link::FrameLink;
pub use panel::{Heartbeat, StatusPanel};
pub use pulse::{Direction, PulseGenerator};
pub use sampler::{AnalogSampler, SampleError};
