//! Command vocabulary and classifier.
//!
//! Inbound frames carry one of five bare ASCII keywords. Classification is
//! a case-sensitive prefix match: a frame whose leading bytes are exactly a
//! keyword matches that keyword, and anything after it is ignored. Each
//! keyword is compared at its own length - `"up-regardless"` is [`Command::Up`],
//! never a misread of a longer keyword.

/// A classified link command.
///
/// Transient - produced from a frame's bytes and consumed by one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Enable telemetry and start the motor in the stored direction
    Power,
    /// Timed direction reversal (blocking)
    Change,
    /// Run toward the raised endstop at sprint speed
    Up,
    /// Run toward the lowered endstop at sprint speed
    Down,
    /// Stop the motor and silence telemetry
    Stop,
    /// Not a recognized keyword; dispatch ignores it
    Unknown,
}

/// Keyword table. Keeping keyword and command side by side guarantees each
/// prefix comparison uses that keyword's own length.
const KEYWORDS: &[(&[u8], Command)] = &[
    (b"power", Command::Power),
    (b"change", Command::Change),
    (b"up", Command::Up),
    (b"down", Command::Down),
    (b"stop", Command::Stop),
];

impl Command {
    /// Classify a frame's bytes. First matching keyword wins; no match is
    /// [`Command::Unknown`]. No case folding, no whitespace trimming.
    pub fn classify(bytes: &[u8]) -> Command {
        for &(keyword, command) in KEYWORDS {
            if bytes.starts_with(keyword) {
                return command;
            }
        }
        Command::Unknown
    }
}
