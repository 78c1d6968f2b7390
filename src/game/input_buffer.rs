//! Lock-free input hand-off from the input source to the simulation
//!
//! The capture side (keyboard, gamepad, touch sticks, an autopilot) pushes
//! [`InputFrame`]s through a bounded crossbeam channel; the simulation drains
//! it at the start of every tick and keeps only the newest frame.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

/// A normalized 2D stick, each component clamped to `[-1, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stick {
    pub x: f32,
    pub y: f32,
}

impl Stick {
    pub const IDLE: Stick = Stick { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: clamp_axis(x),
            y: clamp_axis(y),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Input for one simulation tick
///
/// `movement.y` walks forward (negative walks back), `movement.x` strafes
/// right. `look.x` is the yaw rate; positive turns right. `look.y` is
/// reserved for pitch and ignored by the simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub movement: Stick,
    pub look: Stick,
}

impl InputFrame {
    pub const IDLE: InputFrame = InputFrame {
        movement: Stick::IDLE,
        look: Stick::IDLE,
    };

    pub fn new(movement: Stick, look: Stick) -> Self {
        Self { movement, look }
    }
}

/// Bounded input queue owned by the simulation
pub struct InputBuffer {
    sender: Sender<InputFrame>,
    receiver: Receiver<InputFrame>,
    capacity: usize,
}

impl InputBuffer {
    /// Capacity only needs to cover frames pushed between two ticks.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Clonable handle for an input source
    pub fn sender(&self) -> InputSender {
        InputSender {
            sender: self.sender.clone(),
        }
    }

    /// Empties the queue, returning the most recent frame if any arrived.
    pub fn drain_latest(&self) -> Option<InputFrame> {
        self.receiver.try_iter().last()
    }

    /// Drops everything queued, e.g. when a level is rebuilt.
    pub fn clear(&self) {
        while self.receiver.try_recv().is_ok() {}
    }

    /// Frames queued since the last drain
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// True when no frame has arrived since the last drain
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Most frames the queue holds before `try_send` reports `Full`
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Clonable sender handle for input sources
#[derive(Clone)]
pub struct InputSender {
    sender: Sender<InputFrame>,
}

impl InputSender {
    /// Submits a frame without blocking.
    #[inline]
    pub fn try_send(&self, frame: InputFrame) -> Result<(), InputBufferError> {
        self.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => InputBufferError::Full,
            TrySendError::Disconnected(_) => InputBufferError::Disconnected,
        })
    }
}

/// Input buffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputBufferError {
    /// Too many frames queued since the last tick
    #[error("input buffer is full")]
    Full,
    /// The simulation that owned the buffer is gone
    #[error("simulation has stopped accepting input")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(amount: f32) -> InputFrame {
        InputFrame::new(Stick::new(0.0, amount), Stick::IDLE)
    }

    #[test]
    fn test_stick_clamps_components() {
        let stick = Stick::new(2.5, -7.0);
        assert_eq!(stick, Stick { x: 1.0, y: -1.0 });
        assert_eq!(Stick::new(f32::NAN, 0.5), Stick { x: 0.0, y: 0.5 });
        assert!(Stick::IDLE.is_idle());
    }

    #[test]
    fn test_drain_keeps_latest() {
        let buffer = InputBuffer::new(8);
        let sender = buffer.sender();
        sender.try_send(forward(0.2)).unwrap();
        sender.try_send(forward(0.6)).unwrap();
        sender.try_send(forward(1.0)).unwrap();
        assert_eq!(buffer.pending_count(), 3);

        assert_eq!(buffer.drain_latest(), Some(forward(1.0)));
        assert!(buffer.is_empty());
        assert_eq!(buffer.drain_latest(), None);
    }

    #[test]
    fn test_full_buffer_applies_backpressure() {
        let buffer = InputBuffer::new(2);
        let sender = buffer.sender();
        assert!(sender.try_send(forward(0.1)).is_ok());
        assert!(sender.try_send(forward(0.2)).is_ok());
        assert_eq!(sender.try_send(forward(0.3)), Err(InputBufferError::Full));
    }

    #[test]
    fn test_disconnected_after_drop() {
        let buffer = InputBuffer::new(2);
        let sender = buffer.sender();
        drop(buffer);
        assert_eq!(sender.try_send(forward(0.5)), Err(InputBufferError::Disconnected));
    }

    #[test]
    fn test_clear() {
        let buffer = InputBuffer::default();
        let sender = buffer.sender();
        sender.try_send(forward(1.0)).unwrap();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 64);
    }
}
