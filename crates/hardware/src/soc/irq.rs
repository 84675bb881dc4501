//! Interrupt lines.
//!
//! Devices never own platform wiring. Each one is handed an [`IrqSink`] at
//! construction and asserts it as an explicit output. The platform side is an
//! [`InterruptController`] holding one level-sensitive line per IRQ number;
//! lines are shared with devices through `Arc` and cleared only by the platform.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Capability to drive one interrupt output.
///
/// Implementors must be `Send + Sync` because devices holding them are.
pub trait IrqSink: Send + Sync {
    /// Drives the line to `level` (`true` = asserted).
    fn set_level(&self, level: bool);

    /// Asserts the line.
    fn raise(&self) {
        self.set_level(true);
    }
}

/// Level-sensitive interrupt controller owned by the platform.
///
/// Tracks the state of every line; devices assert lines through [`IrqLine`]
/// handles and the platform acknowledges them with [`InterruptController::clear`].
pub struct InterruptController {
    lines: Vec<AtomicBool>,
}

impl InterruptController {
    /// Creates a controller with `count` lines, all deasserted.
    pub fn new(count: usize) -> Arc<Self> {
        Arc::new(Self {
            lines: (0..count).map(|_| AtomicBool::new(false)).collect(),
        })
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the controller has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns a handle to line `number`, or `None` if it does not exist.
    pub fn line(self: &Arc<Self>, number: u32) -> Option<IrqLine> {
        if (number as usize) < self.lines.len() {
            Some(IrqLine {
                controller: Arc::clone(self),
                number,
            })
        } else {
            None
        }
    }

    /// Returns whether line `number` is currently asserted.
    pub fn is_pending(&self, number: u32) -> bool {
        self.lines
            .get(number as usize)
            .is_some_and(|line| line.load(Ordering::Acquire))
    }

    /// Deasserts line `number` (platform acknowledge).
    pub fn clear(&self, number: u32) {
        if let Some(line) = self.lines.get(number as usize) {
            line.store(false, Ordering::Release);
        }
    }

    /// Returns the numbers of all asserted lines in ascending order.
    pub fn pending(&self) -> Vec<u32> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.load(Ordering::Acquire))
            .map(|(i, _)| i as u32)
            .collect()
    }

    fn set(&self, number: u32, level: bool) {
        if let Some(line) = self.lines.get(number as usize) {
            line.store(level, Ordering::Release);
        }
    }
}

impl fmt::Debug for InterruptController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptController")
            .field("lines", &self.lines.len())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Handle to a single controller line, handed to a device.
#[derive(Clone, Debug)]
pub struct IrqLine {
    controller: Arc<InterruptController>,
    number: u32,
}

impl IrqLine {
    /// Returns the line number.
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl IrqSink for IrqLine {
    fn set_level(&self, level: bool) {
        tracing::trace!(line = self.number, level, "irq");
        self.controller.set(self.number, level);
    }
}

/// Interrupt output that is not connected to anything.
///
/// Used for peripherals whose line the board leaves unwired.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoIrq;

impl IrqSink for NoIrq {
    fn set_level(&self, _level: bool) {}
}
