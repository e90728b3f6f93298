//! Buffer ownership for a ring entry.

/// Who currently owns the buffer attached to a ring entry.
///
/// A buffer moves `Hardware -> Software` only when its descriptor reports
/// completion, and `Software -> Hardware` only when the descriptor is re-armed.
#[derive(Debug)]
pub enum Slot<B> {
    /// No buffer attached
    Vacant,
    /// Posted to the DMA engine
    Hardware(B),
    /// Completed and held by the driver
    Software(B),
}

impl<B> Slot<B> {
    /// Attach a buffer and hand it to hardware. Returns any buffer that was
    /// already attached.
    pub fn post(&mut self, buffer: B) -> Option<B> {
        core::mem::replace(self, Slot::Hardware(buffer)).into_buffer()
    }

    /// Hardware reported completion. No-op unless the slot is hardware-owned.
    pub fn complete(&mut self) {
        *self = match core::mem::take(self) {
            Slot::Hardware(b) => Slot::Software(b),
            other => other,
        };
    }

    /// Return a software-owned buffer to hardware.
    pub fn rearm(&mut self) {
        *self = match core::mem::take(self) {
            Slot::Software(b) => Slot::Hardware(b),
            other => other,
        };
    }

    /// Detach a software-owned buffer. Hardware-owned buffers stay put.
    pub fn take(&mut self) -> Option<B> {
        match self {
            Slot::Software(_) => core::mem::take(self).into_buffer(),
            _ => None,
        }
    }

    /// Detach whatever buffer is attached, regardless of owner.
    ///
    /// Only valid once the DMA engine has been stalled.
    pub fn release(&mut self) -> Option<B> {
        core::mem::take(self).into_buffer()
    }

    /// Borrow the attached buffer.
    pub fn buffer(&self) -> Option<&B> {
        match self {
            Slot::Vacant => None,
            Slot::Hardware(b) | Slot::Software(b) => Some(b),
        }
    }

    /// Mutably borrow the attached buffer.
    pub fn buffer_mut(&mut self) -> Option<&mut B> {
        match self {
            Slot::Vacant => None,
            Slot::Hardware(b) | Slot::Software(b) => Some(b),
        }
    }

    /// Whether the buffer belongs to hardware
    #[must_use]
    pub fn is_hardware(&self) -> bool {
        matches!(self, Slot::Hardware(_))
    }

    /// Whether no buffer is attached
    #[must_use]
    pub fn is_vacant(&self) -> bool {
        matches!(self, Slot::Vacant)
    }

    fn into_buffer(self) -> Option<B> {
        match self {
            Slot::Vacant => None,
            Slot::Hardware(b) | Slot::Software(b) => Some(b),
        }
    }
}

impl<B> Default for Slot<B> {
    fn default() -> Self {
        Slot::Vacant
    }
}
