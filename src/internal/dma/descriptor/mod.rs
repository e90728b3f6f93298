//! RX and TX DMA descriptor structures.
//!
//! Descriptors are shared with the controller through volatile accesses. The
//! hardware follows the `next` word of each descriptor, so software keeps a
//! separate link table in [`DescriptorRing`](super::ring::DescriptorRing) and
//! only writes the hardware word when a descriptor is stitched into a chain.

pub mod bits;
pub mod rx;
pub mod tx;

pub use rx::RxDescriptor;
pub use tx::TxDescriptor;

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: descriptor words are naturally aligned u32 values and every access
// goes through a single volatile load or store.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }

    /// Update the value using a function (read-modify-write)
    #[inline(always)]
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let old = self.get();
        self.set(f(old));
    }
}

impl<T: Copy + Default> Default for VolatileCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Common operations the descriptor ring needs from either descriptor kind.
pub trait Descriptor {
    /// Bus address of the next descriptor as seen by the controller
    fn next_addr(&self) -> u32;

    /// Set the hardware link to the next descriptor (0 ends the chain)
    fn set_next_addr(&self, addr: u32);

    /// Clear everything except the hardware link
    fn clear(&self);
}
