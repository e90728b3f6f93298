//! Explicitly linked descriptor ring.
//!
//! The controller follows the hardware `next` word of each descriptor while
//! software walks a parallel link table. Both are stitched together by
//! [`DescriptorRing::link`] so the two views never disagree about a chain.

use super::descriptor::Descriptor;
use crate::driver::error::{ConfigError, ConfigResult};

/// Fixed-capacity descriptor array with software and hardware links.
///
/// The ring must not move once a list pointer register holds one of its
/// addresses. Bus addresses are only meaningful after [`map`](Self::map).
pub struct DescriptorRing<D, const N: usize> {
    /// Array of descriptors
    pub(super) descriptors: [D; N],
    /// Software successor of each entry
    links: [Option<usize>; N],
    /// Bus address of the first descriptor
    bus_base: u32,
}

impl<D: Descriptor, const N: usize> DescriptorRing<D, N> {
    /// Create a new ring from an existing array. All links start empty.
    #[must_use]
    pub const fn from_array(descriptors: [D; N]) -> Self {
        Self {
            descriptors,
            links: [None; N],
            bus_base: 0,
        }
    }

    /// Record where the controller sees the descriptor array.
    ///
    /// `translate` maps a host address to a bus address. The whole array
    /// must land in one contiguous span below 4 GiB; otherwise the ring is
    /// refused and the previous mapping is kept.
    ///
    /// # Errors
    /// - `DmaAddressOutOfRange` - the first or last byte has no bus address,
    ///   or the two are not `size_of::<[D; N]>()` apart
    pub fn map<F>(&mut self, translate: F) -> ConfigResult<()>
    where
        F: Fn(usize) -> Option<u32>,
    {
        let span = core::mem::size_of::<[D; N]>();
        if span == 0 {
            return Ok(());
        }

        let host = self.descriptors.as_ptr() as usize;
        let base = translate(host).ok_or(ConfigError::DmaAddressOutOfRange)?;
        let last = u32::try_from(span - 1)
            .ok()
            .and_then(|offset| base.checked_add(offset))
            .ok_or(ConfigError::DmaAddressOutOfRange)?;
        if translate(host + (span - 1)) != Some(last) {
            return Err(ConfigError::DmaAddressOutOfRange);
        }

        self.bus_base = base;
        Ok(())
    }

    /// Get the number of descriptors in the ring
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Check if the ring has no descriptors
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Stitch every entry to its successor and the last back to the first,
    /// in both the software and hardware views, and clear all descriptors.
    pub fn initialize(&mut self) {
        for i in 0..N {
            let next = (i + 1) % N;
            self.descriptors[i].clear();
            self.links[i] = Some(next);
            self.descriptors[i].set_next_addr(self.bus_addr(next));
        }
    }

    /// Stitch entries into a software-only list ending at the last entry.
    ///
    /// Hardware links are cleared; descriptors only become reachable by the
    /// controller through [`link`](Self::link).
    pub fn initialize_list(&mut self) {
        for i in 0..N {
            self.descriptors[i].clear();
            self.descriptors[i].set_next_addr(0);
            self.links[i] = if i + 1 < N { Some(i + 1) } else { None };
        }
    }

    /// Descriptor at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= N`.
    #[inline(always)]
    pub fn entry_at(&self, index: usize) -> &D {
        &self.descriptors[index]
    }

    /// Follow the software link from `cursor`.
    #[inline(always)]
    #[must_use]
    pub fn advance(&self, cursor: usize) -> Option<usize> {
        self.links.get(cursor).copied().flatten()
    }

    /// Make `to` the successor of `from` for both software and hardware.
    pub fn link(&mut self, from: usize, to: usize) {
        if from < N && to < N {
            self.links[from] = Some(to);
            self.descriptors[from].set_next_addr(self.bus_addr(to));
        }
    }

    /// Set the software successor only, leaving the hardware link alone.
    pub fn set_soft_link(&mut self, from: usize, to: Option<usize>) {
        if let Some(slot) = self.links.get_mut(from) {
            *slot = to.filter(|&t| t < N);
        }
    }

    /// Terminate the chain at `index` for both software and hardware.
    pub fn unlink(&mut self, index: usize) {
        if index < N {
            self.links[index] = None;
            self.descriptors[index].set_next_addr(0);
        }
    }

    /// Bus address of the descriptor at `index`, 0 if out of range.
    ///
    /// [`map`](Self::map) guarantees the whole array fits, so the offset
    /// never wraps once mapped.
    #[inline(always)]
    #[must_use]
    pub fn bus_addr(&self, index: usize) -> u32 {
        if index < N {
            self.bus_base
                .wrapping_add((index * core::mem::size_of::<D>()) as u32)
        } else {
            0
        }
    }

    /// Bus address of the first descriptor.
    #[inline(always)]
    #[must_use]
    pub fn base_addr_u32(&self) -> u32 {
        self.bus_addr(0)
    }

    /// Iterate over all descriptors
    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.descriptors.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================
