/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The per-class handle table.
//!
//! Handles are allocated from a monotonic counter and are never reused
//! for the lifetime of the context, so a stale handle can never
//! resolve to a different object than the one it was issued for.

use std::marker::PhantomData;
use std::num::NonZeroU32;

use fnv::FnvHashMap;
use webgl_traits::{
    BufferId, FramebufferId, ProgramId, RenderbufferId, ShaderId, TextureId, WebGLError,
};

/// Internal resolution failure. The command translator converts this
/// into `InvalidOperation` at the API boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidHandle;

impl From<InvalidHandle> for WebGLError {
    fn from(_: InvalidHandle) -> WebGLError {
        WebGLError::InvalidOperation
    }
}

/// Conversion between a handle newtype and its raw table key.
pub trait ResourceId: Copy {
    fn from_raw(raw: NonZeroU32) -> Self;
    fn raw(self) -> u32;
}

macro_rules! impl_resource_id {
    ($($id:ty,)*) => {
        $(
            impl ResourceId for $id {
                fn from_raw(raw: NonZeroU32) -> Self {
                    <$id>::new(raw)
                }

                fn raw(self) -> u32 {
                    self.get()
                }
            }
        )*
    };
}

impl_resource_id! {
    BufferId,
    FramebufferId,
    RenderbufferId,
    TextureId,
    ProgramId,
    ShaderId,
}

/// Maps live handles of one object class to their driver objects.
pub struct HandleTable<I, T> {
    next: u32,
    entries: FnvHashMap<u32, T>,
    _ids: PhantomData<I>,
}

impl<I: ResourceId, T> HandleTable<I, T> {
    pub fn new() -> Self {
        HandleTable {
            next: 1,
            entries: FnvHashMap::default(),
            _ids: PhantomData,
        }
    }

    /// Issues a fresh handle for `value`. Returns `None` only when the
    /// handle space of this class is exhausted.
    pub fn allocate(&mut self, value: T) -> Option<I> {
        let raw = NonZeroU32::new(self.next)?;
        self.next = self.next.checked_add(1)?;
        self.entries.insert(raw.get(), value);
        Some(I::from_raw(raw))
    }

    pub fn resolve(&self, id: I) -> Result<&T, InvalidHandle> {
        self.entries.get(&id.raw()).ok_or(InvalidHandle)
    }

    pub fn resolve_mut(&mut self, id: I) -> Result<&mut T, InvalidHandle> {
        self.entries.get_mut(&id.raw()).ok_or(InvalidHandle)
    }

    pub fn contains(&self, id: I) -> bool {
        self.entries.contains_key(&id.raw())
    }

    /// Invalidates `id` and returns its driver object, if live.
    pub fn release(&mut self, id: I) -> Option<T> {
        self.entries.remove(&id.raw())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }

    /// Removes and returns every live entry. Handles allocated later
    /// still never collide with the drained ones.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.entries.drain().map(|(_, value)| value).collect()
    }
}

impl<I: ResourceId, T> Default for HandleTable<I, T> {
    fn default() -> Self {
        HandleTable::new()
    }
}
