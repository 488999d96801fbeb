//! Fixed-capacity storage chunks for `StableVec`.
//!
//! A chunk is the unit of allocation growth: a heap-allocated block holding
//! up to `N` elements contiguously. Chunks are allocated once and never
//! moved or resized afterwards, which is what makes element addresses in a
//! `StableVec` permanent.

use std::alloc::{self, Layout};
use std::mem::MaybeUninit;
use std::ptr;

/// A fixed-capacity, contiguously-stored run of up to `N` elements.
///
/// Tracks its own occupancy and owns the initialization and destruction of
/// its elements. Occupancy only grows; a chunk never relocates elements
/// within itself.
pub(crate) struct Chunk<T, const N: usize> {
    /// Number of initialized elements in `storage`.
    len: usize,
    storage: [MaybeUninit<T>; N],
}

impl<T, const N: usize> Chunk<T, N> {
    /// Allocates a new empty chunk directly on the heap.
    ///
    /// The chunk is never materialized on the stack, so large `N` cannot
    /// overflow it.
    ///
    /// # Panics
    ///
    /// Aborts via `handle_alloc_error` if allocation fails.
    pub(crate) fn new_boxed() -> Box<Self> {
        let layout = Layout::new::<Self>();
        unsafe {
            // `len` makes the layout non-zero-sized even when T is a ZST.
            let ptr = alloc::alloc(layout) as *mut Self;
            if ptr.is_null() {
                alloc::handle_alloc_error(layout);
            }
            ptr::addr_of_mut!((*ptr).len).write(0);
            // The storage array stays uninitialized.
            Box::from_raw(ptr)
        }
    }

    /// Returns the occupancy of this chunk.
    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the occupancy has reached `N`.
    #[inline]
    pub(crate) const fn is_full(&self) -> bool {
        self.len == N
    }

    /// Appends an element to the chunk.
    ///
    /// # Panics
    ///
    /// Panics if the chunk is full.
    #[inline]
    pub(crate) fn push(&mut self, value: T) {
        self.storage[self.len].write(value);
        self.len += 1;
    }

    /// Returns the initialized elements as a slice.
    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        // Safety: elements 0..len are initialized.
        unsafe { std::slice::from_raw_parts(self.storage.as_ptr() as *const T, self.len) }
    }

    /// Returns the initialized elements as a mutable slice.
    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        // Safety: elements 0..len are initialized.
        unsafe { std::slice::from_raw_parts_mut(self.storage.as_mut_ptr() as *mut T, self.len) }
    }

    /// Returns a reference to the element at `offset` without bounds checks.
    ///
    /// # Safety
    ///
    /// `offset` must be less than `self.len()`.
    #[inline]
    pub(crate) unsafe fn get_unchecked(&self, offset: usize) -> &T {
        debug_assert!(offset < self.len);
        &*self.storage.get_unchecked(offset).as_ptr()
    }

    /// Returns a mutable reference to the element at `offset` without bounds
    /// checks.
    ///
    /// # Safety
    ///
    /// `offset` must be less than `self.len()`.
    #[inline]
    pub(crate) unsafe fn get_unchecked_mut(&mut self, offset: usize) -> &mut T {
        debug_assert!(offset < self.len);
        &mut *self.storage.get_unchecked_mut(offset).as_mut_ptr()
    }

    /// Moves the element at `offset` out of the chunk.
    ///
    /// # Safety
    ///
    /// `offset` must address an initialized element, and the element must
    /// not be read again or dropped by the chunk afterwards (adjust the
    /// occupancy with [`set_len`](Self::set_len)).
    #[inline]
    pub(crate) unsafe fn read(&self, offset: usize) -> T {
        debug_assert!(offset < N);
        self.storage.get_unchecked(offset).assume_init_read()
    }

    /// Overwrites the occupancy counter.
    ///
    /// # Safety
    ///
    /// Elements in `new_len..self.len()` are leaked unless the caller has
    /// already moved them out; elements in `self.len()..new_len` must have
    /// been initialized by the caller.
    #[inline]
    pub(crate) unsafe fn set_len(&mut self, new_len: usize) {
        self.len = new_len;
    }

    /// Deep-copies this chunk into a fresh heap allocation.
    pub(crate) fn clone_boxed(&self) -> Box<Self>
    where
        T: Clone,
    {
        let mut chunk = Self::new_boxed();
        for value in self.as_slice() {
            chunk.push(value.clone());
        }
        chunk
    }
}

impl<T, const N: usize> Drop for Chunk<T, N> {
    fn drop(&mut self) {
        if std::mem::needs_drop::<T>() {
            // Safety: exactly the elements 0..len are initialized.
            unsafe { ptr::drop_in_place(self.as_mut_slice()) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_new_boxed() {
        let chunk: Box<Chunk<i32, 8>> = Chunk::new_boxed();
        assert_eq!(chunk.len(), 0);
        assert!(!chunk.is_full());
        assert!(chunk.as_slice().is_empty());
    }

    #[test]
    fn test_push_and_slice() {
        let mut chunk: Box<Chunk<i32, 4>> = Chunk::new_boxed();
        chunk.push(1);
        chunk.push(2);
        chunk.push(3);
        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.as_slice(), &[1, 2, 3]);
        assert!(!chunk.is_full());
        chunk.push(4);
        assert!(chunk.is_full());
    }

    #[test]
    fn test_clone_boxed_is_deep() {
        let mut chunk: Box<Chunk<String, 4>> = Chunk::new_boxed();
        chunk.push("a".to_string());
        chunk.push("b".to_string());

        let copy = chunk.clone_boxed();
        assert_eq!(copy.as_slice(), chunk.as_slice());

        chunk.as_mut_slice()[0].push('!');
        assert_eq!(chunk.as_slice()[0], "a!");
        assert_eq!(copy.as_slice()[0], "a");
    }

    #[test]
    fn test_drop_drops_elements() {
        let tracker = Rc::new(());
        {
            let mut chunk: Box<Chunk<Rc<()>, 4>> = Chunk::new_boxed();
            chunk.push(tracker.clone());
            chunk.push(tracker.clone());
            assert_eq!(Rc::strong_count(&tracker), 3);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn test_zst() {
        let mut chunk: Box<Chunk<(), 8>> = Chunk::new_boxed();
        for _ in 0..8 {
            chunk.push(());
        }
        assert!(chunk.is_full());
        assert_eq!(chunk.as_slice().len(), 8);
    }
}
