//! Borrowing iterators for `StableVec`.
//!
//! Both iterators are (container, logical index) cursors: every step
//! re-resolves the chunk and offset through the container instead of caching
//! an element pointer. Resolution is a division and a remainder by the chunk
//! size, so stepping stays O(1).

use crate::StableVec;

/// An iterator over references to elements of a `StableVec`.
///
/// Created by [`StableVec::iter`]. A read-only cursor can also be obtained
/// from an [`IterMut`] via `From`, but not the other way around.
pub struct Iter<'a, T, const CHUNK_SIZE: usize> {
    pub(crate) vec: &'a StableVec<T, CHUNK_SIZE>,
    /// Next logical index to yield from the front.
    pub(crate) front: usize,
    /// One past the last logical index to yield from the back.
    pub(crate) back: usize,
}

impl<'a, T, const CHUNK_SIZE: usize> Iterator for Iter<'a, T, CHUNK_SIZE> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        // Safety: front < back <= len at creation, and len cannot shrink
        // while the borrow is held.
        let item = unsafe { self.vec.get_unchecked(self.front) };
        self.front += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }

    #[inline]
    fn count(self) -> usize {
        self.back - self.front
    }
}

impl<T, const CHUNK_SIZE: usize> DoubleEndedIterator for Iter<'_, T, CHUNK_SIZE> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        // Safety: back is now a valid logical index below the original len.
        Some(unsafe { self.vec.get_unchecked(self.back) })
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.back = self.back.saturating_sub(n).max(self.front);
        self.next_back()
    }
}

impl<T, const CHUNK_SIZE: usize> ExactSizeIterator for Iter<'_, T, CHUNK_SIZE> {}

impl<T, const CHUNK_SIZE: usize> std::iter::FusedIterator for Iter<'_, T, CHUNK_SIZE> {}

impl<T, const CHUNK_SIZE: usize> Clone for Iter<'_, T, CHUNK_SIZE> {
    fn clone(&self) -> Self {
        Iter {
            vec: self.vec,
            front: self.front,
            back: self.back,
        }
    }
}

impl<T: std::fmt::Debug, const CHUNK_SIZE: usize> std::fmt::Debug for Iter<'_, T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Iter")
            .field("remaining", &(self.back - self.front))
            .finish()
    }
}

/// An iterator over mutable references to elements of a `StableVec`.
///
/// Created by [`StableVec::iter_mut`].
pub struct IterMut<'a, T, const CHUNK_SIZE: usize> {
    pub(crate) vec: &'a mut StableVec<T, CHUNK_SIZE>,
    /// Next logical index to yield from the front.
    pub(crate) front: usize,
    /// One past the last logical index to yield from the back.
    pub(crate) back: usize,
}

impl<'a, T, const CHUNK_SIZE: usize> Iterator for IterMut<'a, T, CHUNK_SIZE> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        // Safety: front < back <= len, each index is yielded at most once,
        // so no two returned references alias.
        let item = unsafe { &mut *(self.vec.get_unchecked_mut(self.front) as *mut T) };
        self.front += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }

    #[inline]
    fn count(self) -> usize {
        self.back - self.front
    }
}

impl<T, const CHUNK_SIZE: usize> DoubleEndedIterator for IterMut<'_, T, CHUNK_SIZE> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        // Safety: indices from the back never overlap those yielded from the
        // front (front < back holds throughout).
        Some(unsafe { &mut *(self.vec.get_unchecked_mut(self.back) as *mut T) })
    }

    #[inline]
    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.back = self.back.saturating_sub(n).max(self.front);
        self.next_back()
    }
}

impl<T, const CHUNK_SIZE: usize> ExactSizeIterator for IterMut<'_, T, CHUNK_SIZE> {}

impl<T, const CHUNK_SIZE: usize> std::iter::FusedIterator for IterMut<'_, T, CHUNK_SIZE> {}

impl<T: std::fmt::Debug, const CHUNK_SIZE: usize> std::fmt::Debug for IterMut<'_, T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IterMut")
            .field("remaining", &(self.back - self.front))
            .finish()
    }
}

/// The one-directional mutable-to-read-only conversion: an `IterMut` can be
/// downgraded into an `Iter` at its current position, never the reverse.
impl<'a, T, const CHUNK_SIZE: usize> From<IterMut<'a, T, CHUNK_SIZE>> for Iter<'a, T, CHUNK_SIZE> {
    fn from(iter: IterMut<'a, T, CHUNK_SIZE>) -> Self {
        let IterMut { vec, front, back } = iter;
        Iter { vec, front, back }
    }
}
