//! Owning iterator for `StableVec`.

use crate::StableVec;

/// An owning iterator over elements of a `StableVec`.
///
/// This struct is created by the `into_iter` method on `StableVec`
/// (provided by the [`IntoIterator`] trait).
pub struct IntoIter<T, const CHUNK_SIZE: usize> {
    pub(crate) vec: StableVec<T, CHUNK_SIZE>,
    /// Next logical index to move out from the front.
    pub(crate) index: usize,
    /// One past the last logical index still owned by the iterator.
    pub(crate) len: usize,
}

impl<T, const CHUNK_SIZE: usize> Iterator for IntoIter<T, CHUNK_SIZE> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }
        // Safety: index < len, so the element exists and has not been moved
        // out yet; the chunk occupancies are reconciled in Drop.
        let value = unsafe { self.vec.read_unchecked(self.index) };
        self.index += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }

    #[inline]
    fn count(self) -> usize {
        self.len - self.index
    }
}

impl<T, const CHUNK_SIZE: usize> DoubleEndedIterator for IntoIter<T, CHUNK_SIZE> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.index >= self.len {
            return None;
        }
        self.len -= 1;
        // Safety: len now addresses the last element not yet moved out.
        Some(unsafe { self.vec.read_unchecked(self.len) })
    }
}

impl<T, const CHUNK_SIZE: usize> ExactSizeIterator for IntoIter<T, CHUNK_SIZE> {}

impl<T, const CHUNK_SIZE: usize> std::iter::FusedIterator for IntoIter<T, CHUNK_SIZE> {}

impl<T, const CHUNK_SIZE: usize> Drop for IntoIter<T, CHUNK_SIZE> {
    fn drop(&mut self) {
        // Drop the elements that were never yielded.
        if std::mem::needs_drop::<T>() {
            for i in self.index..self.len {
                unsafe {
                    std::ptr::drop_in_place(self.vec.get_unchecked_mut(i) as *mut T);
                }
            }
        }
        // Every element has now been either moved out or dropped; zero the
        // occupancies so the chunks do not drop them again.
        for chunk in &mut self.vec.chunks {
            unsafe { chunk.set_len(0) };
        }
    }
}

impl<T: Clone, const CHUNK_SIZE: usize> Clone for IntoIter<T, CHUNK_SIZE> {
    fn clone(&self) -> Self {
        let mut vec = StableVec::new();
        for i in self.index..self.len {
            // Safety: i addresses an element not yet moved out.
            vec.push(unsafe { self.vec.get_unchecked(i) }.clone());
        }
        let len = vec.len();
        IntoIter { vec, index: 0, len }
    }
}

impl<T: std::fmt::Debug, const CHUNK_SIZE: usize> std::fmt::Debug for IntoIter<T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntoIter")
            .field("remaining", &(self.len - self.index))
            .finish()
    }
}
