//! A chunked vector with stable element addresses.
//!
//! Unlike `Vec`, pushing new elements never invalidates references to
//! existing elements. `StableVec` stores its elements in fixed-capacity,
//! individually heap-allocated chunks; a chunk is never moved or resized
//! once created, so the address of every element is permanent for the
//! element's lifetime. Growth only ever appends chunks.
//!
//! The container supports back-insertion and indexed read/write only: there
//! is no removal and no mid-sequence insertion.
//!
//! # Example
//!
//! ```
//! use stable_vector::StableVec;
//!
//! let mut vec: StableVec<i32> = StableVec::new();
//! vec.push(1);
//! vec.push(2);
//!
//! // Get a pointer to the first element
//! let ptr = &vec[0] as *const i32;
//!
//! // Push more elements - the pointer remains valid!
//! for i in 3..100 {
//!     vec.push(i);
//! }
//!
//! // The pointer is still valid
//! assert_eq!(unsafe { *ptr }, 1);
//! ```
//!
//! # Chunk size
//!
//! The chunk size is a structural parameter of the type, fixed at compile
//! time and required to be a non-zero even number. Logical index `i` always
//! lives in chunk `i / CHUNK_SIZE` at offset `i % CHUNK_SIZE`.
//!
//! # Thread safety
//!
//! `StableVec` is a single-owner container with no internal locking.
//! Shared read-only access from multiple threads is safe (it is `Sync` when
//! `T` is), provided no thread mutates it concurrently.

mod chunk;
mod into_iter;
mod iter;

pub use into_iter::IntoIter;
pub use iter::{Iter, IterMut};

use chunk::Chunk;
use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

/// The error type returned by [`StableVec::at`] and [`StableVec::at_mut`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OutOfRangeError {
    index: usize,
    len: usize,
}

impl OutOfRangeError {
    /// The logical index that was requested.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The length of the vector at the time of the call.
    pub fn len(&self) -> usize {
        self.len
    }
}

impl std::fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "index {} out of range for stable vector of length {}",
            self.index, self.len
        )
    }
}

impl std::error::Error for OutOfRangeError {}

/// A chunked vector with stable element addresses.
///
/// Elements live in fixed-capacity chunks of `CHUNK_SIZE` elements each.
/// Chunks are heap-allocated on demand and never moved afterwards, which
/// buys an unusually strong guarantee: a reference or pointer to an element
/// stays valid for the element's whole lifetime, no matter how much the
/// vector grows.
///
/// # Invariants
///
/// - Every occupied chunk except possibly the last is full.
/// - The last occupied chunk is never empty; an empty vector has no
///   occupied chunks at all.
/// - `len()` is the sum of chunk occupancies and is computed on demand
///   (O(number of chunks)); there is no cached length field to keep
///   consistent.
/// - `capacity()` is always a multiple of `CHUNK_SIZE`.
///
/// Chunks pre-allocated by [`reserve`](Self::reserve) are kept in a spare
/// pool and promoted one at a time as pushes fill the tail, so the
/// invariants above hold at every moment.
pub struct StableVec<T, const CHUNK_SIZE: usize = 512> {
    /// Occupied chunks, in logical order. Boxed so they never move.
    pub(crate) chunks: Vec<Box<Chunk<T, CHUNK_SIZE>>>,
    /// Pre-allocated empty chunks, promoted to `chunks` as the tail fills.
    spare: Vec<Box<Chunk<T, CHUNK_SIZE>>>,
}

impl<T, const CHUNK_SIZE: usize> StableVec<T, CHUNK_SIZE> {
    const CHUNK_SIZE_OK: () = assert!(
        CHUNK_SIZE != 0 && CHUNK_SIZE % 2 == 0,
        "CHUNK_SIZE must be a non-zero even number"
    );

    /// Creates a new empty `StableVec`.
    ///
    /// Does not allocate until elements are pushed.
    ///
    /// # Example
    ///
    /// ```
    /// use stable_vector::StableVec;
    /// let vec: StableVec<i32> = StableVec::new();
    /// assert!(vec.is_empty());
    /// ```
    #[inline]
    pub const fn new() -> Self {
        let () = Self::CHUNK_SIZE_OK;
        Self {
            chunks: Vec::new(),
            spare: Vec::new(),
        }
    }

    /// Creates a new `StableVec` with capacity for at least `capacity`
    /// elements.
    ///
    /// # Example
    ///
    /// ```
    /// use stable_vector::StableVec;
    /// let vec: StableVec<i32, 8> = StableVec::with_capacity(20);
    /// assert_eq!(vec.capacity(), 24);
    /// assert_eq!(vec.len(), 0);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        let mut vec = Self::new();
        vec.reserve(capacity);
        vec
    }

    /// Creates a `StableVec` holding `count` clones of `value`.
    ///
    /// # Example
    ///
    /// ```
    /// use stable_vector::StableVec;
    /// let vec: StableVec<i32, 4> = StableVec::from_elem(7, 5);
    /// assert_eq!(vec.len(), 5);
    /// assert!(vec.iter().all(|&x| x == 7));
    /// ```
    pub fn from_elem(value: T, count: usize) -> Self
    where
        T: Clone,
    {
        let mut vec = Self::with_capacity(count);
        for _ in 0..count {
            vec.push(value.clone());
        }
        vec
    }

    /// Creates a `StableVec` holding `count` default-constructed elements.
    pub fn from_default(count: usize) -> Self
    where
        T: Default,
    {
        let mut vec = Self::with_capacity(count);
        for _ in 0..count {
            vec.push(T::default());
        }
        vec
    }

    /// Returns the number of elements in the vector.
    ///
    /// Computed by summing chunk occupancies, so this is O(number of
    /// chunks), not O(1).
    pub fn len(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.len()).sum()
    }

    /// Returns `true` if the vector contains no elements.
    ///
    /// O(1): an empty vector owns no occupied chunks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns the current capacity of the vector.
    ///
    /// Always a multiple of [`chunk_size`](Self::chunk_size); can exceed
    /// `len()` by up to `CHUNK_SIZE - 1` plus any reserved chunks.
    #[inline]
    pub fn capacity(&self) -> usize {
        (self.chunks.len() + self.spare.len()) * CHUNK_SIZE
    }

    /// Returns the chunk size this vector was instantiated with.
    #[inline]
    pub const fn chunk_size(&self) -> usize {
        CHUNK_SIZE
    }

    /// Returns the largest number of elements the vector could ever address.
    #[inline]
    pub const fn max_len(&self) -> usize {
        usize::MAX
    }

    /// Appends an element to the back of the vector.
    ///
    /// Amortized O(1): a new chunk is allocated once per `CHUNK_SIZE`
    /// pushes. Never invalidates references to existing elements.
    ///
    /// # Panics
    ///
    /// Panics if allocation fails.
    ///
    /// # Example
    ///
    /// ```
    /// use stable_vector::StableVec;
    /// let mut vec: StableVec<i32> = StableVec::new();
    /// vec.push(1);
    /// vec.push(2);
    /// assert_eq!(vec.len(), 2);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        self.tail_chunk().push(value);
    }

    /// Appends an element constructed in place at the back of the vector.
    ///
    /// The closure runs after the slot has been secured, so the value goes
    /// straight into its final chunk.
    ///
    /// # Example
    ///
    /// ```
    /// use stable_vector::StableVec;
    /// let mut vec: StableVec<String> = StableVec::new();
    /// vec.push_with(|| "hello".to_string());
    /// assert_eq!(vec[0], "hello");
    /// ```
    #[inline]
    pub fn push_with<F>(&mut self, f: F)
    where
        F: FnOnce() -> T,
    {
        let chunk = self.tail_chunk();
        chunk.push(f());
    }

    /// Ensures a non-full tail chunk exists and returns it.
    ///
    /// Promotes a spare chunk if one is available, otherwise allocates.
    fn tail_chunk(&mut self) -> &mut Chunk<T, CHUNK_SIZE> {
        if self.chunks.last().map_or(true, |chunk| chunk.is_full()) {
            let chunk = self.spare.pop().unwrap_or_else(Chunk::new_boxed);
            self.chunks.push(chunk);
        }
        let tail = self.chunks.len() - 1;
        &mut self.chunks[tail]
    }

    /// Pre-allocates chunks until the capacity is at least `total_capacity`.
    ///
    /// Note: unlike [`Vec::reserve`], the argument is a **total** capacity,
    /// not an additional one. Does not change `len()` and does not touch any
    /// occupied chunk.
    ///
    /// # Example
    ///
    /// ```
    /// use stable_vector::StableVec;
    /// let mut vec: StableVec<i32, 8> = StableVec::new();
    /// vec.reserve(20);
    /// assert_eq!(vec.capacity(), 24);
    /// assert_eq!(vec.len(), 0);
    /// ```
    pub fn reserve(&mut self, total_capacity: usize) {
        let needed = total_capacity.div_ceil(CHUNK_SIZE);
        let have = self.chunks.len() + self.spare.len();
        if needed > have {
            self.spare.reserve(needed - have);
            for _ in have..needed {
                self.spare.push(Chunk::new_boxed());
            }
        }
    }

    /// Returns a reference to the element at the given logical index, or
    /// `None` if the index is out of bounds.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.chunks
            .get(index / CHUNK_SIZE)?
            .as_slice()
            .get(index % CHUNK_SIZE)
    }

    /// Returns a mutable reference to the element at the given logical
    /// index, or `None` if the index is out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.chunks
            .get_mut(index / CHUNK_SIZE)?
            .as_mut_slice()
            .get_mut(index % CHUNK_SIZE)
    }

    /// Bounds-checked access that reports the failing index.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] when `index >= self.len()`.
    ///
    /// # Example
    ///
    /// ```
    /// use stable_vector::StableVec;
    /// let mut vec: StableVec<i32, 4> = StableVec::new();
    /// vec.push(10);
    /// assert_eq!(vec.at(0), Ok(&10));
    /// assert!(vec.at(1).is_err());
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, OutOfRangeError> {
        self.get(index).ok_or_else(|| OutOfRangeError {
            index,
            len: self.len(),
        })
    }

    /// Bounds-checked mutable access that reports the failing index.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] when `index >= self.len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRangeError> {
        let len = self.len();
        if let Some(chunk) = self.chunks.get_mut(index / CHUNK_SIZE) {
            if index % CHUNK_SIZE < chunk.len() {
                // Safety: just checked the offset against the occupancy.
                return Ok(unsafe { chunk.get_unchecked_mut(index % CHUNK_SIZE) });
            }
        }
        Err(OutOfRangeError { index, len })
    }

    /// Returns a reference to the element at `index` without bounds checks.
    ///
    /// This is the branch-free fast path: a division, a remainder, and two
    /// pointer offsets.
    ///
    /// # Safety
    ///
    /// `index` must be less than `self.len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        self.chunks
            .get_unchecked(index / CHUNK_SIZE)
            .get_unchecked(index % CHUNK_SIZE)
    }

    /// Returns a mutable reference to the element at `index` without bounds
    /// checks.
    ///
    /// # Safety
    ///
    /// `index` must be less than `self.len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        self.chunks
            .get_unchecked_mut(index / CHUNK_SIZE)
            .get_unchecked_mut(index % CHUNK_SIZE)
    }

    /// Moves the element at `index` out of its chunk.
    ///
    /// # Safety
    ///
    /// `index` must be less than `self.len()`, and the caller must
    /// reconcile chunk occupancies so the value is not dropped again.
    #[inline]
    pub(crate) unsafe fn read_unchecked(&self, index: usize) -> T {
        self.chunks
            .get_unchecked(index / CHUNK_SIZE)
            .read(index % CHUNK_SIZE)
    }

    /// Returns a reference to the first element, or `None` if empty.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.chunks.first()?.as_slice().first()
    }

    /// Returns a mutable reference to the first element, or `None` if empty.
    #[inline]
    pub fn first_mut(&mut self) -> Option<&mut T> {
        self.chunks.first_mut()?.as_mut_slice().first_mut()
    }

    /// Returns a reference to the last element, or `None` if empty.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.chunks.last()?.as_slice().last()
    }

    /// Returns a mutable reference to the last element, or `None` if empty.
    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.chunks.last_mut()?.as_mut_slice().last_mut()
    }

    /// Exchanges the contents of two vectors in O(1).
    ///
    /// Only chunk ownership moves; no element is moved or copied.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Returns an iterator over references to the elements.
    ///
    /// The iterator re-resolves its position through the chunk table on
    /// every step; it never holds a raw element pointer.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, CHUNK_SIZE> {
        Iter {
            vec: self,
            front: 0,
            back: self.len(),
        }
    }

    /// Returns an iterator over mutable references to the elements.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, CHUNK_SIZE> {
        let len = self.len();
        IterMut {
            vec: self,
            front: 0,
            back: len,
        }
    }

    /// Visits the occupied chunks as contiguous slices, in logical order.
    fn chunk_slices(&self) -> impl Iterator<Item = &[T]> {
        self.chunks.iter().map(|chunk| chunk.as_slice())
    }
}

impl<T: Clone, const CHUNK_SIZE: usize> Clone for StableVec<T, CHUNK_SIZE> {
    /// Deep copy: reconstructs an independent chunk-for-chunk duplicate.
    ///
    /// Spare capacity is not part of the value and is not cloned.
    fn clone(&self) -> Self {
        Self {
            chunks: self.chunks.iter().map(|chunk| chunk.clone_boxed()).collect(),
            spare: Vec::new(),
        }
    }

    /// Copy-and-swap: the new value is fully built before the old one is
    /// released, so a mid-clone panic leaves `self` untouched.
    fn clone_from(&mut self, source: &Self) {
        let fresh = source.clone();
        *self = fresh;
    }
}

impl<T, const CHUNK_SIZE: usize> Default for StableVec<T, CHUNK_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug, const CHUNK_SIZE: usize> std::fmt::Debug for StableVec<T, CHUNK_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Equality compares logical contents only; the chunk size is a storage
/// layout parameter, so vectors with different chunk sizes can be equal.
impl<T, U, const N: usize, const M: usize> PartialEq<StableVec<U, M>> for StableVec<T, N>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &StableVec<U, M>) -> bool {
        if N == M {
            // Same layout: lengths and boundaries line up chunk for chunk.
            return self.chunks.len() == other.chunks.len()
                && self
                    .chunk_slices()
                    .zip(other.chunk_slices())
                    .all(|(a, b)| a == b);
        }
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, const CHUNK_SIZE: usize> Eq for StableVec<T, CHUNK_SIZE> {}

impl<T: PartialOrd, const CHUNK_SIZE: usize> PartialOrd for StableVec<T, CHUNK_SIZE> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, const CHUNK_SIZE: usize> Ord for StableVec<T, CHUNK_SIZE> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: std::hash::Hash, const CHUNK_SIZE: usize> std::hash::Hash for StableVec<T, CHUNK_SIZE> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T, const CHUNK_SIZE: usize> Index<usize> for StableVec<T, CHUNK_SIZE> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index).expect("index out of bounds")
    }
}

impl<T, const CHUNK_SIZE: usize> IndexMut<usize> for StableVec<T, CHUNK_SIZE> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.get_mut(index).expect("index out of bounds")
    }
}

impl<T, const CHUNK_SIZE: usize> Extend<T> for StableVec<T, CHUNK_SIZE> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Clone + 'a, const CHUNK_SIZE: usize> Extend<&'a T> for StableVec<T, CHUNK_SIZE> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item.clone());
        }
    }
}

impl<T, const CHUNK_SIZE: usize> FromIterator<T> for StableVec<T, CHUNK_SIZE> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        vec.extend(iter);
        vec
    }
}

impl<T, const CHUNK_SIZE: usize, const M: usize> From<[T; M]> for StableVec<T, CHUNK_SIZE> {
    fn from(values: [T; M]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone, const CHUNK_SIZE: usize> From<&[T]> for StableVec<T, CHUNK_SIZE> {
    fn from(values: &[T]) -> Self {
        values.iter().cloned().collect()
    }
}

impl<T, const CHUNK_SIZE: usize> IntoIterator for StableVec<T, CHUNK_SIZE> {
    type Item = T;
    type IntoIter = IntoIter<T, CHUNK_SIZE>;

    fn into_iter(self) -> Self::IntoIter {
        let len = self.len();
        IntoIter {
            vec: self,
            index: 0,
            len,
        }
    }
}

impl<'a, T, const CHUNK_SIZE: usize> IntoIterator for &'a StableVec<T, CHUNK_SIZE> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, CHUNK_SIZE>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const CHUNK_SIZE: usize> IntoIterator for &'a mut StableVec<T, CHUNK_SIZE> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, CHUNK_SIZE>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
