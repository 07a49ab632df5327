use crate::models::error::AudioError;

/// A finite, index-addressable source driving a `LazyIterator`.
///
/// `count` is asked again on every step, so a profile over a live
/// collection sees growth or shrinkage as it happens. Callers should not
/// mutate the backing collection while an iterator over it is in use; the
/// results are well-defined but unspecified.
pub trait IteratorProfile {
    type Item;

    fn count(&self) -> Result<usize, AudioError>;

    fn get(&self, index: usize) -> Result<Self::Item, AudioError>;
}

/// Iterator state.
///
/// ```text
/// ready ──(cursor == count)──→ exhausted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorState {
    Ready,
    Exhausted,
}

/// Pull-based, single-pass iterator over an `IteratorProfile`.
///
/// There is no rewind; build a new iterator to walk the source again.
/// Advancing takes `&mut self`, so one cursor walks a given instance.
#[derive(Debug)]
pub struct LazyIterator<P> {
    profile: P,
    cursor: usize,
    fused: bool,
}

impl<P: IteratorProfile> LazyIterator<P> {
    pub fn new(profile: P) -> Self {
        Self {
            profile,
            cursor: 0,
            fused: false,
        }
    }

    /// Whether another item is available at the current cursor.
    pub fn has_next(&self) -> Result<bool, AudioError> {
        Ok(self.cursor < self.profile.count()?)
    }

    /// Return the item at the cursor and advance.
    ///
    /// Fails with `OutOfRange` once exhausted. The cursor advances even when
    /// the profile fails to produce the item, so a bad entry is skipped
    /// rather than retried forever.
    pub fn try_next(&mut self) -> Result<P::Item, AudioError> {
        if !self.has_next()? {
            return Err(AudioError::OutOfRange);
        }
        let index = self.cursor;
        self.cursor += 1;
        self.profile.get(index)
    }

    pub fn state(&self) -> Result<IteratorState, AudioError> {
        if self.has_next()? {
            Ok(IteratorState::Ready)
        } else {
            Ok(IteratorState::Exhausted)
        }
    }

    /// Number of items consumed so far.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }
}

impl<P: IteratorProfile> Iterator for LazyIterator<P> {
    type Item = Result<P::Item, AudioError>;

    /// Yields items until exhaustion. A failing `count` is yielded once and
    /// ends the iteration.
    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        match self.has_next() {
            Ok(true) => Some(self.try_next()),
            Ok(false) => None,
            Err(e) => {
                self.fused = true;
                Some(Err(e))
            }
        }
    }
}

/// Profile over an owned snapshot.
#[derive(Debug, Clone, Default)]
pub struct VecProfile<T> {
    items: Vec<T>,
}

impl<T> VecProfile<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> From<Vec<T>> for VecProfile<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T: Clone> IteratorProfile for VecProfile<T> {
    type Item = T;

    fn count(&self) -> Result<usize, AudioError> {
        Ok(self.items.len())
    }

    fn get(&self, index: usize) -> Result<T, AudioError> {
        self.items.get(index).cloned().ok_or(AudioError::OutOfRange)
    }
}
