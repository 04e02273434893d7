use std::collections::VecDeque;

/// Count-bounded window over the most recent values of a stream.
///
/// Pushing into a full window evicts the oldest value, so memory stays
/// constant no matter how long the stream runs.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// A capacity of zero is bumped to one; an empty window cannot hold the
    /// value that was just pushed.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(item);
    }

    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    /// The value pushed immediately before `latest`.
    pub fn previous(&self) -> Option<&T> {
        let index = self.values.len().checked_sub(2)?;
        self.values.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
