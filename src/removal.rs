/// Deferred removal for collections that are being walked.
///
/// Detection passes only mark indices; nothing is spliced while a loop
/// holds positions into the collection.  Once the pass is over, `apply`
/// compacts the collection in a single stable sweep.

#[derive(Clone, Debug, Default)]
pub struct RemovalSet {
    marked: Vec<bool>,
    count: usize,
}

impl RemovalSet {
    /// A set sized to a collection of `len` entries at the start of a pass.
    pub fn with_len(len: usize) -> Self {
        RemovalSet {
            marked: vec![false; len],
            count: 0,
        }
    }

    /// Mark `index` for removal.  Returns `false` when the entry is
    /// already gone (marked earlier in this pass, or out of range).
    pub fn mark(&mut self, index: usize) -> bool {
        match self.marked.get_mut(index) {
            Some(slot) if !*slot => {
                *slot = true;
                self.count += 1;
                true
            }
            _ => {
                log::trace!("ignoring stale removal of index {}", index);
                false
            }
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.marked.get(index).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Drop every marked entry, preserving the order of survivors.
    /// Returns how many entries were removed.
    pub fn apply<T>(&self, items: &mut Vec<T>) -> usize {
        if self.count == 0 {
            return 0;
        }
        let before = items.len();
        *items = std::mem::take(items)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !self.contains(*i))
            .map(|(_, item)| item)
            .collect();
        before - items.len()
    }
}
