/// Free-list of backing buffers for cell entry lists. Lists returned here
/// keep their capacity, so a warmed pool serves steady-state churn without
/// touching the allocator.
#[derive(Debug)]
pub(crate) struct ListPool<T> {
    free: Vec<Vec<T>>,
}

impl<T> Default for ListPool<T> {
    fn default() -> Self {
        Self { free: Vec::new() }
    }
}

impl<T> ListPool<T> {
    pub(crate) fn acquire(&mut self) -> Vec<T> {
        self.free.pop().unwrap_or_default()
    }

    pub(crate) fn release(&mut self, mut list: Vec<T>) {
        list.clear();
        self.free.push(list);
    }

    pub(crate) fn free_count(&self) -> usize {
        self.free.len()
    }
}
