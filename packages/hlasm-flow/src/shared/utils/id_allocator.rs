//! Element ID allocation
//!
//! Each structuring pass owns one allocator, so IDs restart at 1 for every
//! run and never leak between runs or between tests executing in parallel.

/// Sequential ID allocator producing `elem_1`, `elem_2`, ...
#[derive(Debug, Clone)]
pub struct IdAllocator {
    prefix: &'static str,
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::with_prefix("elem")
    }

    pub fn with_prefix(prefix: &'static str) -> Self {
        Self { prefix, next: 1 }
    }

    /// Allocate the next ID
    pub fn next_id(&mut self) -> String {
        let id = format!("{}_{}", self.prefix, self.next);
        self.next += 1;
        id
    }

    /// Number of IDs handed out so far
    pub fn allocated(&self) -> u64 {
        self.next - 1
    }

    /// Restart numbering at 1
    pub fn reset(&mut self) {
        self.next = 1;
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
