use std::sync::atomic::{AtomicU32, Ordering};

/// Process-wide source of unique ids.
///
/// Ids start at 1 so that 0 is never handed out. The counter wraps around after `u32::MAX` ids.
pub struct IdCounter {
    value: AtomicU32,
}

impl IdCounter {
    pub const fn new() -> Self {
        Self {
            value: AtomicU32::new(1),
        }
    }

    pub fn next(&self) -> u32 {
        self.value.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}
