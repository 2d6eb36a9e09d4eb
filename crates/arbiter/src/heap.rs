#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeapPressure {
    Normal,
    /// Free space dropped below the threshold.
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeapReport {
    pub used: usize,
    pub free: usize,
    pub pressure: HeapPressure,
}

/// Classifies heap usage against a free-space threshold of half the heap.
#[derive(Debug, Clone, Copy)]
pub struct HeapMonitor {
    total: usize,
    threshold: usize,
}

impl HeapMonitor {
    pub const fn new(total: usize) -> Self {
        Self { total, threshold: total / 2 }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn assess(&self, used: usize) -> HeapReport {
        let free = self.total.saturating_sub(used);
        let pressure = if free < self.threshold {
            HeapPressure::Low
        } else {
            HeapPressure::Normal
        };
        HeapReport { used, free, pressure }
    }
}
