//! Ring statistics
//!
//! Counters let the owning task see data loss without the ring deciding
//! whether an overwrite is worth an alarm.

/// Counters for one ring
///
/// All counters wrap on overflow. Counts are per record, across the copying
/// and zero-copy paths alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingStats {
    /// Records accepted by push or write advances
    pub pushed: u32,
    /// Records removed by pop or read advances
    pub popped: u32,
    /// Records discarded to make room for newer ones
    pub overwritten: u32,
    /// Highest fill level seen
    pub max_depth: u32,
}

impl RingStats {
    /// All counters zero
    pub const fn new() -> Self {
        Self {
            pushed: 0,
            popped: 0,
            overwritten: 0,
            max_depth: 0,
        }
    }

    pub(crate) fn record_push(&mut self, records: usize, overwritten: usize, depth: usize) {
        self.pushed = self.pushed.wrapping_add(records as u32);
        self.overwritten = self.overwritten.wrapping_add(overwritten as u32);
        self.max_depth = self.max_depth.max(depth as u32);
    }

    pub(crate) fn record_pop(&mut self, records: usize) {
        self.popped = self.popped.wrapping_add(records as u32);
    }

    /// True if any record has been lost to an overwrite
    pub fn has_overwritten(&self) -> bool {
        self.overwritten > 0
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RingStats {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "pushed={} popped={} overwritten={} max_depth={}",
            self.pushed,
            self.popped,
            self.overwritten,
            self.max_depth
        )
    }
}
