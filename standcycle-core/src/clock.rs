use serde::{Deserialize, Serialize};

/// Fraction of a year covered by one simulated month.
pub const MONTH_FRACTION: f64 = 1.0 / 12.0;

/// Explicit simulation time passed through every call that needs it.
///
/// Months are numbered 1 (January) through 12 (December). The clock is a
/// plain value so that sites can be advanced in parallel without any shared
/// notion of "the current month".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationClock {
    pub year: u32,
    pub month: u8,
}

impl SimulationClock {
    pub fn new(year: u32, month: u8) -> Self {
        debug_assert!((1..=12).contains(&month), "month out of range: {month}");
        Self { year, month }
    }

    /// The clock one month later.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Whether the current month falls inside an inclusive month window.
    ///
    /// Windows may wrap around the year end, e.g. `(11, 2)` covers
    /// November through February.
    pub fn in_window(self, start: u8, end: u8) -> bool {
        if start <= end {
            (start..=end).contains(&self.month)
        } else {
            self.month >= start || self.month <= end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_wraps_year() {
        let clock = SimulationClock::new(2000, 12);
        assert_eq!(clock.next(), SimulationClock::new(2001, 1));
        assert_eq!(SimulationClock::new(2000, 3).next().month, 4);
    }

    #[test]
    fn test_window_membership() {
        let april = SimulationClock::new(1, 4);
        assert!(april.in_window(3, 6));
        assert!(!april.in_window(7, 9));
        // Wrap-around window
        let january = SimulationClock::new(1, 1);
        assert!(january.in_window(11, 2));
        assert!(!january.in_window(5, 10));
    }
}
