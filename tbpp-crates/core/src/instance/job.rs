use std::fmt::Display;

/// A point in time; jobs occupy half-open intervals `[start, end)`.
pub type Time = i64;

/// A job occupies `demand` units of a server's capacity during `[start, end)`.
///
/// Jobs order lexicographically by `(start, end, demand)`, which is the order used when an
/// instance is sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Job {
    pub start: Time,
    pub end: Time,
    pub demand: u64,
}

impl Job {
    pub fn new(start: Time, end: Time, demand: u64) -> Job {
        Job { start, end, demand }
    }

    /// Whether the job runs at time `t`.
    pub fn is_active_at(&self, t: Time) -> bool {
        self.start <= t && t < self.end
    }

    /// Whether the intervals of the two jobs share at least one point in time.
    pub fn overlaps(&self, other: &Job) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    pub fn duration(&self) -> Time {
        self.end - self.start
    }
}

impl Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}) x {}", self.start, self.end, self.demand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_jobs_do_not_overlap() {
        let first = Job::new(0, 2, 1);
        let second = Job::new(2, 4, 1);

        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
        assert!(first.is_active_at(1));
        assert!(!first.is_active_at(2));
    }

    #[test]
    fn nested_jobs_overlap() {
        let outer = Job::new(0, 10, 1);
        let inner = Job::new(3, 4, 1);

        assert!(outer.overlaps(&inner));
        assert_eq!(inner.duration(), 1);
    }
}
