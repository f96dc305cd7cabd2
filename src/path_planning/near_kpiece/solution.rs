//! Best-solution record shared by all workers of a solve
//!
//! The payload sits behind its own lock, independent of the tree lock. Two
//! atomics mirror what the workers poll on every iteration: whether an exact
//! solution exists, and the current best approximate distance.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::common::MotionId;

#[derive(Debug)]
struct Slots {
    exact: Option<(MotionId, f64)>,
    approximate: Option<MotionId>,
    approximate_distance: f64,
}

/// Final content of a record once every worker has stopped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolutionOutcome {
    /// Exact solution motion and its goal distance
    pub exact: Option<(MotionId, f64)>,
    /// Motion closest to the goal among the non-satisfying ones
    pub approximate: Option<MotionId>,
    /// Goal distance of `approximate`, infinite when absent
    pub approximate_distance: f64,
}

/// Thread-safe holder of the best exact and approximate results
#[derive(Debug)]
pub struct SolutionRecord {
    solved: AtomicBool,
    approximate_bits: AtomicU64,
    slots: Mutex<Slots>,
}

impl SolutionRecord {
    pub fn new() -> Self {
        Self {
            solved: AtomicBool::new(false),
            approximate_bits: AtomicU64::new(f64::INFINITY.to_bits()),
            slots: Mutex::new(Slots {
                exact: None,
                approximate: None,
                approximate_distance: f64::INFINITY,
            }),
        }
    }

    /// Lock-free check polled by the worker loop
    pub fn has_exact_solution(&self) -> bool {
        self.solved.load(Ordering::Acquire)
    }

    /// Current best approximate distance, read without the lock
    pub fn approximate_distance(&self) -> f64 {
        f64::from_bits(self.approximate_bits.load(Ordering::Acquire))
    }

    /// Store an exact solution unless one is already recorded.
    ///
    /// Returns `true` for the single winning caller; later callers change nothing.
    pub fn try_commit_exact(&self, motion: MotionId, distance: f64) -> bool {
        let mut slots = self.slots.lock();
        if slots.exact.is_some() {
            return false;
        }
        slots.exact = Some((motion, distance));
        self.solved.store(true, Ordering::Release);
        true
    }

    /// Replace the approximate solution if `distance` is strictly better
    pub fn try_improve_approx(&self, motion: MotionId, distance: f64) -> bool {
        if !(distance < self.approximate_distance()) {
            return false;
        }

        let mut slots = self.slots.lock();
        if distance < slots.approximate_distance {
            slots.approximate = Some(motion);
            slots.approximate_distance = distance;
            self.approximate_bits.store(distance.to_bits(), Ordering::Release);
            true
        } else {
            false
        }
    }

    pub fn into_outcome(self) -> SolutionOutcome {
        let slots = self.slots.into_inner();
        SolutionOutcome {
            exact: slots.exact,
            approximate: slots.approximate,
            approximate_distance: slots.approximate_distance,
        }
    }
}

impl Default for SolutionRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_new_record_is_empty() {
        let record = SolutionRecord::new();
        assert!(!record.has_exact_solution());
        assert_eq!(record.approximate_distance(), f64::INFINITY);
        let outcome = record.into_outcome();
        assert!(outcome.exact.is_none());
        assert!(outcome.approximate.is_none());
    }

    #[test]
    fn test_exact_is_first_writer_wins() {
        let record = SolutionRecord::new();
        assert!(record.try_commit_exact(MotionId(3), 0.0));
        assert!(record.has_exact_solution());
        assert!(!record.try_commit_exact(MotionId(4), 0.0));
        assert_eq!(record.into_outcome().exact, Some((MotionId(3), 0.0)));
    }

    #[test]
    fn test_approximate_requires_strict_improvement() {
        let record = SolutionRecord::new();
        assert!(record.try_improve_approx(MotionId(1), 2.0));
        assert!(!record.try_improve_approx(MotionId(2), 2.0));
        assert!(!record.try_improve_approx(MotionId(3), 3.0));
        assert!(!record.try_improve_approx(MotionId(4), f64::NAN));
        assert!(record.try_improve_approx(MotionId(5), 1.0));

        let outcome = record.into_outcome();
        assert_eq!(outcome.approximate, Some(MotionId(5)));
        assert_eq!(outcome.approximate_distance, 1.0);
    }

    #[test]
    fn test_simultaneous_exact_commits_have_one_winner() {
        for _ in 0..50 {
            let record = SolutionRecord::new();
            let barrier = Barrier::new(2);

            let wins: Vec<bool> = thread::scope(|s| {
                let handles: Vec<_> = (0..2)
                    .map(|t| {
                        let record = &record;
                        let barrier = &barrier;
                        s.spawn(move || {
                            barrier.wait();
                            record.try_commit_exact(MotionId(t), 0.0)
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            assert_eq!(wins.iter().filter(|&&w| w).count(), 1);
            let winner = wins.iter().position(|&w| w).unwrap();
            assert!(record.has_exact_solution());
            assert_eq!(record.into_outcome().exact, Some((MotionId(winner), 0.0)));
        }
    }

    proptest! {
        #[test]
        fn prop_approximate_distance_never_increases(
            distances in prop::collection::vec(0.0f64..100.0, 1..64),
            threads in 1usize..6,
        ) {
            let record = SolutionRecord::new();
            let chunk = (distances.len() + threads - 1) / threads;

            let observed: Vec<f64> = thread::scope(|s| {
                for (t, part) in distances.chunks(chunk).enumerate() {
                    let record = &record;
                    s.spawn(move || {
                        for (i, d) in part.iter().enumerate() {
                            record.try_improve_approx(MotionId(t * chunk + i), *d);
                        }
                    });
                }
                let observer = s.spawn(|| {
                    (0..256).map(|_| record.approximate_distance()).collect::<Vec<f64>>()
                });
                observer.join().unwrap()
            });

            for pair in observed.windows(2) {
                prop_assert!(pair[1] <= pair[0]);
            }

            let best = distances.iter().cloned().fold(f64::INFINITY, f64::min);
            let outcome = record.into_outcome();
            prop_assert_eq!(outcome.approximate_distance, best);
            let winner = outcome.approximate.unwrap();
            prop_assert_eq!(distances[winner.index()], best);
        }
    }
}
