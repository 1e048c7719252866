use rand::Rng;

use crate::constants::{
    DEFAULT_ATTEMPTS, DEFAULT_CANDIDATES, DEFAULT_MAX_NODES, DEFAULT_PROGRESS_EVERY,
};
use crate::error::{Result, SeatPlanError};
use crate::evaluate::{Evaluation, Evaluator};
use crate::solver::{SearchOrder, Seating, Solver};

/// A valid seating together with its score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub seating: Seating,
    pub score: i64,
    pub unmet: Vec<String>,
}

impl Candidate {
    pub fn new(seating: Seating, evaluation: Evaluation) -> Self {
        Self {
            seating,
            score: evaluation.score,
            unmet: evaluation.unmet,
        }
    }
}

/// Best `capacity` candidates seen so far, highest score first.
///
/// Equal scores keep arrival order, and a seating already in the pool is not
/// added twice.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    capacity: usize,
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            candidates: Vec::with_capacity(capacity + 1),
        }
    }

    /// Insert `candidate` at its rank; returns whether it was kept.
    pub fn offer(&mut self, candidate: Candidate) -> bool {
        if self
            .candidates
            .iter()
            .any(|c| c.seating.assignment == candidate.seating.assignment)
        {
            return false;
        }

        let pos = self
            .candidates
            .partition_point(|c| c.score >= candidate.score);
        if pos >= self.capacity {
            return false;
        }
        self.candidates.insert(pos, candidate);
        self.candidates.truncate(self.capacity);
        true
    }

    pub fn is_full(&self) -> bool {
        self.candidates.len() >= self.capacity
    }

    pub fn worst_score(&self) -> Option<i64> {
        self.candidates.last().map(|c| c.score)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}

/// Snapshot handed to the progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub attempts: usize,
    pub budget: usize,
    pub found: usize,
    pub best_score: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct RankOptions {
    pub attempts: usize,
    /// Size of the result list
    pub candidates: usize,
    pub progress_every: usize,
    pub bias_preferences: bool,
    /// Placements one attempt may try before it is abandoned
    pub max_nodes: usize,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            candidates: DEFAULT_CANDIDATES,
            progress_every: DEFAULT_PROGRESS_EVERY,
            bias_preferences: true,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl RankOptions {
    fn validate(&self) -> Result<()> {
        if self.attempts == 0 {
            return Err(SeatPlanError::InvalidInput(
                "attempt budget must be positive".to_string(),
            ));
        }
        if self.candidates == 0 {
            return Err(SeatPlanError::InvalidInput(
                "candidate count must be positive".to_string(),
            ));
        }
        if self.progress_every == 0 {
            return Err(SeatPlanError::InvalidInput(
                "progress interval must be positive".to_string(),
            ));
        }
        if self.max_nodes == 0 {
            return Err(SeatPlanError::InvalidInput(
                "node budget must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Runs many independent attempts and keeps the best scoring seatings
pub struct Ranker<'a> {
    solver: &'a Solver<'a>,
    evaluator: &'a Evaluator<'a>,
}

impl<'a> Ranker<'a> {
    pub fn new(solver: &'a Solver<'a>, evaluator: &'a Evaluator<'a>) -> Self {
        Self { solver, evaluator }
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        options: &RankOptions,
    ) -> Result<Vec<Candidate>> {
        self.generate_with_progress(rng, options, |_| {})
    }

    /// Collect up to `options.candidates` seatings, best first.
    ///
    /// Stops early once the pool is full and even its worst entry reaches the
    /// maximum possible score. `progress` fires every `progress_every`
    /// attempts and once more when the loop ends.
    pub fn generate_with_progress<R, F>(
        &self,
        rng: &mut R,
        options: &RankOptions,
        mut progress: F,
    ) -> Result<Vec<Candidate>>
    where
        R: Rng + ?Sized,
        F: FnMut(Progress),
    {
        options.validate()?;

        let roster = self.solver.roster();
        let max_score = self.evaluator.max_score();
        log::info!(
            "ranking seatings for {} students: budget {} attempts, keeping {}, max score {}",
            roster.len(),
            options.attempts,
            options.candidates,
            max_score
        );

        let mut pool = CandidatePool::new(options.candidates);
        let mut done = 0;
        let mut reported = 0;
        let snapshot = |done: usize, pool: &CandidatePool| Progress {
            attempts: done,
            budget: options.attempts,
            found: pool.len(),
            best_score: pool.candidates().first().map(|c| c.score),
        };

        while done < options.attempts {
            let order = SearchOrder::shuffled(roster, rng, options.bias_preferences);
            done += 1;

            if let Some(seating) = self.solver.solve_once(&order, options.max_nodes) {
                let evaluation = self.evaluator.evaluate(&seating.assignment);
                let score = evaluation.score;
                if pool.offer(Candidate::new(seating, evaluation)) {
                    log::debug!("attempt {done}: kept candidate with score {score}");
                }
            }

            if done % options.progress_every == 0 {
                progress(snapshot(done, &pool));
                reported = done;
            }

            if pool.is_full() && pool.worst_score().is_some_and(|w| w >= max_score) {
                log::info!("every kept candidate reaches the maximum score, stopping after {done} attempts");
                break;
            }
        }

        if reported != done {
            progress(snapshot(done, &pool));
        }

        if pool.is_empty() {
            return Err(SeatPlanError::NoSolutionFound { attempts: done });
        }
        log::info!(
            "kept {} candidates after {} attempts (best score {})",
            pool.len(),
            done,
            pool.candidates()[0].score
        );
        Ok(pool.into_candidates())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SEAT_COUNT;
    use crate::evaluate::ScoringPolicy;
    use crate::geometry::{Seat, Side, Topology};
    use crate::roster::{ClassInput, Roster};
    use crate::solver::Assignment;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeSet;

    fn class(n: usize) -> ClassInput {
        ClassInput {
            students: (1..=n).map(|i| format!("Lln{i:02}")).collect(),
            ..Default::default()
        }
    }

    fn candidate(name: &str, seat: usize, score: i64) -> Candidate {
        let mut assignment = Assignment::new();
        assignment.insert(Seat::from_index(seat), name.to_string());
        Candidate {
            seating: Seating {
                assignment,
                reserved: BTreeSet::new(),
            },
            score,
            unmet: Vec::new(),
        }
    }

    #[test]
    fn test_pool_keeps_best_in_order() {
        let mut pool = CandidatePool::new(3);
        assert!(pool.offer(candidate("A", 0, 10)));
        assert!(pool.offer(candidate("A", 1, 30)));
        assert!(pool.offer(candidate("A", 2, 20)));
        assert!(pool.is_full());
        assert!(pool.offer(candidate("A", 3, 25)));
        assert!(!pool.offer(candidate("A", 4, 5)));

        let scores: Vec<i64> = pool.candidates().iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![30, 25, 20]);
        assert_eq!(pool.worst_score(), Some(20));
    }

    #[test]
    fn test_pool_ties_keep_arrival_order() {
        let mut pool = CandidatePool::new(2);
        pool.offer(candidate("A", 0, 10));
        pool.offer(candidate("A", 1, 10));
        assert!(!pool.offer(candidate("A", 2, 10)));
        let seats: Vec<Seat> = pool
            .candidates()
            .iter()
            .map(|c| *c.seating.assignment.keys().next().unwrap())
            .collect();
        assert_eq!(
            seats,
            vec![Seat::new(0, 0, Side::Left), Seat::new(0, 0, Side::Right)]
        );
    }

    #[test]
    fn test_pool_rejects_duplicate_seating() {
        let mut pool = CandidatePool::new(5);
        assert!(pool.offer(candidate("A", 7, 10)));
        assert!(!pool.offer(candidate("A", 7, 10)));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_generate_sorted_and_valid() {
        let mut input = class(10);
        input.forbidden = vec![vec!["Lln01".into(), "Lln02".into()]];
        input.front = vec!["Lln03".into()];
        input.solo = vec!["Lln04".into()];
        let roster = Roster::build(&input).unwrap();
        let topo = Topology::build();
        let solver = Solver::new(&topo, &roster);
        let evaluator = Evaluator::new(&topo, &roster, ScoringPolicy::default());
        let ranker = Ranker::new(&solver, &evaluator);

        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let options = RankOptions {
            attempts: 200,
            candidates: 5,
            ..Default::default()
        };
        let ranked = ranker.generate(&mut rng, &options).unwrap();

        assert!(!ranked.is_empty() && ranked.len() <= 5);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        for c in &ranked {
            assert!(solver.violations(&c.seating).is_empty());
            assert_eq!(evaluator.evaluate(&c.seating.assignment).score, c.score);
            assert!(c.score <= evaluator.max_score());
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        let mut input = class(8);
        input.forbidden = vec![vec!["Lln01".into(), "Lln02".into(), "Lln03".into()]];
        input.back = vec!["Lln04".into()];
        let roster = Roster::build(&input).unwrap();
        let topo = Topology::build();
        let solver = Solver::new(&topo, &roster);
        let evaluator = Evaluator::new(&topo, &roster, ScoringPolicy::default());
        let ranker = Ranker::new(&solver, &evaluator);

        let options = RankOptions {
            attempts: 50,
            candidates: 3,
            ..Default::default()
        };
        let first = ranker
            .generate(&mut ChaCha8Rng::seed_from_u64(8), &options)
            .unwrap();
        let second = ranker
            .generate(&mut ChaCha8Rng::seed_from_u64(8), &options)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_early_stop_at_max_score() {
        let roster = Roster::build(&class(4)).unwrap();
        let topo = Topology::build();
        let solver = Solver::new(&topo, &roster);
        // without bank terms every valid seating scores the maximum
        let policy = ScoringPolicy {
            empty_bank_penalty: 0,
            full_bank_penalty: [0; 4],
            ..Default::default()
        };
        let evaluator = Evaluator::new(&topo, &roster, policy);
        let ranker = Ranker::new(&solver, &evaluator);

        let options = RankOptions {
            attempts: 1_000,
            candidates: 1,
            progress_every: 100,
            ..Default::default()
        };
        let mut reports = Vec::new();
        let ranked = ranker
            .generate_with_progress(&mut ChaCha8Rng::seed_from_u64(1), &options, |p| {
                reports.push(p)
            })
            .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, evaluator.max_score());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].attempts, 1);
        assert_eq!(reports[0].budget, 1_000);
    }

    #[test]
    fn test_progress_reported_periodically_and_at_end() {
        let roster = Roster::build(&class(2)).unwrap();
        let topo = Topology::build();
        let solver = Solver::new(&topo, &roster);
        let evaluator = Evaluator::new(&topo, &roster, ScoringPolicy::default());
        let ranker = Ranker::new(&solver, &evaluator);

        let options = RankOptions {
            attempts: 10,
            candidates: 100,
            progress_every: 3,
            bias_preferences: false,
            ..Default::default()
        };
        let mut seen = Vec::new();
        ranker
            .generate_with_progress(&mut ChaCha8Rng::seed_from_u64(4), &options, |p| {
                seen.push(p.attempts)
            })
            .unwrap();
        assert_eq!(seen, vec![3, 6, 9, 10]);
    }

    #[test]
    fn test_impossible_class_yields_no_candidates() {
        let mut input = class(7);
        input.forbidden = vec![input.students.clone()];
        let roster = Roster::build(&input).unwrap();
        let topo = Topology::build();
        let solver = Solver::new(&topo, &roster);
        let evaluator = Evaluator::new(&topo, &roster, ScoringPolicy::default());
        let ranker = Ranker::new(&solver, &evaluator);

        let options = RankOptions {
            attempts: 2,
            ..Default::default()
        };
        let err = ranker
            .generate(&mut ChaCha8Rng::seed_from_u64(0), &options)
            .unwrap_err();
        assert!(matches!(err, SeatPlanError::NoSolutionFound { attempts: 2 }));
    }

    #[test]
    fn test_abandoned_attempts_yield_no_candidates() {
        let roster = Roster::build(&class(SEAT_COUNT)).unwrap();
        let topo = Topology::build();
        let solver = Solver::new(&topo, &roster);
        let evaluator = Evaluator::new(&topo, &roster, ScoringPolicy::default());
        let ranker = Ranker::new(&solver, &evaluator);

        let options = RankOptions {
            attempts: 3,
            max_nodes: 10,
            ..Default::default()
        };
        let err = ranker
            .generate(&mut ChaCha8Rng::seed_from_u64(6), &options)
            .unwrap_err();
        assert!(matches!(err, SeatPlanError::NoSolutionFound { attempts: 3 }));
    }

    #[test]
    fn test_zero_candidates_rejected() {
        let roster = Roster::build(&class(1)).unwrap();
        let topo = Topology::build();
        let solver = Solver::new(&topo, &roster);
        let evaluator = Evaluator::new(&topo, &roster, ScoringPolicy::default());
        let ranker = Ranker::new(&solver, &evaluator);

        let options = RankOptions {
            candidates: 0,
            ..Default::default()
        };
        let err = ranker
            .generate(&mut ChaCha8Rng::seed_from_u64(0), &options)
            .unwrap_err();
        assert!(err.is_input_error());
    }
}
