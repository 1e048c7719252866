use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::constants::{
    BACK_BONUS, BASE_SCORE, EMPTY_BANK_PENALTY, FRONT_BONUS, FULL_BANK_PENALTY, ROWS_A, SOLO_BONUS,
};
use crate::geometry::{Layout, Topology, on_row_in_both};
use crate::roster::Roster;
use crate::solver::Assignment;

/// Weights used to rank valid seatings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub base: i64,
    pub front_bonus: i64,
    pub back_bonus: i64,
    pub solo_bonus: i64,
    pub empty_bank_penalty: i64,
    /// Penalty for a fully occupied bank, indexed by distance from the front
    pub full_bank_penalty: [i64; ROWS_A],
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base: BASE_SCORE,
            front_bonus: FRONT_BONUS,
            back_bonus: BACK_BONUS,
            solo_bonus: SOLO_BONUS,
            empty_bank_penalty: EMPTY_BANK_PENALTY,
            full_bank_penalty: FULL_BANK_PENALTY,
        }
    }
}

impl ScoringPolicy {
    pub fn full_bank_penalty(&self, distance: usize) -> i64 {
        self.full_bank_penalty[distance.min(ROWS_A - 1)]
    }
}

/// Score of one seating plus the human readable list of what it misses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub score: i64,
    pub unmet: Vec<String>,
}

pub struct Evaluator<'a> {
    topology: &'a Topology,
    roster: &'a Roster,
    policy: ScoringPolicy,
}

impl<'a> Evaluator<'a> {
    pub fn new(topology: &'a Topology, roster: &'a Roster, policy: ScoringPolicy) -> Self {
        Self {
            topology,
            roster,
            policy,
        }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Score an assignment keyed by layout A seats.
    ///
    /// Preferences are checked per student in roster order, then every bank of
    /// layout A and layout B adds its empty or full bank term.
    pub fn evaluate(&self, assignment: &Assignment) -> Evaluation {
        let mut score = self.policy.base;
        let mut unmet = Vec::new();

        let seat_of = |name: &str| {
            assignment
                .iter()
                .find(|(_, n)| n.as_str() == name)
                .map(|(&seat, _)| seat)
        };

        for student in self.roster.students() {
            let Some(seat) = seat_of(&student.name) else {
                continue;
            };

            if student.front {
                if on_row_in_both(seat, Layout::front_row) {
                    score += self.policy.front_bonus;
                } else {
                    unmet.push(format!("{} not in front", student.name));
                }
            }
            if student.back {
                if on_row_in_both(seat, Layout::back_row) {
                    score += self.policy.back_bonus;
                } else {
                    unmet.push(format!("{} not in back", student.name));
                }
            }
            if student.solo {
                if assignment.contains_key(&seat.buddy()) {
                    unmet.push(format!("{} not alone", student.name));
                } else {
                    score += self.policy.solo_bonus;
                }
            }
        }

        for layout in Layout::iter() {
            let mut occupied = vec![vec![0usize; layout.cols()]; layout.rows()];
            for &seat in assignment.keys() {
                let s = self.topology.project(seat, layout);
                occupied[s.row][s.col] += 1;
            }

            for (row, banks) in occupied.iter().enumerate() {
                for (col, &count) in banks.iter().enumerate() {
                    match count {
                        0 => {
                            score -= self.policy.empty_bank_penalty;
                            log::debug!("empty bank in layout {layout} at row {row}, bank {col}");
                            unmet.push("empty bank (seating not optimal)".to_string());
                        }
                        2 => {
                            score -= self
                                .policy
                                .full_bank_penalty(row.abs_diff(layout.front_row()));
                        }
                        _ => {}
                    }
                }
            }
        }

        log::debug!("evaluated seating: score {score}, {} unmet", unmet.len());
        Evaluation { score, unmet }
    }

    /// Score reached when every preference is met and no bank term applies
    pub fn max_score(&self) -> i64 {
        self.policy.base
            + self.policy.front_bonus * self.roster.front_count() as i64
            + self.policy.back_bonus * self.roster.back_count() as i64
            + self.policy.solo_bonus * self.roster.solo_count() as i64
    }
}
