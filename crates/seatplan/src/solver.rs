use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::constants::{DEFAULT_ATTEMPTS, DEFAULT_MAX_NODES, SEAT_COUNT};
use crate::error::{Result, SeatPlanError};
use crate::geometry::{Grid, Layout, Seat, Topology, grid_of, on_row_in_both};
use crate::roster::Roster;

/// Layout A seat -> student name
pub type Assignment = BTreeMap<Seat, String>;

/// A complete valid seating: who sits where, and which seats stay free for
/// solo students.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seating {
    pub assignment: Assignment,
    pub reserved: BTreeSet<Seat>,
}

impl Seating {
    pub fn occupant(&self, seat: Seat) -> Option<&str> {
        self.assignment.get(&seat).map(String::as_str)
    }

    pub fn seat_of(&self, name: &str) -> Option<Seat> {
        self.assignment
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(&seat, _)| seat)
    }

    /// Seats neither occupied nor reserved
    pub fn free_seats(&self) -> Vec<Seat> {
        (0..SEAT_COUNT)
            .map(Seat::from_index)
            .filter(|s| !self.assignment.contains_key(s) && !self.reserved.contains(s))
            .collect()
    }

    pub fn grid(&self, layout: Layout) -> Grid {
        grid_of(&self.assignment, &self.reserved, layout)
    }
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Number of reshuffled attempts before giving up
    pub attempts: usize,
    /// Let front/back students try matching rows first
    pub bias_preferences: bool,
    /// Placements one attempt may try before it is abandoned
    pub max_nodes: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            bias_preferences: true,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

/// Visiting order of one attempt: students in placement order, and for every
/// student (by roster index) the seat indices to try, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOrder {
    students: Vec<usize>,
    seats: Vec<Vec<usize>>,
}

impl SearchOrder {
    /// Same seat list for everybody; students most constrained first, roster
    /// order within a tier.
    pub fn fixed(roster: &Roster, seats: &[Seat]) -> Self {
        let mut students: Vec<usize> = (0..roster.len()).collect();
        students.sort_by_key(|&i| roster.tier(i));
        let list: Vec<usize> = seats.iter().map(Seat::index).collect();
        Self {
            students,
            seats: vec![list; roster.len()],
        }
    }

    /// Fresh random order. Students are shuffled and then grouped by tier;
    /// every student gets an independently shuffled seat list. With `bias`,
    /// front students see front rows first and back students see the seats
    /// that are at the back in both layouts first, then the rest of the back.
    pub fn shuffled<R: Rng + ?Sized>(roster: &Roster, rng: &mut R, bias: bool) -> Self {
        let mut students: Vec<usize> = (0..roster.len()).collect();
        students.shuffle(rng);
        students.sort_by_key(|&i| roster.tier(i));

        let seats = (0..roster.len())
            .map(|i| {
                let mut list: Vec<usize> = (0..SEAT_COUNT).collect();
                list.shuffle(rng);
                let student = roster.student(i);
                if bias && student.front {
                    list.sort_by_key(|&s| {
                        let seat = Seat::from_index(s);
                        (!on_row_in_both(seat, Layout::front_row), seat.row)
                    });
                } else if bias && student.back {
                    list.sort_by_key(|&s| {
                        let seat = Seat::from_index(s);
                        Reverse((on_row_in_both(seat, Layout::back_row), seat.row))
                    });
                }
                list
            })
            .collect();

        Self { students, seats }
    }

    pub fn students(&self) -> &[usize] {
        &self.students
    }

    pub fn seats_for(&self, student: usize) -> &[usize] {
        &self.seats[student]
    }
}

/// Mutable search state, exclusively owned by one attempt
struct SearchState {
    occupant: [Option<usize>; SEAT_COUNT],
    reserved: [bool; SEAT_COUNT],
    /// placements tried so far
    nodes: usize,
    max_nodes: usize,
}

impl SearchState {
    fn new(max_nodes: usize) -> Self {
        Self {
            occupant: [None; SEAT_COUNT],
            reserved: [false; SEAT_COUNT],
            nodes: 0,
            max_nodes,
        }
    }

    fn exhausted(&self) -> bool {
        self.nodes >= self.max_nodes
    }

    fn is_taken(&self, seat: usize) -> bool {
        self.occupant[seat].is_some() || self.reserved[seat]
    }
}

/// Backtracking search over students, checking forbidden pairs against the
/// combined adjacency of both layouts.
pub struct Solver<'a> {
    topology: &'a Topology,
    roster: &'a Roster,
    /// conflict[i][j]: students i and j must not touch
    conflict: Vec<Vec<bool>>,
}

impl<'a> Solver<'a> {
    pub fn new(topology: &'a Topology, roster: &'a Roster) -> Self {
        let n = roster.len();
        let mut conflict = vec![vec![false; n]; n];
        for (i, student) in roster.students().iter().enumerate() {
            for partner in roster.conflicts().partners(&student.name) {
                if let Some(j) = roster.index_of(partner) {
                    conflict[i][j] = true;
                }
            }
        }
        Self {
            topology,
            roster,
            conflict,
        }
    }

    pub fn roster(&self) -> &'a Roster {
        self.roster
    }

    pub fn topology(&self) -> &'a Topology {
        self.topology
    }

    /// Run the driver loop: reshuffle and search until one attempt succeeds
    /// or the budget runs out.
    pub fn solve<R: Rng + ?Sized>(&self, rng: &mut R, options: &SolveOptions) -> Result<Seating> {
        if options.attempts == 0 {
            return Err(SeatPlanError::InvalidInput(
                "attempt budget must be positive".to_string(),
            ));
        }
        if options.max_nodes == 0 {
            return Err(SeatPlanError::InvalidInput(
                "node budget must be positive".to_string(),
            ));
        }
        log::info!(
            "searching a seating for {} students (budget {} attempts)",
            self.roster.len(),
            options.attempts
        );

        for attempt in 1..=options.attempts {
            let order = SearchOrder::shuffled(self.roster, rng, options.bias_preferences);
            if let Some(seating) = self.solve_once(&order, options.max_nodes) {
                log::info!("valid seating found on attempt {attempt}");
                return Ok(seating);
            }
        }

        Err(SeatPlanError::NoSolutionFound {
            attempts: options.attempts,
        })
    }

    /// One backtracking run over a fixed visiting order.
    ///
    /// Gives up after `max_nodes` placements, so an attempt on an
    /// unsatisfiable class always ends.
    pub fn solve_once(&self, order: &SearchOrder, max_nodes: usize) -> Option<Seating> {
        let mut state = SearchState::new(max_nodes);
        if !self.place(0, order, &mut state) {
            if state.exhausted() {
                log::debug!("attempt abandoned after {} placements", state.nodes);
            }
            return None;
        }

        let assignment = state
            .occupant
            .iter()
            .enumerate()
            .filter_map(|(i, occ)| {
                occ.map(|s| (Seat::from_index(i), self.roster.student(s).name.clone()))
            })
            .collect();
        let reserved = state
            .reserved
            .iter()
            .enumerate()
            .filter(|&(_, &r)| r)
            .map(|(i, _)| Seat::from_index(i))
            .collect();
        Some(Seating {
            assignment,
            reserved,
        })
    }

    fn place(&self, depth: usize, order: &SearchOrder, state: &mut SearchState) -> bool {
        let Some(&student) = order.students.get(depth) else {
            return true;
        };
        let solo = self.roster.student(student).solo;

        for &seat in order.seats_for(student) {
            if state.exhausted() {
                return false;
            }
            if !self.admits(student, seat, state) {
                continue;
            }

            state.nodes += 1;
            state.occupant[seat] = Some(student);
            if solo {
                state.reserved[Seat::buddy_index(seat)] = true;
            }
            if self.place(depth + 1, order, state) {
                return true;
            }
            // undo
            state.occupant[seat] = None;
            if solo {
                state.reserved[Seat::buddy_index(seat)] = false;
            }
        }
        false
    }

    fn admits(&self, student: usize, seat: usize, state: &SearchState) -> bool {
        if state.is_taken(seat) {
            return false;
        }

        let buddy = Seat::buddy_index(seat);
        if self.roster.student(student).solo && state.is_taken(buddy) {
            return false;
        }
        if let Some(mate) = state.occupant[buddy]
            && !self.roster.may_share_bank(student, mate)
        {
            return false;
        }

        self.topology
            .combined_neighbors(seat)
            .iter()
            .all(|&n| state.occupant[n].is_none_or(|other| !self.conflict[student][other]))
    }

    /// Check every hard rule on a finished seating.
    ///
    /// Returns a description of each violation; empty means valid.
    pub fn violations(&self, seating: &Seating) -> Vec<String> {
        let mut out = Vec::new();
        let conflicts = self.roster.conflicts();

        for student in self.roster.students() {
            if seating.seat_of(&student.name).is_none() {
                out.push(format!("{} has no seat", student.name));
            }
        }

        for (&a, name_a) in &seating.assignment {
            for (&b, name_b) in seating.assignment.range(a..).skip(1) {
                if conflicts.conflicts(name_a, name_b) && self.topology.conflicts(a, b) {
                    out.push(format!("{name_a} and {name_b} sit next to each other"));
                }
            }

            let Some(idx) = self.roster.index_of(name_a) else {
                out.push(format!("{name_a} is not on the roster"));
                continue;
            };
            let buddy = a.buddy();
            if self.roster.student(idx).solo && seating.assignment.contains_key(&buddy) {
                out.push(format!("{name_a} does not sit alone"));
            }
            if let Some(mate) = seating.occupant(buddy)
                && let Some(j) = self.roster.index_of(mate)
                && a < buddy
                && !self.roster.may_share_bank(idx, j)
            {
                out.push(format!("{name_a} and {mate} share a mixed bank"));
            }
        }
        out
    }
}
