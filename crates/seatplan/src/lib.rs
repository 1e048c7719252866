pub mod config;
pub mod constants;
pub mod constraints;
pub mod csv_reader;
pub mod error;
pub mod evaluate;
pub mod geometry;
pub mod ranker;
pub mod roster;
pub mod solver;

pub use config::{Config, Mode};
pub use constants::SEAT_COUNT;
pub use constraints::ConflictIndex;
pub use csv_reader::{RosterEntry, read_roster_csv};
pub use error::SeatPlanError;
pub use evaluate::{Evaluation, Evaluator, ScoringPolicy};
pub use geometry::{BankId, Grid, Layout, Seat, SeatMark, Side, Topology};
pub use ranker::{Candidate, CandidatePool, Progress, RankOptions, Ranker};
pub use roster::{ClassInput, Roster, Student, Tier};
pub use solver::{Assignment, SearchOrder, Seating, SolveOptions, Solver};
