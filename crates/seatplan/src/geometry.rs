pub mod grid;
pub mod topology;
pub mod types;

pub use grid::{Grid, SeatMark, grid_of};
pub use topology::{Adjacency, Topology, on_row_in_both, to_layout_a, to_layout_b};
pub use types::{BankId, Layout, Seat, Side};
