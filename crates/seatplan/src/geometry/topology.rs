use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;
use strum::IntoEnumIterator;

use super::types::*;
use crate::constants::{COLS_A, ROWS_A, SEAT_COUNT};

/// Seat -> seats it touches within one layout
pub type Adjacency = HashMap<Seat, BTreeSet<Seat>>;

/// Map a layout A seat onto layout B.
///
/// The back row of A becomes the rightmost column of B: bank `(3, c)` moves to
/// `(c, 3)`. Every other seat keeps its row, column and side.
pub fn to_layout_b(seat: Seat) -> Seat {
    if seat.row == ROWS_A - 1 {
        Seat::new(seat.col, COLS_A, seat.side)
    } else {
        seat
    }
}

/// Inverse of [`to_layout_b`]
pub fn to_layout_a(seat: Seat) -> Seat {
    if seat.col == COLS_A {
        Seat::new(ROWS_A - 1, seat.row, seat.side)
    } else {
        seat
    }
}

/// Whether the layout A `seat` lies on the row `row_of` picks, in both layouts
pub fn on_row_in_both(seat: Seat, row_of: fn(Layout) -> usize) -> bool {
    seat.row == row_of(Layout::A) && to_layout_b(seat).row == row_of(Layout::B)
}

/// All seats of a layout in row-major order
pub fn enumerate_seats(layout: Layout) -> Vec<Seat> {
    (0..layout.rows())
        .cartesian_product(0..layout.cols())
        .cartesian_product(Side::iter())
        .map(|((row, col), side)| Seat::new(row, col, side))
        .collect()
}

/// Same bank, horizontal neighbour bank, or vertical neighbour bank
pub fn seats_adjacent(a: Seat, b: Seat) -> bool {
    if a == b {
        return false;
    }
    let same_bank = a.row == b.row && a.col == b.col;
    let horizontal = a.row == b.row && a.col.abs_diff(b.col) == 1;
    let vertical = a.col == b.col && a.row.abs_diff(b.row) == 1;
    same_bank || horizontal || vertical
}

pub fn build_adjacency(seats: &[Seat]) -> Adjacency {
    let mut adj: Adjacency = seats.iter().map(|&s| (s, BTreeSet::new())).collect();
    for (&a, &b) in seats.iter().tuple_combinations() {
        if seats_adjacent(a, b) {
            adj.entry(a).or_default().insert(b);
            adj.entry(b).or_default().insert(a);
        }
    }
    adj
}

/// Seats and neighbourhoods of both layouts, built once and shared by the
/// solver and the evaluator.
#[derive(Debug, Clone)]
pub struct Topology {
    seats_a: Vec<Seat>,
    seats_b: Vec<Seat>,
    adjacency_a: Adjacency,
    adjacency_b: Adjacency,
    /// combined[i]: indices of layout A seats touching seat i in A or in B
    combined: Vec<Vec<usize>>,
}

impl Topology {
    pub fn build() -> Self {
        let seats_a = enumerate_seats(Layout::A);
        let seats_b = enumerate_seats(Layout::B);
        let adjacency_a = build_adjacency(&seats_a);
        let adjacency_b = build_adjacency(&seats_b);

        let mut combined = vec![Vec::new(); SEAT_COUNT];
        for &seat in &seats_a {
            let mut union: BTreeSet<Seat> = adjacency_a[&seat].clone();
            union.extend(
                adjacency_b[&to_layout_b(seat)]
                    .iter()
                    .map(|&other| to_layout_a(other)),
            );
            combined[seat.index()] = union.iter().map(Seat::index).collect();
        }

        log::debug!(
            "topology: {} seats, {} A edges, {} B edges, {} combined edges",
            seats_a.len(),
            edge_count(&adjacency_a),
            edge_count(&adjacency_b),
            combined.iter().map(Vec::len).sum::<usize>() / 2
        );

        Self {
            seats_a,
            seats_b,
            adjacency_a,
            adjacency_b,
            combined,
        }
    }

    pub fn seats(&self, layout: Layout) -> &[Seat] {
        match layout {
            Layout::A => &self.seats_a,
            Layout::B => &self.seats_b,
        }
    }

    pub fn adjacency(&self, layout: Layout) -> &Adjacency {
        match layout {
            Layout::A => &self.adjacency_a,
            Layout::B => &self.adjacency_b,
        }
    }

    /// Express a layout A seat in `layout`
    pub fn project(&self, seat: Seat, layout: Layout) -> Seat {
        match layout {
            Layout::A => seat,
            Layout::B => to_layout_b(seat),
        }
    }

    /// Indices of layout A seats adjacent to `index` in either layout
    pub fn combined_neighbors(&self, index: usize) -> &[usize] {
        &self.combined[index]
    }

    /// Whether two layout A seats touch in either arrangement
    pub fn conflicts(&self, a: Seat, b: Seat) -> bool {
        self.combined[a.index()].contains(&b.index())
    }

    /// Whether two layout A seats touch in the given arrangement
    pub fn is_adjacent(&self, layout: Layout, a: Seat, b: Seat) -> bool {
        let (a, b) = (self.project(a, layout), self.project(b, layout));
        self.adjacency(layout)
            .get(&a)
            .is_some_and(|set| set.contains(&b))
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::build()
    }
}

fn edge_count(adj: &Adjacency) -> usize {
    adj.values().map(BTreeSet::len).sum::<usize>() / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_transform_is_bijection() {
        let topo = Topology::build();
        let images: HashSet<Seat> = topo
            .seats(Layout::A)
            .iter()
            .map(|&s| to_layout_b(s))
            .collect();
        let expected: HashSet<Seat> = topo.seats(Layout::B).iter().copied().collect();
        assert_eq!(images.len(), SEAT_COUNT);
        assert_eq!(images, expected);
    }

    #[test]
    fn test_transform_round_trip() {
        for seat in enumerate_seats(Layout::A) {
            assert_eq!(to_layout_a(to_layout_b(seat)), seat);
        }
        for seat in enumerate_seats(Layout::B) {
            assert_eq!(to_layout_b(to_layout_a(seat)), seat);
        }
    }

    #[test]
    fn test_back_row_becomes_right_column() {
        assert_eq!(
            to_layout_b(Seat::new(3, 0, Side::Left)),
            Seat::new(0, 3, Side::Left)
        );
        assert_eq!(
            to_layout_b(Seat::new(3, 2, Side::Right)),
            Seat::new(2, 3, Side::Right)
        );
        assert_eq!(
            to_layout_b(Seat::new(1, 2, Side::Right)),
            Seat::new(1, 2, Side::Right)
        );
    }

    #[test]
    fn test_back_of_both_layouts_is_one_bank() {
        let back: Vec<Seat> = enumerate_seats(Layout::A)
            .into_iter()
            .filter(|&s| on_row_in_both(s, Layout::back_row))
            .collect();
        assert_eq!(
            back,
            vec![Seat::new(3, 2, Side::Left), Seat::new(3, 2, Side::Right)]
        );
        let front = enumerate_seats(Layout::A)
            .into_iter()
            .filter(|&s| on_row_in_both(s, Layout::front_row))
            .count();
        assert_eq!(front, 6);
    }

    #[test]
    fn test_adjacency_counts() {
        let topo = Topology::build();
        let adj = topo.adjacency(Layout::A);
        // corner seat: buddy + 2 seats right + 2 seats behind
        assert_eq!(adj[&Seat::new(0, 0, Side::Left)].len(), 5);
        // centre seat of row 1: buddy + 4 horizontal + 4 vertical
        assert_eq!(adj[&Seat::new(1, 1, Side::Left)].len(), 9);
        assert!(adj.values().all(|set| !set.is_empty()));
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let topo = Topology::build();
        for layout in Layout::iter() {
            let adj = topo.adjacency(layout);
            for (a, set) in adj {
                for b in set {
                    assert!(adj[b].contains(a), "{layout}: {a:?} -> {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_combined_contains_both_layouts() {
        let topo = Topology::build();
        for &a in topo.seats(Layout::A) {
            for &b in topo.seats(Layout::A) {
                let either =
                    topo.is_adjacent(Layout::A, a, b) || topo.is_adjacent(Layout::B, a, b);
                assert_eq!(topo.conflicts(a, b), either, "{a:?} {b:?}");
            }
        }
    }

    #[test]
    fn test_rotated_column_touches_in_b_only() {
        let topo = Topology::build();
        // (3,0) and (3,1) are horizontal neighbours in A and vertical ones in B
        let a = Seat::new(3, 0, Side::Left);
        let b = Seat::new(3, 1, Side::Left);
        assert!(topo.is_adjacent(Layout::A, a, b));
        assert!(topo.is_adjacent(Layout::B, a, b));
        // (3,0) sits next to (0,2) only once the back row is rotated
        let c = Seat::new(0, 2, Side::Right);
        assert!(!topo.is_adjacent(Layout::A, a, c));
        assert!(topo.is_adjacent(Layout::B, a, c));
        assert!(topo.conflicts(a, c));
    }
}
