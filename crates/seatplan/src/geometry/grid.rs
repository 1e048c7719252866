use std::collections::BTreeSet;

use super::topology::to_layout_b;
use super::types::*;
use crate::solver::Assignment;

/// What a single seat shows in a grid view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatMark {
    Student(String),
    /// Kept free for a solo student
    Reserved,
    Empty,
}

impl SeatMark {
    pub fn is_empty(&self) -> bool {
        matches!(self, SeatMark::Empty)
    }
}

/// `rows x cols` banks of one layout, row 0 at the front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub layout: Layout,
    pub banks: Vec<Vec<[SeatMark; 2]>>,
}

impl Grid {
    pub fn bank(&self, bank: BankId) -> &[SeatMark; 2] {
        &self.banks[bank.row][bank.col]
    }

    pub fn mark(&self, seat: Seat) -> &SeatMark {
        &self.bank(seat.bank())[seat.side.index()]
    }
}

/// Lay an assignment (keyed by layout A seats) out as a grid of `layout`
pub fn grid_of(assignment: &Assignment, reserved: &BTreeSet<Seat>, layout: Layout) -> Grid {
    let project = |seat: Seat| match layout {
        Layout::A => seat,
        Layout::B => to_layout_b(seat),
    };

    let mut banks = vec![vec![[SeatMark::Empty, SeatMark::Empty]; layout.cols()]; layout.rows()];
    for (&seat, name) in assignment {
        let s = project(seat);
        banks[s.row][s.col][s.side.index()] = SeatMark::Student(name.clone());
    }
    for &seat in reserved {
        let s = project(seat);
        banks[s.row][s.col][s.side.index()] = SeatMark::Reserved;
    }

    Grid { layout, banks }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_projects_back_row_into_column() {
        let mut assignment = Assignment::new();
        assignment.insert(Seat::new(3, 1, Side::Left), "Azra".to_string());
        assignment.insert(Seat::new(0, 0, Side::Right), "Lina".to_string());
        let reserved = BTreeSet::from([Seat::new(3, 1, Side::Right)]);

        let a = grid_of(&assignment, &reserved, Layout::A);
        assert_eq!(a.banks.len(), 4);
        assert_eq!(a.banks[0].len(), 3);
        assert_eq!(
            a.mark(Seat::new(3, 1, Side::Left)),
            &SeatMark::Student("Azra".to_string())
        );
        assert_eq!(a.mark(Seat::new(3, 1, Side::Right)), &SeatMark::Reserved);

        let b = grid_of(&assignment, &reserved, Layout::B);
        assert_eq!(b.banks.len(), 3);
        assert_eq!(b.banks[0].len(), 4);
        assert_eq!(
            b.bank(BankId::new(1, 3)),
            &[SeatMark::Student("Azra".to_string()), SeatMark::Reserved]
        );
        assert_eq!(
            b.mark(Seat::new(0, 0, Side::Right)),
            &SeatMark::Student("Lina".to_string())
        );
        assert!(b.mark(Seat::new(2, 2, Side::Left)).is_empty());
    }
}
