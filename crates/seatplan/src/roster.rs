use std::collections::{BTreeMap, HashMap, HashSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::constants::{BANK_COUNT, SEAT_COUNT};
use crate::constraints::ConflictIndex;
use crate::error::{Result, SeatPlanError};

/// Raw class description as handed over by a collaborator (config file, form,
/// CSV import). Nothing here is validated yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassInput {
    #[serde(default)]
    pub students: Vec<String>,
    /// Groups of names that must never sit next to each other
    #[serde(default)]
    pub forbidden: Vec<Vec<String>>,
    #[serde(default)]
    pub front: Vec<String>,
    #[serde(default)]
    pub back: Vec<String>,
    /// Students who get a bank to themselves
    #[serde(default)]
    pub solo: Vec<String>,
    #[serde(default)]
    pub genders: BTreeMap<String, String>,
    /// Treat a bank shared by two different gender tags as invalid
    #[serde(default)]
    pub avoid_mixed_bank: bool,
}

/// Search priority, most constrained first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Solo,
    Forbidden,
    Preference,
    Free,
}

/// One validated student with all tags resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub name: String,
    pub front: bool,
    pub back: bool,
    pub solo: bool,
    pub gender: Option<String>,
}

/// Validated class: unique names, known references, capacity respected
#[derive(Debug, Clone)]
pub struct Roster {
    students: Vec<Student>,
    index: HashMap<String, usize>,
    conflicts: ConflictIndex,
    avoid_mixed_bank: bool,
}

impl Roster {
    /// Validate `input` before any search work.
    ///
    /// Capacity is checked first, then blank and duplicate names, then every
    /// name referenced by a group, preference or gender tag.
    pub fn build(input: &ClassInput) -> Result<Self> {
        let names = &input.students;
        if names.len() > SEAT_COUNT {
            return Err(SeatPlanError::TooManyStudents {
                count: names.len(),
                capacity: SEAT_COUNT,
            });
        }

        if let Some(position) = names.iter().position(|n| n.trim().is_empty()) {
            return Err(SeatPlanError::EmptyName { position });
        }

        let dupes: Vec<String> = names
            .iter()
            .counts()
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(name, _)| name.clone())
            .sorted()
            .collect();
        if !dupes.is_empty() {
            return Err(SeatPlanError::DuplicateNames(dupes));
        }

        let known: HashSet<&str> = names.iter().map(String::as_str).collect();
        check_known(&known, "front preferences", &input.front)?;
        check_known(&known, "back preferences", &input.back)?;
        check_known(&known, "solo preferences", &input.solo)?;
        check_known(&known, "gender tags", input.genders.keys())?;

        let conflicts = ConflictIndex::build(&input.forbidden, names)?;

        // every solo student also takes the buddy seat
        let solo_known: HashSet<&str> = input.solo.iter().map(String::as_str).collect();
        let needed = names.len() + solo_known.len();
        if needed > SEAT_COUNT {
            return Err(SeatPlanError::InvalidInput(format!(
                "{} students with {} solo banks need {} seats, only {} available",
                names.len(),
                solo_known.len(),
                needed,
                SEAT_COUNT
            )));
        }

        if input.avoid_mixed_bank {
            // a tag group of n shared-bank students fills at least ceil(n/2) banks
            let banks = solo_known.len()
                + names
                    .iter()
                    .filter(|n| !solo_known.contains(n.as_str()))
                    .filter_map(|n| input.genders.get(n))
                    .counts()
                    .values()
                    .map(|n| n.div_ceil(2))
                    .sum::<usize>();
            if banks > BANK_COUNT {
                return Err(SeatPlanError::InvalidInput(format!(
                    "unmixed banks need {} banks, only {} available",
                    banks, BANK_COUNT
                )));
            }
        }

        let front: HashSet<&str> = input.front.iter().map(String::as_str).collect();
        let back: HashSet<&str> = input.back.iter().map(String::as_str).collect();
        let solo = solo_known;

        let students: Vec<Student> = names
            .iter()
            .map(|name| Student {
                name: name.clone(),
                front: front.contains(name.as_str()),
                back: back.contains(name.as_str()),
                solo: solo.contains(name.as_str()),
                gender: input.genders.get(name).cloned(),
            })
            .collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        let roster = Self {
            students,
            index,
            conflicts,
            avoid_mixed_bank: input.avoid_mixed_bank,
        };
        log::info!(
            "roster: {} students, {} forbidden pairs, front={} back={} solo={}",
            roster.len(),
            roster.conflicts.len(),
            roster.front_count(),
            roster.back_count(),
            roster.solo_count()
        );
        Ok(roster)
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn student(&self, idx: usize) -> &Student {
        &self.students[idx]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn conflicts(&self) -> &ConflictIndex {
        &self.conflicts
    }

    pub fn avoid_mixed_bank(&self) -> bool {
        self.avoid_mixed_bank
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn tier(&self, idx: usize) -> Tier {
        let s = &self.students[idx];
        if s.solo {
            Tier::Solo
        } else if self.conflicts.has_partners(&s.name) {
            Tier::Forbidden
        } else if s.front || s.back {
            Tier::Preference
        } else {
            Tier::Free
        }
    }

    pub fn front_count(&self) -> usize {
        self.students.iter().filter(|s| s.front).count()
    }

    pub fn back_count(&self) -> usize {
        self.students.iter().filter(|s| s.back).count()
    }

    pub fn solo_count(&self) -> usize {
        self.students.iter().filter(|s| s.solo).count()
    }

    /// Whether two students may share a bank under the mixed-bank rule.
    ///
    /// Students without a gender tag never clash.
    pub fn may_share_bank(&self, a: usize, b: usize) -> bool {
        if !self.avoid_mixed_bank {
            return true;
        }
        match (&self.students[a].gender, &self.students[b].gender) {
            (Some(ga), Some(gb)) => ga == gb,
            _ => true,
        }
    }
}

fn check_known<'a, I>(known: &HashSet<&str>, context: &'static str, names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let unknown: Vec<String> = names
        .into_iter()
        .filter(|n| !known.contains(n.as_str()))
        .cloned()
        .sorted()
        .dedup()
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(SeatPlanError::UnknownNames {
            context,
            names: unknown,
        })
    }
}
