use std::collections::{BTreeSet, HashMap, HashSet};

use itertools::Itertools;

use crate::error::{Result, SeatPlanError};

/// Symmetric "must never sit next to each other" relation over student names.
///
/// Every declared group is closed under pairwise combination: `{A, B, C}`
/// forbids `{A, B}`, `{A, C}` and `{B, C}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictIndex {
    partners: HashMap<String, BTreeSet<String>>,
    pairs: BTreeSet<(String, String)>,
}

impl ConflictIndex {
    /// Build the index, rejecting groups that name students outside `roster`
    /// or hold fewer than two distinct names.
    pub fn build<G, S>(groups: &[G], roster: &[String]) -> Result<Self>
    where
        G: AsRef<[S]>,
        S: AsRef<str>,
    {
        let known: HashSet<&str> = roster.iter().map(String::as_str).collect();

        let unknown: Vec<String> = groups
            .iter()
            .flat_map(|g| names_of(g.as_ref()))
            .filter(|name| !known.contains(name))
            .map(str::to_string)
            .sorted()
            .dedup()
            .collect();
        if !unknown.is_empty() {
            return Err(SeatPlanError::UnknownNames {
                context: "forbidden groups",
                names: unknown,
            });
        }

        let mut index = Self::default();
        for (i, group) in groups.iter().enumerate() {
            let members: Vec<&str> = names_of(group.as_ref()).unique().collect();
            if members.len() < 2 {
                return Err(SeatPlanError::InvalidGroup { index: i });
            }
            for (a, b) in members.iter().tuple_combinations() {
                index.insert(a, b);
            }
        }

        log::debug!("conflict index: {} forbidden pairs", index.len());
        Ok(index)
    }

    fn insert(&mut self, a: &str, b: &str) {
        self.partners
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.partners
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.pairs.insert((lo.to_string(), hi.to_string()));
    }

    pub fn conflicts(&self, a: &str, b: &str) -> bool {
        self.partners.get(a).is_some_and(|set| set.contains(b))
    }

    pub fn partners(&self, name: &str) -> impl Iterator<Item = &str> {
        self.partners
            .get(name)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn has_partners(&self, name: &str) -> bool {
        self.partners.get(name).is_some_and(|set| !set.is_empty())
    }

    /// Forbidden pairs, each once, in lexical order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn names_of<S: AsRef<str>>(group: &[S]) -> impl Iterator<Item = &str> {
    group.iter().map(|name| name.as_ref())
}
