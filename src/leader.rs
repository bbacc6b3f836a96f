//! Storyline leader election.
//!
//! The leader is the author with the most contributions along a storyline.
//! Ties go to whichever tied author contributed first. The result is never
//! cached: a storyline can keep growing while it is open.

use std::collections::HashMap;

use crate::types::AuthorId;

/// Elect the leader of a storyline from its author sequence (root first,
/// one entry per contribution).
///
/// Returns `None` only for an empty sequence.
pub fn storyline_leader(authors: &[AuthorId]) -> Option<&AuthorId> {
    // author -> (count, first position)
    let mut tally: HashMap<&AuthorId, (usize, usize)> = HashMap::new();
    for (position, author) in authors.iter().enumerate() {
        tally.entry(author).or_insert((0, position)).0 += 1;
    }

    tally
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then_with(|| first_b.cmp(first_a))
        })
        .map(|(author, _)| author)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authors(ids: &[&str]) -> Vec<AuthorId> {
        ids.iter().map(|id| AuthorId::from(*id)).collect()
    }

    #[test]
    fn test_most_contributions_wins() {
        let path = authors(&["x", "y", "y", "x", "y"]);
        assert_eq!(storyline_leader(&path), Some(&AuthorId::from("y")));
    }

    #[test]
    fn test_tie_goes_to_earliest_contributor() {
        let path = authors(&["y", "x", "x", "y"]);
        assert_eq!(storyline_leader(&path), Some(&AuthorId::from("y")));

        let path = authors(&["x", "y"]);
        assert_eq!(storyline_leader(&path), Some(&AuthorId::from("x")));
    }

    #[test]
    fn test_three_way_tie() {
        let path = authors(&["c", "b", "a", "a", "b", "c"]);
        assert_eq!(storyline_leader(&path), Some(&AuthorId::from("c")));
    }

    #[test]
    fn test_single_author() {
        let path = authors(&["solo", "solo"]);
        assert_eq!(storyline_leader(&path), Some(&AuthorId::from("solo")));
    }

    #[test]
    fn test_empty_path_has_no_leader() {
        assert_eq!(storyline_leader(&[]), None);
    }
}
