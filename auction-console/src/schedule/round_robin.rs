// Round-robin fixture generation.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One scheduled match between two teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// Sequential match number (1-indexed) in published order.
    pub match_number: u32,
    pub team1: String,
    pub team2: String,
}

/// Generate every unordered pairing exactly once: n*(n-1)/2 fixtures,
/// numbered sequentially in generation order (team order as given).
pub fn generate_round_robin(teams: &[String]) -> Vec<Fixture> {
    let n = teams.len();
    let mut fixtures = Vec::with_capacity(n.saturating_sub(1) * n / 2);
    let mut match_number = 1u32;
    for i in 0..n.saturating_sub(1) {
        for j in (i + 1)..n {
            fixtures.push(Fixture {
                match_number,
                team1: teams[i].clone(),
                team2: teams[j].clone(),
            });
            match_number += 1;
        }
    }
    fixtures
}

/// Shuffle the published order and renumber sequentially, so match
/// numbers carry no information about generation order.
pub fn shuffle_schedule<R: Rng>(fixtures: &mut [Fixture], rng: &mut R) {
    fixtures.shuffle(rng);
    for (idx, fixture) in fixtures.iter_mut().enumerate() {
        fixture.match_number = idx as u32 + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn teams(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn pair_key(f: &Fixture) -> (String, String) {
        let mut pair = [f.team1.clone(), f.team2.clone()];
        pair.sort();
        (pair[0].clone(), pair[1].clone())
    }

    #[test]
    fn four_teams_produce_six_fixtures() {
        let fixtures = generate_round_robin(&teams(&["A", "B", "C", "D"]));
        // 4*3/2 = 6
        assert_eq!(fixtures.len(), 6);
        let numbers: Vec<u32> = fixtures.iter().map(|f| f.match_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn every_pair_exactly_once_no_self_pairing() {
        let names = teams(&["A", "B", "C", "D", "E", "F", "G"]);
        let fixtures = generate_round_robin(&names);
        assert_eq!(fixtures.len(), 7 * 6 / 2);
        let mut seen = HashSet::new();
        for fixture in &fixtures {
            assert_ne!(fixture.team1, fixture.team2);
            assert!(seen.insert(pair_key(fixture)), "duplicate pairing {:?}", fixture);
        }
    }

    #[test]
    fn generation_order_is_lexicographic_in_team_index() {
        let fixtures = generate_round_robin(&teams(&["A", "B", "C"]));
        assert_eq!(fixtures[0].team1, "A");
        assert_eq!(fixtures[0].team2, "B");
        assert_eq!(fixtures[1].team1, "A");
        assert_eq!(fixtures[1].team2, "C");
        assert_eq!(fixtures[2].team1, "B");
        assert_eq!(fixtures[2].team2, "C");
    }

    #[test]
    fn degenerate_inputs_produce_no_fixtures() {
        assert!(generate_round_robin(&[]).is_empty());
        assert!(generate_round_robin(&teams(&["A"])).is_empty());
    }

    #[test]
    fn shuffle_preserves_pair_set_and_renumbers() {
        let names = teams(&["A", "B", "C", "D", "E"]);
        let original = generate_round_robin(&names);
        let original_pairs: HashSet<_> = original.iter().map(pair_key).collect();

        let mut shuffled = original.clone();
        let mut rng = StdRng::seed_from_u64(42);
        shuffle_schedule(&mut shuffled, &mut rng);

        let shuffled_pairs: HashSet<_> = shuffled.iter().map(pair_key).collect();
        assert_eq!(original_pairs, shuffled_pairs);
        let numbers: Vec<u32> = shuffled.iter().map(|f| f.match_number).collect();
        assert_eq!(numbers, (1..=10).collect::<Vec<u32>>());
    }
}
