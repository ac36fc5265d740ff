use rand::Rng;
use smallvec::SmallVec;

use crate::game::systems::candidates::Candidate;

/// Pick a maximal-score candidate, breaking ties uniformly at random.
/// Returns `None` for an empty set.
pub fn select_best<'a, R: Rng + ?Sized>(candidates: &'a [Candidate], rng: &mut R) -> Option<&'a Candidate> {
    let best = candidates.iter().map(|c| c.score).max()?;

    let tied: SmallVec<[&Candidate; 16]> = candidates.iter().filter(|c| c.score == best).collect();
    match tied.len() {
        1 => Some(tied[0]),
        n => Some(tied[rng.gen_range(0..n)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::vec2::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scored(scores: &[u32]) -> Vec<Candidate> {
        scores
            .iter()
            .enumerate()
            .map(|(slot, &score)| {
                let mut c = Candidate::new(Vec2::new(slot as f32, 0.0), slot);
                c.score = score;
                c
            })
            .collect()
    }

    #[test]
    fn test_empty_set_selects_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(select_best(&[], &mut rng).is_none());
    }

    #[test]
    fn test_unique_maximum_wins() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let batch = scored(&[3, 9, 4, 0]);
        for _ in 0..20 {
            assert_eq!(select_best(&batch, &mut rng).map(|c| c.slot), Some(1));
        }
    }

    #[test]
    fn test_tie_break_is_roughly_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let batch = scored(&[5, 7, 2, 7, 7, 1]);
        let trials = 6000;
        let mut counts = [0usize; 6];

        for _ in 0..trials {
            let picked = select_best(&batch, &mut rng).map(|c| c.slot);
            if let Some(slot) = picked {
                counts[slot] += 1;
            }
        }

        assert_eq!(counts[0] + counts[2] + counts[5], 0);
        let expected = trials / 3;
        for slot in [1, 3, 4] {
            let deviation = (counts[slot] as f64 - expected as f64).abs() / expected as f64;
            assert!(deviation < 0.1, "slot {} picked {} times", slot, counts[slot]);
        }
    }

    #[test]
    fn test_same_seed_same_choice() {
        let batch = scored(&[4, 4, 4, 4]);
        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..10 {
            assert_eq!(
                select_best(&batch, &mut a).map(|c| c.slot),
                select_best(&batch, &mut b).map(|c| c.slot)
            );
        }
    }
}
