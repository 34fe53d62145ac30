use rand::seq::SliceRandom;
use rand::Rng;

/// Returns a uniformly random permutation of `items`, leaving the input untouched.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffled.shuffle(rng);
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn output_is_a_permutation_of_the_input() {
        let mut rng = StdRng::seed_from_u64(7);
        let input: Vec<u32> = (0..50).collect();

        let mut shuffled = shuffle(&input, &mut rng);
        assert_eq!(input, (0..50).collect::<Vec<_>>());
        assert_eq!(shuffled.len(), input.len());

        shuffled.sort_unstable();
        assert_eq!(shuffled, input);
    }

    #[test]
    fn same_seed_same_order() {
        let input: Vec<u32> = (0..20).collect();
        let first = shuffle(&input, &mut StdRng::seed_from_u64(42));
        let second = shuffle(&input, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_and_single_inputs() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffle::<u8, _>(&[], &mut rng).is_empty());
        assert_eq!(shuffle(&["only"], &mut rng), vec!["only"]);
    }

    #[test]
    fn positions_are_roughly_uniform() {
        const TRIALS: usize = 40_000;
        const N: usize = 4;

        let mut rng = StdRng::seed_from_u64(2024);
        let input: Vec<usize> = (0..N).collect();
        let mut counts = [[0usize; N]; N];

        for _ in 0..TRIALS {
            for (position, &element) in shuffle(&input, &mut rng).iter().enumerate() {
                counts[element][position] += 1;
            }
        }

        let expected = TRIALS / N;
        for row in counts {
            for count in row {
                assert!(
                    count.abs_diff(expected) < expected / 20,
                    "count {count} too far from {expected}"
                );
            }
        }
    }
}
