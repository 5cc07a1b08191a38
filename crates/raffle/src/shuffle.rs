use crate::{RangeSource, ThreadRandom};

/// Produces uniformly random permutations.
///
/// Uses the descending Fisher–Yates walk: for each index `i` from the last
/// down to `1`, swap it with an index drawn uniformly from `0..=i`. Given an
/// unbiased [`RangeSource`], each of the `n!` orderings is equally likely.
///
/// Membership is never altered: the output multiset equals the input
/// multiset, duplicates included.
///
/// # Example
/// ```
/// use raffle::{Shuffler, ThreadRandom};
///
/// let shuffler = Shuffler::new(ThreadRandom);
/// let mut names = shuffler.shuffle(vec!["a".to_string(), "b".into(), "c".into()]);
/// names.sort();
/// assert_eq!(names, ["a", "b", "c"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Shuffler<R = ThreadRandom>
where
    R: RangeSource,
{
    rng: R,
}

impl<R> Shuffler<R>
where
    R: RangeSource,
{
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Returns a random permutation of `entries`.
    pub fn shuffle<T>(&self, mut entries: Vec<T>) -> Vec<T> {
        self.shuffle_in_place(&mut entries);
        entries
    }

    /// Permutes `entries` in place.
    pub fn shuffle_in_place<T>(&self, entries: &mut [T]) {
        for i in (1..entries.len()).rev() {
            let j = self.rng.below(i + 1);
            entries.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeededRandom;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Replays a scripted sequence of picks.
    struct ScriptedRange {
        picks: RefCell<Vec<usize>>,
    }

    impl RangeSource for ScriptedRange {
        fn below(&self, bound: usize) -> usize {
            let pick = self.picks.borrow_mut().remove(0);
            assert!(pick < bound, "scripted pick {pick} out of range {bound}");
            pick
        }
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn empty_and_single_inputs_are_untouched() {
        let shuffler = Shuffler::new(ThreadRandom);
        assert!(shuffler.shuffle(Vec::<String>::new()).is_empty());
        assert_eq!(shuffler.shuffle(names(&["only"])), names(&["only"]));
    }

    #[test]
    fn walks_from_last_index_down() {
        // i = 2 picks 0, i = 1 picks 1: [a, b, c] -> [c, b, a] -> [c, b, a]
        let shuffler = Shuffler::new(ScriptedRange {
            picks: RefCell::new(vec![0, 1]),
        });
        assert_eq!(
            shuffler.shuffle(names(&["a", "b", "c"])),
            names(&["c", "b", "a"])
        );
    }

    #[test]
    fn preserves_duplicates() {
        let shuffler = Shuffler::new(ThreadRandom);
        let input = names(&["x", "x", "y", "x", "z"]);
        let mut output = shuffler.shuffle(input.clone());
        let mut expected = input;
        output.sort();
        expected.sort();
        assert_eq!(output, expected);
    }

    #[test]
    fn same_seed_gives_same_order() {
        let input: Vec<u32> = (0..100).collect();
        let a = Shuffler::new(SeededRandom::new(42)).shuffle(input.clone());
        let b = Shuffler::new(SeededRandom::new(42)).shuffle(input.clone());
        assert_eq!(a, b);
        assert_ne!(a, input);
    }

    #[test]
    fn all_orderings_are_roughly_equally_likely() {
        const TRIALS: usize = 60_000;
        let shuffler = Shuffler::new(SeededRandom::new(0x5EED));
        let mut counts: HashMap<Vec<&str>, usize> = HashMap::new();

        for _ in 0..TRIALS {
            let order = shuffler.shuffle(vec!["Alice", "Bob", "Carol"]);
            *counts.entry(order).or_default() += 1;
        }

        assert_eq!(counts.len(), 6, "every permutation of 3 should appear");
        // Expected 10_000 each; sigma is about 91, so 600 is a very wide band.
        for (order, count) in counts {
            assert!(
                (9_400..=10_600).contains(&count),
                "ordering {order:?} drawn {count} times"
            );
        }
    }
}
