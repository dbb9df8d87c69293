use itertools::Itertools;

/// True when `a` and `b` have the same length and differ at exactly one position.
///
/// Identical words are not one letter apart. Scanning stops at the second
/// difference.
pub fn are_one_letter_apart(a: &str, b: &str) -> bool {
    if a.chars().count() != b.chars().count() {
        return false;
    }

    let mut differences = 0;
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            differences += 1;
            if differences > 1 {
                return false;
            }
        }
    }

    differences == 1
}

/// Number of positions at which two equal-length words differ.
///
/// This is a Hamming distance. Ladder words always share a length, so it
/// doubles as the minimum number of single-letter substitutions between
/// them. For words of different length every position of the longer word
/// counts as a mismatch.
pub fn mismatch_count(a: &str, b: &str) -> usize {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a != len_b {
        return len_a.max(len_b);
    }

    a.chars().zip(b.chars()).filter(|(x, y)| x != y).count()
}

/// Index of the first position where the two words differ.
pub fn first_difference(a: &str, b: &str) -> Option<usize> {
    a.chars().zip(b.chars()).positions(|(x, y)| x != y).next()
}
