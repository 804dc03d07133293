//! Spelling suggestions based on edit distance.

/// Levenshtein distance in characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

/// The closest candidate to `input`, if it is close enough.
///
/// A candidate qualifies when its distance is below
/// `min(max(len / 2, 3), len)`. Candidates are considered in sorted order
/// so the result does not depend on the iteration order of the caller.
pub fn did_you_mean<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let len = input.chars().count();
    let mut best_distance = (len / 2).max(3).min(len);
    let mut sorted: Vec<&str> = candidates.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut best = None;
    for candidate in sorted {
        if candidate == input {
            continue;
        }
        let distance = levenshtein(input, candidate);
        if distance < best_distance {
            best_distance = distance;
            best = Some(candidate.to_string());
        }
    }
    best
}
