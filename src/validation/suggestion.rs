//! "Did you mean" suggestions for unknown names.

/// Ranks `options` by similarity to `input`.
///
/// An option is kept when its edit distance to `input` is at most
/// `floor(0.4 * len(input)) + 1`. Case-only differences count as distance 1
/// and rank ahead of other options at that distance. Results are sorted by
/// distance, then name, and truncated to `limit`.
pub fn suggestion_list<'o, I>(input: &str, options: I, limit: usize) -> Vec<&'o str>
where
    I: IntoIterator<Item = &'o str>,
{
    let threshold = input.chars().count() * 2 / 5 + 1;
    let input_lower = input.to_lowercase();

    let mut ranked: Vec<(usize, bool, &str)> = options
        .into_iter()
        .filter_map(|option| {
            if option == input {
                return Some((0, false, option));
            }
            let option_lower = option.to_lowercase();
            if option_lower == input_lower {
                return Some((1, false, option));
            }
            let distance = edit_distance(&input_lower, &option_lower);
            (distance <= threshold).then_some((distance, true, option))
        })
        .collect();

    ranked.sort_unstable();
    ranked.dedup_by(|a, b| a.2 == b.2);
    ranked
        .into_iter()
        .take(limit)
        .map(|(_, _, option)| option)
        .collect()
}

/// Formats suggestions as a sentence appended to an error message, e.g.
/// ` Did you mean 'a', 'b', or 'c'?`. Empty without suggestions.
pub fn did_you_mean(suggestions: &[&str]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    format!(" Did you mean {}?", quoted_or_list(suggestions))
}

/// Quotes and joins items: `'a'`, `'a' or 'b'`, `'a', 'b', or 'c'`.
pub fn quoted_or_list(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => format!("'{only}'"),
        [first, second] => format!("'{first}' or '{second}'"),
        [init @ .., last] => {
            let init: Vec<String> = init.iter().map(|s| format!("'{s}'")).collect();
            format!("{}, or '{last}'", init.join(", "))
        }
    }
}

/// Optimal string alignment distance: Levenshtein plus adjacent
/// transpositions.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut matrix = vec![vec![0; b.len() + 1]; a.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        matrix[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(matrix[i - 2][j - 2] + 1);
            }
            matrix[i][j] = best;
        }
    }

    matrix[a.len()][b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("ab", "ba"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
    }

    #[test]
    fn ranks_by_distance_then_name() {
        let options = ["dog", "Dog", "dogs", "cat", "doge", "human"];
        assert_eq!(suggestion_list("dog", options, 5), vec!["dog", "Dog", "doge", "dogs"]);
    }

    #[test]
    fn case_only_difference_ranks_first_at_distance_one() {
        assert_eq!(suggestion_list("NAME", ["nam", "name"], 5), vec!["name", "nam"]);
    }

    #[test]
    fn threshold_scales_with_length() {
        assert!(suggestion_list("a", ["abc"], 5).is_empty());
        assert_eq!(suggestion_list("nickname", ["nicknam", "cat"], 5), vec!["nicknam"]);
    }

    #[test]
    fn limit_applies() {
        let options = ["aa", "ab", "ac", "ad"];
        assert_eq!(suggestion_list("a", options, 2), vec!["aa", "ab"]);
    }

    #[test]
    fn formats_sentences() {
        assert_eq!(did_you_mean(&[]), "");
        assert_eq!(did_you_mean(&["a"]), " Did you mean 'a'?");
        assert_eq!(did_you_mean(&["a", "b"]), " Did you mean 'a' or 'b'?");
        assert_eq!(did_you_mean(&["a", "b", "c"]), " Did you mean 'a', 'b', or 'c'?");
        assert_eq!(quoted_or_list(&["Cat", "Dog"]), "'Cat' or 'Dog'");
    }
}
