//! Glob matching for hostmask patterns.
//!
//! Only `*` (any run of characters, including none) and `?` (exactly one
//! character) are special. Matching is a single left-to-right pass that
//! remembers the most recent `*` and retries from there on a mismatch.

/// Returns `true` if `input` matches the glob `pattern`.
///
/// ```
/// use slirc_client::hostmask::is_match;
///
/// assert!(is_match("*!*@*.example", "nick!user@host.example"));
/// assert!(is_match("n?ck!*@*", "nick!user@host"));
/// assert!(!is_match("*!*@*.example", "nick!user@host.example.org"));
/// ```
pub fn is_match(pattern: &str, input: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let input: Vec<char> = input.chars().collect();

    let (mut p, mut i) = (0, 0);
    // Position of the last `*` seen and the input position it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while i < input.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, i));
                p += 1;
            }
            Some('?') => {
                p += 1;
                i += 1;
            }
            Some(&c) if c == input[i] => {
                p += 1;
                i += 1;
            }
            _ => match backtrack {
                Some((star, tried)) => {
                    // Let the star swallow one more character.
                    p = star + 1;
                    i = tried + 1;
                    backtrack = Some((star, tried + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
