#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure command-string compressor used to annotate history records.
//!
//! Compression happens in two passes. The first collapses runs of identical
//! characters into a decimal count followed by the character. The second
//! looks for the single largest block that repeats back to back and rewrites
//! it as `count(pattern)`. Only one block is ever factored, so the result is
//! deliberately not a minimal encoding.
//!
//! The compressor treats its input as opaque characters. Operator symbols,
//! digits, and anything else pass through the same rules.

/// Shortest block length considered by the pattern pass.
const MIN_PATTERN_LENGTH: usize = 2;

/// Minimum number of back-to-back repeats required to factor a block.
const MIN_REPEATS: usize = 2;

/// Compresses a raw command string.
///
/// Deterministic and total: the same input always yields the same output and
/// no input is rejected. Applying it to its own output is not guaranteed to be
/// a no-op.
#[must_use]
pub fn optimize(commands: &str) -> String {
    factor_pattern(&run_length(commands))
}

/// Collapses every maximal run of a repeated character into `<count><char>`.
///
/// Runs of length one are emitted unchanged.
#[must_use]
pub fn run_length(commands: &str) -> String {
    let mut encoded = String::with_capacity(commands.len());
    let mut chars = commands.chars().peekable();

    while let Some(current) = chars.next() {
        let mut count = 1usize;
        while chars.next_if_eq(&current).is_some() {
            count += 1;
        }
        if count > 1 {
            encoded.push_str(&count.to_string());
        }
        encoded.push(current);
    }

    encoded
}

/// Replaces the first, longest back-to-back repeated block with `count(block)`.
///
/// Block lengths are tried from half the input length downward and, for each
/// length, start positions from left to right. The first block that repeats at
/// least twice wins and the search stops there. Text on either side of the
/// repeated span is kept verbatim. Inputs without such a block are returned
/// unchanged.
#[must_use]
pub fn factor_pattern(encoded: &str) -> String {
    let chars: Vec<char> = encoded.chars().collect();
    match find_repeat(&chars) {
        Some(repeat) => repeat.render(&chars),
        None => encoded.to_owned(),
    }
}

/// Location of a repeated block inside a character sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Repeat {
    start: usize,
    length: usize,
    count: usize,
}

impl Repeat {
    fn end(&self) -> usize {
        self.start + self.length * self.count
    }

    fn render(&self, chars: &[char]) -> String {
        let pattern = &chars[self.start..self.start + self.length];
        let mut out = String::with_capacity(chars.len() + 4);
        out.extend(&chars[..self.start]);
        out.push_str(&self.count.to_string());
        out.push('(');
        out.extend(pattern);
        out.push(')');
        out.extend(&chars[self.end()..]);
        out
    }
}

fn find_repeat(chars: &[char]) -> Option<Repeat> {
    let longest = chars.len() / 2;
    for length in (MIN_PATTERN_LENGTH..=longest).rev() {
        let last_start = chars.len() - MIN_REPEATS * length;
        for start in 0..=last_start {
            let count = count_repeats(chars, start, length);
            if count >= MIN_REPEATS {
                return Some(Repeat {
                    start,
                    length,
                    count,
                });
            }
        }
    }
    None
}

fn count_repeats(chars: &[char], start: usize, length: usize) -> usize {
    let pattern = &chars[start..start + length];
    chars[start..]
        .chunks_exact(length)
        .take_while(|chunk| *chunk == pattern)
        .count()
}
