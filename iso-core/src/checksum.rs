//! ISO 7064 MOD 97-10 checksum shared by IBAN and RF creditor references
//!
//! Letters are transliterated to two-digit numbers (A=10 … Z=35) and the
//! remainder is folded one digit at a time, so arbitrarily long inputs never
//! need big-integer arithmetic.

/// Compute `input mod 97` over the transliterated digit string.
///
/// Returns `None` if the input contains anything other than `0-9` or `A-Z`.
pub fn mod97(input: &str) -> Option<u32> {
    let mut remainder: u32 = 0;
    for c in input.chars() {
        remainder = match c {
            '0'..='9' => (remainder * 10 + (c as u32 - '0' as u32)) % 97,
            // Two digits at once: r*100 + v == (r*10 + tens)*10 + ones
            'A'..='Z' => (remainder * 100 + (c as u32 - 'A' as u32 + 10)) % 97,
            _ => return None,
        };
    }
    Some(remainder)
}

/// Normalize a user-supplied identifier: drop whitespace, uppercase ASCII.
pub(crate) fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
