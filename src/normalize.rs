//! Text normalization (§4.1): letter/digit runes are uppercased, everything else becomes a
//! single space. Rune count is preserved, which is required for offsets recorded against the
//! normalized text (hash positions, fragment boundaries) to stay valid against the original.

/// Normalize a single rune per §4.1. A rune counts as letter-or-digit the way the original's
/// `unicode.IsLetter(r) || unicode.IsDigit(r)` does: any Unicode letter, plus ASCII decimal
/// digits. `char::is_numeric()` is deliberately avoided here — it also admits the Nl/No
/// categories (Roman numerals, vulgar fractions, ...) that Go's `IsDigit` rejects, which would
/// normalize and fragment-trim those runes differently than the original.
#[inline]
pub fn normalize_rune(r: char) -> char {
    if r.is_alphabetic() || r.is_ascii_digit() {
        r.to_uppercase().next().unwrap_or(r)
    } else {
        ' '
    }
}

/// Normalize a full string, rune for rune.
pub fn normalize(text: &str) -> String {
    text.chars().map(normalize_rune).collect()
}
