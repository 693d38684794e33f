//! Character-set classification

/// Check if a character is printable ASCII (space through tilde)
pub fn is_printable_ascii(c: char) -> bool {
    (' '..='~').contains(&c)
}
