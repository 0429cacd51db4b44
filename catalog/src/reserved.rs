/// Reserved words of the SQL surface (§6); neither a table nor a column
/// name may collide with one of these, case-insensitively.
pub const RESERVED_WORDS: &[&str] = &[
    "SELECT", "UPDATE", "DELETE", "INSERT", "VALUES", "FROM", "INTO", "WHERE", "LIMIT", "OFFSET",
    "SET",
];

pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS
        .iter()
        .any(|rw| rw.eq_ignore_ascii_case(word))
}
