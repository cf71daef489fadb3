/// ASCII whitespace, the one classification the string helpers need.
/// Anything >= 0x80 belongs to a word and is never whitespace.
pub fn isspace(ch: u8) -> bool {
    matches!(ch, 9..=13 | 32)
}
