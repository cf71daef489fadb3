use crate::ctype::isspace;

/// Remove trailing whitespace in place.
pub fn rtrim(line: &mut String) {
    while line
        .as_bytes()
        .last()
        .map_or(false, |&c| c < 0x80 && isspace(c))
    {
        line.pop();
    }
}

/// Strip surrounding whitespace from a borrowed slice.
pub fn trim_slice(mut i: &str) -> &str {
    while !i.is_empty() && i.as_bytes()[0] < 0x80 && isspace(i.as_bytes()[0]) {
        i = &i[1..];
    }
    while !i.is_empty() {
        let last = i.as_bytes()[i.len() - 1];
        if last < 0x80 && isspace(last) {
            i = &i[..i.len() - 1];
        } else {
            break;
        }
    }
    i
}

/// Derive an anchor id from heading text: lowercased, spaces become `-`,
/// anything that is not alphanumeric, `-` or `_` is dropped.
pub fn anchor_id(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|&c| c == ' ' || c == '-' || c == '_' || c.is_alphanumeric())
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

/// Column width of a string, counted in Unicode code points.
pub fn cp_width(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rtrim_mixed_whitespace() {
        let mut s = String::from("abc \t ");
        rtrim(&mut s);
        assert_eq!(s, "abc");
    }

    #[test]
    fn trim_slice_both_ends() {
        assert_eq!(trim_slice("  x y\t"), "x y");
        assert_eq!(trim_slice(" \t "), "");
    }

    #[test]
    fn anchors() {
        assert_eq!(anchor_id("Hello World"), "hello-world");
        assert_eq!(anchor_id("a  b"), "a--b");
        assert_eq!(anchor_id("Config & Setup"), "config--setup");
    }

    #[test]
    fn widths_are_code_points() {
        assert_eq!(cp_width("héé"), 3);
        assert_eq!(cp_width(""), 0);
    }
}
