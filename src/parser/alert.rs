//! Alert and directive label metadata.
//!
//! Labels are free-form and case-preserved in the tree; the well-known
//! GitHub set gets colors and icons, anything else renders with the
//! default style and no icon.

use crate::nodes::Color;

/// Accent color for a known label.
pub fn color(label: &str) -> Option<Color> {
    match label.to_ascii_uppercase().as_str() {
        "NOTE" => Some(Color::Blue),
        "TIP" => Some(Color::Green),
        "IMPORTANT" => Some(Color::Magenta),
        "WARNING" | "CAUTION" => Some(Color::Red),
        _ => None,
    }
}

/// Inline icon for a known label.
pub fn icon(label: &str) -> Option<&'static str> {
    match label.to_ascii_uppercase().as_str() {
        "NOTE" => Some("ℹ"),
        "TIP" => Some("💡"),
        "IMPORTANT" => Some("☛"),
        "WARNING" => Some("⚠"),
        "CAUTION" => Some("⛔"),
        _ => None,
    }
}

/// CSS class fragment for the HTML renderer.
pub fn css_class(label: &str) -> String {
    label.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels_case_insensitive() {
        assert_eq!(color("note"), Some(Color::Blue));
        assert_eq!(color("WARNING"), Some(Color::Red));
        assert_eq!(color("bogus"), None);
        assert!(icon("Tip").is_some());
        assert!(icon("whatever").is_none());
    }
}
