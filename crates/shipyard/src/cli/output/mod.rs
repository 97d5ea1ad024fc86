//! Terminal output helpers

use console::{style, Style, StyledObject};

use shipyard_core::types::BumpType;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning to stderr so piped output stays clean
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Dimmed key followed by a value, indented
pub fn key_value(key: &str, value: impl std::fmt::Display) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Bump keyword colored by severity; no bump renders as "no release"
pub fn bump(bump: Option<BumpType>) -> StyledObject<&'static str> {
    match bump {
        Some(BumpType::Major) => style("major").red().bold(),
        Some(BumpType::Minor) => style("minor").yellow().bold(),
        Some(BumpType::Patch) => style("patch").green(),
        None => style("no release").dim(),
    }
}

/// Commit range as `from..to`, or just `to` for the whole history
pub fn range(from: Option<&str>, to: &str) -> String {
    match from {
        Some(from) => format!("{}..{}", tag_style().apply_to(from), tag_style().apply_to(to)),
        None => tag_style().apply_to(to).to_string(),
    }
}

/// Heading followed by one indented line per label
pub fn label_list(heading: &str, names: &[String], style: &Style) {
    if names.is_empty() {
        return;
    }
    println!("{}", heading);
    for name in names {
        println!("  {}", style.apply_to(name));
    }
}

/// Style for version numbers
pub fn version_style() -> Style {
    Style::new().green().bold()
}

/// Style for tags and refs
pub fn tag_style() -> Style {
    Style::new().yellow()
}

/// Style for paths and links
pub fn path_style() -> Style {
    Style::new().cyan().underlined()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_without_colors() {
        console::set_colors_enabled(false);
        assert_eq!(range(Some("v1.0.0"), "HEAD"), "v1.0.0..HEAD");
        assert_eq!(range(None, "HEAD"), "HEAD");
        assert_eq!(bump(None).to_string(), "no release");
        assert_eq!(bump(Some(BumpType::Minor)).to_string(), "minor");
    }
}
