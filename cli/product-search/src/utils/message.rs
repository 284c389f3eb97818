use std::fmt::Display;

/// Print a user facing message to stderr, keeping stdout for results.
fn print_message(v: impl Display) {
    eprintln!("{v}");
}

pub(crate) fn error(v: impl Display) {
    print_message(std::format_args!("❌ ERROR: {v}"));
}

/// The emoji is double width, hence the extra space
pub(crate) fn warning(v: impl Display) {
    print_message(std::format_args!("⚠️  {v}"));
}
