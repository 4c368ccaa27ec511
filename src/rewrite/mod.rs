//! [`ConfigRewriter`](crate::traits::ConfigRewriter) implementations for the
//! files the layout is spliced into.
//!
//! Both rewriters only touch the lines they recognise.  Everything else,
//! including comments and blank lines, is copied through byte for byte.

pub mod hyprland;
pub mod waybar;

pub use hyprland::HyprlandRewriter;
pub use waybar::WaybarRewriter;

/// Apply `f` to every line of `contents` (without its line terminator).
///
/// `Some(new)` replaces the line, `None` keeps it.  Line terminators,
/// including a missing one on the last line, are preserved.
pub(crate) fn map_lines(contents: &str, mut f: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(contents.len());
    for line in contents.split_inclusive('\n') {
        let body = line
            .strip_suffix("\r\n")
            .or_else(|| line.strip_suffix('\n'))
            .unwrap_or(line);
        let ending = &line[body.len()..];
        match f(body) {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(body),
        }
        out.push_str(ending);
    }
    out
}
