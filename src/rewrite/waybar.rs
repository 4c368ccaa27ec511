//! Rewriter for the Waybar config.
//!
//! Only the `"output": [...]` line is touched; it is pointed at the monitor
//! the plan selected for the status bar.

use crate::layout::LayoutPlan;
use crate::traits::ConfigRewriter;
use regex::Regex;
use std::sync::LazyLock;

static OUTPUT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*"output":\s*\[\S+\s*\],\s*$"#).expect("valid regex"));

/// Points Waybar's `output` at the status-bar monitor.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaybarRewriter;

/// The `output` line for connector `name`.
pub fn output_line(name: &str) -> String {
    format!(r#"    "output": ["{}", ],"#, name)
}

impl ConfigRewriter for WaybarRewriter {
    fn label(&self) -> &'static str {
        "waybar"
    }

    fn rewrite(&self, contents: &str, plan: &LayoutPlan) -> String {
        let Some(name) = plan.status_bar_name() else {
            return contents.to_string();
        };
        super::map_lines(contents, |line| {
            OUTPUT_LINE_RE.is_match(line).then(|| output_line(name))
        })
    }
}
