//! Rewriter for `hyprland.conf`.
//!
//! Two kinds of lines are recognised:
//!
//! * monitor lines, `monitor = NAME, ...` or the commented-out
//!   `#monitor = NAME, ...`, for any declared connector.  They are replaced by
//!   the line rendered from the plan ([`monitor_line`]).
//! * workspace rules `workspace = N, ...` for N in 1–11.  Every declared
//!   connector name on the line is swapped for the workspace's target and the
//!   `default:true|false` rule is set from the plan.  Workspace 11 keeps its
//!   monitor and only has its default rule updated.

use crate::layout::{LayoutPlan, MonitorPlan, OutputState, WorkspaceAssignment};
use crate::traits::ConfigRewriter;
use regex::{Captures, NoExpand, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static MONITOR_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#)?monitor\s*=\s*([^,\s]+)\s*(,.*)?$").expect("valid regex")
});
static WORKSPACE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^workspace\s*=\s*(\d+)\s*,.*$").expect("valid regex"));
/// A maximal run of non-delimiters together with the delimiter before it.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[\s:,=])([^\s:,=]+)").expect("valid regex"));
static DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"default:(true|false)").expect("valid regex"));

/// Splices monitor and workspace lines into a Hyprland config.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyprlandRewriter;

/// Render the Hyprland monitor line for one monitor.
pub fn monitor_line(monitor: &MonitorPlan) -> String {
    match monitor.state {
        OutputState::Disabled => format!("monitor = {}, disable", monitor.name),
        OutputState::Enabled | OutputState::Inactive => {
            let prefix = if monitor.state == OutputState::Inactive { "#" } else { "" };
            format!(
                "{}monitor = {}, {}@{}, {}, {}",
                prefix,
                monitor.name,
                monitor.resolution,
                monitor.refresh_rate,
                monitor.effective_position,
                monitor.scale
            )
        }
    }
}

fn workspace_line(
    line: &str,
    assignment: &WorkspaceAssignment,
    target: Option<&str>,
    names: &[&str],
) -> String {
    let rebound = match target {
        Some(target) => TOKEN_RE
            .replace_all(line, |caps: &Captures| {
                if names.contains(&&caps[2]) {
                    format!("{}{}", &caps[1], target)
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned(),
        None => line.to_string(),
    };
    let marker = format!("default:{}", assignment.is_default);
    DEFAULT_RE
        .replace_all(&rebound, NoExpand(&marker))
        .into_owned()
}

impl ConfigRewriter for HyprlandRewriter {
    fn label(&self) -> &'static str {
        "hyprland"
    }

    fn rewrite(&self, contents: &str, plan: &LayoutPlan) -> String {
        let names = plan.monitor_names();
        let monitor_lines: HashMap<&str, String> = plan
            .monitors
            .values()
            .map(|m| (m.name.as_str(), monitor_line(m)))
            .collect();

        super::map_lines(contents, |line| {
            if let Some(caps) = MONITOR_LINE_RE.captures(line) {
                return monitor_lines.get(&caps[2]).cloned();
            }
            let caps = WORKSPACE_LINE_RE.captures(line)?;
            let workspace: u8 = caps[1].parse().ok()?;
            let assignment = plan.workspace(workspace)?;
            Some(workspace_line(
                line,
                assignment,
                plan.target_name(workspace),
                &names,
            ))
        })
    }
}
