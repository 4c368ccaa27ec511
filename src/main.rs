//! Entry point for **hyprmon**.
//!
//! Run it once before starting Hyprland (`hyprmon -s l ... && Hyprland`) or
//! keep it running with `--watch` to follow monitors being plugged in and
//! out.  Monitor declarations come from the command line, the config file or
//! both; command-line values win.

use clap::Parser;
use hyprmon::config::{self, Config, LayoutConfig, MonitorDecl};
use hyprmon::drm::DrmProbe;
use hyprmon::layout::{ResolveOptions, SecondarySide};
use hyprmon::monitor::Slot;
use hyprmon::registry::MonitorRegistry;
use hyprmon::session::{FilePaths, LayoutSession};
use log::{error, info};
use std::error::Error;
use std::path::{Path, PathBuf};

const MONITOR_FIELDS: [&str; 5] = ["NAME", "RESOLUTION", "REFRESH_RATE", "POSITION", "SCALE"];

fn parse_side(s: &str) -> Result<SecondarySide, String> {
    s.parse()
}

#[derive(Parser, Debug)]
#[command(name = "hyprmon", version, long_about = None)]
#[command(about = "Rewrite the Hyprland and Waybar configs for the monitors that are connected")]
struct Cli {
    /// Left monitor, e.g. `DP-1 1920x1080 60 0x0 1`
    #[arg(short = 'l', long = "left-monitor", num_args = 5, value_names = MONITOR_FIELDS)]
    left_monitor: Option<Vec<String>>,

    /// Center monitor
    #[arg(short = 'c', long = "center-monitor", num_args = 5, value_names = MONITOR_FIELDS)]
    center_monitor: Option<Vec<String>>,

    /// Right monitor
    #[arg(short = 'r', long = "right-monitor", num_args = 5, value_names = MONITOR_FIELDS)]
    right_monitor: Option<Vec<String>>,

    /// Builtin (laptop) monitor
    #[arg(short = 'b', long = "builtin-monitor", num_args = 5, value_names = MONITOR_FIELDS)]
    builtin_monitor: Option<Vec<String>>,

    /// Place the secondary monitor to the left (l) or right (r) when only
    /// two external monitors are connected
    #[arg(short = 's', long = "secondary-monitor", value_name = "l|r", value_parser = parse_side)]
    secondary_monitor: Option<SecondarySide>,

    /// Disable the builtin monitor when external monitors are connected
    #[arg(short = 'w', long = "when-external-connected-disable-builtin")]
    when_external_connected_disable_builtin: bool,

    /// Log the resolved layout
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Write the generated configs to the temp directory only
    #[arg(short = 'd', long = "dry-run")]
    dry_run: bool,

    /// Keep running and re-apply the layout whenever monitors change
    #[arg(long = "watch")]
    watch: bool,

    /// Config file (default: $XDG_CONFIG_HOME/hyprmon/config.json)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    fn monitor(&self, slot: Slot) -> Option<&Vec<String>> {
        match slot {
            Slot::Left => self.left_monitor.as_ref(),
            Slot::Center => self.center_monitor.as_ref(),
            Slot::Right => self.right_monitor.as_ref(),
            Slot::Builtin => self.builtin_monitor.as_ref(),
        }
    }
}

/// Load the config file, falling back to compiled-in defaults when the
/// default file does not exist.  An explicitly requested file must load.
fn load_config(explicit: Option<&Path>) -> Result<Config, config::ConfigError> {
    load_config_from(explicit, &config::default_config_path())
}

fn load_config_from(
    explicit: Option<&Path>,
    default: &Path,
) -> Result<Config, config::ConfigError> {
    let path = match explicit {
        Some(path) => path,
        None if !default.exists() => {
            info!("no config file at {}, using defaults", default.display());
            return Ok(Config::default());
        }
        None => default,
    };
    let cfg = Config::load(path)?;
    info!("loaded config from {}", path.display());
    Ok(cfg)
}

/// Overlay the command-line flags on the config file's layout section.
fn merge_layout(cli: &Cli, mut layout: LayoutConfig) -> Result<LayoutConfig, String> {
    for slot in Slot::ALL {
        if let Some(values) = cli.monitor(slot) {
            let decl: MonitorDecl = values.clone().try_into().map_err(|v: Vec<String>| {
                format!("--{}-monitor takes 5 values, got {}", slot, v.len())
            })?;
            layout.set_monitor(slot, decl);
        }
    }
    if cli.secondary_monitor.is_some() {
        layout.secondary_monitor = cli.secondary_monitor;
    }
    layout.disable_builtin_when_external |= cli.when_external_connected_disable_builtin;
    Ok(layout)
}

fn build_registry(layout: &LayoutConfig) -> Result<MonitorRegistry, hyprmon::error::LayoutError> {
    let mut registry = MonitorRegistry::new();
    for slot in Slot::ALL {
        if let Some([name, resolution, refresh_rate, position, scale]) = layout.monitor(slot) {
            registry.register(slot, name, resolution, refresh_rate, position, scale)?;
        }
    }
    Ok(registry)
}

//  Main

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let config = load_config(cli.config.as_deref())?;
    let layout = merge_layout(cli, config.layout.clone())?;

    let secondary = layout
        .secondary_monitor
        .ok_or("the secondary monitor side is required (-s l|r or layout.secondary_monitor)")?;
    let options = ResolveOptions {
        secondary,
        disable_builtin_when_external: layout.disable_builtin_when_external,
    };

    let registry = build_registry(&layout)?;
    info!("declared monitors: {:?}", registry.names());

    let paths = config.paths.expanded();
    let probe = DrmProbe::new(&paths.drm_dir);
    let mut session = LayoutSession::new(registry, probe, options, &FilePaths::from(&paths));
    session.set_dry_run(cli.dry_run);

    if cli.watch {
        session.watch(config.watch.interval());
    }

    let plan = session.run_once()?;
    info!("{}", plan.connectivity);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn temp_file(contents: Option<&str>) -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "hyprmon-main-test-{}-{}.json",
            std::process::id(),
            id
        ));
        let _ = std::fs::remove_file(&path);
        if let Some(contents) = contents {
            std::fs::write(&path, contents).unwrap();
        }
        path
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("hyprmon").chain(args.iter().copied())).unwrap()
    }

    fn decl(values: [&str; 5]) -> MonitorDecl {
        values.map(String::from)
    }

    fn file_layout() -> LayoutConfig {
        LayoutConfig {
            left: Some(decl(["DP-1", "1920x1080", "60", "0x0", "1"])),
            builtin: Some(decl(["eDP-1", "1920x1200", "60", "1920x0", "1"])),
            secondary_monitor: Some(SecondarySide::Left),
            ..LayoutConfig::default()
        }
    }

    //  Config loading

    #[test]
    fn missing_default_config_uses_defaults() {
        let path = temp_file(None);
        let cfg = load_config_from(None, &path).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn valid_default_config_is_loaded() {
        let path = temp_file(Some(r#"{ "layout": { "secondary_monitor": "r" } }"#));
        let cfg = load_config_from(None, &path).unwrap();
        assert_eq!(cfg.layout.secondary_monitor, Some(SecondarySide::Right));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn malformed_default_config_is_an_error() {
        let path = temp_file(Some(
            r#"{"layout":{"secondary_monitor":"l","left":["DP-1","1920x1080"]}}"#,
        ));
        let err = load_config_from(None, &path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn explicit_config_must_exist() {
        let missing = temp_file(None);
        let default = temp_file(Some("{}"));
        let err = load_config_from(Some(&missing), &default).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
        let _ = std::fs::remove_file(&default);
    }

    #[test]
    fn explicit_config_must_parse() {
        let path = temp_file(Some("{ not json"));
        let default = temp_file(None);
        let err = load_config_from(Some(&path), &default).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
        let _ = std::fs::remove_file(&path);
    }

    //  Merging

    #[test]
    fn cli_declaration_overrides_file_per_slot() {
        let cli = cli(&["-l", "HDMI-A-1", "2560x1440", "144", "0x0", "1"]);
        let layout = merge_layout(&cli, file_layout()).unwrap();
        assert_eq!(layout.left, Some(decl(["HDMI-A-1", "2560x1440", "144", "0x0", "1"])));
        assert_eq!(layout.builtin, file_layout().builtin);
        assert!(layout.center.is_none());
        assert!(layout.right.is_none());
    }

    #[test]
    fn secondary_flag_overrides_file() {
        let layout = merge_layout(&cli(&["-s", "r"]), file_layout()).unwrap();
        assert_eq!(layout.secondary_monitor, Some(SecondarySide::Right));

        let layout = merge_layout(&cli(&[]), file_layout()).unwrap();
        assert_eq!(layout.secondary_monitor, Some(SecondarySide::Left));
    }

    #[test]
    fn disable_builtin_flag_is_ored_with_file() {
        let mut from_file = file_layout();
        from_file.disable_builtin_when_external = true;
        let layout = merge_layout(&cli(&[]), from_file).unwrap();
        assert!(layout.disable_builtin_when_external);

        let layout = merge_layout(&cli(&["-w"]), file_layout()).unwrap();
        assert!(layout.disable_builtin_when_external);

        let layout = merge_layout(&cli(&[]), file_layout()).unwrap();
        assert!(!layout.disable_builtin_when_external);
    }

    #[test]
    fn wrong_value_count_is_rejected() {
        let mut cli = cli(&[]);
        cli.center_monitor = Some(vec!["DP-2".into(), "1920x1080".into(), "60".into()]);
        let err = merge_layout(&cli, file_layout()).unwrap_err();
        assert_eq!(err, "--center-monitor takes 5 values, got 3");
    }

    #[test]
    fn short_declaration_fails_to_parse() {
        let args = ["hyprmon", "-r", "DP-3", "1920x1080"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn invalid_side_fails_to_parse() {
        assert!(Cli::try_parse_from(["hyprmon", "-s", "up"]).is_err());
    }

    //  Registry

    #[test]
    fn registry_holds_declared_slots() {
        let registry = build_registry(&file_layout()).unwrap();
        assert!(registry.contains(Slot::Left));
        assert!(registry.contains(Slot::Builtin));
        assert!(!registry.contains(Slot::Center));
        assert_eq!(registry.get(Slot::Left).unwrap().name(), "DP-1");
    }

    #[test]
    fn registry_rejects_invalid_declaration() {
        let mut layout = file_layout();
        layout.right = Some(decl(["DP-3", "wide", "60", "0x0", "1"]));
        assert!(build_registry(&layout).is_err());
    }
}
