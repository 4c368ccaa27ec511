//! Probe → resolve → rewrite, once or in a polling loop.
//!
//! [`LayoutSession`] owns the [`MonitorRegistry`] and drives it with a
//! [`ConnectionProbe`].  Every resolved [`LayoutPlan`] is spliced into the
//! Hyprland and Waybar configs through their [`ConfigRewriter`]s.  Hyprland
//! reloads its config on change, so rewriting the file is enough to apply a
//! new layout.

use crate::config::PathsConfig;
use crate::error::LayoutError;
use crate::layout::{self, LayoutPlan, ResolveOptions};
use crate::registry::{MonitorRegistry, Snapshot};
use crate::rewrite::hyprland::monitor_line;
use crate::rewrite::{HyprlandRewriter, WaybarRewriter};
use crate::traits::{ConfigRewriter, ConnectionProbe};
use log::{debug, error, info};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BACKUP_SUFFIX: &str = ".bak";
const HYPRLAND_TEMP_FILE: &str = "hypr_config";
const WAYBAR_TEMP_FILE: &str = "waybar_config";
const STAGING_SUFFIX: &str = ".hyprmon-tmp";

/// Errors raised while running a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("connection probe failed: {0}")]
    Probe(Box<dyn std::error::Error + Send>),
    #[error("cannot {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> SessionError {
    let path = path.to_path_buf();
    move |source| SessionError::Io {
        action,
        path,
        source,
    }
}

/// The files a session rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePaths {
    pub hyprland_config: PathBuf,
    pub waybar_config: PathBuf,
    /// Directory for dry-run output.
    pub temp_dir: PathBuf,
}

impl From<&PathsConfig> for FilePaths {
    fn from(paths: &PathsConfig) -> Self {
        Self {
            hyprland_config: paths.hyprland_config.clone(),
            waybar_config: paths.waybar_config.clone(),
            temp_dir: paths.temp_dir.clone(),
        }
    }
}

/// `<path>.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// `.<name>.hyprmon-tmp` next to `path`, renamed over it once written.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(STAGING_SUFFIX);
    path.with_file_name(name)
}

/// One config file and the rewriter responsible for it.
struct Target {
    path: PathBuf,
    temp: PathBuf,
    rewriter: Box<dyn ConfigRewriter>,
}

impl FilePaths {
    fn targets(&self) -> Vec<Target> {
        vec![
            Target {
                path: self.hyprland_config.clone(),
                temp: self.temp_dir.join(HYPRLAND_TEMP_FILE),
                rewriter: Box::new(HyprlandRewriter),
            },
            Target {
                path: self.waybar_config.clone(),
                temp: self.temp_dir.join(WAYBAR_TEMP_FILE),
                rewriter: Box::new(WaybarRewriter),
            },
        ]
    }
}

/// A registry bound to a probe and a set of config files.
pub struct LayoutSession<P: ConnectionProbe> {
    registry: MonitorRegistry,
    probe: P,
    options: ResolveOptions,
    targets: Vec<Target>,
    dry_run: bool,
    last_snapshot: Option<Snapshot>,
}

impl<P: ConnectionProbe> LayoutSession<P> {
    pub fn new(
        registry: MonitorRegistry,
        probe: P,
        options: ResolveOptions,
        paths: &FilePaths,
    ) -> Self {
        Self {
            registry,
            probe,
            options,
            targets: paths.targets(),
            dry_run: false,
            last_snapshot: None,
        }
    }

    /// Write generated files to the temp directory only.
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    pub fn registry(&self) -> &MonitorRegistry {
        &self.registry
    }

    /// Probe every declared monitor and store the result in the registry.
    ///
    /// Returns whether the connection state differs from the previous
    /// probe.  The first probe always counts as a change.
    pub fn probe(&mut self) -> Result<bool, SessionError> {
        let snapshot = self
            .probe
            .snapshot(&self.registry)
            .map_err(|e| SessionError::Probe(Box::new(e)))?;
        self.registry.apply_snapshot(&snapshot)?;

        let changed = self.last_snapshot.as_ref() != Some(&snapshot);
        if changed {
            info!("connected monitors: {:?}", self.connected_names());
        }
        self.last_snapshot = Some(snapshot);
        Ok(changed)
    }

    fn connected_names(&self) -> Vec<&str> {
        self.registry
            .connected_slots()
            .into_iter()
            .filter_map(|slot| self.registry.get(slot).map(|m| m.name()))
            .collect()
    }

    /// Run the resolver over the current connection state.
    pub fn resolve(&mut self) -> Result<LayoutPlan, SessionError> {
        let plan = layout::resolve(&mut self.registry, &self.options)?;
        for (slot, monitor) in &plan.monitors {
            debug!("{:>8}: {}", slot, monitor_line(monitor));
        }
        debug!(
            "status bar on {}",
            plan.status_bar_name().unwrap_or("<undeclared>")
        );
        Ok(plan)
    }

    /// Splice `plan` into every config file.
    ///
    /// A `.bak` copy of each file is made the first time it is touched.  The
    /// result is written next to the original and renamed over it, so readers
    /// never see a partial file.  A dry run writes to the temp directory
    /// instead and leaves the original alone.
    pub fn apply(&self, plan: &LayoutPlan) -> Result<(), SessionError> {
        for target in &self.targets {
            let label = target.rewriter.label();

            let backup = backup_path(&target.path);
            if !backup.exists() {
                info!("no backup of the {} config found, creating {}", label, backup.display());
                std::fs::copy(&target.path, &backup)
                    .map_err(io_error("back up", &target.path))?;
            }

            let contents = std::fs::read_to_string(&target.path)
                .map_err(io_error("read", &target.path))?;
            let rewritten = target.rewriter.rewrite(&contents, plan);

            if !self.dry_run && rewritten == contents {
                debug!("{} config unchanged", label);
                continue;
            }

            if self.dry_run {
                std::fs::write(&target.temp, &rewritten)
                    .map_err(io_error("write", &target.temp))?;
                info!("see generated {} config in {}", label, target.temp.display());
                continue;
            }

            let staging = staging_path(&target.path);
            std::fs::write(&staging, &rewritten).map_err(io_error("write", &staging))?;
            if let Err(e) = std::fs::rename(&staging, &target.path) {
                let _ = std::fs::remove_file(&staging);
                return Err(io_error("replace", &target.path)(e));
            }
            info!("updated {}", target.path.display());
        }
        Ok(())
    }

    /// Probe, resolve and apply once.
    pub fn run_once(&mut self) -> Result<LayoutPlan, SessionError> {
        self.probe()?;
        let plan = self.resolve()?;
        self.apply(&plan)?;
        Ok(plan)
    }

    /// One watch iteration: re-resolve and re-apply only if the connection
    /// state changed.  Returns the new plan, if any.
    ///
    /// A failed iteration forgets the last snapshot so the next poll retries.
    pub fn poll(&mut self) -> Result<Option<LayoutPlan>, SessionError> {
        let result = self.poll_inner();
        if result.is_err() {
            self.last_snapshot = None;
        }
        result
    }

    fn poll_inner(&mut self) -> Result<Option<LayoutPlan>, SessionError> {
        if !self.probe()? {
            return Ok(None);
        }
        let plan = self.resolve()?;
        self.apply(&plan)?;
        Ok(Some(plan))
    }

    /// Poll forever, sleeping `interval` between probes.
    pub fn watch(&mut self, interval: Duration) -> ! {
        info!("watching monitor connections every {:?}", interval);
        loop {
            if let Err(e) = self.poll() {
                error!("{}", e);
            }
            std::thread::sleep(interval);
        }
    }
}
