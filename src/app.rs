//! The core of the tool: resolving the local version state and reconciling
//! it with what the user asked for.
//!
//! Every command starts from the same freshly computed [`LocalState`];
//! nothing is persisted between invocations except the active symlink.

use crate::catalog::{Catalog, GoDevCatalog};
use crate::config::Config;
use crate::error::{GoverError, Result};
use crate::exec::{Runner, SystemRunner};
use crate::fsx::{DirFs, OsDir};
use crate::version;
use std::io::{self, Write};
use std::path::PathBuf;

/// Name of both the active symlink and the unversioned toolchain binary.
const LINK: &str = "go";

/// Prefix of versioned binary and SDK directory names (`go1.18`).
const PREFIX: &str = "go";

/// Zero-byte sentinel written by golang.org/dl once an SDK has been
/// downloaded and unpacked successfully.
const SDK_MARKER: &str = ".unpacked-success";

/// The version state of this machine, recomputed on every invocation.
pub struct LocalState {
    /// The version of the pristine toolchain, the one that responds when
    /// the active symlink is out of the way. Never removable.
    pub main: String,

    /// The version the active symlink points at, or `main` if there is no
    /// symlink.
    pub current: String,

    /// Every version with a binary in the Go binary directory, plus
    /// `main`, newest first.
    pub installed: Vec<String>,
}

/// The reconciliation engine. All collaborators are injected so the
/// command logic can run against doubles in tests.
pub struct App {
    pub gobin: Box<dyn DirFs>,
    pub sdk: Box<dyn DirFs>,
    pub gobin_dir: PathBuf,
    pub runner: Box<dyn Runner>,
    pub catalog: Box<dyn Catalog>,
    pub output: Box<dyn Write + Send>,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            gobin: Box::new(OsDir::new(config.gobin_dir.clone())),
            sdk: Box::new(OsDir::new(config.sdk_dir.clone())),
            gobin_dir: config.gobin_dir.clone(),
            runner: Box::new(SystemRunner::new(config.gobin_dir.clone())),
            catalog: Box::new(GoDevCatalog::new(&config.catalog_url, config.fetch_timeout())?),
            output: Box::new(io::stdout()),
        })
    }

    /// Switch the current Go version, installing it first if needed.
    pub async fn use_version(&mut self, version: &str) -> Result<()> {
        let local = self.local_state().await?;

        let version = self.resolve_alias(version, &local)?;

        if version == local.current {
            writeln!(self.output, "{version} is already in use")?;
            return Ok(());
        }

        if version == local.main {
            // switching back to main only takes removing the symlink.
            self.gobin.remove(LINK)?;
            writeln!(self.output, "Switched to {version} (main)")?;
            return Ok(());
        }

        let initial = !local.installed.contains(&version);
        if initial {
            writeln!(self.output, "{version} is not installed. Looking for it on go.dev ...")?;
            let module = format!("golang.org/dl/{PREFIX}{version}@latest");
            self.runner.run(LINK, &["install", &module]).await?;
        }

        // the SDK download may have been interrupted on a previous run, so
        // its presence is checked even when the binary already exists.
        if !self.downloaded(&version)? {
            if !initial {
                writeln!(self.output, "{version} SDK is missing. Starting download ...")?;
            }
            let binary = format!("{PREFIX}{version}");
            self.runner.run(&binary, &["download"]).await?;
        }

        match self.gobin.remove(LINK) {
            Err(GoverError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {}
            other => other?,
        }
        self.gobin.symlink(&format!("{PREFIX}{version}"), LINK)?;

        writeln!(self.output, "Switched to {version}")?;
        Ok(())
    }

    /// Print installed versions, or the whole remote catalog with `all`.
    /// The current version is marked with `*`.
    pub async fn list(&mut self, all: bool, only: Option<&str>) -> Result<()> {
        let local = self.local_state().await?;

        let mut versions = local.installed.clone();
        if all {
            versions = self.catalog.versions().await?;
        }

        let mut only = only.unwrap_or("");
        if only == "latest" {
            only = "";
            versions = version::latest_patches(&versions);
        }

        let width = versions.iter().map(|v| v.len()).max().unwrap_or(0);

        for version in &versions {
            if !version.starts_with(only) {
                continue;
            }

            let extra = if *version == local.main {
                " (main)"
            } else if !local.installed.contains(version) {
                " (not installed)"
            } else if !self.downloaded(version)? {
                " (missing SDK)"
            } else {
                ""
            };

            let prefix = if *version == local.current { "*" } else { " " };
            writeln!(self.output, "{prefix} {version:<width$}{extra}")?;
        }

        Ok(())
    }

    /// Remove a version, both the binary and the SDK. Removing the current
    /// version reverts to main first; main itself is never removable.
    pub async fn remove(&mut self, version: &str) -> Result<()> {
        let local = self.local_state().await?;

        let version = self.resolve_alias(version, &local)?;

        if version == local.main {
            return Err(GoverError::RemoveMain(version));
        }
        if !local.installed.contains(&version) {
            return Err(GoverError::NotInstalled(version));
        }

        if version == local.current {
            self.gobin.remove(LINK)?;
            writeln!(self.output, "Switched to {} (main)", local.main)?;
        }

        self.gobin.remove(&format!("{PREFIX}{version}"))?;
        self.sdk.remove_all(&format!("{PREFIX}{version}"))?;

        writeln!(self.output, "Removed {version}")?;
        Ok(())
    }

    /// Substitute the `main` alias and validate the version grammar.
    fn resolve_alias(&self, version: &str, local: &LocalState) -> Result<String> {
        let version = if version == "main" { &local.main } else { version };
        if !version::is_valid(version) {
            return Err(GoverError::MalformedVersion(version.to_string()));
        }
        Ok(version.to_string())
    }

    /// Compute the main, current and installed versions from scratch.
    async fn local_state(&mut self) -> Result<LocalState> {
        // the go<version> binaries put $GOROOT/bin in front of $PATH when
        // re-execing the toolchain; both it and $GOBIN must be out of the
        // way for the pristine binary to answer.
        let mut exclude = vec![self.gobin_dir.clone()];
        if let Some(goroot) = std::env::var_os("GOROOT") {
            exclude.push(PathBuf::from(goroot).join("bin"));
        }

        let output = self.runner.run_captured(LINK, &["version"], &exclude).await?;

        // the format is `go version go1.20 linux/amd64`.
        let parts: Vec<&str> = output.split_whitespace().collect();
        let main = match parts.as_slice() {
            [_, _, v, _] => v.strip_prefix(PREFIX),
            _ => None,
        };
        let main = match main {
            Some(v) => v.to_string(),
            None => return Err(GoverError::VersionOutput(output.trim().to_string())),
        };

        let current = match self.gobin.read_link(LINK)? {
            None => main.clone(),
            Some(target) => {
                let base = target.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                base.strip_prefix(PREFIX).unwrap_or(base).to_string()
            }
        };

        let mut installed = vec![main.clone()];
        for entry in self.gobin.read_dir()? {
            if entry.is_dir {
                continue;
            }
            if let Some(v) = entry.name.strip_prefix(PREFIX) {
                if version::is_valid(v) {
                    installed.push(v.to_string());
                }
            }
        }
        installed.sort_by(|a, b| version::compare(a, b));
        installed.dedup();

        Ok(LocalState { main, current, installed })
    }

    /// Whether the SDK payload of a version has been fully unpacked.
    fn downloaded(&self, version: &str) -> Result<bool> {
        // tip has no sentinel file; golang.org/dl checks for the nested
        // binary instead.
        let name = if version == version::TIP {
            format!("{PREFIX}tip/bin/go")
        } else {
            format!("{PREFIX}{version}/{SDK_MARKER}")
        };
        self.sdk.exists(&name)
    }
}
