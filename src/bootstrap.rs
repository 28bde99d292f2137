//! Base filesystem bootstrap via debootstrap.
//!
//! [`BootstrapConfig`] carries everything the bootstrap needs explicitly;
//! the CLI layer supplies suite, mirror and variant, so no distribution
//! defaults are baked into the lifecycle controller itself.

use anyhow::Result;
use camino::Utf8Path;
use clap::ValueEnum;
use strum::Display;
use tracing::info;
use url::Url;

use crate::command::Command;
use crate::executor::CommandExecutor;
use crate::sequence::run_till_success;

/// Ubuntu suite to bootstrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Suite {
    /// 12.04 LTS (default)
    #[default]
    Precise,
    /// 14.04 LTS
    Trusty,
}

/// Configuration for one bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Suite to install.
    pub suite: Suite,
    /// Package mirror to install from.
    pub mirror: Url,
    /// Install the minimal base variant only.
    pub minbase: bool,
    /// Target architecture.
    pub arch: String,
    /// Repository components to enable.
    pub components: Vec<String>,
    /// Additional packages to include.
    pub include: Vec<String>,
}

impl BootstrapConfig {
    /// Creates a config with the stock architecture, components and
    /// included packages.
    pub fn new(suite: Suite, mirror: Url, minbase: bool) -> Self {
        Self {
            suite,
            mirror,
            minbase,
            arch: "amd64".to_string(),
            components: vec!["main".to_string(), "universe".to_string()],
            include: vec!["language-pack-en".to_string()],
        }
    }

    /// Assembles the debootstrap argv for `target`.
    fn build_args(&self, target: &Utf8Path) -> Vec<String> {
        let mut args = vec![format!("--arch={}", self.arch)];
        if !self.components.is_empty() {
            args.push(format!("--components={}", self.components.join(",")));
        }
        if !self.include.is_empty() {
            args.push(format!("--include={}", self.include.join(",")));
        }
        if self.minbase {
            args.push("--variant=minbase".to_string());
        }
        args.push(self.suite.to_string());
        args.push(target.to_string());
        args.push(self.mirror.to_string());
        args
    }
}

/// Populates `target` with a base system.
///
/// The target directory must not exist yet; debootstrap creates it.
pub fn bootstrap(
    target: &Utf8Path,
    config: &BootstrapConfig,
    executor: &dyn CommandExecutor,
) -> Result<()> {
    info!("bootstrapping {} ({}) from {}", target, config.suite, config.mirror);

    let mut argv = vec!["debootstrap".to_string()];
    argv.extend(config.build_args(target));
    run_till_success(executor, &[Command::new(argv)])?;

    info!("bootstrap of {} complete", target);
    Ok(())
}

/// Shell stub that tells invoke-rc.d not to start any daemon.
const POLICY_RC_D: &str = "#!/bin/sh\nexit 101\n";

/// Installs the guards that keep package installation inside the chroot
/// from starting services on the host: a denying `policy-rc.d` and an
/// `ischroot` that always answers yes.
pub fn install_service_guards(root: &Utf8Path, executor: &dyn CommandExecutor) -> Result<()> {
    let commands: Vec<Command> = [
        Command::from_tokens(["dd", "of=/usr/sbin/policy-rc.d"]).with_stdin(POLICY_RC_D),
        Command::from_tokens(["chmod", "a+x", "/usr/sbin/policy-rc.d"]),
        Command::from_tokens([
            "dpkg-divert",
            "--divert",
            "/usr/bin/ischroot.debianutils",
            "--rename",
            "/usr/bin/ischroot",
        ]),
        Command::from_tokens(["ln", "-s", "/bin/true", "/usr/bin/ischroot"]),
    ]
    .into_iter()
    .map(|command| command.in_chroot(root))
    .collect();

    info!("installing service guards in {}", root);
    run_till_success(executor, &commands)?;
    Ok(())
}
