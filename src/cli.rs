//! CLI argument definitions for the condastrap binary.
//!
//! This module defines the command-line interface using clap. It is
//! separated from the main entrypoint to keep the binary small and focused
//! on orchestration.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Bootstrap a Conda distribution inside a notebook kernel host.
#[derive(Parser, Debug, Default)]
#[command(name = "condastrap")]
#[command(version, about)]
#[command(long_about = concat!(
    "Bootstrap a Conda distribution inside a notebook kernel host.\n\n",
    "Condastrap downloads a constructor-style installer (Mambaforge by ",
    "default), verifies its checksum, installs it to the prefix the kernel ",
    "already resolves libraries from, pins the interpreter version so the ",
    "solver cannot break the running kernel, and patches the interpreter ",
    "launch wrapper so the prefix's bin/ and lib/ directories are exported.\n\n",
    "A successful install terminates the current process: environment ",
    "variables were read once at start and only a restarted kernel picks up ",
    "the rewired paths. The notebook service restarts the kernel ",
    "automatically.",
))]
#[command(after_help = concat!(
    "DISTRIBUTIONS:\n",
    "  mambaforge    conda-forge distribution with mamba (default)\n",
    "  miniforge     conda-forge distribution\n",
    "  miniconda     minimal Anaconda installer\n",
    "  anaconda      full Anaconda distribution\n\n",
    "EXAMPLES:\n",
    "  Install the default distribution:\n",
    "    $ condastrap install\n\n",
    "  Install Miniconda:\n",
    "    $ condastrap install --distribution miniconda\n\n",
    "  Install from an explicit installer URL with checksum verification:\n",
    "    $ condastrap install --url https://example.com/Installer.sh \\\n",
    "        --sha256 cfb16c47dc2d115c8b114280aa605e322173f029fdb847a45348bf4bd23c62ab\n\n",
    "  Verify an existing install:\n",
    "    $ condastrap check\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Install arguments (used when no subcommand is given).
    #[command(flatten)]
    pub install: InstallArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Install a distribution (default when no subcommand given).
    Install(InstallArgs),

    /// Verify that an install is present and the environment was rewired.
    Check(CheckArgs),
}

/// Arguments for the install command.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Catalogued distribution to install.
    #[arg(short, long, value_name = "NAME", conflicts_with = "url")]
    pub distribution: Option<String>,

    /// Explicit constructor-style installer URL.
    #[arg(short, long, value_name = "URL")]
    pub url: Option<String>,

    /// Expected SHA-256 checksum of the installer artifact.
    #[arg(long, value_name = "HEX")]
    pub sha256: Option<String>,

    /// Target location for the installation [default: /usr/local].
    #[arg(short, long, value_name = "DIR")]
    pub prefix: Option<Utf8PathBuf>,

    /// Extra variable to export from the interpreter wrapper (repeatable).
    ///
    /// Raw strings; add your own quoting for values with spaces.
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Install even when the prefix already passes the verification checks.
    #[arg(short, long)]
    pub force: bool,

    /// Skip the kernel restart after a successful install.
    #[arg(long)]
    pub no_restart: bool,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the check command.
#[derive(Parser, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Location where the distribution was installed [default: /usr/local].
    #[arg(short, long, value_name = "DIR")]
    pub prefix: Option<Utf8PathBuf>,

    /// Suppress the success banner (failures still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_install_with_no_subcommand() {
        let cli = Cli::parse_from(["condastrap"]);
        assert!(cli.command.is_none());
        assert!(cli.install.distribution.is_none());
        assert!(!cli.install.force);
    }

    #[test]
    fn parses_install_subcommand_flags() {
        let cli = Cli::parse_from([
            "condastrap",
            "install",
            "--distribution",
            "miniconda",
            "--prefix",
            "/opt/conda",
            "--env",
            "MY_FLAG=1",
            "--no-restart",
        ]);
        let Some(Command::Install(args)) = cli.command else {
            panic!("expected install subcommand");
        };
        assert_eq!(args.distribution.as_deref(), Some("miniconda"));
        assert_eq!(args.prefix, Some(Utf8PathBuf::from("/opt/conda")));
        assert_eq!(args.env, vec!["MY_FLAG=1".to_owned()]);
        assert!(args.no_restart);
    }

    #[test]
    fn url_conflicts_with_distribution() {
        let result = Cli::try_parse_from([
            "condastrap",
            "install",
            "--distribution",
            "miniconda",
            "--url",
            "https://example.test/installer.sh",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_check_subcommand() {
        let cli = Cli::parse_from(["condastrap", "check", "--prefix", "/opt/conda"]);
        let Some(Command::Check(args)) = cli.command else {
            panic!("expected check subcommand");
        };
        assert_eq!(args.prefix, Some(Utf8PathBuf::from("/opt/conda")));
        assert!(!args.quiet);
    }
}
