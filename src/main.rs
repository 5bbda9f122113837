//! Condastrap CLI entrypoint.
//!
//! This binary bootstraps a Conda distribution into the notebook host and
//! verifies existing installs. Orchestration only; the pipeline lives in the
//! library crate.

use clap::Parser;
use condastrap::check::{EnvSnapshot, run_checks};
use condastrap::cli::{CheckArgs, Cli, Command, InstallArgs};
use condastrap::distribution::Distribution;
use condastrap::error::{BootstrapError, Result};
use condastrap::host::HostKernel;
use condastrap::install::{InstallOptions, install_distribution, install_from_url};
use condastrap::output::{installed_from_message, write_stderr_line};
use condastrap::receipt::InstallReceipt;
use condastrap::runner::{CommandExecutor, SystemCommandExecutor};
use condastrap::sha256_digest::Sha256Digest;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let exit_code = match run(&cli, &mut stderr) {
        Ok(code) => code,
        Err(err) => {
            write_stderr_line(&mut stderr, err);
            1
        }
    };
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Dispatch the parsed CLI and return the process exit code.
fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<i32> {
    match &cli.command {
        Some(Command::Check(args)) => run_check(args, &SystemCommandExecutor, stderr),
        Some(Command::Install(args)) => run_install(args, stderr),
        None => run_install(&cli.install, stderr),
    }
}

/// Run the install command.
///
/// A successful run normally does not return at all: the pipeline's final
/// step terminates the process so the notebook service restarts the kernel.
fn run_install(args: &InstallArgs, stderr: &mut dyn Write) -> Result<i32> {
    let options = install_options_from(args)?;

    let mut sink = std::io::sink();
    let progress: &mut dyn Write = if args.quiet { &mut sink } else { stderr };

    match &args.url {
        Some(url) => install_from_url(url, &options, progress)?,
        None => {
            let dist = match &args.distribution {
                Some(name) => name.parse::<Distribution>()?,
                None => Distribution::DEFAULT,
            };
            install_distribution(dist, &options, progress)?
        }
    };
    Ok(0)
}

/// Run the verification check and map the report onto an exit code.
///
/// When an install receipt is present under the prefix, its provenance is
/// reported ahead of the probe results.
fn run_check(
    args: &CheckArgs,
    executor: &dyn CommandExecutor,
    stderr: &mut dyn Write,
) -> Result<i32> {
    let prefix = args
        .prefix
        .clone()
        .unwrap_or_else(|| camino::Utf8PathBuf::from(condastrap::install::DEFAULT_PREFIX));

    let kernel = HostKernel::detect(executor)?;
    let receipt = InstallReceipt::read(&prefix)?;
    let report = run_checks(&prefix, &kernel, &EnvSnapshot::capture());

    if let Some(receipt) = &receipt {
        if !args.quiet {
            write_stderr_line(
                stderr,
                installed_from_message(&receipt.distribution, &receipt.installer_url),
            );
        }
    }

    if report.passed() {
        if !args.quiet {
            write_stderr_line(stderr, report.display_text());
        }
        Ok(0)
    } else {
        write_stderr_line(stderr, report.display_text());
        Ok(1)
    }
}

/// Build pipeline options from the install arguments.
fn install_options_from(args: &InstallArgs) -> Result<InstallOptions> {
    let mut options = InstallOptions::default();

    if let Some(prefix) = &args.prefix {
        options.prefix = prefix.clone();
    }
    if let Some(hex) = &args.sha256 {
        options.expected_sha256 = Some(Sha256Digest::try_from(hex.as_str())?);
    }
    options.extra_env = args
        .env
        .iter()
        .map(|assignment| parse_env_assignment(assignment))
        .collect::<Result<Vec<_>>>()?;
    options.run_checks = !args.force;
    options.restart = !args.no_restart;

    Ok(options)
}

/// Parse one `KEY=VALUE` assignment.
fn parse_env_assignment(assignment: &str) -> Result<(String, String)> {
    match assignment.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(BootstrapError::InvalidEnvAssignment {
            value: assignment.to_owned(),
        }),
    }
}
