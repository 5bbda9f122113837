//! Condastrap bootstrap library.
//!
//! This crate installs a Conda-based distribution (Mambaforge, Miniforge,
//! Miniconda, or Anaconda) inside an ephemeral notebook kernel host. It
//! downloads a constructor-style installer, verifies its checksum, executes it
//! against a fixed prefix, rewrites the configuration files that pin the host
//! interpreter version, patches the interpreter launch wrapper so the prefix's
//! libraries are visible after restart, and finally terminates the host
//! process so the notebook service restarts it with the new environment.
//!
//! It is used by the `condastrap` CLI binary and can be consumed
//! programmatically for testing or custom bootstrap workflows.
//!
//! # Modules
//!
//! - [`check`] - Post-install verification probes and reporting
//! - [`cli`] - Command-line argument definitions
//! - [`distribution`] - Catalogue of supported installer distributions
//! - [`download`] - Installer artifact download abstraction
//! - [`error`] - Semantic error types with recovery hints
//! - [`host`] - Host kernel environment probing
//! - [`install`] - Bootstrap pipeline orchestration
//! - [`output`] - Progress and status message formatting
//! - [`patcher`] - Configuration file rewriting under the prefix
//! - [`receipt`] - Install receipt persistence
//! - [`restart`] - Kernel restart trigger
//! - [`runner`] - External command execution and installer invocation
//! - [`sha256_digest`] - Validated SHA-256 digest newtype and hashing
//! - [`wrapper`] - Interpreter launch wrapper patching

pub mod check;
pub mod cli;
pub mod distribution;
pub mod download;
pub mod error;
pub mod host;
pub mod install;
pub mod output;
pub mod patcher;
pub mod receipt;
pub mod restart;
pub mod runner;
pub mod sha256_digest;
pub mod wrapper;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
