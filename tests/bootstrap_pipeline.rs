//! End-to-end pipeline tests driven through the public API.
//!
//! Exercises the bootstrap with stubbed collaborators from the
//! `test-support` feature: no network access, no installer execution, and no
//! process termination.

use camino::Utf8PathBuf;
use condastrap::check::{EnvSnapshot, run_checks};
use condastrap::error::BootstrapError;
use condastrap::host::HostKernel;
use condastrap::install::{Bootstrap, InstallOptions, Outcome};
use condastrap::patcher::condarc_contents;
use condastrap::receipt::InstallReceipt;
use condastrap::sha256_digest::{Sha256Digest, compute_sha256};
use condastrap::test_utils::{
    ExpectedCall, RecordingRestart, StubDownloader, StubExecutor, success_output,
};

const INSTALLER_BODY: &[u8] = b"#!/bin/sh\n# constructor payload\nexit 0\n";

struct Host {
    root: Utf8PathBuf,
    kernel: HostKernel,
    options: InstallOptions,
    _dir: tempfile::TempDir,
}

fn host() -> Host {
    let dir = tempfile::tempdir().expect("create temp dir");
    let root =
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("temp path is UTF-8");

    let executable = root.join("python3");
    std::fs::write(&executable, b"#!ELF fake interpreter").expect("write interpreter");

    let kernel = HostKernel {
        executable,
        python_major: 3,
        python_minor: 10,
        cuda_series: "11.8".to_owned(),
        startup_config: root.join("etc/ipython/ipython_config.py"),
    };

    let options = InstallOptions {
        prefix: root.join("prefix"),
        run_checks: false,
        restart: false,
        log_path: root.join("install.log"),
        staging_path: Some(root.join("installer.sh")),
        ..InstallOptions::default()
    };

    Host {
        root,
        kernel,
        options,
        _dir: dir,
    }
}

fn body_digest() -> Sha256Digest {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("body");
    std::fs::write(&path, INSTALLER_BODY).expect("write body");
    compute_sha256(&path).expect("hash body")
}

fn installer_call(host: &Host) -> ExpectedCall {
    ExpectedCall::new(
        "bash",
        &[
            host.root.join("installer.sh").as_str(),
            "-bfp",
            host.options.prefix.as_str(),
        ],
        Ok(success_output()),
    )
}

#[test]
fn full_run_rewires_the_host_for_the_next_kernel() {
    let host = host();
    let downloader = StubDownloader::new(INSTALLER_BODY);
    let executor = StubExecutor::new(vec![installer_call(&host)]);
    let restart = RecordingRestart::default();
    let bootstrap = Bootstrap::new(&downloader, &executor, &restart);
    let mut progress = Vec::new();

    let outcome = bootstrap
        .run_pipeline(
            &host.kernel,
            "https://example.test/Mambaforge.sh",
            "mambaforge",
            Some(&body_digest()),
            &host.options,
            &mut progress,
        )
        .expect("pipeline succeeds");

    assert!(matches!(outcome, Outcome::Installed { .. }));
    executor.assert_finished();

    // The pin file targets the probed interpreter series and CUDA driver.
    let pinned = std::fs::read_to_string(host.options.prefix.join("conda-meta/pinned"))
        .expect("pinned readable");
    assert!(pinned.contains("python 3.10.*"));
    assert!(pinned.contains("cudatoolkit 11.8.*"));

    assert_eq!(
        std::fs::read_to_string(host.options.prefix.join(".condarc"))
            .expect(".condarc readable"),
        condarc_contents()
    );

    // The wrapper execs the moved-aside interpreter with the prefix paths.
    let wrapper =
        std::fs::read_to_string(host.root.join("python3")).expect("wrapper readable");
    assert!(wrapper.starts_with("#!/bin/bash\n"));
    assert!(wrapper.contains("LD_LIBRARY_PATH="));
    assert!(wrapper.contains(host.options.prefix.join("lib").as_str()));
    assert!(wrapper.contains("python3.real -x"));

    let receipt = InstallReceipt::read(&host.options.prefix)
        .expect("receipt readable")
        .expect("receipt present");
    assert_eq!(receipt.distribution, "mambaforge");
    assert_eq!(receipt.sha256, Some(body_digest().into_inner()));
}

#[test]
fn rerunning_the_pipeline_is_stable() {
    let host = host();
    let restart = RecordingRestart::default();

    let run = |progress: &mut Vec<u8>| {
        // Each run stages and consumes its own artifact.
        let downloader = StubDownloader::new(INSTALLER_BODY);
        let executor = StubExecutor::new(vec![installer_call(&host)]);
        let bootstrap = Bootstrap::new(&downloader, &executor, &restart);
        bootstrap
            .run_pipeline(
                &host.kernel,
                "https://example.test/Mambaforge.sh",
                "mambaforge",
                None,
                &host.options,
                progress,
            )
            .expect("pipeline succeeds");
        executor.assert_finished();
    };

    run(&mut Vec::new());
    let pinned_path = host.options.prefix.join("conda-meta/pinned");
    let first_pinned = std::fs::read_to_string(&pinned_path).expect("pinned readable");
    let first_wrapper =
        std::fs::read_to_string(host.root.join("python3")).expect("wrapper readable");

    run(&mut Vec::new());
    assert_eq!(
        std::fs::read_to_string(&pinned_path).expect("pinned readable"),
        first_pinned
    );
    assert_eq!(
        std::fs::read_to_string(host.root.join("python3")).expect("wrapper readable"),
        first_wrapper
    );
    // The real interpreter survived both runs.
    assert_eq!(
        std::fs::read(host.root.join("python3.real")).expect("real interpreter readable"),
        b"#!ELF fake interpreter"
    );
}

#[test]
fn failed_install_leaves_a_diagnosable_report() {
    let host = host();
    let downloader = StubDownloader::new(INSTALLER_BODY);
    let executor = StubExecutor::new(vec![ExpectedCall::new(
        "bash",
        &[
            host.root.join("installer.sh").as_str(),
            "-bfp",
            host.options.prefix.as_str(),
        ],
        Ok(condastrap::test_utils::failure_output("no space left on device")),
    )]);
    let restart = RecordingRestart::default();
    let bootstrap = Bootstrap::new(&downloader, &executor, &restart);

    let err = bootstrap
        .run_pipeline(
            &host.kernel,
            "https://example.test/Mambaforge.sh",
            "mambaforge",
            None,
            &host.options,
            &mut Vec::new(),
        )
        .expect_err("installer failure is fatal");

    assert!(matches!(err, BootstrapError::InstallerFailed { .. }));
    assert_eq!(restart.triggered(), 0, "no restart after a failed install");

    // The captured log names the underlying cause, and the half-finished
    // prefix fails the verification probes.
    let log = std::fs::read_to_string(&host.options.log_path).expect("log readable");
    assert!(log.contains("no space left on device"));
    let report = run_checks(&host.options.prefix, &host.kernel, &EnvSnapshot::default());
    assert!(!report.passed());
}

#[test]
fn verification_report_distinguishes_installed_from_rewired() {
    use std::os::unix::fs::PermissionsExt;

    let host = host();
    let prefix = &host.options.prefix;
    std::fs::create_dir_all(prefix.join("bin")).expect("create bin");
    let conda = prefix.join("bin/conda");
    std::fs::write(&conda, b"#!fake conda").expect("write conda");
    std::fs::set_permissions(&conda, std::fs::Permissions::from_mode(0o755))
        .expect("mark executable");
    std::fs::create_dir_all(prefix.join("lib/python3.10/site-packages"))
        .expect("create site-packages");

    // Files are in place but the environment was never rewired.
    let stale = EnvSnapshot {
        path: Some("/usr/bin:/bin".to_owned()),
        ld_library_path: None,
    };
    let report = run_checks(prefix, &host.kernel, &stale);
    assert!(!report.passed());
    assert!(report.display_text().contains("was the kernel restarted?"));

    // After a restart through the wrapper, the probes pass.
    let rewired = EnvSnapshot {
        path: Some(format!("{}:/usr/bin:/bin", prefix.join("bin"))),
        ld_library_path: Some(format!("{}:", prefix.join("lib"))),
    };
    assert!(run_checks(prefix, &host.kernel, &rewired).passed());
}

#[test]
fn explicit_url_failure_does_not_touch_the_prefix() {
    let host = host();
    let downloader = condastrap::test_utils::FailingDownloader;
    let executor = StubExecutor::new(Vec::new());
    let restart = RecordingRestart::default();
    let bootstrap = Bootstrap::new(&downloader, &executor, &restart);

    let err = bootstrap
        .run_pipeline(
            &host.kernel,
            "https://example.test/definitely-not-there.sh",
            "custom",
            None,
            &host.options,
            &mut Vec::new(),
        )
        .expect_err("download failure is fatal");

    assert!(matches!(err, BootstrapError::DownloadFailed { .. }));
    assert!(!host.options.prefix.exists());
    assert!(
        InstallReceipt::read(&host.options.prefix)
            .expect("read succeeds")
            .is_none()
    );
}
