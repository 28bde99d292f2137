//! Create flow tests against a scripted executor.

mod helpers;

use std::sync::Arc;

use camino::Utf8PathBuf;
use chrootctl::bootstrap::Suite;
use chrootctl::cli::CreateArgs;
use chrootctl::run_create;
use helpers::ScriptedExecutor;
use url::Url;

fn create_args(target: Utf8PathBuf, suite: Suite, minbase: bool) -> CreateArgs {
    CreateArgs {
        target_directory: target,
        mirror: Url::parse("http://mirror.example.com/ubuntu").unwrap(),
        suite,
        minbase,
    }
}

#[test]
fn create_bootstraps_then_installs_service_guards() {
    let dir = tempfile::tempdir().unwrap();
    let target = Utf8PathBuf::from_path_buf(dir.path().join("box")).unwrap();

    let executor = Arc::new(ScriptedExecutor::new());
    run_create(&create_args(target.clone(), Suite::Precise, false), executor.clone()).unwrap();

    let calls = executor.calls();
    assert_eq!(calls.len(), 5, "debootstrap + 4 guard commands");

    assert_eq!(
        calls[0].argv,
        [
            "debootstrap",
            "--arch=amd64",
            "--components=main,universe",
            "--include=language-pack-en",
            "precise",
            target.as_str(),
            "http://mirror.example.com/ubuntu",
        ]
    );

    // guard commands all run inside the fresh chroot
    for call in &calls[1..] {
        assert_eq!(call.argv[..2], ["chroot".to_string(), target.to_string()]);
    }
    assert_eq!(calls[1].argv[2..], ["dd", "of=/usr/sbin/policy-rc.d"]);
    let stdin = calls[1].stdin.as_deref().unwrap();
    assert!(std::str::from_utf8(stdin).unwrap().contains("exit 101"));
    assert_eq!(calls[2].argv[2..4], ["chmod", "a+x"]);
    assert_eq!(calls[3].argv[2], "dpkg-divert");
    assert_eq!(calls[4].argv[2..], ["ln", "-s", "/bin/true", "/usr/bin/ischroot"]);
}

#[test]
fn create_minbase_passes_the_variant_flag() {
    let dir = tempfile::tempdir().unwrap();
    let target = Utf8PathBuf::from_path_buf(dir.path().join("box")).unwrap();

    let executor = Arc::new(ScriptedExecutor::new());
    run_create(&create_args(target, Suite::Trusty, true), executor.clone()).unwrap();

    let argv = &executor.argvs()[0];
    assert!(argv.contains(&"--variant=minbase".to_string()));
    assert!(argv.contains(&"trusty".to_string()));
}

#[test]
fn create_refuses_an_existing_target() {
    let dir = tempfile::tempdir().unwrap();
    let target = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

    let executor = Arc::new(ScriptedExecutor::new());
    let err = run_create(&create_args(target, Suite::Precise, false), executor.clone()).unwrap_err();

    assert!(err.to_string().contains("already exists"));
    assert!(executor.argvs().is_empty(), "validation must precede the bootstrap");
}

#[test]
fn failed_bootstrap_skips_guard_installation() {
    let dir = tempfile::tempdir().unwrap();
    let target = Utf8PathBuf::from_path_buf(dir.path().join("box")).unwrap();

    let executor = Arc::new(ScriptedExecutor::failing_matching(vec!["debootstrap"]));
    let err = run_create(&create_args(target.clone(), Suite::Precise, false), executor.clone())
        .unwrap_err();

    assert!(err.to_string().contains("command execution failed"));
    assert_eq!(executor.argvs().len(), 1, "no guard command may run");
    assert!(!target.exists());
}
