//! End-to-end dispatch tests: JSON config in, recorded command lines out.

mod common;

use std::fs;
use std::path::Path;

use common::{config_from_json, guard_for, RecordingLauncher, RecordingNotifier};
use link_router::config::{load_config, validate_config, ValidationIssue};
use link_router::guard::RecursionKind;
use link_router::routing::{CandidateError, CandidateKind};
use link_router::{is_dispatchable_url, Dispatcher};

const OWN_EXE: &str = r"C:\Tools\LinkRouter\linkrouter.exe";

#[test]
fn test_music_and_other_links() {
    let config = config_from_json(
        r#"{
            "global": {
                "fallbackBrowserPath": "C:\\Browser\\b.exe",
                "fallbackBrowserArgs": "{URL}"
            },
            "rules": [
                { "regex": "^https://music\\..*", "program": "C:\\MusicApp\\app.exe", "arguments": "play $0" }
            ]
        }"#,
    );
    let guard = guard_for(OWN_EXE);
    let launcher = RecordingLauncher::default();
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    dispatcher.handle("https://music.example/x").unwrap();
    dispatcher.handle("https://other.example").unwrap();

    assert_eq!(
        launcher.commands(),
        vec![
            r#""C:\MusicApp\app.exe" play https://music.example/x"#,
            r#""C:\Browser\b.exe" https://other.example"#,
        ]
    );
    assert_eq!(notifier.events.lock().unwrap().len(), 2);
    assert!(notifier.errors.lock().unwrap().is_empty());
}

#[test]
fn test_first_matching_rule_wins() {
    let config = config_from_json(
        r#"{
            "global": { "fallbackBrowserPath": "C:\\Browser\\b.exe" },
            "rules": [
                { "regex": "example\\.com/docs", "program": "C:\\Docs\\viewer.exe", "arguments": "{URL}" },
                { "regex": "example\\.com", "program": "C:\\Generic\\g.exe", "arguments": "{URL}" }
            ]
        }"#,
    );
    let guard = guard_for(OWN_EXE);
    let launcher = RecordingLauncher::default();
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    let docs = dispatcher.handle("https://example.com/docs/intro").unwrap();
    let home = dispatcher.handle("https://example.com/").unwrap();

    assert_eq!(docs.candidate, CandidateKind::Rule { index: 0 });
    assert_eq!(home.candidate, CandidateKind::Rule { index: 1 });
}

#[test]
fn test_invalid_regex_rule_is_skipped() {
    let config = config_from_json(
        r#"{
            "global": { "fallbackBrowserPath": "C:\\Browser\\b.exe" },
            "rules": [
                { "regex": "([unclosed", "program": "C:\\Broken\\x.exe", "arguments": "{URL}" },
                { "regex": "teams\\.microsoft\\.com/(l/meetup-join/.+)", "program": "C:\\Teams\\ms-teams.exe", "arguments": "msteams:/$1" }
            ]
        }"#,
    );
    assert_eq!(
        validate_config(&config)
            .iter()
            .filter(|i| matches!(i, ValidationIssue::InvalidRegex { index: 0, .. }))
            .count(),
        1
    );

    let guard = guard_for(OWN_EXE);
    let launcher = RecordingLauncher::default();
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    let launched = dispatcher
        .handle("https://teams.microsoft.com/l/meetup-join/abc")
        .unwrap();

    assert_eq!(launched.candidate, CandidateKind::Rule { index: 1 });
    assert_eq!(launched.command.arguments(), "msteams:/l/meetup-join/abc");
}

#[test]
fn test_missing_program_falls_back_and_failure_is_reported_once() {
    let config = config_from_json(
        r#"{
            "global": { "fallbackBrowserPath": "C:\\Browser\\b.exe", "fallbackBrowserArgs": "--new-window" },
            "rules": [
                { "regex": ".", "program": "C:\\Gone\\app.exe", "arguments": "{URL}" }
            ]
        }"#,
    );
    let guard = guard_for(OWN_EXE);
    let launcher = RecordingLauncher::with_missing(&[r"C:\Gone\app.exe", r"C:\Browser\b.exe"]);
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    let failure = dispatcher.handle("https://example.com").unwrap_err();

    assert_eq!(
        launcher.commands(),
        vec![
            r#""C:\Gone\app.exe" https://example.com"#,
            r#""C:\Browser\b.exe" --new-window https://example.com"#,
        ]
    );
    assert_eq!(failure.attempts.len(), 2);
    assert!(matches!(failure.attempts[1].error, CandidateError::Launch(_)));

    let errors = notifier.errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("No program could be launched for https://example.com"));
}

#[test]
fn test_byte_identical_copy_is_never_launched() {
    let dir = tempfile::tempdir().unwrap();
    let own = dir.path().join("linkrouter.exe");
    let copy = dir.path().join("renamed-router.exe");
    fs::write(&own, b"MZ\x90\x00 router image").unwrap();
    fs::copy(&own, &copy).unwrap();

    let mut config =
        config_from_json(r#"{ "global": { "fallbackBrowserPath": "C:\\Browser\\b.exe" } }"#);
    config.rules.push(link_router::config::Rule::new(
        ".",
        copy.to_string_lossy(),
        "{URL}",
    ));

    let guard = guard_for(&own);
    let launcher = RecordingLauncher::default();
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    let launched = dispatcher.handle("https://example.com").unwrap();

    assert_eq!(launched.candidate, CandidateKind::Fallback);
    assert!(launcher
        .commands()
        .iter()
        .all(|c| !c.contains("renamed-router.exe")));
}

#[test]
fn test_shell_loop_on_registered_scheme_is_refused() {
    let config = config_from_json(
        r#"{
            "global": {
                "fallbackBrowserPath": "C:\\Windows\\explorer.exe",
                "supportedProtocols": ["https://", "mailto"]
            }
        }"#,
    );
    let guard = guard_for(OWN_EXE);
    let launcher = RecordingLauncher::default();
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    let failure = dispatcher.handle("mailto:someone@example.com").unwrap_err();

    match &failure.attempts[0].error {
        CandidateError::Recursion(RecursionKind::ShellLoop { scheme }) => {
            assert_eq!(scheme, "mailto")
        }
        other => panic!("unexpected rejection: {other}"),
    }
    assert!(launcher.commands().is_empty());
}

#[test]
fn test_quoted_url_through_explorer_is_refused() {
    let config = config_from_json(
        r#"{
            "global": { "fallbackBrowserPath": "C:\\Browser\\b.exe" },
            "rules": [
                { "regex": ".", "program": "C:\\Windows\\explorer.exe", "arguments": "\"{URL}\"" }
            ]
        }"#,
    );
    let guard = guard_for(OWN_EXE);
    let launcher = RecordingLauncher::default();
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    let launched = dispatcher.handle("https://example.com").unwrap();

    assert_eq!(launched.candidate, CandidateKind::Fallback);
    assert_eq!(
        launcher.commands(),
        vec![r#""C:\Browser\b.exe" https://example.com"#]
    );
}

#[test]
fn test_env_placeholders_in_program_paths() {
    std::env::set_var("LR_TEST_APPS_DIR", r"C:\Apps");
    std::env::set_var("LR_TEST_BROWSER_DIR", r"C:\Browsers");
    let config = config_from_json(
        r#"{
            "global": { "fallbackBrowserPath": "${LR_TEST_BROWSER_DIR}\\b.exe" },
            "rules": [
                { "regex": "docs\\.", "program": "%LR_TEST_APPS_DIR%\\viewer.exe", "arguments": "{URL}" }
            ]
        }"#,
    );
    let guard = guard_for(OWN_EXE);
    let launcher = RecordingLauncher::default();
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    dispatcher.handle("https://docs.example").unwrap();
    dispatcher.handle("https://other.example").unwrap();

    assert_eq!(
        launcher.commands(),
        vec![
            r#""C:\Apps\viewer.exe" https://docs.example"#,
            r#""C:\Browsers\b.exe" https://other.example"#,
        ]
    );
}

#[test]
fn test_env_expanded_copy_of_router_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let own = dir.path().join("linkrouter.exe");
    fs::write(&own, b"MZ\x90\x00 router image").unwrap();
    fs::copy(&own, dir.path().join("alias.exe")).unwrap();
    std::env::set_var("LR_TEST_ALIAS_DIR", dir.path());

    let config = config_from_json(
        r#"{
            "global": { "fallbackBrowserPath": "C:\\Browser\\b.exe" },
            "rules": [ { "regex": ".", "program": "%LR_TEST_ALIAS_DIR%/alias.exe", "arguments": "{URL}" } ]
        }"#,
    );
    let guard = guard_for(&own);
    let launcher = RecordingLauncher::default();
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    let launched = dispatcher.handle("https://example.com").unwrap();

    assert_eq!(launched.candidate, CandidateKind::Fallback);
    assert_eq!(
        launcher.commands(),
        vec![r#""C:\Browser\b.exe" https://example.com"#]
    );
}

#[test]
fn test_env_expanded_fallback_copy_of_router_fails() {
    let dir = tempfile::tempdir().unwrap();
    let own = dir.path().join("linkrouter.exe");
    fs::write(&own, b"MZ\x90\x00 router image").unwrap();
    fs::copy(&own, dir.path().join("browser.exe")).unwrap();
    std::env::set_var("LR_TEST_FALLBACK_DIR", dir.path());

    let config = config_from_json(
        r#"{ "global": { "fallbackBrowserPath": "${LR_TEST_FALLBACK_DIR}/browser.exe" } }"#,
    );
    let guard = guard_for(&own);
    let launcher = RecordingLauncher::default();
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    let failure = dispatcher.handle("https://example.com").unwrap_err();

    assert!(matches!(
        failure.attempts[0].error,
        CandidateError::Recursion(RecursionKind::SelfTarget)
    ));
    assert!(launcher.commands().is_empty());
}

#[test]
fn test_bare_invocation_opens_fallback_without_arguments() {
    let config = config_from_json(
        r#"{
            "global": { "fallbackBrowserPath": "C:\\Browser\\b.exe", "fallbackBrowserArgs": "{URL}" },
            "rules": [ { "regex": ".*", "program": "C:\\CatchAll\\c.exe", "arguments": "{URL}" } ]
        }"#,
    );
    let guard = guard_for(OWN_EXE);
    let launcher = RecordingLauncher::default();
    let notifier = RecordingNotifier::default();
    let dispatcher = Dispatcher::new(&config, &guard, &launcher, &notifier);

    let arg = "x";
    let url = if is_dispatchable_url(arg) { arg } else { "" };
    dispatcher.handle(url).unwrap();

    assert_eq!(launcher.commands(), vec![r#""C:\Browser\b.exe""#]);
}

#[test]
fn test_missing_config_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("LinkRouter").join("linkrouter.json");

    let config = load_config(&path).unwrap();

    assert!(Path::new(&path).is_file());
    assert!(config.rules.is_empty());
    assert_eq!(config.global.fallback_browser_args, "{URL}");
    assert_eq!(load_config(&path).unwrap(), config);
}
