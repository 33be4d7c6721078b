#![cfg_attr(windows, windows_subsystem = "windows")]

//! LinkRouter (v1)
//!
//! Opens links with the program picked by user-defined regex rules.
//!
//! # Architecture Overview
//!
//! ```text
//!     linkrouter "https://music.example/x"
//!         │
//!         ▼
//!     ┌─────────┐    ┌───────────┐    ┌─────────────┐    ┌─────────┐    ┌──────────┐
//!     │ config  │───▶│  routing  │───▶│   routing   │───▶│  guard  │───▶│  launch  │──▶ target
//!     │ loader  │    │  matcher  │    │placeholders │    │ self /  │    │ detached │    program
//!     └─────────┘    └───────────┘    └─────────────┘    │ shell   │    │ process  │
//!                          │ no match / failure          └─────────┘    └──────────┘
//!                          ▼
//!                    fallback browser (same expand → guard → launch path)
//!
//!     Cross-cutting: observability (tracing), shell (notifier, registrar)
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use link_router::config::{
    expand_env, load_config_with_origin, resolve_config_path, validate_config, Config,
};
use link_router::guard::{ExecutableIdentity, SelfIdentityGuard};
use link_router::launch::{CommandLine, DryRunLauncher, Launcher, ProcessLauncher};
use link_router::observability::{init_logging, resolve_log_target, LogTarget};
#[cfg(windows)]
use link_router::shell::{DialogNotifier, RegistryRegistrar};
use link_router::shell::{
    ConsoleNotifier, Notifier, RegFileRegistrar, RegistrationPlan, ShellRegistrar,
};
use link_router::{is_dispatchable_url, Dispatcher};

/// No program could be launched.
const EXIT_DISPATCH_FAILED: u8 = 1;
/// Configuration missing, unreadable or invalid.
const EXIT_CONFIG: u8 = 2;

#[derive(Parser)]
#[command(name = "linkrouter", version)]
#[command(about = "Open links with the program your rules pick", long_about = None)]
struct Cli {
    /// URL to open. Without it the fallback browser is started.
    url: Option<String>,

    /// Config file to use instead of the default location.
    #[arg(short, long, env = "LINKROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Register LinkRouter as a browser for the supported protocols.
    #[arg(long, conflicts_with = "unregister")]
    register: bool,

    /// Remove the registration.
    #[arg(long)]
    unregister: bool,

    /// With --register/--unregister: print a .reg script instead of
    /// editing the registry. Always the case outside Windows.
    #[arg(long)]
    reg_file: bool,

    /// Validate the config and list every problem.
    #[arg(long)]
    check: bool,

    /// Open the config file in the configured editor.
    #[arg(long)]
    edit: bool,

    /// Print the command line instead of launching it.
    #[arg(long)]
    dry_run: bool,

    /// Do not show error messages (they are still logged).
    #[arg(short, long)]
    quiet: bool,

    /// Debug-level logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let reporter = notifier(cli.quiet);
    let notifier = reporter.as_ref();

    let config_path = cli.config.clone().unwrap_or_else(resolve_config_path);
    let (config, origin) = match load_config_with_origin(&config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let _ = init_logging(&LogTarget::Stderr, cli.verbose);
            notifier.report_error(&format!("Failed to load config:\n{e}"));
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let target = resolve_log_target(&config.global.log_path, &exe_dir());
    if let Err(e) = init_logging(&target, cli.verbose) {
        notifier.report_error(&format!("Cannot open log file: {e}"));
    }
    origin.log(&config_path);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        rules = config.rules.len(),
        "linkrouter starting"
    );
    for issue in validate_config(&config) {
        tracing::warn!(%issue, "Configuration issue");
    }

    if cli.check {
        return run_check(&config, &config_path);
    }

    let launcher: Box<dyn Launcher> = if cli.dry_run {
        Box::new(DryRunLauncher::new(io::stdout()))
    } else {
        Box::new(ProcessLauncher::new())
    };

    if cli.edit {
        return run_edit(&config, &config_path, launcher.as_ref(), notifier);
    }

    let identity = match ExecutableIdentity::current() {
        Ok(identity) => identity,
        Err(e) => {
            notifier.report_error(&format!("Cannot locate own executable: {e}"));
            return ExitCode::from(EXIT_DISPATCH_FAILED);
        }
    };

    if cli.register || cli.unregister {
        let plan = RegistrationPlan::new(identity.path(), &config.global.protocols());
        let registrar = shell_registrar(cli.reg_file);
        return run_registration(registrar.as_ref(), &plan, cli.unregister, notifier);
    }

    let guard = SelfIdentityGuard::new(identity);
    let dispatcher = Dispatcher::new(&config, &guard, launcher.as_ref(), notifier);

    let url = cli
        .url
        .as_deref()
        .filter(|url| is_dispatchable_url(url))
        .unwrap_or("");

    match dispatcher.handle(url) {
        Ok(launched) => {
            tracing::info!(candidate = %launched.candidate, "Done");
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::from(EXIT_DISPATCH_FAILED),
    }
}

/// Console output when started from a terminal, message boxes otherwise.
#[cfg(windows)]
fn notifier(quiet: bool) -> Box<dyn Notifier> {
    use windows_sys::Win32::System::Console::{AttachConsole, ATTACH_PARENT_PROCESS};

    if unsafe { AttachConsole(ATTACH_PARENT_PROCESS) } != 0 {
        Box::new(ConsoleNotifier::new(quiet))
    } else {
        Box::new(DialogNotifier::new(quiet))
    }
}

#[cfg(not(windows))]
fn notifier(quiet: bool) -> Box<dyn Notifier> {
    Box::new(ConsoleNotifier::new(quiet))
}

#[cfg(windows)]
fn shell_registrar(reg_file: bool) -> Box<dyn ShellRegistrar> {
    if reg_file {
        Box::new(RegFileRegistrar::new(io::stdout()))
    } else {
        Box::new(RegistryRegistrar)
    }
}

#[cfg(not(windows))]
fn shell_registrar(_reg_file: bool) -> Box<dyn ShellRegistrar> {
    Box::new(RegFileRegistrar::new(io::stdout()))
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn run_check(config: &Config, config_path: &Path) -> ExitCode {
    let issues = validate_config(config);
    if issues.is_empty() {
        println!("{}: OK ({} rules)", config_path.display(), config.rules.len());
        return ExitCode::SUCCESS;
    }
    println!("{}: {} issue(s)", config_path.display(), issues.len());
    for issue in &issues {
        println!("  - {issue}");
    }
    ExitCode::from(EXIT_CONFIG)
}

fn run_edit(
    config: &Config,
    config_path: &Path,
    launcher: &dyn Launcher,
    notifier: &dyn Notifier,
) -> ExitCode {
    let editor = expand_env(config.global.default_config_editor.trim());
    let editor = if editor.is_empty() { "notepad.exe".to_string() } else { editor };
    let command = CommandLine::new(editor, format!("\"{}\"", config_path.display()));

    match launcher.launch(&command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            notifier.report_error(&format!("Cannot open config editor:\n{e}"));
            ExitCode::from(EXIT_DISPATCH_FAILED)
        }
    }
}

fn run_registration(
    registrar: &dyn ShellRegistrar,
    plan: &RegistrationPlan,
    remove: bool,
    notifier: &dyn Notifier,
) -> ExitCode {
    let result = if remove {
        registrar.unregister(plan)
    } else {
        registrar.register(plan)
    };

    match result {
        Ok(()) => {
            tracing::info!(protocols = ?plan.protocols(), remove, "Registration applied");
            ExitCode::SUCCESS
        }
        Err(e) => {
            notifier.report_error(&e.to_string());
            ExitCode::from(EXIT_DISPATCH_FAILED)
        }
    }
}
