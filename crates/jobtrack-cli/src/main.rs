// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use jobtrack_app::{AppCommand, AppState, TabKind};
use jobtrack_store::{Client, Session};
use runtime::{DemoRuntime, RemoteRuntime};
use std::env;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{info, warn};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `jobtrack --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let session_path = config.session_path()?;
    if options.print_session_path {
        println!("{}", session_path.display());
        return Ok(());
    }

    let log_path = logging::init(&config)?;
    info!(
        "starting jobtrack; config {} log {}",
        options.config_path.display(),
        log_path.display()
    );

    let mut state = AppState::default();

    if options.demo {
        let mut runtime = DemoRuntime::new(
            jobtrack_testkit::demo_user(),
            config.sender_profile(),
            OffsetDateTime::now_utc(),
        )?;
        if options.check_only {
            return Ok(());
        }
        state.dispatch(AppCommand::SignedIn(runtime.user().clone()));
        if !config.show_dashboard() {
            state.active_tab = TabKind::Applications;
        }
        return jobtrack_tui::run_app(&mut state, &mut runtime);
    }

    let backend_url = config.backend_url();
    let client = Client::new(&backend_url, &config.anon_key()?, config.backend_timeout()?)
        .with_context(|| {
            format!(
                "invalid [backend] config in {}; fix url/anon_key/timeout values",
                options.config_path.display()
            )
        })?;

    if options.sign_out {
        return sign_out_saved_session(&client, &session_path);
    }

    if options.check_only {
        client
            .health()
            .with_context(|| format!("backend at {backend_url} failed its health check"))?;
        println!("config ok; backend reachable at {backend_url}");
        return Ok(());
    }

    let mut runtime = RemoteRuntime::new(client, session_path, config.sender_profile());
    if let Some(user) = runtime.resume(OffsetDateTime::now_utc())? {
        state.dispatch(AppCommand::SignedIn(user));
    }
    if !config.show_dashboard() {
        state.active_tab = TabKind::Applications;
    }
    jobtrack_tui::run_app(&mut state, &mut runtime)
}

/// Revokes the saved session if the backend answers, and always removes
/// the local file.
fn sign_out_saved_session(client: &Client, session_path: &Path) -> Result<()> {
    match Session::load(session_path)? {
        Some(session) => {
            if let Err(error) = client.sign_out(&session) {
                warn!("server sign-out failed: {error:#}");
                eprintln!("server sign-out failed ({error}); removing local session anyway");
            }
            Session::remove(session_path)?;
            println!("signed out {}", session.user.email);
        }
        None => println!("no saved session at {}", session_path.display()),
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_session_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    sign_out: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_session_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        sign_out: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-session-path" => {
                options.print_session_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--sign-out" => {
                options.sign_out = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    if options.demo && options.sign_out {
        return Err(anyhow::anyhow!(
            "--sign-out has no effect with --demo; drop one of them"
        ));
    }

    Ok(options)
}

fn print_help() {
    println!("jobtrack: track job applications and networking contacts");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-session-path     Print resolved session file path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Launch signed in with seeded in-memory data");
    println!("  --check                  Validate config and backend reachability");
    println!("  --sign-out               Revoke and delete the saved session");
    println!("  --help                   Show this help");
}
