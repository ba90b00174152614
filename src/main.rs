//! Slipway CLI - versioned release deployer
//!
//! Usage: slipway <COMMAND>
//!
//! Commands:
//!   list      List revisions on the host
//!   deploy    Upload the artifact directory as a new release
//!   activate  Point `current` at an uploaded revision

use std::path::Path;
use std::process::{Command, ExitCode};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;

use slipway::application::DeployOptions;
use slipway::config::{Config, ConfigWarning, DeploySettings, Transport};
use slipway::domain::ports::{DeployEventSink, RemoteConnector};
use slipway::domain::value_objects::{CancellationToken, IgnorePatterns};
use slipway::infrastructure::{artifacts, ConsoleEventSink, JsonEventSink};
use slipway::presentation::{factory, output, Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "event": "error", "message": format!("{err:#}") })
                );
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr. `SLIPWAY_LOG` takes precedence over `RUST_LOG`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env("SLIPWAY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::from_default_env())
        .add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let (config, warnings) = Config::discover(cli.config.as_deref())?;
    if !cli.json {
        print_config_warnings(&warnings);
    }

    let config = cli.apply_overrides(config.with_env_overrides());
    let settings = config.resolve()?;
    tracing::debug!(root = settings.layout.root(), transport = ?settings.transport, "resolved settings");

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
            tracing::warn!("could not install Ctrl-C handler: {e}");
        }
    }

    let json_sink = cli.json.then(|| Arc::new(JsonEventSink::stdout()));
    let events: Arc<dyn DeployEventSink> = match &json_sink {
        Some(sink) => sink.clone() as Arc<dyn DeployEventSink>,
        None => Arc::new(ConsoleEventSink::stderr(cli.verbose > 0)),
    };
    let ui = Ui { json: json_sink };

    let limits = factory::run_limits(&settings, &cancel);
    match settings.transport {
        Transport::Ssh => {
            let connector = factory::create_ssh_connector(&settings, limits)?;
            dispatch(connector, cli.command, &settings, events, &cancel, &ui)
        }
        Transport::Local => {
            let connector = factory::create_local_connector(limits);
            dispatch(connector, cli.command, &settings, events, &cancel, &ui)
        }
    }
}

/// Where final command output goes
struct Ui {
    /// Shared with the event stream so lines never interleave
    json: Option<Arc<JsonEventSink>>,
}

fn dispatch<C: RemoteConnector>(
    connector: C,
    command: Commands,
    settings: &DeploySettings,
    events: Arc<dyn DeployEventSink>,
    cancel: &CancellationToken,
    ui: &Ui,
) -> Result<()> {
    let orchestrator = factory::create_orchestrator(connector, settings, events, cancel);

    match command {
        Commands::List => {
            let ledger = orchestrator.list()?;
            match &ui.json {
                Some(sink) => sink.write_value(output::revisions_json(&ledger)),
                None => print!(
                    "{}",
                    output::render_revisions(&ledger, std::io::stdout().is_terminal())
                ),
            }
        }
        Commands::Deploy {
            revision,
            git_revision,
            activate,
            ..
        } => {
            let revision = match (revision, git_revision) {
                (Some(id), _) => Some(id),
                (None, true) => Some(git_short_head(Path::new("."))?),
                (None, false) => None,
            };

            let patterns = IgnorePatterns::load(&settings.dist_dir, &settings.ignore)?;
            let files = artifacts::collect(&settings.dist_dir, &patterns)?;
            tracing::info!(
                count = files.len(),
                dist = %settings.dist_dir.display(),
                "collected artifacts"
            );

            let mut options = DeployOptions::new(files)
                .with_keep(settings.keep)
                .with_activate(activate);
            if let Some(id) = revision {
                options = options.with_revision(id);
            }

            let report = orchestrator.deploy(&options)?;
            match &ui.json {
                Some(sink) => sink.write_value(output::report_json(&report)),
                None => print!("{}", output::render_report(&report)),
            }
        }
        Commands::Activate { revision } => {
            let ledger = orchestrator.activate(&revision)?;
            match &ui.json {
                Some(sink) => sink.write_value(output::revisions_json(&ledger)),
                None => println!("Active revision: {revision}"),
            }
        }
    }

    Ok(())
}

/// `git rev-parse --short HEAD` in `dir`
fn git_short_head(dir: &Path) -> Result<String> {
    let out = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(dir)
        .output()
        .context("failed to run git")?;

    if !out.status.success() {
        bail!(
            "git rev-parse failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        );
    }

    let id = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if id.is_empty() {
        bail!("git rev-parse returned an empty revision");
    }
    Ok(id)
}

fn print_config_warnings(warnings: &[ConfigWarning]) {
    for w in warnings {
        let location = match w.line {
            Some(line) => format!("{}:{}", w.file.display(), line),
            None => w.file.display().to_string(),
        };
        match &w.suggestion {
            Some(s) => eprintln!(
                "Warning: unknown config key '{}' in {} (did you mean '{}'?)",
                w.key, location, s
            ),
            None => eprintln!("Warning: unknown config key '{}' in {}", w.key, location),
        }
    }
}
