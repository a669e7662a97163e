//! Garfield CLI service
//!
//! Entry point for the `garfield-cli-service` command-line tool.

use clap::{ArgAction, Args, Parser, Subcommand};
use garfield_cli::launcher::{Launcher, ProcessEngine};
use garfield_cli::{logging, ConfigFragment, EnvFileStore, ProjectConfig, Resolution, Resolver};
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "garfield-cli-service")]
#[command(about = "Resolve the build configuration and start the dev server", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,

    /// Project root (default: current directory)
    #[arg(long, global = true, default_value = ".")]
    project_root: PathBuf,

    /// Path to project config file (default: <project-root>/garfield.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the configuration and start the dev server
    Serve(ServeArgs),

    /// Print the resolved configuration without launching
    Inspect {
        /// Environment name (development, production)
        environment: Option<String>,

        /// Do not redact secret-like values
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Args, Clone, Default)]
struct ServeArgs {
    /// Environment name (development, production)
    environment: Option<String>,

    /// Environment name, as a flag
    #[arg(
        long = "node-env",
        visible_alias = "NODE_ENV",
        value_name = "ENV",
        conflicts_with = "environment"
    )]
    node_env: Option<String>,

    /// Override the dev-server host
    #[arg(long)]
    host: Option<String>,

    /// Override the dev-server port
    #[arg(long)]
    port: Option<u16>,

    /// Do not open a browser
    #[arg(long)]
    no_open: bool,
}

impl ServeArgs {
    fn environment(&self) -> Option<&str> {
        self.environment.as_deref().or(self.node_env.as_deref())
    }

    /// Command-line overrides as a config layer
    fn overrides(&self) -> ConfigFragment {
        let mut server = serde_json::Map::new();
        if let Some(ref host) = self.host {
            server.insert("host".to_string(), json!(host));
        }
        if let Some(port) = self.port {
            server.insert("port".to_string(), json!(port));
        }
        if self.no_open {
            server.insert("open".to_string(), json!(false));
        }

        if server.is_empty() {
            ConfigFragment::empty()
        } else {
            ConfigFragment::empty().with("devServer", server)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let project = load_project(&cli.project_root, cli.config.clone());

    match cli.command {
        Some(Commands::Serve(args)) => run_serve(project, &args),
        Some(Commands::Inspect { environment, raw }) => {
            run_inspect(project, environment.as_deref(), raw)
        }
        None => run_serve(project, &cli.serve),
    }
}

fn load_project(root: &Path, config_path: Option<PathBuf>) -> ProjectConfig {
    match ProjectConfig::load(root, config_path.as_deref()) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("Error loading project config: {}", e);
            process::exit(1);
        }
    }
}

fn resolve(
    project: ProjectConfig,
    overrides: ConfigFragment,
    environment: Option<&str>,
) -> Resolution {
    let store = EnvFileStore::new(project.environments_dir());
    let resolver = Resolver::new(project, store).with_cli_overrides(overrides);

    match resolver.resolve(environment) {
        Ok(resolution) => resolution,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    }
}

fn run_serve(project: ProjectConfig, args: &ServeArgs) {
    let engine = ProcessEngine::from_project(&project);
    let resolution = resolve(project, args.overrides(), args.environment());

    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!("\nReceived interrupt signal, stopping dev server...");
        handler_stop.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!(error = %e, "failed to install interrupt handler");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut handle = match Launcher::new(engine).launch(resolution.config, &mut out) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error starting dev server: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = handle.on_ready(&mut out) {
        drop(handle);
        eprintln!("Error starting dev server: {}", e);
        process::exit(1);
    }
    drop(out);

    if let Err(e) = handle.run_until_stopped(&stop) {
        drop(handle);
        eprintln!("Dev server stopped: {}", e);
        process::exit(1);
    }
}

fn run_inspect(project: ProjectConfig, environment: Option<&str>, raw: bool) {
    let resolution = resolve(project, ConfigFragment::empty(), environment);

    let report = match resolution.report(raw) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error computing fingerprint: {}", e);
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}
