//! otelop CLI - render and inspect the Kubernetes objects of OpenTelemetry collectors

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod error;
mod exit_codes;

use commands::render::{Component, RenderOptions};

#[derive(Parser)]
#[command(name = "otelop")]
#[command(version)]
#[command(about = "Render and inspect the Kubernetes objects of OpenTelemetry collectors", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the objects of an OpenTelemetryCollector as YAML
    Render {
        /// OpenTelemetryCollector manifest
        instance: PathBuf,

        /// Operator configuration file (default: ~/.config/otelop/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Assume the Prometheus operator CRDs are installed
        #[arg(long)]
        prometheus_operator: bool,

        /// Assume the cluster serves OpenShift routes
        #[arg(long)]
        openshift_routes: bool,

        /// Objects to render
        #[arg(long, value_enum, default_value_t = Component::All)]
        component: Component,

        /// Output a JSON array instead of a YAML stream
        #[arg(long)]
        json: bool,
    },

    /// Detect optional APIs served by the current cluster
    Detect {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Wait until a HorizontalPodAutoscaler reports metrics
    WaitHpa {
        /// Autoscaler name
        #[arg(long)]
        hpa: String,

        /// How long to wait (e.g. 30s, 5m)
        #[arg(long, default_value = "5m", value_parser = humantime::parse_duration)]
        timeout: Duration,

        /// Namespace of the autoscaler
        #[arg(short, long, env = "NAMESPACE")]
        namespace: String,
    },
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Commands::Render {
            instance,
            config,
            prometheus_operator,
            openshift_routes,
            component,
            json,
        } => commands::render::run(
            &instance,
            &RenderOptions {
                config: config.as_deref(),
                prometheus_operator,
                openshift_routes,
                component,
                json,
            },
        ),

        Commands::Detect { json } => commands::detect::run(json).await,

        Commands::WaitHpa {
            hpa,
            timeout,
            namespace,
        } => commands::wait_hpa::run(&hpa, &namespace, timeout).await,
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
    Ok(())
}
