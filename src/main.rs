//! Scorpia: closed-loop predictive kernel: frame simulator and HTTP gateway

use anyhow::Context;
use clap::{Parser, Subcommand};
use scorpia_core::{BindMode, GatewayConfig, Kernel, KernelConfig, RawSignal, Trace};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scorpia", about = "Closed-loop predictive kernel: simulator and gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the kernel over HTTP
    Serve {
        #[arg(short, long, default_value = "18800")]
        port: u16,
        #[arg(short, long, default_value = "loopback")]
        bind: String,
        /// Kernel config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Feed a fixed signal through the kernel for a number of frames
    Simulate {
        #[arg(short, long, default_value_t = 5)]
        frames: usize,
        /// Comma-separated channel values: auditory,visual,proprioceptive,social
        #[arg(
            short,
            long,
            value_delimiter = ',',
            allow_negative_numbers = true,
            default_value = "0.9,0.5,0.2,0.95"
        )]
        signal: Vec<f64>,
        /// Kernel config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,
        /// Write the error history and rewiring frames as JSON
        #[arg(short, long)]
        trace: Option<PathBuf>,
    },
    /// Print the default kernel config as TOML
    DumpConfig,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            port,
            bind,
            config,
            seed,
        }) => {
            init_tracing();
            let bind_mode = match bind.as_str() {
                "lan" | "0.0.0.0" => BindMode::Lan,
                _ => BindMode::Loopback,
            };
            let kernel = Kernel::from_config(load_config(config, seed))?;
            scorpia_gateway::start_gateway(
                GatewayConfig {
                    port,
                    bind: bind_mode,
                },
                kernel,
            )
            .await?;
        }

        Some(Commands::Simulate {
            frames,
            signal,
            config,
            seed,
            trace,
        }) => {
            init_tracing();
            simulate(frames, &signal, load_config(config, seed), trace)?;
        }

        Some(Commands::DumpConfig) => {
            println!("{}", KernelConfig::default().to_toml());
        }

        Some(Commands::Version) => {
            println!("scorpia v{}", env!("CARGO_PKG_VERSION"));
        }

        // No subcommand = the reference stress scenario
        None => {
            init_tracing();
            simulate(5, &[0.9, 0.5, 0.2, 0.95], KernelConfig::default(), None)?;
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "scorpia=info,scorpia_core=info,scorpia_gateway=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(path: Option<PathBuf>, seed: Option<u64>) -> KernelConfig {
    let mut config = path
        .map(|p| KernelConfig::load(&p))
        .unwrap_or_default();
    if seed.is_some() {
        config.seed = seed;
    }
    config
}

fn simulate(
    frames: usize,
    values: &[f64],
    config: KernelConfig,
    trace_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let signal = RawSignal::from_slice(values)?;
    let mut trace = Trace::new(config.homeostatic_threshold);
    let mut kernel = Kernel::from_config(config)?;

    for _ in 0..frames {
        tracing::info!("--- FRAME {} ---", kernel.frames());
        let report = kernel.process_frame(&signal)?;
        trace.record(&report);
    }

    let status = kernel.status();
    println!("frames:            {}", status.frames);
    println!("error metric:      {:.2}%", status.current_error_metric);
    println!("plasticity active: {}", status.plasticity_active);
    println!("rewiring frames:   {:?}", trace.rewiring_frames);
    if let Some(mean) = trace.mean_error_metric() {
        println!("mean error metric: {:.2}%", mean);
    }

    if let Some(path) = trace_path {
        trace
            .write_json(&path)
            .with_context(|| format!("writing trace to {}", path.display()))?;
        println!("trace written to {}", path.display());
    }
    Ok(())
}
