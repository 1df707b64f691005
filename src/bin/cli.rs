use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use memristor_dynamics::{run, ModelKind, ModelParams, SimulationConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Memristor I-V simulator", long_about = None)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one simulation and write the trace as CSV.
    Run(RunArgs),
    /// Print the default parameters of a model as YAML.
    Params {
        /// Model kind (linear, biolek, joglekar, vteam, mms, yakopcic)
        kind: String,
    },
    /// List the available models.
    Models,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Run configuration (YAML, or JSON by extension). Flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    model: Option<String>,

    /// sine, square, triangle or sawtooth
    #[arg(short, long)]
    waveform: Option<String>,

    /// Drive frequency in Hz
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Drive amplitude in V
    #[arg(short, long)]
    amplitude: Option<f64>,

    /// Simulated time in microseconds
    #[arg(long)]
    duration_us: Option<f64>,

    /// Step size in microseconds
    #[arg(long)]
    dt_us: Option<f64>,

    /// Model parameter override, NAME=VALUE (repeatable)
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, f64)>,

    /// Fail on unknown waveforms and non-finite currents
    #[arg(long)]
    strict: bool,

    /// CSV destination (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for `{name}`: {e}"))?;
    Ok((name.trim().to_string(), value))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // logs go to stderr so CSV on stdout stays clean
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => run_simulation(args),
        Commands::Params { kind } => print_params(&kind),
        Commands::Models => {
            for kind in ModelKind::ALL {
                println!("{kind}");
            }
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_config(args: &RunArgs) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("failed to load run config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(waveform) = &args.waveform {
        config.waveform = waveform.clone();
    }
    if let Some(f) = args.frequency {
        config.frequency = f;
    }
    if let Some(a) = args.amplitude {
        config.amplitude = a;
    }
    if let Some(us) = args.duration_us {
        config.duration = us * 1e-6;
    }
    if let Some(us) = args.dt_us {
        config.dt = us * 1e-6;
    }
    for (name, value) in &args.params {
        config.params.insert(name.clone(), *value);
    }
    config.strict |= args.strict;
    Ok(config)
}

fn run_simulation(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    if config.dt <= 0.0 {
        return Err(anyhow!("step size must be positive, got {} s", config.dt));
    }
    let trace = run(&config).context("simulation failed")?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            trace.write_csv(BufWriter::new(file))?;
            info!(samples = trace.len(), path = %path.display(), "wrote trace");
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            trace.write_csv(&mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn print_params(kind: &str) -> Result<()> {
    let kind: ModelKind = kind.parse()?;
    let yaml = serde_yaml::to_string(&ModelParams::defaults(kind))?;
    print!("{yaml}");
    Ok(())
}
