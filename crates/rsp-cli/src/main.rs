//! rspgain - inspect RSP gain tables and drive gain modes on a simulated device

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rsp_gain::{
    step_table, AntennaPort, GainModeKind, GainReductionTable, HardwareModel, RowSelector,
    StepBand, GAIN_STEPS,
};
use rsp_device::{DeviceConfig, HardwarePort, RspDevice, SimulatedPort};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "rspgain")]
#[command(about = "Inspect SDRplay RSP gain tables and gain modes")]
struct Cli {
    /// JSON device configuration; flags override its fields
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hardware model (RSP1, RSP1A, RSP2, RSPduo, RSPdx) or API id
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Gain mode (legacy, db, rfatt, steps, ifgr, normalized, offsetdb)
    #[arg(long, global = true)]
    mode: Option<GainModeKind>,

    /// Tuned frequency in MHz
    #[arg(short, long, global = true)]
    freq: Option<f64>,

    /// Use the Hi-Z antenna port
    #[arg(long, global = true)]
    hi_z: bool,

    /// Enable HDR mode (RSPdx)
    #[arg(long, global = true)]
    hdr: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the gain reduction row and step table for the tuner state
    Table,

    /// List the gain modes
    Modes,

    /// Apply gain operations to a simulated device and print the result
    Gain {
        /// Start streaming first, so changes are pushed to the hardware
        #[arg(long)]
        stream: bool,

        /// Enable or disable AGC
        #[arg(long)]
        agc: Option<bool>,

        /// Combined gain
        #[arg(short, long, allow_negative_numbers = true)]
        gain: Option<f64>,

        /// Named gain as NAME=VALUE (repeatable)
        #[arg(short, long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Setting as KEY=VALUE (repeatable)
        #[arg(long = "setting", value_name = "KEY=VALUE")]
        settings: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "rspgain=info,rsp_gain=info,rsp_device=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = device_config(&cli)?;
    debug!("Configuration: {:?}", config);

    match &cli.command {
        Command::Table => print_tables(&config),
        Command::Modes => {
            for kind in GainModeKind::all() {
                println!("{:<12} {}", kind.name(), kind.description());
            }
            Ok(())
        }
        Command::Gain {
            stream,
            agc,
            gain,
            set,
            settings,
        } => {
            let ops = GainOps {
                stream: *stream,
                agc: *agc,
                gain: *gain,
                named: set.iter().map(|s| split_assignment(s)).collect::<Result<_>>()?,
                settings: settings
                    .iter()
                    .map(|s| split_assignment(s))
                    .collect::<Result<_>>()?,
            };
            run_gain(&config, ops)
        }
    }
}

/// Load the configuration file, if any, and apply command line overrides
fn device_config(cli: &Cli) -> Result<DeviceConfig> {
    let mut config = match &cli.config {
        Some(path) => DeviceConfig::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => DeviceConfig::default(),
    };

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(mode) = cli.mode {
        config.gain_mode = mode;
    }
    if let Some(freq_mhz) = cli.freq {
        config.rf_hz = freq_mhz * 1_000_000.0;
    }
    if cli.hi_z {
        config.antenna_port = AntennaPort::HighZ;
    }
    if cli.hdr {
        config.hdr_enabled = true;
    }
    Ok(config)
}

fn split_assignment(arg: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("Expected NAME=VALUE, got {:?}", arg),
    }
}

fn print_tables(config: &DeviceConfig) -> Result<()> {
    let model = config.resolve_model()?;
    let sel = RowSelector {
        rf_hz: config.rf_hz,
        antenna_port: config.antenna_port,
        hdr_enabled: config.hdr_enabled && model == HardwareModel::RspDx,
    };

    let row = GainReductionTable::new(model).row_for(sel)?;
    println!(
        "{} at {:.3} MHz ({} port{})",
        model,
        sel.rf_hz / 1_000_000.0,
        match sel.antenna_port {
            AntennaPort::Standard => "standard",
            AntennaPort::HighZ => "Hi-Z",
        },
        if sel.hdr_enabled { ", HDR" } else { "" }
    );
    println!();
    println!("LNA state  RF gain reduction (dB)");
    for (state, gr) in row.values().iter().enumerate() {
        println!("{:>9}  {:>3}", state, gr);
    }
    if !row.is_monotonic() {
        println!("(row is not monotonic)");
    }

    let steps = step_table(model, config.rf_hz, config.antenna_port)?;
    let band = StepBand::from_hz(config.rf_hz).map_or("?", |b| b.name());
    println!();
    println!("Gain steps ({} band)", band);
    println!("Step  LNA state  IF gain reduction (dB)");
    for step in 1..=GAIN_STEPS {
        if let Some(values) = steps.lookup(step) {
            println!(
                "{:>4}  {:>9}  {:>3}",
                step, values.lna_state, values.if_gain_reduction_db
            );
        }
    }
    Ok(())
}

struct GainOps {
    stream: bool,
    agc: Option<bool>,
    gain: Option<f64>,
    named: Vec<(String, String)>,
    settings: Vec<(String, String)>,
}

fn run_gain(config: &DeviceConfig, ops: GainOps) -> Result<()> {
    let port = SimulatedPort::new();
    let device = RspDevice::new(config, port.clone())?;

    if ops.stream {
        device.activate_stream()?;
    }

    if let Some(automatic) = ops.agc {
        if !device.has_gain_mode() {
            info!("{} gain mode has a fixed AGC policy", device.gain_mode_kind());
        }
        report("AGC", device.set_gain_mode(automatic));
    }
    if let Some(value) = ops.gain {
        report("gain", device.set_gain(value));
    }
    for (name, value) in &ops.named {
        let value: f64 = value
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", name, value))?;
        report(name, device.set_named_gain(name, value));
    }
    for (key, value) in &ops.settings {
        report(key, device.write_setting(key, value)?);
    }

    print_device(&device);

    if ops.stream {
        device.deactivate_stream()?;
        let updates = port.updates();
        println!();
        println!("Hardware updates: {}", updates.len());
        for update in updates {
            println!("  {:<15} {}", update.reason.name(), update.regs.gain_summary());
        }
    }
    Ok(())
}

fn report(what: &str, changed: bool) {
    if changed {
        info!("{} changed", what);
    } else {
        info!("{} unchanged", what);
    }
}

fn print_device<P: HardwarePort>(device: &RspDevice<P>) {
    let regs = device.registers();
    println!("{} / {} gain mode", device.model(), device.gain_mode_kind());
    println!("Registers: {}", regs.gain_summary());
    println!("AGC set point: {} dBFS", regs.agc_set_point_dbfs);
    println!();

    if device.has_gain_mode() {
        println!("AGC: {}", if device.gain_mode() { "on" } else { "off" });
    }
    for name in device.list_gains() {
        let range = device.named_gain_range(name);
        println!(
            "{:<6} {:>8.2}   [{}, {}]",
            name,
            device.named_gain(name),
            range.min,
            range.max
        );
    }
    if device.has_generic_gain() {
        let range = device.gain_range();
        println!(
            "{:<6} {:>8.2}   [{}, {}]",
            "gain",
            device.gain(),
            range.min,
            range.max
        );
    }

    let options = device.rf_gain_setting_options();
    println!();
    println!(
        "{}: {} (options {:?}, default {})",
        device.rf_gain_setting_name(),
        device.read_rf_gain_setting(),
        options.values,
        options.default
    );
}
