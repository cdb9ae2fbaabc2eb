//! powerswitch entry point: logging, config, relay lines and the control server.

use std::process;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use powerswitch::api::{self, AppState};
use powerswitch::cli;
use powerswitch::config::ServerConfig;
use powerswitch::controller::PowerController;
use powerswitch::line::{Line, MemoryLine};

type LinePair = (Box<dyn Line>, Box<dyn Line>);

fn memory_lines() -> LinePair {
    (
        Box::new(MemoryLine::new("grid")),
        Box::new(MemoryLine::new("inverter")),
    )
}

#[cfg(feature = "rpi")]
fn open_lines(config: &ServerConfig) -> anyhow::Result<LinePair> {
    use powerswitch::line::GpioLine;
    use rppal::gpio::Gpio;

    if config.dry_run {
        info!("dry run: relays are simulated in memory");
        return Ok(memory_lines());
    }
    let gpio = Gpio::new().context("failed to open the GPIO controller")?;
    let grid = GpioLine::open(&gpio, config.grid_pin)
        .with_context(|| format!("failed to claim grid relay pin {}", config.grid_pin))?;
    let inverter = GpioLine::open(&gpio, config.inverter_pin).with_context(|| {
        format!(
            "failed to claim inverter relay pin {}",
            config.inverter_pin
        )
    })?;
    Ok((Box::new(grid), Box::new(inverter)))
}

#[cfg(not(feature = "rpi"))]
fn open_lines(config: &ServerConfig) -> anyhow::Result<LinePair> {
    if !config.dry_run {
        tracing::warn!("built without the `rpi` feature: relays are simulated in memory");
    }
    Ok(memory_lines())
}

fn load_config(cli: &cli::CliOptions) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => ServerConfig::default(),
    };
    cli.apply(&mut config);
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("powerswitch=info")),
        )
        .init();

    let cli = match cli::parse_args() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };

    let config = load_config(&cli)?;
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let (grid, inverter) = open_lines(&config)?;
    let controller = Arc::new(PowerController::new(
        grid,
        inverter,
        config.settle_delay(),
    ));
    controller.set_mode(config.startup_mode);
    info!(
        mode = %controller.current_mode(),
        grid_pin = config.grid_pin,
        inverter_pin = config.inverter_pin,
        settle_delay_ms = config.settle_delay_ms,
        "relays initialised"
    );

    let addr = config.socket_addr();
    let state = Arc::new(AppState::new(controller, config.strict_status_codes));
    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    rt.block_on(api::serve(state, addr))
        .with_context(|| format!("control server on {addr} failed"))
}
