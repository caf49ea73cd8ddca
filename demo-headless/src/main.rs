use clap::Parser;
use hot_bath_core::{
    Fahrenheit, FrameObserver, Grid, HotBath, KgPerCubicMeter, ParameterChannel, TubConfig,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Shading ramp from coldest to hottest
const RAMP: &[u8] = b" .:-=+*#%@";

/// Widest heat map printed, in characters
const MAX_MAP_WIDTH: usize = 80;

/// Hot bath simulation demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "hot-bath-headless")]
#[command(about = "Headless hot-bath heat and flow simulation", long_about = None)]
struct Args {
    /// Number of ticks to run
    #[arg(short, long, default_value_t = 200)]
    ticks: u64,

    /// Tub rows
    #[arg(long, default_value_t = 40)]
    rows: usize,

    /// Tub columns
    #[arg(long, default_value_t = 100)]
    cols: usize,

    /// Number of top-row cells, centered, switched to faucets
    #[arg(short, long, default_value_t = 6)]
    faucets: usize,

    /// Faucet water temperature in °F
    #[arg(long, default_value_t = 100.0)]
    source_temp: f32,

    /// Faucet flow speed in cells per tick
    #[arg(long, default_value_t = 1.0)]
    source_flow_speed: f32,

    /// Starting bath temperature in °F
    #[arg(long, default_value_t = 80.0)]
    tub_temp: f32,

    /// Body temperature in °F
    #[arg(long, default_value_t = 98.6)]
    body_temp: f32,

    /// Water density in kg/m³
    #[arg(long, default_value_t = 997.0)]
    water_density: f32,

    /// Drop a body into the bath at this row (needs --body-col)
    #[arg(long, requires = "body_col")]
    body_row: Option<usize>,

    /// Drop a body into the bath at this column (needs --body-row)
    #[arg(long, requires = "body_row")]
    body_col: Option<usize>,

    /// Tick at which the faucets are shut off
    #[arg(long)]
    shut_off_at: Option<u64>,

    /// Report interval in ticks
    #[arg(short, long, default_value_t = 20)]
    report_interval: u64,

    /// Print an ASCII heat map with every report
    #[arg(short, long)]
    map: bool,
}

/// Keeps the most recent frame as ASCII art
struct HeatMapObserver {
    cold: f32,
    hot: f32,
    frame: String,
}

impl HeatMapObserver {
    fn new(cold: f32, hot: f32) -> Self {
        Self {
            cold,
            hot: hot.max(cold + f32::EPSILON),
            frame: String::new(),
        }
    }

    fn shade(&self, temperature: f32) -> char {
        let t = ((temperature - self.cold) / (self.hot - self.cold)).clamp(0.0, 1.0);
        let index = (t * (RAMP.len() - 1) as f32).round() as usize;
        char::from(RAMP[index])
    }
}

impl FrameObserver for HeatMapObserver {
    fn clear(&mut self, _grid: &Grid) {
        self.frame.clear();
    }

    fn render(&mut self, grid: &Grid) {
        let step = grid.cols().div_ceil(MAX_MAP_WIDTH).max(1);
        for row in (0..grid.rows()).step_by(step) {
            for col in (0..grid.cols()).step_by(step) {
                let shade = grid
                    .get_cell(row, col)
                    .map_or('?', |cell| self.shade(cell.temperature()));
                self.frame.push(shade);
            }
            self.frame.push('\n');
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    println!("=== Hot Bath Simulation Demo ===\n");

    let config = TubConfig {
        rows: args.rows,
        cols: args.cols,
        source_flow_speed: args.source_flow_speed,
        source_temp: Fahrenheit::new(args.source_temp),
        tub_temp: Fahrenheit::new(args.tub_temp),
        body_temp: Fahrenheit::new(args.body_temp),
        water_density: KgPerCubicMeter::new(args.water_density),
        ..TubConfig::default()
    };

    let mut bath = match HotBath::from_config(config) {
        Ok(bath) => bath,
        Err(err) => {
            error!("Failed to build tub: {err}");
            std::process::exit(1);
        }
    };
    println!(
        "Created {}x{} tub at {}, faucets at {}, body at {}",
        args.rows, args.cols, config.tub_temp, config.source_temp, config.body_temp
    );

    // Faucets sit on the top wall, away from the corners
    let faucets = args.faucets.min(args.cols.saturating_sub(2));
    let first = (args.cols - faucets) / 2;
    let faucet_cols: Vec<usize> = (first..first + faucets).collect();
    for &col in &faucet_cols {
        if let Err(err) = bath.toggle(0, col) {
            error!("Failed to open faucet at column {col}: {err}");
            std::process::exit(1);
        }
    }
    println!("Opened {} faucet(s) at columns {:?}", faucets, faucet_cols);

    if let (Some(row), Some(col)) = (args.body_row, args.body_col) {
        match bath.toggle(row, col) {
            Ok(()) => println!("Dropped a body at ({row}, {col})"),
            Err(err) => {
                error!("Failed to drop body: {err}");
                std::process::exit(1);
            }
        }
    }

    let hottest = args.source_temp.max(args.body_temp).max(args.tub_temp);
    let coldest = args.source_temp.min(args.body_temp).min(args.tub_temp);
    let mut observer = HeatMapObserver::new(coldest, hottest);

    println!("\nRunning {} ticks...\n", args.ticks);
    let report_interval = args.report_interval.max(1);
    let mut next_report = report_interval;
    for tick in 1..=args.ticks {
        if args.shut_off_at == Some(tick) {
            // A zero-speed, tub-temperature faucet is indistinguishable from a closed one
            let posted = bath
                .post_parameter(ParameterChannel::SourceFlowSpeed, 0.0)
                .and_then(|()| bath.post_parameter(ParameterChannel::SourceTemp, args.tub_temp));
            if let Err(err) = posted {
                error!("Failed to shut off faucets: {err}");
            } else {
                info!("Faucets shut off before tick {tick}");
            }
        }

        let stats = match bath.tick(&mut observer) {
            Ok(stats) => stats,
            Err(err) => {
                error!("Simulation halted: {err}");
                std::process::exit(1);
            }
        };

        if tick >= next_report || tick == args.ticks {
            next_report += report_interval;
            println!(
                "Tick {:>5}: avg {:>7.2}°F  std dev {:>6.2}°F  ({:.2} ms/tick)",
                stats.tick,
                stats.average_temp,
                stats.std_dev_temp,
                bath.timer().average_frame_time_ms()
            );
            if args.map {
                println!("{}", observer.frame);
            }
        }
    }

    let stats = bath.stats();
    println!("\n=== Final State ===");
    println!("Ticks: {}", stats.tick);
    println!("Average temperature: {:.2}°F", stats.average_temp);
    println!("Std dev temperature: {:.2}°F", stats.std_dev_temp);
}
