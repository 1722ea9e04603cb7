use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use trip_compare::{
    draw_error_bars, parse_destinations, parse_routes, render_geojson, BarGeometry, Config,
    DrawCall, LinearAxis, ViewController,
};

/// Replays saved backend responses through the map and chart logic, and writes out what would be
/// drawn.
#[derive(Parser)]
struct Args {
    /// Path to a saved /route/{origin}/{destination} response
    #[arg(long)]
    routes: String,

    /// Path to a saved /destinations/{origin} response
    #[arg(long)]
    destinations: Option<String>,

    /// The origin city. Defaults to the configured one.
    #[arg(long)]
    origin: Option<String>,

    /// The destination city the routes were fetched for
    #[arg(long)]
    destination: String,

    /// Path to a JSON file overriding the default config
    #[arg(long)]
    config: Option<String>,

    /// Output file to write
    #[arg(long, default_value = "debug.geojson")]
    output: String,

    /// Width of the chart's value axis in pixels, for previewing error bars
    #[arg(long, default_value_t = 400.0)]
    chart_width: f64,
}

fn main() -> Result<()> {
    simple_logger::init_with_level(log::Level::Info)?;
    let args = Args::parse();

    let config = match args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(&path)?)
            .with_context(|| format!("parsing config {}", path))?,
        None => Config::default(),
    };
    let mut controller = ViewController::new(config);

    let fetch = match args.origin {
        Some(origin) => controller.set_origin(&origin),
        None => controller.start(),
    };
    let origin = controller
        .state()
        .origin()
        .map(|x| x.to_string())
        .unwrap_or_default();
    info!("Would fetch {}", fetch.path());

    if let Some(path) = args.destinations {
        let response = parse_destinations(&std::fs::read_to_string(&path)?)?;
        controller.on_destinations_loaded(&origin, response);
    }

    if let Some(fetch) = controller.select_destination(&args.destination) {
        info!("Would fetch {}", fetch.path());
    }
    let response = parse_routes(&std::fs::read_to_string(&args.routes)?)?;
    controller.on_routes_loaded(&origin, &args.destination, response);

    let gj = render_geojson(controller.state());
    std::fs::write(&args.output, serde_json::to_string_pretty(&gj)?)?;
    info!("Wrote {}", args.output);

    println!(
        "Map view: {}",
        serde_json::to_string(controller.map_view())?
    );
    for row in controller.summary_table() {
        println!("{:<20} {:<20} {}", row.mode, row.co2, row.time);
    }

    let chart = controller.chart();
    let axis = LinearAxis {
        min: 0.0,
        max: chart.suggested_max.unwrap_or(1.0),
        left: 0.0,
        right: args.chart_width,
    };
    let bars: Vec<BarGeometry> = (0..chart.labels.len())
        .map(|idx| BarGeometry {
            y: 20.0 + 40.0 * idx as f64,
        })
        .collect();
    let mut canvas: Vec<DrawCall> = Vec::new();
    let drawn = draw_error_bars(&bars, &[chart.series()], &axis, &mut canvas);
    info!("{} error bars", drawn);
    for call in &canvas {
        println!("{} {:?}", call.color, call.segments[0]);
    }

    Ok(())
}
