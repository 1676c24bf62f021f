use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;
use space_logistics::config::{PlannerConfig, load_planner};
use space_logistics::export::{ephemeris, summary};
use space_logistics::orbits::CaptureSense;
use space_logistics::time::split_duration;
use space_logistics::transfer::{
    BodyCatalog, MissionBuilder, PlannerSettings, ephemeris_rows, plan_summary,
};
use space_logistics::units::m_to_km;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Patched-conic planet-to-moon mission planner"
)]
struct Cli {
    /// Planet the parking orbit circles (case-insensitive)
    #[arg(long)]
    from: String,

    /// Moon to capture around (case-insensitive)
    #[arg(long)]
    to: String,

    /// Request time in simulation seconds
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    time: f64,

    /// Capture direction about the moon (overrides the planner file)
    #[arg(long, value_enum)]
    capture_sense: Option<SenseArg>,

    /// Ephemeris samples per segment
    #[arg(long, default_value_t = 50)]
    samples: usize,

    /// Write the sampled ephemeris as CSV (`-` for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the plan summary as JSON (`-` for stdout)
    #[arg(long)]
    json: Option<PathBuf>,

    /// Body catalog: directory of TOML files, single TOML file or YAML list
    #[arg(long, default_value = "configs/bodies")]
    bodies: PathBuf,

    /// Planner settings file (TOML or YAML)
    #[arg(long)]
    planner: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum SenseArg {
    Prograde,
    Retrograde,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let planner = match &cli.planner {
        Some(path) => load_planner(path)
            .with_context(|| format!("loading planner settings from {}", path.display()))?,
        None => PlannerConfig::default(),
    };
    let mut settings = PlannerSettings::from(&planner);
    if let Some(sense) = cli.capture_sense {
        settings.capture_sense = match sense {
            SenseArg::Prograde => CaptureSense::Prograde,
            SenseArg::Retrograde => CaptureSense::Retrograde,
        };
    }

    let catalog = BodyCatalog::load(&cli.bodies)
        .with_context(|| format!("loading bodies from {}", cli.bodies.display()))?;
    let planet = catalog.get(&cli.from)?;
    let moon = catalog.get(&cli.to)?;

    let mission = MissionBuilder::new(settings).plan_planet_to_moon(&planet, &moon, cli.time)?;
    let report = plan_summary(&mission);

    let (d, h, m) = split_duration(mission.soi_entry_time - mission.launch_time);
    println!("=== Flight Plan: {} -> {} ===", planet.name, moon.name);
    println!("Launch        : t = {:.0} s", mission.launch_time);
    println!(
        "Transfer      : apogee = {:.1} km, phase lead = {:.3} deg, {}d {}h {}m to SOI",
        m_to_km(mission.transfer_apogee),
        mission.phase_angle.to_degrees(),
        d,
        h,
        m
    );
    println!("SOI entry     : t = {:.0} s", mission.soi_entry_time);
    println!(
        "Periapsis     : t = {:.0} s, r_p = {:.1} km ({}), v_inf = {:.1} m/s",
        mission.periapsis_time,
        m_to_km(mission.approach.periapsis_radius),
        report.capture_sense,
        mission.approach.v_infinity
    );
    println!(
        "Burns         : injection = {:.1} m/s, capture = {:.1} m/s, total = {:.1} m/s",
        mission.injection_delta_v,
        mission.capture_delta_v,
        mission.total_delta_v()
    );
    for segment in &report.segments {
        println!(
            "  [{}] {:<9} {:<17} {:<6} {:>12.0} .. {:<12.0} {}",
            segment.index,
            segment.phase,
            segment.kind,
            segment.reference_body,
            segment.start_time_s,
            segment.end_time_s,
            segment.exit_condition
        );
    }

    if let Some(path) = &cli.csv {
        let rows = ephemeris_rows(&mission.plan, cli.samples)?;
        ephemeris::write_records(path, &rows)
            .with_context(|| format!("writing ephemeris to {}", path.display()))?;
        info!("wrote {} ephemeris rows to {}", rows.len(), path.display());
    }
    if let Some(path) = &cli.json {
        summary::write_summary(path, &report)
            .with_context(|| format!("writing summary to {}", path.display()))?;
        info!("wrote plan summary to {}", path.display());
    }

    Ok(())
}
