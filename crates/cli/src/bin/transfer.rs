use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use space_logistics::impulsive::{find_next_launch_window, hohmann};
use space_logistics::time::{seconds_to_days, split_duration};
use space_logistics::transfer::BodyCatalog;
use space_logistics::units::{km_to_m, ms_to_kms};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Hohmann transfer estimate and launch window between circular orbits"
)]
struct Cli {
    /// Central body (case-insensitive)
    #[arg(long)]
    body: String,

    /// Initial circular orbit radius in km
    #[arg(long)]
    r1_km: f64,

    /// Target circular orbit radius in km
    #[arg(long)]
    r2_km: f64,

    /// Satellite of `--body` to rendezvous with at apoapsis
    #[arg(long)]
    target: Option<String>,

    /// Earliest departure in simulation seconds
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    time: f64,

    /// Body catalog: directory of TOML files, single TOML file or YAML list
    #[arg(long, default_value = "configs/bodies")]
    bodies: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if !(cli.r1_km > 0.0 && cli.r2_km > 0.0) {
        bail!("orbit radii must be positive");
    }

    let catalog = BodyCatalog::load(&cli.bodies)
        .with_context(|| format!("loading bodies from {}", cli.bodies.display()))?;
    let body = catalog.get(&cli.body)?;
    let result = hohmann(km_to_m(cli.r1_km), km_to_m(cli.r2_km), body.mu())?;

    let (d, h, m) = split_duration(result.tof_seconds);
    println!("=== Hohmann Transfer about {} ===", body.name);
    println!(
        "Burns : dv1 = {:.3} km/s, dv2 = {:.3} km/s, total = {:.3} km/s",
        ms_to_kms(result.dv1_m_s),
        ms_to_kms(result.dv2_m_s),
        ms_to_kms(result.dv_total_m_s)
    );
    println!(
        "TOF   : {:.3} days ({}d {}h {}m), e = {:.4}",
        seconds_to_days(result.tof_seconds),
        d,
        h,
        m,
        result.eccentricity
    );

    if let Some(name) = &cli.target {
        let target = catalog.get(name)?;
        let launch = find_next_launch_window(&body, &target, result.tof_seconds, cli.time)?;
        let (d, h, m) = split_duration(launch - cli.time);
        println!(
            "Window: launch at t = {:.0} s ({}d {}h {}m from t = {:.0} s) to meet {} at apoapsis",
            launch, d, h, m, cli.time, target.name
        );
    }

    Ok(())
}
