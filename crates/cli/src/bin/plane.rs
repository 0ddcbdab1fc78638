use clap::Parser;
use coast_propagator::core::constants::SIDEREAL_DAY_EARTH;
use coast_propagator::orbits::time_to_plane;

/// Wait time until a launch site rotates into a target orbital plane.
#[derive(Parser, Debug)]
#[command(author, version, about = "Launch-window phasing calculator")]
struct Cli {
    /// Site latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Site celestial longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    /// Target longitude of ascending node in degrees
    #[arg(long, allow_hyphen_values = true)]
    lan: f64,

    /// Target inclination in degrees (negative for descending-node launches)
    #[arg(long, allow_hyphen_values = true)]
    inc: f64,

    /// Body rotation period in seconds (negative for retrograde rotation)
    #[arg(long, allow_hyphen_values = true, default_value_t = SIDEREAL_DAY_EARTH)]
    period: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let wait = time_to_plane(cli.period, cli.lat, cli.lng, cli.lan, cli.inc)?;
    log::debug!("lat {} lng {} lan {} inc {}", cli.lat, cli.lng, cli.lan, cli.inc);
    println!("{wait:.3}");
    Ok(())
}
