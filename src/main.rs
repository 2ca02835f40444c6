//! orbitcore - command-line front end for the orbit engine
//!
//! Propagates element sets, samples orbit paths and runs nearest-point and
//! time-to-reach queries, printing JSON to stdout.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use nalgebra::Vector3;
use serde::Serialize;

use orbitcore::data::{load_catalog, load_element_sets, load_settings};
use orbitcore::propagation::station_geodetic;
use orbitcore::{
    EngineSettings, OrbitClass, OrbitRegime, OrbitalElements, Propagator, ReferenceEpoch,
};

#[derive(Parser, Debug)]
#[command(name = "orbitcore", version, about = "Keplerian orbit propagation and orbit queries")]
struct Cli {
    /// Engine settings JSON (missing fields use defaults)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Position of an object at a time after the reference epoch
    Propagate {
        #[command(flatten)]
        source: ElementSource,
        #[command(flatten)]
        time: TimeArgs,
    },
    /// Sampled orbit path
    Path {
        #[command(flatten)]
        source: ElementSource,
        /// Number of samples (defaults to the render density)
        #[arg(long)]
        points: Option<usize>,
        /// Emit render-space points (body radii, Y up) instead of meters
        #[arg(long)]
        render: bool,
    },
    /// Closest point on the orbit to a query point
    Nearest {
        #[command(flatten)]
        source: ElementSource,
        /// Query point "x,y,z" in meters, in the orbit's frame
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        point: Vector3<f64>,
    },
    /// Seconds until the object reaches a point on its orbit
    Eta {
        #[command(flatten)]
        source: ElementSource,
        #[command(flatten)]
        time: TimeArgs,
        /// Target point "x,y,z" in meters, in the orbit's frame
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        point: Vector3<f64>,
    },
    /// Orbit class, regime and derived quantities for one or all objects
    Classify {
        #[command(flatten)]
        source: ElementSource,
    },
}

/// Where the element set comes from
#[derive(Args, Debug, Clone)]
struct ElementSource {
    /// JSON map of name -> orbital elements (.json or .json.gz)
    #[arg(long, conflicts_with = "catalog")]
    elements: Option<PathBuf>,
    /// Satellite catalog export (.json or .json.gz)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Object to select from the file
    #[arg(long)]
    name: Option<String>,
    /// Semi-major axis (m)
    #[arg(long)]
    a: Option<f64>,
    /// Eccentricity
    #[arg(long, default_value_t = 0.0)]
    e: f64,
    /// Inclination (deg)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    inc: f64,
    /// Right ascension of the ascending node (deg)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    raan: f64,
    /// Argument of periapsis (deg)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    argp: f64,
    /// Mean anomaly at epoch (deg)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    m0: f64,
    /// Orbital period (s), derived when omitted
    #[arg(long)]
    period: Option<f64>,
}

#[derive(Args, Debug, Clone)]
struct TimeArgs {
    /// Seconds since the reference epoch
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true, conflicts_with = "at")]
    elapsed: f64,
    /// Absolute UTC instant (RFC 3339); needs --epoch
    #[arg(long, requires = "epoch")]
    at: Option<DateTime<Utc>>,
    /// Reference epoch (RFC 3339)
    #[arg(long)]
    epoch: Option<DateTime<Utc>>,
}

impl TimeArgs {
    fn elapsed(&self) -> f64 {
        match (self.epoch, self.at) {
            (Some(epoch), Some(at)) => ReferenceEpoch::new(epoch).elapsed_at(at),
            _ => self.elapsed,
        }
    }
}

fn parse_point(s: &str) -> Result<Vector3<f64>, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid coordinate: {}", e))?;

    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected 3 comma-separated values, got {}", parts.len())),
    }
}

/// Resolve the element sets selected on the command line
fn resolve(source: &ElementSource, settings: &EngineSettings) -> Result<BTreeMap<String, OrbitalElements>> {
    let sets: BTreeMap<String, OrbitalElements> = if let Some(path) = &source.elements {
        load_element_sets(path)?.into_iter().collect()
    } else if let Some(path) = &source.catalog {
        load_catalog(path)?
            .element_sets(&settings.body)
            .into_iter()
            .collect()
    } else if let Some(a) = source.a {
        let mut elements =
            OrbitalElements::new(a, source.e, source.inc, source.raan, source.argp, source.m0);
        elements.orbit_period = source.period;
        BTreeMap::from([("inline".to_string(), elements)])
    } else {
        bail!("provide --elements, --catalog or inline elements with --a");
    };

    match &source.name {
        Some(name) => {
            let elements = sets
                .get(name)
                .copied()
                .ok_or_else(|| anyhow!("no object named {:?}", name))?;
            Ok(BTreeMap::from([(name.clone(), elements)]))
        }
        None => Ok(sets),
    }
}

/// Exactly one element set, for single-object commands
fn resolve_one(source: &ElementSource, settings: &EngineSettings) -> Result<(String, OrbitalElements)> {
    let sets = resolve(source, settings)?;
    if sets.len() != 1 {
        bail!(
            "{} objects matched; select one with --name",
            sets.len()
        );
    }
    sets.into_iter()
        .next()
        .ok_or_else(|| anyhow!("no objects loaded"))
}

#[derive(Serialize)]
struct Classification {
    class: OrbitClass,
    regime: OrbitRegime,
    regime_name: &'static str,
    period_s: f64,
    mean_motion_rad_s: f64,
    altitude_km: f64,
    perigee_altitude_km: f64,
    apogee_altitude_km: f64,
    station_longitude_deg: Option<f64>,
}

fn classify(elements: &OrbitalElements, engine: &Propagator) -> Result<Classification> {
    let settings = engine.settings();
    elements.validate(&settings.body)?;

    let class = engine.classify(elements);
    let regime = elements.regime(settings);
    let (perigee, apogee) = elements.apsis_altitudes(&settings.body);

    Ok(Classification {
        class,
        regime,
        regime_name: regime.name(),
        period_s: elements.period(settings.body.mu),
        mean_motion_rad_s: elements.mean_motion(settings.body.mu),
        altitude_km: elements.altitude_km(&settings.body),
        perigee_altitude_km: perigee / 1000.0,
        apogee_altitude_km: apogee / 1000.0,
        station_longitude_deg: class
            .is_fixed()
            .then(|| station_geodetic(elements, &settings.body).longitude_deg),
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => EngineSettings::default(),
    };
    log::debug!(
        "Kepler tolerance {:e}, at most {} iterations",
        settings.kepler.tolerance,
        settings.kepler.max_iterations
    );
    let engine = Propagator::with_settings(settings);

    match cli.command {
        Command::Propagate { source, time } => {
            let elapsed = time.elapsed();
            if let Some(epoch) = time.epoch {
                let instant = ReferenceEpoch::new(epoch).format_elapsed(elapsed)?;
                log::info!("Propagating to {} ({:.3} s after epoch)", instant, elapsed);
            }
            let objects: HashMap<String, OrbitalElements> =
                resolve(&source, &settings)?.into_iter().collect();
            let states: BTreeMap<_, _> = engine
                .propagate_all(&objects, elapsed)
                .into_iter()
                .collect();
            if states.iter().any(|(_, s)| s.confidence.is_low()) {
                log::warn!("Some positions did not converge and are approximate");
            }
            print_json(&states)
        }
        Command::Path {
            source,
            points,
            render,
        } => {
            let (name, elements) = resolve_one(&source, &settings)?;
            let n = points.unwrap_or(settings.sampling.render_points);
            let path = engine.sample_path(&elements, n)?;
            log::info!("Sampled {} points for {}", n, name);

            if render {
                let points: Vec<[f32; 3]> = path
                    .to_render_points(settings.body.radius)
                    .into_iter()
                    .map(|p| p.to_array())
                    .collect();
                print_json(&points)
            } else {
                print_json(&path)
            }
        }
        Command::Nearest { source, point } => {
            let (_, elements) = resolve_one(&source, &settings)?;
            print_json(&engine.nearest_point(&point, &elements)?)
        }
        Command::Eta {
            source,
            time,
            point,
        } => {
            let (_, elements) = resolve_one(&source, &settings)?;
            print_json(&engine.time_to_reach(time.elapsed(), &point, &elements)?)
        }
        Command::Classify { source } => {
            let mut report = BTreeMap::new();
            for (name, elements) in resolve(&source, &settings)? {
                match classify(&elements, &engine) {
                    Ok(c) => {
                        report.insert(name, c);
                    }
                    Err(e) => log::warn!("Skipping {}: {}", name, e),
                }
            }
            print_json(&report)
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run(cli)
}
