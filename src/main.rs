//! CLI entry point (spec §6): generate a random schedule of
//! polyomino blocks and find its minimum packing width, either via
//! the SAT formulation (default) or the IP formulation (`--ip`).

use std::path::PathBuf;

use chrono::Utc;
use structopt::StructOpt;

use polypack::amo::AmoScheme;
use polypack::encoder::PlacementEncoder;
use polypack::error::{PolypackError, Result};
use polypack::instance::{random_instance, ScheduleItem};
use polypack::ip::IpModel;
use polypack::optimizer::OptimizationDriver;
use polypack::output::{paint_solution, save_solution};
use polypack::shapes::WELL_KNOWN_SHAPES;
use polypack::solver::GlucoseSolver;
use polypack::var::VarAllocator;

#[derive(Debug, StructOpt)]
#[structopt(name = "polypack", about = "generate and solve an example problem")]
struct Opt {
    /// number of time steps
    #[structopt(long)]
    steps: usize,

    /// limit of blocks present at the same time
    #[structopt(long)]
    fill: usize,

    /// limit of steps an item is present
    #[structopt(long)]
    duration: usize,

    /// height of the packing area
    #[structopt(long)]
    height: usize,

    /// maximal width of the packing area
    #[structopt(long = "max-width")]
    max_width: usize,

    /// do not use cardinality constraints
    #[structopt(long = "no-cardinality")]
    no_cardinality: bool,

    /// encoding to use for at most one constraints
    #[structopt(long = "at-most-one", default_value = "product")]
    at_most_one: String,

    /// verbose solver logging
    #[structopt(long)]
    verbose: bool,

    /// use the IP formulation and CBC as solver
    #[structopt(long)]
    ip: bool,

    /// random seed for instance generation
    #[structopt(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    if opt.verbose && std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "debug");
    }
    pretty_env_logger::init();

    let amo_scheme = AmoScheme::parse(&opt.at_most_one)
        .ok_or_else(|| PolypackError::Configuration(format!("unknown at_most_one encoding {}", opt.at_most_one)))?;

    if opt.duration == 0 {
        return Err(PolypackError::Configuration("duration must be at least 1".to_string()));
    }

    let schedule = random_instance(&WELL_KNOWN_SHAPES, opt.steps, opt.fill, opt.duration, opt.seed);
    let items: Vec<ScheduleItem> = schedule
        .into_iter()
        .map(|(begin, end, shape)| ScheduleItem::new(begin, end, shape))
        .collect();

    log::info!("placing {} items", items.len());

    if opt.ip {
        run_ip(&items, opt.height, opt.max_width, !opt.no_cardinality)
    } else {
        run_sat(&items, opt.height, opt.max_width, !opt.no_cardinality, amo_scheme)
    }
}

fn run_sat(
    items: &[ScheduleItem],
    height: usize,
    max_width: usize,
    use_cardinality: bool,
    amo_scheme: AmoScheme,
) -> Result<()> {
    let _guard = hprof::enter("sat_solver");

    let mut vars = VarAllocator::new();
    let mut solver = GlucoseSolver::new();

    let encoder = PlacementEncoder::build(
        &mut vars,
        &mut |clause| solver.add_clause(&clause),
        items,
        height,
        max_width,
        use_cardinality,
        amo_scheme,
    );

    log::info!("used {} variables", vars.len());

    let mut driver = OptimizationDriver::new(solver, encoder.block_vars.clone(), max_width);
    driver.optimize(|solver, width| {
        let solution = paint_solution(solver, &encoder, items, width, Utc::now());
        let path = PathBuf::from(format!("solution_{width}.json"));
        if let Err(err) = save_solution(&solution, &path) {
            log::warn!("failed to write {}: {err}", path.display());
        }
    });

    log::info!("optimal width: {}", driver.upper_bound());
    Ok(())
}

fn run_ip(items: &[ScheduleItem], height: usize, max_width: usize, use_cardinality: bool) -> Result<()> {
    let model = IpModel::build(items, height, max_width, use_cardinality);
    let width = model.solve_with_gurobi()?;
    log::info!("optimal width: {width}");
    Ok(())
}
