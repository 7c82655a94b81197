mod os_signal_termination;
mod result;

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::ValueEnum;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;
use os_signal_termination::OsSignal;
use result::TbppResult;
use tbpp_solver::backends::MicroLpSolver;
use tbpp_solver::core::convert_case::Case;
use tbpp_solver::core::enumset::EnumSet;
use tbpp_solver::formulations::build_model;
use tbpp_solver::formulations::parse_modifiers;
use tbpp_solver::formulations::FormulationKind;
use tbpp_solver::formulations::Modifier;
use tbpp_solver::formulations::ServerBounds;
use tbpp_solver::instance::Allocation;
use tbpp_solver::instance::InstanceFu;
use tbpp_solver::instance::ValueFunction;
use tbpp_solver::lifting::lift;
use tbpp_solver::pipeline::evaluate_kind;
use tbpp_solver::pipeline::EvaluationSettings;
use tbpp_solver::readers::allocation::read_allocation_file;
use tbpp_solver::readers::allocation::write_allocation_file;
use tbpp_solver::readers::format1;
use tbpp_solver::readers::format2;
use tbpp_solver::solver::SolveOptions;
use tbpp_solver::solver::Verbosity;
use tbpp_solver::statistics::configure_statistic_logging;
use tbpp_solver::statistics::log_statistic;
use tbpp_solver::statistics::log_statistic_postfix;

/// The exit code used when the run is interrupted by a signal.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Parser)]
#[command(
    help_template = "\
{before-help}{name} {version}
Authors: {author}
About: {about}

{usage-heading}\n{tab}{usage}

{all-args}{after-help}
",
    author,
    version,
    about,
    arg_required_else_help = true
)]
struct Args {
    /// The instance to solve.
    instance_path: PathBuf,

    /// The format of the instance file.
    ///  - 'format1': a header `n cap` followed by one `index start end demand` line per job,
    ///  - 'format2': a header `n cap steps`, the demands, two ignored lines and the active jobs of
    ///    every time step.
    #[arg(long, value_enum, default_value_t, verbatim_doc_comment)]
    format: InstanceFormat,

    /// The cost of a fire-up relative to the cost of a server.
    #[arg(long, default_value_t = 1.0)]
    gamma: f64,

    /// Lift the demands of the jobs before building the models.
    #[arg(long)]
    lift: bool,

    /// The formulation to build. When omitted, all formulations are evaluated one after the other.
    #[arg(long, value_enum)]
    formulation: Option<FormulationKind>,

    /// A comma separated list of modifiers, e.g. `conflicts,wy` or `vi1,vi2,dominance`.
    ///
    /// When omitted, the default modifiers of each formulation are used.
    #[arg(long, value_parser = parse_modifiers)]
    modifiers: Option<EnumSet<Modifier>>,

    /// A known lower bound on the number of servers.
    #[arg(long, default_value_t = 0)]
    lower_bound: usize,

    /// A known upper bound on the number of servers.
    #[arg(long)]
    upper_bound: Option<usize>,

    /// A feasible allocation of the instance, with one server per line.
    ///
    /// It is handed to the solver as start values and its value tightens the upper bound on the
    /// number of servers.
    #[arg(long)]
    allocation: Option<PathBuf>,

    /// The time limit of every solve, in seconds.
    #[arg(long)]
    time_limit: Option<u64>,

    /// Skip solving the continuous relaxation of each model.
    #[arg(long)]
    skip_relaxation: bool,

    /// Write every built model in the CPLEX LP format into this directory and do not solve.
    #[arg(long)]
    write_lp: Option<PathBuf>,

    /// Write the best allocation found to this file.
    #[arg(long)]
    write_allocation: Option<PathBuf>,

    /// How much the solver backend reports about each solve.
    #[arg(long, value_enum, default_value_t)]
    solver_verbosity: Verbosity,

    /// Enables logging of statistics about the models and solves.
    #[arg(short = 's', long = "log-statistics")]
    log_statistics: bool,

    /// Enables log message output from the solver.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum InstanceFormat {
    #[default]
    Format1,
    Format2,
}

fn configure_logging(verbose: bool, log_statistics: bool) {
    if log_statistics {
        configure_statistic_logging(
            "%%%tbpp-stat:",
            Some("%%%tbpp-stat-end"),
            Some(Case::Snake),
            None,
        );
    }
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .format(move |buf, record| writeln!(buf, "c {}", record.args()))
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
    info!("Logging successfully configured");
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(e) if e.is_interruption() => {
            warn!("Execution interrupted");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        Err(e) => {
            error!("Execution failed, error: {e}");
            std::process::exit(1);
        }
    }
}

fn run() -> TbppResult<()> {
    let args = Args::parse();
    configure_logging(args.verbose, args.log_statistics);

    if tbpp_solver::core::tbpp_asserts::TBPP_ASSERT_LEVEL_DEFINITION
        >= tbpp_solver::core::tbpp_asserts::TBPP_ASSERT_MODERATE
    {
        warn!(
            "Potential performance degradation: the assert level is set to {}, meaning many debug asserts are active which may result in performance degradation.",
            tbpp_solver::core::tbpp_asserts::TBPP_ASSERT_LEVEL_DEFINITION
        );
    }

    let instance = match args.format {
        InstanceFormat::Format1 => format1::read_file(&args.instance_path)?,
        InstanceFormat::Format2 => format2::read_file(&args.instance_path)?,
    };
    info!(
        "Read instance with {} jobs and capacity {}",
        instance.num_jobs(),
        instance.capacity()
    );
    let instance = if args.lift { lift(&instance)? } else { instance };

    // The models need the jobs in order of their start; `order` maps back to the file's indices.
    let (sorted, order) = instance.sorted_with_order();
    let mut position = vec![0; order.len()];
    for (new, &old) in order.iter().enumerate() {
        position[old] = new;
    }
    let instance = InstanceFu::extend(sorted, args.gamma)?;

    let mut bounds = ServerBounds::new(args.lower_bound, args.upper_bound);
    let warm_start = args
        .allocation
        .as_deref()
        .map(|path| read_warm_start(path, &instance, &position, &mut bounds))
        .transpose()?;

    let kinds = args
        .formulation
        .map_or(FormulationKind::ALL.to_vec(), |kind| vec![kind]);

    if let Some(directory) = &args.write_lp {
        std::fs::create_dir_all(directory)?;
        for kind in kinds {
            let model = build_model(kind, args.modifiers, &instance, bounds)?;
            let path = directory.join(format!("{kind}.lp"));
            model.write_lp(std::io::BufWriter::new(std::fs::File::create(&path)?))?;
            info!("Wrote {model} to {}", path.display());
        }
        return Ok(());
    }

    let settings = EvaluationSettings {
        bounds,
        warm_start: warm_start.as_ref(),
        solve_options: SolveOptions {
            verbosity: args.solver_verbosity,
            time_limit: args.time_limit.map(Duration::from_secs),
        },
        skip_relaxation: args.skip_relaxation,
    };
    let mut termination = OsSignal::install()?;
    let mut solver = MicroLpSolver::default();

    let mut best: Option<(f64, Allocation)> = None;
    for kind in kinds {
        let report = evaluate_kind(
            kind,
            args.modifiers,
            &instance,
            &settings,
            &mut solver,
            &mut termination,
        )?;

        report.log_statistics();
        log_statistic_postfix();
        println!(
            "{kind}: status {}, value {}, servers {}, fire-ups {}",
            report.status,
            display_optional(report.value),
            display_optional(report.servers),
            display_optional(report.fire_ups),
        );

        if let (Some(value), Some(allocation)) = (report.value, report.allocation) {
            if best.as_ref().map_or(true, |(best, _)| value < *best) {
                best = Some((value, allocation));
            }
        }
    }

    if let Some(path) = &args.write_allocation {
        match best {
            Some((value, allocation)) => {
                write_allocation_file(&allocation.remap(|job| order[job]), path)?;
                info!("Wrote allocation of value {value} to {}", path.display());
            }
            None => warn!("No allocation was found, {} is not written", path.display()),
        }
    }

    Ok(())
}

/// Reads an allocation in the indices of the instance file and translates it to the sorted
/// instance. Its value tightens the upper bound on the number of servers.
fn read_warm_start(
    path: &Path,
    instance: &InstanceFu,
    position: &[usize],
    bounds: &mut ServerBounds,
) -> TbppResult<Allocation> {
    let allocation = read_allocation_file(path)?;
    allocation.check_partition(instance.num_jobs())?;
    let allocation = allocation.remap(|job| position[job]);
    instance.check_allocation(&allocation)?;

    let value = instance.compute_value(&allocation);
    let derived = ServerBounds::from_heuristic_value(bounds.lower, value, instance.gamma());
    bounds.upper = match (bounds.upper, derived.upper) {
        (Some(given), Some(derived)) => Some(given.min(derived)),
        (given, derived) => given.or(derived),
    };
    info!(
        "Warm start with {} servers and value {value}, at most {:?} servers are needed",
        allocation.num_patterns(),
        bounds.upper
    );
    log_statistic("warm_start_value", value);

    Ok(allocation)
}

fn display_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |value| format!("{value:.0}"))
}
