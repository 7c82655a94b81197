use clap::Parser;
use tbpp_solver::backends::MicroLpSolver;
use tbpp_solver::core::rand::rngs::SmallRng;
use tbpp_solver::core::rand::SeedableRng;
use tbpp_solver::formulations::FormulationKind;
use tbpp_solver::formulations::ServerBounds;
use tbpp_solver::instance::Allocation;
use tbpp_solver::instance::Instance;
use tbpp_solver::instance::InstanceFu;
use tbpp_solver::instance::Pattern;
use tbpp_solver::instance::RandomInstanceParameters;
use tbpp_solver::instance::ValueFunction;
use tbpp_solver::lifting::lift;
use tbpp_solver::pipeline::evaluate_kind;
use tbpp_solver::pipeline::EvaluationSettings;
use tbpp_solver::termination::Indefinite;

#[derive(Parser)]
struct Cli {
    /// The number of jobs of the random instance.
    #[arg(short, long, default_value_t = 12)]
    num_jobs: usize,

    /// The seed of the random generator.
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// The cost of a fire-up relative to the cost of a server.
    #[arg(short, long, default_value_t = 1.0)]
    gamma: f64,
}

/// Puts every job, in order of their start, on the first server where it fits.
fn first_fit(instance: &InstanceFu) -> Allocation {
    let mut servers: Vec<Vec<usize>> = Vec::new();
    for (job, details) in instance.jobs().iter().enumerate() {
        // Jobs come in order of their start, so the load of a server only decreases after it.
        let fits = |server: &[usize]| {
            instance.load_at(&Pattern::new(server.iter().copied()), details.start) + details.demand
                <= instance.capacity()
        };
        match servers.iter_mut().find(|server| fits(server)) {
            Some(server) => server.push(job),
            None => servers.push(vec![job]),
        }
    }
    servers.into_iter().map(Pattern::new).collect()
}

fn main() {
    let Cli {
        num_jobs,
        seed,
        gamma,
    } = Cli::parse();

    let mut rng = SmallRng::seed_from_u64(seed);
    let parameters = RandomInstanceParameters {
        max_start: 2 * num_jobs as i64,
        max_duration: 8,
        ..RandomInstanceParameters::new(num_jobs, 100)
    };
    let instance = Instance::random(&mut rng, parameters);

    let lifted = match lift(&instance) {
        Ok(lifted) => lifted,
        Err(error) => {
            eprintln!("Failed to lift the instance: {error}");
            return;
        }
    };
    let Ok(instance) = InstanceFu::extend(lifted.sorted(), gamma) else {
        eprintln!("Please provide a finite, non-negative gamma");
        return;
    };

    let allocation = first_fit(&instance);
    let value = instance.compute_value(&allocation);
    let bounds = ServerBounds::from_heuristic_value(0, value, gamma);
    println!(
        "first fit value = {value}\nmaximal server count = {}",
        bounds.upper.unwrap_or(num_jobs)
    );

    let settings = EvaluationSettings {
        bounds,
        warm_start: Some(&allocation),
        ..EvaluationSettings::default()
    };
    for kind in FormulationKind::ALL {
        match evaluate_kind(
            kind,
            None,
            &instance,
            &settings,
            &mut MicroLpSolver::default(),
            &mut Indefinite,
        ) {
            Ok(report) => println!(
                "{kind}: z* = {:?}, servers = {:?}, fire-ups = {:?}, relaxation = {:?}",
                report.value,
                report.servers,
                report.fire_ups,
                report.relaxation.and_then(|relaxation| relaxation.value),
            ),
            Err(error) => eprintln!("{kind}: {error}"),
        }
    }
}
