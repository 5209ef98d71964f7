mod element;
mod error;
mod geometry;
mod input;
mod post_processor;
mod problem;
mod solver;
mod system;

use clap::Parser;

use error::OlivineError;
use geometry::Geometry;
use problem::Problem;

/// 2D linear-elasticity finite-element solver: computes the static
/// displacement field of a meshed solid under self-weight and Dirichlet
/// boundary conditions.
#[derive(Parser)]
struct Args {
    /// Problem-definition json (material constants, boundary conditions)
    input: String,

    /// Mesh file produced by the external mesher
    mesh: String,

    /// Output solution file
    #[arg(short, long, default_value = "solution.txt")]
    output: String,
}

fn main() {
    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), OlivineError> {
    let model = input::load_input_file(&args.input)?;
    let geometry = Geometry::from_file(&args.mesh)?;
    println!(
        "info: loaded {} nodes, {} elements and {} domains",
        geometry.nodes.len(),
        geometry.elements.n_elem(),
        geometry.domains.len()
    );
    println!("info: mesh area {:.7e}", solver::mesh_area(&geometry)?);

    let mut problem = Problem::new(
        &geometry,
        model.youngs_modulus,
        model.poisson_ratio,
        model.density,
        model.gravity,
        model.elastic_case,
    )?;
    for condition in &model.boundary_conditions {
        problem.add_boundary_condition(&condition.domain, condition.axis, condition.value)?;
    }
    println!(
        "info: registered {} boundary conditions",
        model.boundary_conditions.len()
    );

    let displacement = solver::run(problem)?;

    post_processor::write_solution(geometry.nodes.len(), &displacement, &args.output)?;
    println!("info: wrote solution to {}", args.output);

    Ok(())
}
