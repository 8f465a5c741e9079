use contact_explore::{
    bounce::BallPaddle,
    config::ExploreConfig,
    params::{idx, InputVector, StateVector},
    plot::{plot, plot_trajectory},
    simulate::Simulator,
    types::Float,
    util::to_dvector,
    Result,
};

/// Ball tossed from the paddle. MPC plans the paddle motion that brings
/// both into the target region, and the plan is played back on the plant
/// with contacts enabled.
pub fn main() -> Result<()> {
    env_logger::init();

    let config = ExploreConfig::load_or_default();
    let params = config.bounce;
    params.validate()?;

    // ball bottom on the paddle, leaving it upwards
    let mut x0 = StateVector::zeros();
    x0[idx::XB] = 0.02;
    x0[idx::YB] = -0.15;
    x0[idx::TB] = 0.1;
    x0[idx::XF] = 0.05;
    x0[idx::YF] = -0.15;
    x0[idx::XDB] = 0.05;
    x0[idx::YDB] = 2.05;
    x0[idx::TDB] = 0.05;

    let problem = params.mpc_problem(BallPaddle::free_flight_model(&params))?;
    let plan = problem.solve(&to_dvector(&x0))?;
    println!("planned cost: {:.4}", plan.cost);

    let dt = params.h;
    let horizon = params.horizon;
    let final_time = horizon as Float * dt;
    let system = BallPaddle::new(params, x0);
    let mut simulator = Simulator::new(system, dt)?;

    let mut contacts = 0;
    simulator.advance_to(final_time, |system: &BallPaddle| {
        contacts += system.contacts.len();
        let k = ((system.t / dt).round() as usize).min(horizon - 1);
        InputVector::from_column_slice(plan.inputs[k].as_slice())
    })?;

    let (system, log) = simulator.into_parts();
    let in_target = problem.terminal_set.contains(system.x.as_slice(), 1e-3);
    println!("contacts: {}", contacts + system.contacts.len());
    println!("final state: {:?}", system.x.as_slice());
    println!("final state in target region: {}", in_target);

    plot(&log.row(idx::YB), final_time, dt, "ball_height")?;
    plot_trajectory(&log.row(idx::XB), &log.row(idx::YB), "ball_traj")?;
    plot_trajectory(&log.row(idx::XF), &log.row(idx::YF), "floor_traj")?;
    Ok(())
}
