use std::path::Path;

use contact_explore::{
    config::ExploreConfig,
    plot::{plot, plot_state_log},
    simulate::Simulator,
    slider::build_slider,
    Result,
};

/// Block dropped on a table, logged until it comes to rest
pub fn main() -> Result<()> {
    env_logger::init();

    let config = ExploreConfig::load_or_default().slider;
    let slider = build_slider(&config)?;

    let mut simulator = Simulator::new(slider, config.time_step)?;
    simulator.set_target_realtime_rate(config.realtime_rate);
    simulator.set_publish_every_time_step(true);

    simulator.initialize()?;
    simulator.advance_to(config.final_time, |_| ())?;

    let log = simulator.log();
    println!("{:?}", log.shape());

    if config.show_plots {
        plot_state_log(log, &(0..6).collect::<Vec<_>>(), Path::new("slider_states_0.png"))?;
        plot_state_log(log, &(6..12).collect::<Vec<_>>(), Path::new("slider_states_1.png"))?;
        plot(
            &log.row(log.size() - 1),
            config.final_time,
            config.time_step,
            "slider_last_state",
        )?;
    }
    Ok(())
}
