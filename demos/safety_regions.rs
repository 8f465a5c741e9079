use std::path::Path;

use contact_explore::{config::ExploreConfig, plot::plot_regions, region::Regions, Result};

/// Draw the safety and target regions of the default ball-paddle parameters
pub fn main() -> Result<()> {
    env_logger::init();

    let config = ExploreConfig::load_or_default();
    let params = config.bounce;
    params.validate()?;

    let regions = Regions::from_params(&params);
    println!("safety region center: {:?}", regions.safety.center().as_slice());
    println!("safety region extent: {:?}", regions.safety.extent().as_slice());
    println!("target region center: {:?}", regions.target.center().as_slice());
    println!("target region extent: {:?}", regions.target.extent().as_slice());

    plot_regions(&regions, Path::new("safety_regions.png"))
}
