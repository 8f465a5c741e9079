use std::time::{Duration, Instant};

use na::DVector;

use crate::{
    error::{Error, Result},
    logger::VectorLog,
    types::Float,
};

/// A system that can be stepped forward in time
pub trait Plant {
    type Input;

    /// Step the plant forward by dt seconds under the given input.
    fn step(&mut self, dt: Float, input: &Self::Input);

    /// Current state, flattened
    fn state_vector(&self) -> DVector<Float>;

    fn time(&self) -> Float;
}

/// Fixed time-step simulator that logs the plant state
pub struct Simulator<P: Plant> {
    pub plant: P,
    dt: Float,
    target_realtime_rate: Option<Float>,
    publish_every_time_step: bool,
    log: VectorLog,
    initialized: bool,
}

impl<P: Plant> Simulator<P> {
    pub fn new(plant: P, dt: Float) -> Result<Self> {
        if !dt.is_finite() || dt <= 0. {
            return Err(Error::InvalidParameter {
                name: "dt",
                value: dt,
                reason: "time step must be finite and positive",
            });
        }
        let size = plant.state_vector().len();
        Ok(Simulator {
            plant,
            dt,
            target_realtime_rate: None,
            publish_every_time_step: true,
            log: VectorLog::new(size),
            initialized: false,
        })
    }

    /// Slow the simulation down to `rate` times wall-clock speed.
    /// Zero or negative disables pacing.
    pub fn set_target_realtime_rate(&mut self, rate: Float) {
        self.target_realtime_rate = if rate > 0. { Some(rate) } else { None };
    }

    /// When disabled, only the initial and the final states are logged.
    pub fn set_publish_every_time_step(&mut self, publish: bool) {
        self.publish_every_time_step = publish;
    }

    pub fn dt(&self) -> Float {
        self.dt
    }

    pub fn log(&self) -> &VectorLog {
        &self.log
    }

    pub fn into_parts(self) -> (P, VectorLog) {
        (self.plant, self.log)
    }

    /// Record the initial state
    pub fn initialize(&mut self) -> Result<()> {
        if !self.initialized {
            self.log
                .record(self.plant.time(), &self.plant.state_vector())?;
            self.initialized = true;
        }
        Ok(())
    }

    /// Advance the plant until final_time, asking the controller for an
    /// input before every step.
    pub fn advance_to<F>(&mut self, final_time: Float, mut control_fn: F) -> Result<()>
    where
        F: FnMut(&P) -> P::Input,
    {
        self.initialize()?;

        let start_sim = self.plant.time();
        let start_wall = Instant::now();
        let num_steps = ((final_time - start_sim) / self.dt).round().max(0.) as usize;
        log::info!(
            "advancing from t = {:.3} to t = {:.3} in {} steps",
            start_sim,
            final_time,
            num_steps
        );

        for s in 0..num_steps {
            let input = control_fn(&self.plant);
            self.plant.step(self.dt, &input);

            let last_step = s + 1 == num_steps;
            if self.publish_every_time_step || last_step {
                self.log
                    .record(self.plant.time(), &self.plant.state_vector())?;
            }

            if let Some(rate) = self.target_realtime_rate {
                let sim_elapsed = (self.plant.time() - start_sim) / rate;
                let wall_elapsed = start_wall.elapsed().as_secs_f64();
                if sim_elapsed > wall_elapsed {
                    std::thread::sleep(Duration::from_secs_f64(sim_elapsed - wall_elapsed));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod simulate_tests {
    use na::dvector;

    use crate::{assert_close, GRAVITY};

    use super::*;

    /// Point mass falling freely along z
    struct FallingMass {
        t: Float,
        z: Float,
        v: Float,
    }

    impl Plant for FallingMass {
        type Input = Float;

        fn step(&mut self, dt: Float, input: &Float) {
            self.v += (input - GRAVITY) * dt;
            self.z += self.v * dt;
            self.t += dt;
        }

        fn state_vector(&self) -> DVector<Float> {
            dvector![self.z, self.v]
        }

        fn time(&self) -> Float {
            self.t
        }
    }

    #[test]
    fn free_fall() {
        // Arrange
        let mass = FallingMass {
            t: 0.,
            z: 0.,
            v: 0.,
        };
        let mut simulator = Simulator::new(mass, 1e-3).unwrap();

        // Act
        simulator.advance_to(1.0, |_| 0.).unwrap();

        // Assert
        let log = simulator.log();
        assert_eq!(log.shape(), (2, 1001));
        assert_close!(log.sample_times()[1000], 1.0, 1e-9);
        let (_, x) = log.last().unwrap();
        assert_close!(x[1], -GRAVITY, 1e-9);
        assert_close!(x[0], -0.5 * GRAVITY, 1e-2);
    }

    #[test]
    fn hover_with_controller() {
        let mass = FallingMass {
            t: 0.,
            z: 1.,
            v: 0.,
        };
        let mut simulator = Simulator::new(mass, 0.01).unwrap();
        simulator.advance_to(2.0, |_| GRAVITY).unwrap();

        assert_close!(simulator.plant.z, 1., 1e-9);
    }

    #[test]
    fn publish_only_final_sample() {
        let mass = FallingMass {
            t: 0.,
            z: 0.,
            v: 0.,
        };
        let mut simulator = Simulator::new(mass, 0.01).unwrap();
        simulator.set_publish_every_time_step(false);
        simulator.advance_to(1.0, |_| 0.).unwrap();

        assert_eq!(simulator.log().num_samples(), 2);
    }

    #[test]
    fn realtime_rate_paces_the_loop() {
        // Arrange
        let mass = FallingMass {
            t: 0.,
            z: 0.,
            v: 0.,
        };
        let mut simulator = Simulator::new(mass, 0.01).unwrap();
        simulator.set_target_realtime_rate(1.0);

        // Act
        let start = Instant::now();
        simulator.advance_to(0.1, |_| 0.).unwrap();

        // Assert
        assert!(start.elapsed().as_secs_f64() >= 0.095);
        assert_close!(simulator.plant.t, 0.1, 1e-9);
    }

    #[test]
    fn zero_rate_runs_unpaced() {
        let mass = FallingMass {
            t: 0.,
            z: 0.,
            v: 0.,
        };
        let mut simulator = Simulator::new(mass, 0.01).unwrap();
        simulator.set_target_realtime_rate(0.);

        let start = Instant::now();
        simulator.advance_to(1.0, |_| 0.).unwrap();

        assert!(start.elapsed().as_secs_f64() < 0.5);
    }

    #[test]
    fn rejects_bad_time_step() {
        let mass = FallingMass {
            t: 0.,
            z: 0.,
            v: 0.,
        };
        assert!(Simulator::new(mass, 0.).is_err());
    }
}
