//! Simulation state: the current population and the reload inbox

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use super::entity::{Bounds, MotionEntity};

/// The full set of live entities; always replaced as a unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    /// Increments with every load, starting at 0 for the initial one
    pub generation: u64,
    pub entities: Vec<MotionEntity>,
}

impl Population {
    pub fn new(generation: u64, entities: Vec<MotionEntity>) -> Self {
        Self {
            generation,
            entities,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Everything the loop needs to advance the simulation
#[derive(Debug)]
pub struct SimulationState {
    pub bounds: Bounds,
    pub population: Population,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Fully built populations published by the watcher thread
    reload_rx: Option<Receiver<Population>>,
}

impl SimulationState {
    pub fn new(bounds: Bounds, population: Population) -> Self {
        Self {
            bounds,
            population,
            time_ticks: 0,
            reload_rx: None,
        }
    }

    /// Attach the channel new populations arrive on
    pub fn with_reloads(mut self, reload_rx: Receiver<Population>) -> Self {
        self.reload_rx = Some(reload_rx);
        self
    }

    /// Swap in the newest published population, if any.
    ///
    /// Older pending populations are dropped unseen; the swap replaces the
    /// whole collection so no tick ever sees a mix of generations.
    pub fn apply_pending_reload(&mut self) -> bool {
        let Some(rx) = &self.reload_rx else {
            return false;
        };
        let Some(latest) = rx.try_iter().last() else {
            return false;
        };

        log::info!(
            "Population reloaded: generation {} -> {}, {} -> {} balls",
            self.population.generation,
            latest.generation,
            self.population.len(),
            latest.len()
        );
        self.population = latest;
        true
    }
}
