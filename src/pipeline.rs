//! Load pipeline: CSV file -> records -> freshly spawned population

use chrono::NaiveDate;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::loader::{SourceLoadError, load_records};
use crate::settings::Settings;
use crate::sim::{Population, spawn_population};

/// Today's date in the local timezone
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Builds complete populations from the data file.
///
/// Owns the RNG so successive loads keep drawing from one seeded stream, and
/// numbers each population it produces.
#[derive(Debug)]
pub struct PopulationBuilder {
    settings: Settings,
    rng: Pcg32,
    next_generation: u64,
    today: fn() -> NaiveDate,
}

impl PopulationBuilder {
    pub fn new(settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::debug!("Population RNG seed: {seed}");
        Self {
            settings,
            rng: Pcg32::seed_from_u64(seed),
            next_generation: 0,
            today: local_today,
        }
    }

    /// Replace the date source used to age records
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load the file and spawn a new population.
    ///
    /// Fails only on file-level errors; bad rows are skipped by the loader.
    /// Nothing is consumed on failure, so the next generation number is
    /// unchanged.
    pub fn build(&mut self) -> Result<Population, SourceLoadError> {
        let today = (self.today)();
        let report = load_records(&self.settings.data_path, today, self.settings.date_range)?;
        let entities = spawn_population(&report.records, &self.settings, &mut self.rng);

        let generation = self.next_generation;
        self.next_generation += 1;
        Ok(Population::new(generation, entities))
    }

    /// Like `build`, but a file-level failure yields an empty population
    pub fn build_or_empty(&mut self) -> Population {
        match self.build() {
            Ok(population) => population,
            Err(e) => {
                log::error!("Error loading data, starting with no balls: {e}");
                let generation = self.next_generation;
                self.next_generation += 1;
                Population::new(generation, Vec::new())
            }
        }
    }
}
