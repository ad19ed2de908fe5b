use super::traits::ConfigSection;
use crate::error::SearchError;
use serde::{Deserialize, Serialize};

/// Genetic-algorithm knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub generations: usize,
    pub population_size: usize,
    pub tournament_size: usize,
    pub mutation_rate: f64,
    pub elitism_count: usize,
    /// Upper bound on re-mutating a child that came out identical to its
    /// first parent. Past this the duplicate is accepted.
    pub max_mutation_retries: usize,
    /// Mutation rate used for those retries. Independent of `mutation_rate`
    /// so duplicates are still perturbed when regular mutation is off.
    pub retry_mutation_rate: f64,
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            generations: 5,
            population_size: 10,
            tournament_size: 3,
            mutation_rate: 0.1,
            elitism_count: 1,
            max_mutation_retries: 100,
            retry_mutation_rate: 0.1,
            seed: None,
        }
    }
}

impl ConfigSection for SearchConfig {
    fn section_name() -> &'static str {
        "search"
    }

    fn validate(&self) -> Result<(), SearchError> {
        if self.generations == 0 {
            return Err(SearchError::Configuration(
                "At least one generation must run".to_string(),
            ));
        }
        if self.population_size == 0 {
            return Err(SearchError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(SearchError::Configuration(format!(
                "Tournament size must be between 1 and the population size ({}), got {}",
                self.population_size, self.tournament_size
            )));
        }
        if self.elitism_count > self.population_size {
            return Err(SearchError::Configuration(format!(
                "Elitism count {} exceeds population size {}",
                self.elitism_count, self.population_size
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SearchError::Configuration(
                "Mutation rate must be between 0 and 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry_mutation_rate) {
            return Err(SearchError::Configuration(
                "Retry mutation rate must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn oversized_tournament_is_rejected() {
        let config = SearchConfig {
            population_size: 4,
            tournament_size: 5,
            ..SearchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn elitism_may_fill_the_whole_population() {
        let config = SearchConfig {
            population_size: 4,
            tournament_size: 2,
            elitism_count: 4,
            ..SearchConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn mutation_rate_out_of_bounds() {
        let config = SearchConfig {
            mutation_rate: 1.5,
            ..SearchConfig::default()
        };
        assert!(matches!(config.validate(), Err(SearchError::Configuration(_))));
    }

    #[test]
    fn retry_rate_is_checked_separately() {
        let config = SearchConfig {
            mutation_rate: 0.0,
            retry_mutation_rate: -0.1,
            ..SearchConfig::default()
        };
        assert!(matches!(config.validate(), Err(SearchError::Configuration(_))));
    }
}
