use crate::config::ParamRanges;
use crate::engines::generation::genome::{Genome, Param, Perturbation};
use crate::types::{rank_by_fitness, Evaluation};
use rand::seq::index::sample;
use rand::Rng;

/// Tournament selection: best of `tournament_size` distinct candidates.
///
/// Candidates are drawn without replacement; a size larger than the
/// population is clamped to it. On equal loss the candidate drawn first wins.
/// The returned genome is an owned copy.
///
/// # Panics
///
/// Panics if `evaluated` is empty.
pub fn tournament_selection<R: Rng>(
    evaluated: &[Evaluation],
    tournament_size: usize,
    rng: &mut R,
) -> Genome {
    let k = tournament_size.clamp(1, evaluated.len());
    let picks = sample(rng, evaluated.len(), k);

    let mut best_idx = picks.index(0);
    for idx in picks.iter().skip(1) {
        if evaluated[idx].loss < evaluated[best_idx].loss {
            best_idx = idx;
        }
    }

    evaluated[best_idx].genome.clone()
}

/// Uniform crossover: every field comes from either parent with equal odds.
///
/// Both parents must describe the same model shape.
pub fn crossover<R: Rng>(parent1: &Genome, parent2: &Genome, rng: &mut R) -> Genome {
    debug_assert_eq!(
        parent1.shape, parent2.shape,
        "crossover between genomes of different model shapes"
    );

    let mut child = parent1.clone();
    if rng.gen_bool(0.5) {
        child.shape.measurement_count = parent2.shape.measurement_count;
    }
    if rng.gen_bool(0.5) {
        child.shape.input_count = parent2.shape.input_count;
    }
    for param in Param::ALL {
        if rng.gen_bool(0.5) {
            child.take_from(parent2, param);
        }
    }
    child
}

/// Mutation: each ranged field moves with probability `mutation_rate`, then
/// is clamped back into its range. Structural fields are never touched.
pub fn mutate<R: Rng>(
    genome: &mut Genome,
    ranges: &ParamRanges,
    mutation_rate: f64,
    rng: &mut R,
) {
    for param in Param::ALL {
        if !rng.gen_bool(mutation_rate) {
            continue;
        }
        match param.perturbation() {
            Perturbation::Step(step) => {
                if let (Some(range), Some(slot)) = (ranges.int(param), genome.int_mut(param)) {
                    let delta = if rng.gen_bool(0.5) { step } else { -step };
                    *slot = range.clamp(slot.saturating_add(delta));
                }
            }
            Perturbation::Decades(exponents) => {
                if let (Some(range), Some(slot)) = (ranges.real(param), genome.real_mut(param)) {
                    let exponent = exponents[rng.gen_range(0..exponents.len())];
                    *slot = range.clamp(*slot * 10f64.powi(exponent));
                }
            }
        }
    }
}

/// Re-mutate `child` until it differs from `reference`, at most
/// `max_retries` times. Returns `true` when the child ended up distinct; a
/// child that never moves is kept as is.
pub fn mutate_until_distinct<R: Rng>(
    child: &mut Genome,
    reference: &Genome,
    ranges: &ParamRanges,
    mutation_rate: f64,
    max_retries: usize,
    rng: &mut R,
) -> bool {
    let mut retries = 0;
    while child == reference {
        if retries == max_retries {
            return false;
        }
        mutate(child, ranges, mutation_rate, rng);
        retries += 1;
    }
    true
}

/// Top `count` genomes by fitness, copied.
pub fn select_elites(evaluated: &[Evaluation], count: usize) -> Vec<Genome> {
    rank_by_fitness(evaluated)
        .into_iter()
        .take(count)
        .map(|e| e.genome.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IntRange, RealRange};
    use crate::engines::generation::genome::ModelShape;
    use crate::types::Device;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn genome(x_neurons: i64, alpha2: f64) -> Genome {
        Genome {
            shape: ModelShape::default(),
            x_observables: 3,
            u_observables: 3,
            x_neurons,
            u_neurons: 15,
            hidden_x: 2,
            hidden_u: 2,
            alpha0: 0.1,
            alpha1: 1e-7,
            alpha2,
        }
    }

    fn evaluated(losses: &[f64]) -> Vec<Evaluation> {
        losses
            .iter()
            .enumerate()
            .map(|(i, &loss)| Evaluation::new(i, genome(10 + i as i64, 1e-15), Device(0), loss))
            .collect()
    }

    #[test]
    fn full_tournament_returns_global_best() {
        let population = evaluated(&[4.0, 0.5, f64::INFINITY, 2.0, 0.7]);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let winner = tournament_selection(&population, population.len(), &mut rng);
            assert_eq!(winner, population[1].genome);
        }
    }

    #[test]
    fn tournament_never_prefers_a_failure() {
        let population = evaluated(&[f64::INFINITY, 1.0]);
        let mut rng = StdRng::seed_from_u64(11);
        let winner = tournament_selection(&population, 2, &mut rng);
        assert_eq!(winner, population[1].genome);
    }

    #[test]
    fn mutation_at_full_rate_stays_in_range() {
        let ranges = ParamRanges {
            x_neurons: IntRange::new(10, 20),
            alpha2: RealRange::new(1e-18, 1e-12),
            ..ParamRanges::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut g = genome(20, 1e-12);
        for _ in 0..200 {
            mutate(&mut g, &ranges, 1.0, &mut rng);
            assert!(ranges.x_neurons.contains(g.x_neurons));
            assert!(ranges.alpha2.contains(g.alpha2));
            assert!(ranges.hidden_x.contains(g.hidden_x));
        }
        assert_eq!(g.shape, ModelShape::default());
    }

    #[test]
    fn zero_rate_retry_gives_up() {
        let ranges = ParamRanges::default();
        let parent = genome(15, 1e-15);
        let mut child = parent.clone();
        let mut rng = StdRng::seed_from_u64(9);
        let distinct = mutate_until_distinct(&mut child, &parent, &ranges, 0.0, 25, &mut rng);
        assert!(!distinct);
        assert_eq!(child, parent);
    }

    #[test]
    fn retry_produces_distinct_child() {
        let ranges = ParamRanges::default();
        let parent = genome(15, 1e-15);
        let mut child = parent.clone();
        let mut rng = StdRng::seed_from_u64(9);
        assert!(mutate_until_distinct(&mut child, &parent, &ranges, 0.5, 100, &mut rng));
        assert_ne!(child, parent);
    }

    #[test]
    fn elites_are_lowest_losses_in_order() {
        let population = evaluated(&[3.0, 1.0, 2.0, 1.0]);
        let elites = select_elites(&population, 3);
        assert_eq!(
            elites,
            vec![
                population[1].genome.clone(),
                population[3].genome.clone(),
                population[2].genome.clone()
            ]
        );
    }
}
