use crate::config::ParamRanges;
use crate::engines::generation::genome::{Genome, ModelShape, Param};
use rand::Rng;

/// Draw one genome.
///
/// Integer fields are uniform over their inclusive range. Weights are picked
/// from a short list of sensible magnitudes and clamped into range.
pub fn random_genome<R: Rng>(shape: ModelShape, ranges: &ParamRanges, rng: &mut R) -> Genome {
    let mut genome = Genome {
        shape,
        x_observables: 0,
        u_observables: 0,
        x_neurons: 0,
        u_neurons: 0,
        hidden_x: 0,
        hidden_u: 0,
        alpha0: 0.0,
        alpha1: 0.0,
        alpha2: 0.0,
    };

    for param in Param::ALL {
        if let (Some(range), Some(slot)) = (ranges.int(param), genome.int_mut(param)) {
            *slot = rng.gen_range(range.low..=range.high);
        }
        if let (Some(range), Some(slot)) = (ranges.real(param), genome.real_mut(param)) {
            let choices = param.initial_choices();
            let pick = if choices.is_empty() {
                range.low
            } else {
                choices[rng.gen_range(0..choices.len())]
            };
            *slot = range.clamp(pick);
        }
    }

    genome
}

pub fn initialize_population<R: Rng>(
    size: usize,
    shape: ModelShape,
    ranges: &ParamRanges,
    rng: &mut R,
) -> Vec<Genome> {
    (0..size).map(|_| random_genome(shape, ranges, rng)).collect()
}
