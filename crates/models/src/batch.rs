//! Parallel evaluation of many parameter vectors for one model.

use crate::catalog::ModelEntry;
use crate::errors::ModelError;
use rayon::prelude::*;
use splitmig_spectrum::{Engine, Spectrum};
use tracing::info_span;

/// Evaluate `entry` once per parameter vector on the rayon pool.
///
/// Every evaluation is independent; results come back in input order and a
/// failing vector does not affect the others.
pub fn evaluate_batch<E>(
    entry: &ModelEntry,
    params: &[Vec<f64>],
    ns: &[usize],
    engine: &E,
) -> Vec<Result<Spectrum, ModelError>>
where
    E: Engine + Sync + ?Sized,
{
    let _span = info_span!("evaluate_batch", model = entry.name(), size = params.len()).entered();
    params
        .par_iter()
        .map(|values| entry.evaluate(values, ns, engine))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_model;
    use splitmig_spectrum::MomentEngine;

    #[test]
    fn test_batch_matches_sequential() {
        let (_, entry) = find_model("sim_split_sym_mig_all").unwrap();
        let params = vec![
            vec![1.0, 1.0, 1.0, 0.5, 0.5, 0.5, 0.1],
            vec![2.0, 0.5, 1.0, 0.1, 0.0, 0.3, 0.2],
            vec![1.0, 1.0],
        ];
        let engine = MomentEngine::new();
        let results = evaluate_batch(entry, &params, &[2, 2, 2], &engine);

        assert_eq!(results.len(), 3);
        for (values, result) in params.iter().zip(&results).take(2) {
            let expected = entry.evaluate(values, &[2, 2, 2], &engine).unwrap();
            assert_eq!(result.as_ref().unwrap(), &expected);
        }
        assert!(matches!(
            results[2],
            Err(ModelError::ParameterCount {
                expected: 7,
                found: 2,
                ..
            })
        ));
    }
}
