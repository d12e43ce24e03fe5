//! Closure of the migration moment.
//!
//! Migration into population `k` from `l` needs the spectrum with one sample
//! moved from `k` to `l`. Only the top moment along `l` is missing from the
//! current spectrum. Sites whose two frequencies coincide (the whole spectrum
//! right after a split) are exchangeable between the populations and are
//! redistributed exactly; the remainder is extended with a quadratic
//! jackknife.

use crate::error::SpectrumError;
use crate::spectrum::binomial_row;
use nalgebra::{DMatrix, DVector};
use ndarray::{ArrayD, Axis, Dimension, IxDyn, Zip};
use std::ops::Range;

/// Source cells per local fit.
const STENCIL: usize = 3;

/// Quadratic jackknife extending one axis from `n` to `n + 1` samples.
///
/// Each lane is read as point masses at frequencies 0 and 1 plus a density
/// that is locally quadratic. Interior cells are fitted on the nearest
/// interior source cells. The boundary cells keep their point mass and pick
/// up the change of the fitted density.
#[derive(Debug, Clone)]
pub(crate) struct Jackknife {
    n: usize,
    weights: Vec<Vec<(usize, f64)>>,
}

impl Jackknife {
    pub(crate) fn new(n: usize) -> Result<Self, SpectrumError> {
        let order = STENCIL.min(n.saturating_sub(1));
        let mut weights = Vec::with_capacity(n + 2);
        if order == 0 {
            weights.push(vec![(0, 1.0)]);
            weights.resize(n + 1, Vec::new());
            weights.push(vec![(n, 1.0)]);
            return Ok(Self { n, weights });
        }

        let mut lost = vec![(0, 1.0)];
        lost.extend(fit(n, order, 0, n + 1, 0)?);
        lost.extend(fit(n, order, 0, n, 0)?.into_iter().map(|(i, w)| (i, -w)));
        weights.push(lost);

        for j in 1..=n {
            weights.push(fit(n, order, j, n + 1, j)?);
        }

        let mut fixed = vec![(n, 1.0)];
        fixed.extend(fit(n, order, n + 1, n + 1, n + 1)?);
        fixed.extend(fit(n, order, n + 1, n, n)?.into_iter().map(|(i, w)| (i, -w)));
        weights.push(fixed);

        Ok(Self { n, weights })
    }

    /// Extends `axis` of `y`, which must hold `n + 1` cells, to `n + 2`.
    pub(crate) fn extend(&self, y: &ArrayD<f64>, axis: usize) -> ArrayD<f64> {
        debug_assert_eq!(y.shape()[axis], self.n + 1);
        let mut shape = y.shape().to_vec();
        shape[axis] = self.n + 2;
        let mut out = ArrayD::zeros(IxDyn(&shape));
        Zip::from(out.lanes_mut(Axis(axis)))
            .and(y.lanes(Axis(axis)))
            .for_each(|mut dst, src| {
                for (cell, weights) in dst.iter_mut().zip(&self.weights) {
                    *cell = weights.iter().map(|&(i, w)| w * src[i]).sum();
                }
            });
        out
    }
}

/// Weights on the source cells around `target` that evaluate the fitted
/// density at cell `at` of a sample of `size`.
fn fit(
    n: usize,
    order: usize,
    target: usize,
    size: usize,
    at: usize,
) -> Result<Vec<(usize, f64)>, SpectrumError> {
    let cells = stencil(n, order, target);
    let start = cells.start;
    let system = DMatrix::from_fn(order, order, |power, col| {
        density_moment(n, start + col, power)
    });
    let Some(inverse) = system.try_inverse() else {
        return Err(SpectrumError::SingularClosure { n });
    };
    let rhs = DVector::from_fn(order, |power, _| density_moment(size, at, power));
    let solution = inverse * rhs;
    Ok(cells.zip(solution.iter().copied()).collect())
}

/// Interior source cells nearest to cell `target` of the extended axis.
fn stencil(n: usize, order: usize, target: usize) -> Range<usize> {
    let centre = (target * n) as f64 / (n + 1) as f64;
    let start = if order == STENCIL {
        centre.round() - 1.0
    } else {
        centre.floor()
    };
    let start = (start.max(1.0) as usize).min(n - order);
    start..start + order
}

/// Expected count in cell `i` of a sample of `n` under the density `x^power`.
fn density_moment(n: usize, i: usize, power: usize) -> f64 {
    let rising: f64 = (1..=power).map(|q| (i + q) as f64).product();
    let denominator: f64 = (1..=power + 1).map(|q| (n + q) as f64).product();
    rising / denominator
}

/// Sums populations `k` and `l` by their combined derived count.
///
/// Every axis is kept: `k` collapses to a single cell and `l` holds the
/// pooled count.
pub(crate) fn pool(y: &ArrayD<f64>, k: usize, l: usize) -> ArrayD<f64> {
    let mut shape = y.shape().to_vec();
    shape[l] += shape[k] - 1;
    shape[k] = 1;
    let mut pooled = ArrayD::zeros(IxDyn(&shape));
    for (idx, &value) in y.indexed_iter() {
        let mut at = idx.clone();
        at[l] = idx[k] + idx[l];
        at[k] = 0;
        pooled[at.slice()] += value;
    }
    pooled
}

/// Spreads pooled counts over samples of `n_k` and `n_l` as if both
/// populations shared one allele frequency.
pub(crate) fn spread(
    pooled: &ArrayD<f64>,
    k: usize,
    l: usize,
    n_k: usize,
    n_l: usize,
) -> ArrayD<f64> {
    debug_assert_eq!(pooled.shape()[l], n_k + n_l + 1);
    let c_k = binomial_row(n_k);
    let c_l = binomial_row(n_l);
    let c_total = binomial_row(n_k + n_l);

    let mut shape = pooled.shape().to_vec();
    shape[k] = n_k + 1;
    shape[l] = n_l + 1;
    ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        let (a, j) = (idx[k], idx[l]);
        let mut at = idx.clone();
        at[k] = 0;
        at[l] = a + j;
        pooled[at.slice()] * c_k[a] * c_l[j] / c_total[a + j]
    })
}
