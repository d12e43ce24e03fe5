//! Joint allele-frequency spectrum container.
//!
//! A spectrum over `P` populations is a `P`-dimensional array whose axis `k`
//! has length `n_k + 1`, where `n_k` is the number of sampled chromosomes in
//! population `k`. Entry `[i_1, ..., i_P]` is the expected number of sites at
//! which `i_k` of the `n_k` samples of every population `k` carry the derived
//! allele.
//!
//! The container also provides the two exact sampling operations the rest of
//! the engine relies on: the hypergeometric split of one population into two
//! and the hypergeometric projection down to a smaller sample size.

use crate::error::SpectrumError;
use ndarray::{ArrayD, Axis, Dimension, IxDyn, Zip};
use serde::{Deserialize, Serialize};

/// Expected joint allele-frequency spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    data: ArrayD<f64>,
}

impl Spectrum {
    /// Wrap an existing array. Every axis must hold at least two entries
    /// (sample size of at least one).
    pub fn from_array(data: ArrayD<f64>) -> Result<Self, SpectrumError> {
        if data.ndim() == 0 {
            return Err(SpectrumError::DimensionMismatch {
                what: "spectrum axes",
                expected: 1,
                found: 0,
            });
        }
        if let Some(&len) = data.shape().iter().find(|&&len| len < 2) {
            return Err(SpectrumError::InvalidSampleSize(len.saturating_sub(1)));
        }
        Ok(Self { data })
    }

    /// An all-zero spectrum for the given sample sizes.
    pub fn zeros(sample_sizes: &[usize]) -> Result<Self, SpectrumError> {
        let shape = shape_for(sample_sizes)?;
        Ok(Self {
            data: ArrayD::zeros(IxDyn(&shape)),
        })
    }

    /// Equilibrium neutral spectrum of a single population of constant size.
    ///
    /// The expected number of sites with `i` derived copies out of `n` is
    /// `theta / i` for `0 < i < n`; the monomorphic cells are zero.
    pub fn steady_state(n: usize, theta: f64) -> Result<Self, SpectrumError> {
        if n == 0 {
            return Err(SpectrumError::InvalidSampleSize(n));
        }
        let mut data = ArrayD::zeros(IxDyn(&[n + 1]));
        for i in 1..n {
            data[[i].as_slice()] = theta / i as f64;
        }
        Ok(Self { data })
    }

    /// Number of populations (array dimensionality).
    pub fn populations(&self) -> usize {
        self.data.ndim()
    }

    /// Sample size of every population, in axis order.
    pub fn sample_sizes(&self) -> Vec<usize> {
        self.data.shape().iter().map(|len| len - 1).collect()
    }

    /// Sum of the sample sizes over all populations.
    pub fn total_sample_size(&self) -> usize {
        self.sample_sizes().iter().sum()
    }

    /// Total expected number of sites, monomorphic cells included.
    pub fn sum(&self) -> f64 {
        self.data.sum()
    }

    /// Entry at `index`, or `None` if the index is out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.populations() {
            return None;
        }
        self.data.get(index).copied()
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<f64> {
        self.data
    }

    /// True when no entry is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Split population `axis` into two newly diverged populations.
    ///
    /// The first daughter keeps position `axis` with `left` samples, the
    /// second is appended as the last axis with `right` samples. `left +
    /// right` must equal the current sample size of `axis`. Each parent cell
    /// with `s` derived copies is distributed over the daughter cells `(i, j)`
    /// with `i + j = s` by hypergeometric sampling, so the total is conserved.
    pub fn split(&self, axis: usize, left: usize, right: usize) -> Result<Self, SpectrumError> {
        self.check_axis(axis)?;
        let n = self.data.shape()[axis] - 1;
        if left + right != n {
            return Err(SpectrumError::SplitMismatch { n, left, right });
        }
        if left == 0 || right == 0 {
            return Err(SpectrumError::InvalidSampleSize(0));
        }

        let c_left = binomial_row(left);
        let c_right = binomial_row(right);
        let c_parent = binomial_row(n);

        let mut shape = self.data.shape().to_vec();
        shape[axis] = left + 1;
        shape.push(right + 1);
        let last = shape.len() - 1;

        let data = ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
            let idx = idx.slice();
            let (i, j) = (idx[axis], idx[last]);
            let mut parent = idx[..last].to_vec();
            parent[axis] = i + j;
            self.data[parent.as_slice()] * c_left[i] * c_right[j] / c_parent[i + j]
        });
        Ok(Self { data })
    }

    /// Project population `axis` down to a sample of `target` chromosomes.
    ///
    /// Uses the hypergeometric sub-sampling identity, which is exact.
    pub fn project(&self, axis: usize, target: usize) -> Result<Self, SpectrumError> {
        self.check_axis(axis)?;
        let n = self.data.shape()[axis] - 1;
        if target > n {
            return Err(SpectrumError::ProjectionTooLarge { n, target });
        }
        if target == 0 {
            return Err(SpectrumError::InvalidSampleSize(target));
        }
        if target == n {
            return Ok(self.clone());
        }

        let total = binomial(n, target);
        let weights: Vec<Vec<f64>> = (0..=n)
            .map(|i| {
                (0..=target)
                    .map(|j| binomial(i, j) * binomial(n - i, target - j) / total)
                    .collect()
            })
            .collect();

        let mut shape = self.data.shape().to_vec();
        shape[axis] = target + 1;
        let mut data = ArrayD::zeros(IxDyn(&shape));
        Zip::from(data.lanes_mut(Axis(axis)))
            .and(self.data.lanes(Axis(axis)))
            .for_each(|mut dst, src| {
                for (j, out) in dst.iter_mut().enumerate() {
                    *out = src
                        .iter()
                        .zip(weights.iter())
                        .map(|(&value, row)| value * row[j])
                        .sum();
                }
            });
        Ok(Self { data })
    }

    /// Sum out population `axis`, returning the spectrum of the others.
    pub fn marginalize(&self, axis: usize) -> Result<Self, SpectrumError> {
        self.check_axis(axis)?;
        if self.populations() < 2 {
            return Err(SpectrumError::DimensionMismatch {
                what: "populations to marginalize",
                expected: 2,
                found: self.populations(),
            });
        }
        Ok(Self {
            data: self.data.sum_axis(Axis(axis)),
        })
    }

    /// Exchange the positions of two populations.
    pub fn swap_populations(&self, a: usize, b: usize) -> Result<Self, SpectrumError> {
        self.check_axis(a)?;
        self.check_axis(b)?;
        let mut view = self.data.view();
        view.swap_axes(a, b);
        Ok(Self {
            data: view.as_standard_layout().into_owned(),
        })
    }

    fn check_axis(&self, axis: usize) -> Result<(), SpectrumError> {
        if axis >= self.populations() {
            return Err(SpectrumError::AxisOutOfRange {
                axis,
                populations: self.populations(),
            });
        }
        Ok(())
    }
}

fn shape_for(sample_sizes: &[usize]) -> Result<Vec<usize>, SpectrumError> {
    if sample_sizes.is_empty() {
        return Err(SpectrumError::DimensionMismatch {
            what: "sample sizes",
            expected: 1,
            found: 0,
        });
    }
    sample_sizes
        .iter()
        .map(|&n| {
            if n == 0 {
                Err(SpectrumError::InvalidSampleSize(n))
            } else {
                Ok(n + 1)
            }
        })
        .collect()
}

/// `C(n, k)` for `k = 0..=n`.
pub(crate) fn binomial_row(n: usize) -> Vec<f64> {
    let mut row = Vec::with_capacity(n + 1);
    let mut c = 1.0;
    row.push(c);
    for k in 1..=n {
        c *= (n - k + 1) as f64 / k as f64;
        row.push(c);
    }
    row
}

pub(crate) fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (1..=k).fold(1.0, |acc, i| acc * (n - k + i) as f64 / i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 2), 10.0);
        assert_eq!(binomial(5, 0), 1.0);
        assert_eq!(binomial(3, 4), 0.0);
        assert_eq!(binomial_row(4), vec![1.0, 4.0, 6.0, 4.0, 1.0]);
    }

    #[test]
    fn test_steady_state_values() {
        let fs = Spectrum::steady_state(10, 2.0).unwrap();
        assert_eq!(fs.sample_sizes(), vec![10]);
        assert_eq!(fs.get(&[0]), Some(0.0));
        assert_eq!(fs.get(&[10]), Some(0.0));
        assert!(approx_eq(fs.get(&[1]).unwrap(), 2.0, 1e-12));
        assert!(approx_eq(fs.get(&[4]).unwrap(), 0.5, 1e-12));
    }

    #[test]
    fn test_steady_state_rejects_zero() {
        assert_eq!(
            Spectrum::steady_state(0, 1.0),
            Err(SpectrumError::InvalidSampleSize(0))
        );
    }

    #[test]
    fn test_split_shape_and_total() {
        let fs = Spectrum::steady_state(30, 1.0).unwrap();
        let split = fs.split(0, 10, 20).unwrap();
        assert_eq!(split.sample_sizes(), vec![10, 20]);
        assert!(approx_eq(split.sum(), fs.sum(), 1e-12));

        let split = split.split(1, 10, 10).unwrap();
        assert_eq!(split.sample_sizes(), vec![10, 10, 10]);
        assert_eq!(split.total_sample_size(), 30);
        assert!(approx_eq(split.sum(), fs.sum(), 1e-12));
    }

    #[test]
    fn test_split_marginal_matches_projection() {
        let fs = Spectrum::steady_state(12, 1.0).unwrap();
        let split = fs.split(0, 5, 7).unwrap();

        let marginal = split.marginalize(1).unwrap();
        let projected = fs.project(0, 5).unwrap();
        for i in 0..=5 {
            assert!(approx_eq(
                marginal.get(&[i]).unwrap(),
                projected.get(&[i]).unwrap(),
                1e-12
            ));
        }
    }

    #[test]
    fn test_split_rejects_mismatched_sizes() {
        let fs = Spectrum::steady_state(10, 1.0).unwrap();
        assert_eq!(
            fs.split(0, 4, 5),
            Err(SpectrumError::SplitMismatch {
                n: 10,
                left: 4,
                right: 5
            })
        );
        assert!(matches!(
            fs.split(1, 5, 5),
            Err(SpectrumError::AxisOutOfRange { .. })
        ));
    }

    #[test]
    fn test_project_identity_and_bounds() {
        let fs = Spectrum::steady_state(8, 1.0).unwrap();
        assert_eq!(fs.project(0, 8).unwrap(), fs);
        assert!(matches!(
            fs.project(0, 9),
            Err(SpectrumError::ProjectionTooLarge { n: 8, target: 9 })
        ));
    }

    #[test]
    fn test_project_preserves_total() {
        let fs = Spectrum::steady_state(20, 1.0).unwrap();
        let projected = fs.project(0, 7).unwrap();
        assert_eq!(projected.sample_sizes(), vec![7]);
        assert!(approx_eq(projected.sum(), fs.sum(), 1e-10));
    }

    #[test]
    fn test_swap_populations() {
        let fs = Spectrum::steady_state(9, 1.0).unwrap().split(0, 3, 6).unwrap();
        let swapped = fs.swap_populations(0, 1).unwrap();
        assert_eq!(swapped.sample_sizes(), vec![6, 3]);
        assert_eq!(swapped.get(&[2, 1]), fs.get(&[1, 2]));
    }

    #[test]
    fn test_from_array_validation() {
        let bad = ArrayD::zeros(IxDyn(&[1, 3]));
        assert_eq!(
            Spectrum::from_array(bad),
            Err(SpectrumError::InvalidSampleSize(0))
        );
        let good = ArrayD::zeros(IxDyn(&[3, 4]));
        assert_eq!(
            Spectrum::from_array(good).unwrap().sample_sizes(),
            vec![2, 3]
        );
        assert!(Spectrum::zeros(&[]).is_err());
    }
}
