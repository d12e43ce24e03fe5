//! Migration-rate matrices and the topologies they are built from.
//!
//! Entry `(to, from)` of a matrix is the scaled rate (`2 * Na * m`) at which
//! lineages of population `from` migrate into population `to`. The diagonal
//! is always zero.
//!
//! Every topology defines a canonical ordering of the cells its rates fill,
//! so a model can hand over its scalar rates as a flat list:
//!
//! | Topology | Rate order (1-based population labels) |
//! |---|---|
//! | `Isolated` | none |
//! | `SymmetricAdjacent` | `m12, m23, m34, ...` |
//! | `AsymmetricAdjacent` | `m12, m21, m23, m32, ...` |
//! | `SymmetricAll` | upper triangle, row-major: `m12, m13, m23` |
//! | `AsymmetricAll` | off-diagonal, row-major: `m12, m13, m21, m23, m31, m32` |
//! | `SymmetricBarrier` | `SymmetricAll` order within each group |
//! | `AsymmetricBarrier` | `AsymmetricAll` order within each group |

use crate::error::SpectrumError;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which population pairs may exchange migrants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// No gene flow at all.
    Isolated,
    /// Equal rates in both directions between neighbors in a linear arrangement.
    SymmetricAdjacent,
    /// Independent rates per direction between neighbors.
    AsymmetricAdjacent,
    /// Equal rates in both directions between every pair.
    SymmetricAll,
    /// Independent rates for every ordered pair.
    AsymmetricAll,
    /// Symmetric gene flow only within `[0, boundary)` and within `[boundary, n)`.
    SymmetricBarrier { boundary: usize },
    /// Asymmetric gene flow only within the two groups.
    AsymmetricBarrier { boundary: usize },
}

impl Topology {
    /// True when every rate fills both `(i, j)` and `(j, i)`.
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self,
            Self::Isolated
                | Self::SymmetricAdjacent
                | Self::SymmetricAll
                | Self::SymmetricBarrier { .. }
        )
    }

    /// Whether migration into `to` from `from` is allowed.
    pub fn admits(&self, to: usize, from: usize) -> bool {
        if to == from {
            return false;
        }
        match *self {
            Self::Isolated => false,
            Self::SymmetricAdjacent | Self::AsymmetricAdjacent => to.abs_diff(from) == 1,
            Self::SymmetricAll | Self::AsymmetricAll => true,
            Self::SymmetricBarrier { boundary } | Self::AsymmetricBarrier { boundary } => {
                (to < boundary) == (from < boundary)
            }
        }
    }

    /// Cells filled by each rate, in canonical order.
    ///
    /// For symmetric topologies each `(i, j)` also fills `(j, i)`.
    pub fn cells(&self, n: usize) -> Vec<(usize, usize)> {
        match *self {
            Self::Isolated => Vec::new(),
            Self::SymmetricAdjacent => (1..n).map(|j| (j - 1, j)).collect(),
            Self::AsymmetricAdjacent => (1..n).flat_map(|j| [(j - 1, j), (j, j - 1)]).collect(),
            Self::SymmetricAll => upper_triangle(0..n),
            Self::AsymmetricAll => off_diagonal(0..n),
            Self::SymmetricBarrier { boundary } => {
                let mut cells = upper_triangle(0..boundary);
                cells.extend(upper_triangle(boundary..n));
                cells
            }
            Self::AsymmetricBarrier { boundary } => {
                let mut cells = off_diagonal(0..boundary);
                cells.extend(off_diagonal(boundary..n));
                cells
            }
        }
    }

    /// Number of scalar rates the topology takes for `n` populations.
    pub fn rate_count(&self, n: usize) -> usize {
        self.cells(n).len()
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Isolated => write!(f, "isolated"),
            Self::SymmetricAdjacent => write!(f, "symmetric-adjacent"),
            Self::AsymmetricAdjacent => write!(f, "asymmetric-adjacent"),
            Self::SymmetricAll => write!(f, "symmetric-all"),
            Self::AsymmetricAll => write!(f, "asymmetric-all"),
            Self::SymmetricBarrier { boundary } => write!(f, "symmetric-barrier@{boundary}"),
            Self::AsymmetricBarrier { boundary } => write!(f, "asymmetric-barrier@{boundary}"),
        }
    }
}

fn upper_triangle(range: std::ops::Range<usize>) -> Vec<(usize, usize)> {
    let mut cells = Vec::new();
    for i in range.clone() {
        for j in (i + 1)..range.end {
            cells.push((i, j));
        }
    }
    cells
}

fn off_diagonal(range: std::ops::Range<usize>) -> Vec<(usize, usize)> {
    let mut cells = Vec::new();
    for i in range.clone() {
        for j in range.clone() {
            if i != j {
                cells.push((i, j));
            }
        }
    }
    cells
}

/// Square matrix of scaled migration rates with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationMatrix {
    rates: DMatrix<f64>,
}

impl MigrationMatrix {
    /// No migration between any of `n` populations.
    pub fn zeros(n: usize) -> Self {
        Self {
            rates: DMatrix::zeros(n, n),
        }
    }

    /// Build from explicit rows, `rows[to][from]`.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SpectrumError> {
        let n = rows.len();
        let mut rates = DMatrix::zeros(n, n);
        for (to, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(SpectrumError::DimensionMismatch {
                    what: "migration matrix row",
                    expected: n,
                    found: row.len(),
                });
            }
            for (from, &value) in row.iter().enumerate() {
                if to == from {
                    if value != 0.0 {
                        return Err(SpectrumError::NonZeroDiagonal { index: to, value });
                    }
                    continue;
                }
                check_rate(to, from, value)?;
                rates[(to, from)] = value;
            }
        }
        Ok(Self { rates })
    }

    /// Fill the cells of `topology` with `rates` in canonical order.
    pub fn from_topology(
        topology: Topology,
        n: usize,
        rates: &[f64],
    ) -> Result<Self, SpectrumError> {
        if let Topology::SymmetricBarrier { boundary } | Topology::AsymmetricBarrier { boundary } =
            topology
        {
            if boundary == 0 || boundary >= n {
                return Err(SpectrumError::DimensionMismatch {
                    what: "barrier boundary",
                    expected: n.saturating_sub(1),
                    found: boundary,
                });
            }
        }

        let cells = topology.cells(n);
        if cells.len() != rates.len() {
            return Err(SpectrumError::RateCount {
                topology: topology.to_string(),
                expected: cells.len(),
                found: rates.len(),
            });
        }

        let mut matrix = DMatrix::zeros(n, n);
        for (&(to, from), &value) in cells.iter().zip(rates) {
            check_rate(to, from, value)?;
            matrix[(to, from)] = value;
            if topology.is_symmetric() {
                matrix[(from, to)] = value;
            }
        }
        Ok(Self { rates: matrix })
    }

    /// Number of populations.
    pub fn dim(&self) -> usize {
        self.rates.nrows()
    }

    /// Rate of migration into `to` from `from`.
    pub fn get(&self, to: usize, from: usize) -> f64 {
        self.rates[(to, from)]
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.rates
    }

    pub fn is_zero(&self) -> bool {
        self.rates.iter().all(|&r| r == 0.0)
    }

    pub fn is_symmetric(&self) -> bool {
        self.rates == self.rates.transpose()
    }

    /// True when every nonzero entry is a pair `topology` admits.
    pub fn respects(&self, topology: Topology) -> bool {
        let n = self.dim();
        (0..n).all(|to| {
            (0..n).all(|from| self.rates[(to, from)] == 0.0 || topology.admits(to, from))
        })
    }

    /// True when no migration crosses between the two groups in either direction.
    pub fn is_blocked_between(&self, group_a: &[usize], group_b: &[usize]) -> bool {
        group_a.iter().all(|&a| {
            group_b
                .iter()
                .all(|&b| self.rates[(a, b)] == 0.0 && self.rates[(b, a)] == 0.0)
        })
    }

    /// Total incoming migration rate of every population.
    pub(crate) fn row_sums(&self) -> Vec<f64> {
        self.rates.row_iter().map(|row| row.sum()).collect()
    }
}

fn check_rate(to: usize, from: usize, value: f64) -> Result<(), SpectrumError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SpectrumError::InvalidMigrationRate { to, from, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros() {
        let m = MigrationMatrix::zeros(3);
        assert_eq!(m.dim(), 3);
        assert!(m.is_zero());
        assert!(m.is_symmetric());
        assert!(m.respects(Topology::Isolated));
    }

    #[test]
    fn test_symmetric_adjacent() {
        let m = MigrationMatrix::from_topology(Topology::SymmetricAdjacent, 3, &[0.5, 0.7]).unwrap();
        assert_eq!(m.get(0, 1), 0.5);
        assert_eq!(m.get(1, 0), 0.5);
        assert_eq!(m.get(1, 2), 0.7);
        assert_eq!(m.get(2, 1), 0.7);
        assert_eq!(m.get(0, 2), 0.0);
        assert!(m.is_symmetric());
        assert_eq!(m.as_matrix(), &m.as_matrix().transpose());
        assert_eq!(m.as_matrix().shape(), (3, 3));
    }

    #[test]
    fn test_asymmetric_all_order() {
        let rates = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let m = MigrationMatrix::from_topology(Topology::AsymmetricAll, 3, &rates).unwrap();
        // [[0, m12, m13], [m21, 0, m23], [m31, m32, 0]]
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(0, 2), 2.0);
        assert_eq!(m.get(1, 0), 3.0);
        assert_eq!(m.get(1, 2), 4.0);
        assert_eq!(m.get(2, 0), 5.0);
        assert_eq!(m.get(2, 1), 6.0);
        assert!(!m.is_symmetric());
    }

    #[test]
    fn test_barrier_blocks_crossing() {
        let topology = Topology::AsymmetricBarrier { boundary: 2 };
        assert_eq!(topology.rate_count(4), 4);
        let m = MigrationMatrix::from_topology(topology, 4, &[0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(m.get(0, 1), 0.1);
        assert_eq!(m.get(1, 0), 0.2);
        assert_eq!(m.get(2, 3), 0.3);
        assert_eq!(m.get(3, 2), 0.4);
        assert!(m.is_blocked_between(&[0, 1], &[2, 3]));
        assert!(m.respects(topology));
        assert!(!m.respects(Topology::Isolated));
    }

    #[test]
    fn test_rate_count_mismatch() {
        let err = MigrationMatrix::from_topology(Topology::SymmetricAll, 3, &[0.1]).unwrap_err();
        assert_eq!(
            err,
            SpectrumError::RateCount {
                topology: "symmetric-all".to_string(),
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn test_invalid_rates() {
        assert!(matches!(
            MigrationMatrix::from_topology(Topology::SymmetricAll, 2, &[-0.1]),
            Err(SpectrumError::InvalidMigrationRate { .. })
        ));
        assert!(matches!(
            MigrationMatrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 0.0]]),
            Err(SpectrumError::NonZeroDiagonal { index: 0, .. })
        ));
        assert!(matches!(
            MigrationMatrix::from_topology(Topology::SymmetricBarrier { boundary: 4 }, 4, &[]),
            Err(SpectrumError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_from_rows_round_trip() {
        let m = MigrationMatrix::from_rows(&[
            vec![0.0, 0.1, 0.0],
            vec![0.2, 0.0, 0.3],
            vec![0.0, 0.4, 0.0],
        ])
        .unwrap();
        assert!(m.respects(Topology::AsymmetricAdjacent));
        assert!(!m.respects(Topology::SymmetricBarrier { boundary: 1 }));
        assert_eq!(m.row_sums(), vec![0.1, 0.5, 0.4]);
    }
}
