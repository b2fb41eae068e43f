//! Exact Euclidean dilation of dexel volumes.
//!
//! Every source interval is a segment on its column's centre line. Offsetting
//! the set of segments by `r` gives, on an output column at planar distance
//! `d` from a source column, that column's intervals grown by
//! `sqrt(r² - d²)` on both ends. Since `d² = dy² + dz²` separates, the
//! candidates are gathered in two passes, first across Y then across Z,
//! each carrying the squared planar distance accumulated so far as the
//! interval's weight. This is the power distance of a point on the column
//! to the weighted interval, so the construction is a one-dimensional power
//! diagram per column.
//!
//! Between passes an interval is dropped when its weight already exceeds
//! `r²` or another interval contains it with no larger weight, since
//! growing it can never add anything.

use mesh_grid::check_grid_size;
use rayon::prelude::*;
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DexelError, DexelResult};
use crate::volume::{Column, DexelVolume};

/// Configuration for dexel dilation and the resampling that follows it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DilationConfig {
    /// Dilation radius in world units. Default: 3.0.
    pub radius: f64,
    /// Sub-samples per column cell when resampling to a grid. Default: 2.
    pub samples_per_cell: usize,
    /// Process columns on the rayon thread pool. Default: true.
    pub parallel: bool,
    /// Upper bound on `depth × columns` of the dilated volume. Default: 256³.
    pub max_grid_cells: usize,
}

impl Default for DilationConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            samples_per_cell: 2,
            parallel: true,
            max_grid_cells: 256 * 256 * 256,
        }
    }
}

impl DilationConfig {
    /// Configuration that leaves the volume unchanged.
    #[must_use]
    pub fn none() -> Self {
        Self {
            radius: 0.0,
            ..Self::default()
        }
    }

    /// Set the dilation radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Set the resampling density.
    #[must_use]
    pub const fn with_samples_per_cell(mut self, samples_per_cell: usize) -> Self {
        self.samples_per_cell = samples_per_cell;
        self
    }

    /// Enable or disable parallel column processing.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the cell budget of the dilated volume.
    #[must_use]
    pub const fn with_max_grid_cells(mut self, max_grid_cells: usize) -> Self {
        self.max_grid_cells = max_grid_cells;
        self
    }
}

/// Interval with the squared planar distance to its source column.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Weighted {
    lo: f64,
    hi: f64,
    weight: f64,
}

/// Dilate a volume by `radius` using the default configuration.
///
/// # Errors
///
/// See [`dilate_with`].
///
/// # Example
///
/// ```
/// use mesh_dexel::{dilate, DexelVolume};
/// use mesh_types::Point3;
///
/// let volume =
///     DexelVolume::from_columns(Point3::origin(), 1.0, (1, 1), 1, vec![vec![0.0, 1.0]]).unwrap();
/// let grown = dilate(&volume, 1.5).unwrap();
///
/// assert_eq!(grown.grid_size(), (5, 5));
/// assert_eq!(grown.column(2, 2), &[-1.5, 2.5]);
/// assert_eq!(dilate(&volume, 0.0).unwrap(), volume);
/// ```
pub fn dilate(volume: &DexelVolume, radius: f64) -> DexelResult<DexelVolume> {
    dilate_with(volume, &DilationConfig::default().with_radius(radius))
}

/// Dilate a volume by `config.radius`.
///
/// A point on an output column centre line is solid iff its distance to
/// the nearest source segment is at most the radius. The output grid grows
/// by `ceil(radius / h)` columns on every side and its X range by the same
/// number of cells, so the result is never clipped. The input is not
/// modified.
///
/// # Errors
///
/// Returns [`DexelError::InvalidRadius`] for a negative or non-finite
/// radius, and [`GridError::GridTooLarge`](mesh_grid::GridError::GridTooLarge)
/// when the grown grid would exceed `config.max_grid_cells`.
pub fn dilate_with(volume: &DexelVolume, config: &DilationConfig) -> DexelResult<DexelVolume> {
    let r = config.radius;
    if !r.is_finite() || r < 0.0 {
        return Err(DexelError::InvalidRadius(r));
    }
    if r == 0.0 {
        return Ok(volume.clone());
    }

    let h = volume.cell_size();
    // Saturates for huge radii; the size check below rejects those.
    let pad = (r / h).ceil() as usize;
    let grow = |n: usize| {
        pad.checked_mul(2)
            .and_then(|p| n.checked_add(p))
            .unwrap_or(usize::MAX)
    };
    let (gy, gz) = volume.grid_size();
    let (oy, oz, depth) = (grow(gy), grow(gz), grow(volume.depth()));
    check_grid_size((depth, oy, oz), config.max_grid_cells)?;

    let shift = pad as f64 * h;
    let origin = volume.origin() - mesh_types::Vector3::repeat(shift);

    if volume.is_empty() {
        return Ok(DexelVolume::from_parts(
            origin,
            h,
            (oy, oz),
            depth,
            vec![Column::new(); oy * oz],
        ));
    }

    let r2 = r * r;
    let offsets: Vec<(isize, f64)> = (-(pad as isize)..=pad as isize)
        .map(|d| (d, (d as f64 * h).powi(2)))
        .filter(|&(_, c)| c <= r2)
        .collect();

    // Pass 1: gather across Y for every (output j, source k).
    let across_y = map_columns(oy * gz, config.parallel, |idx| {
        let (oj, k) = (idx % oy, idx / oy);
        let mut out = Vec::new();
        for &(dy, c) in &offsets {
            let Some(j) = source_index(oj, pad, dy, gy) else {
                continue;
            };
            out.extend(volume.column(j, k).chunks_exact(2).map(|pair| Weighted {
                lo: pair[0],
                hi: pair[1],
                weight: c,
            }));
        }
        prune(out, r2)
    });

    // Pass 2: gather across Z and grow.
    let columns = map_columns(oy * oz, config.parallel, |idx| {
        let (oj, ok) = (idx % oy, idx / oy);
        let mut out = Vec::new();
        for &(dz, c) in &offsets {
            let Some(k) = source_index(ok, pad, dz, gz) else {
                continue;
            };
            out.extend(across_y[oj + oy * k].iter().map(|w| Weighted {
                weight: w.weight + c,
                ..*w
            }));
        }
        grow_and_merge(&prune(out, r2), r2)
    });

    let result = DexelVolume::from_parts(origin, h, (oy, oz), depth, columns);
    info!(
        radius = r,
        grid = ?(oy, oz),
        solid_columns = result.solid_column_count(),
        "dilated dexel volume"
    );
    Ok(result)
}

/// Source index for output index `out` at neighbour offset `d`.
fn source_index(out: usize, pad: usize, d: isize, len: usize) -> Option<usize> {
    let s = out as isize - pad as isize + d;
    (s >= 0 && (s as usize) < len).then_some(s as usize)
}

fn map_columns<T, F>(count: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        (0..count).into_par_iter().map(f).collect()
    } else {
        (0..count).map(f).collect()
    }
}

/// Drop intervals that can no longer contribute.
fn prune(mut items: Vec<Weighted>, r2: f64) -> Vec<Weighted> {
    items.retain(|w| w.weight <= r2);
    items.sort_by(|a, b| {
        a.weight
            .total_cmp(&b.weight)
            .then(a.lo.total_cmp(&b.lo))
            .then(b.hi.total_cmp(&a.hi))
    });

    let mut kept: Vec<Weighted> = Vec::with_capacity(items.len());
    for item in items {
        let dominated = kept.iter().any(|k| k.lo <= item.lo && k.hi >= item.hi);
        if !dominated {
            kept.push(item);
        }
    }
    if kept.len() > 64 {
        debug!(intervals = kept.len(), "dense column during dilation");
    }
    kept
}

fn grow_and_merge(items: &[Weighted], r2: f64) -> Column {
    let mut grown: Vec<(f64, f64)> = items
        .iter()
        .map(|w| {
            let g = (r2 - w.weight).max(0.0).sqrt();
            (w.lo - g, w.hi + g)
        })
        .collect();
    grown.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut out = Column::new();
    let mut current: Option<(f64, f64)> = None;
    for (lo, hi) in grown {
        current = match current {
            Some((clo, chi)) if lo <= chi => Some((clo, chi.max(hi))),
            Some((clo, chi)) => {
                out.push(clo);
                out.push(chi);
                Some((lo, hi))
            }
            None => Some((lo, hi)),
        };
    }
    if let Some((clo, chi)) = current {
        out.push(clo);
        out.push(chi);
    }
    out
}
