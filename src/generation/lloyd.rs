//! Lloyd's Relaxation for uniform point distribution
//!
//! Lloyd's Relaxation moves each site to the area centroid of its Voronoi
//! cell. One pass already breaks up the clumps of a uniform random draw; a
//! few more passes approach a honeycomb.

use std::time::Instant;

use log::debug;

use crate::error::Result;
use crate::geometry::{polygon_centroid, BBox, Point};
use crate::voronoi::{compute_diagram, Diagram};

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LloydOptions {
    /// Maximum number of passes to run
    pub max_iterations: usize,
    /// Stop when the largest site displacement falls below this (absolute units)
    /// Set to 0.0 to disable early termination
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1,
            convergence_threshold: 0.0,
        }
    }
}

/// One Lloyd step: the area centroid of every non-degenerate cell
///
/// Points come out in cell order. Degenerate cells (no half-edges) are
/// skipped, so the result may be shorter than the site list. A cell with
/// zero area contributes the average of its vertices.
pub fn relax_cells(diagram: &Diagram) -> Vec<Point> {
    relax_with_displacement(diagram).0
}

/// Centroids plus the largest distance any site moved
fn relax_with_displacement(diagram: &Diagram) -> (Vec<Point>, f64) {
    let mut max_displacement: f64 = 0.0;
    let centroids = diagram
        .cells()
        .iter()
        .filter(|cell| !cell.is_degenerate())
        .filter_map(|cell| {
            let centroid = polygon_centroid(&diagram.cell_polygon(cell.site))?;
            max_displacement = max_displacement.max(centroid.distance(cell.position));
            Some(centroid)
        })
        .collect();
    (centroids, max_displacement)
}

/// Apply Lloyd's Relaxation for a fixed number of passes
pub fn lloyd_relaxation(points: Vec<Point>, bbox: BBox, iterations: usize) -> Result<Vec<Point>> {
    let options = LloydOptions {
        max_iterations: iterations,
        ..Default::default()
    };
    lloyd_relaxation_with_options(points, bbox, options)
}

/// Apply Lloyd's Relaxation with custom options
///
/// Every pass recomputes the diagram over `bbox`. An empty point set is
/// returned as is.
///
/// # Errors
///
/// Propagates diagram failures (`InvalidInput` for non-finite points,
/// `GenerationFailed` for numerical breakdown).
pub fn lloyd_relaxation_with_options(
    mut points: Vec<Point>,
    bbox: BBox,
    options: LloydOptions,
) -> Result<Vec<Point>> {
    if points.is_empty() || options.max_iterations == 0 {
        return Ok(points);
    }

    let total_start = Instant::now();
    debug!(
        "[Lloyd] Starting: {} points, max {} iterations, threshold {:.4}",
        points.len(),
        options.max_iterations,
        options.convergence_threshold
    );

    let mut iterations_run = 0;
    let mut converged = false;

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();

        let diagram = compute_diagram(&points, bbox)?;
        let (relaxed, max_displacement) = relax_with_displacement(&diagram);

        points = relaxed;
        iterations_run = iteration + 1;

        debug!(
            "[Lloyd] Iter {}: {} points, total={:?}, max_disp={:.4}",
            iteration + 1,
            points.len(),
            iter_start.elapsed(),
            max_displacement
        );

        if options.convergence_threshold > 0.0 && max_displacement < options.convergence_threshold {
            converged = true;
            debug!(
                "[Lloyd] Converged at iteration {} (max_disp {:.4} < threshold {:.4})",
                iteration + 1,
                max_displacement,
                options.convergence_threshold
            );
            break;
        }
    }

    debug!(
        "[Lloyd] Finished: {} iterations (of max {}), converged={}, total={:?}",
        iterations_run,
        options.max_iterations,
        converged,
        total_start.elapsed()
    );

    Ok(points)
}
