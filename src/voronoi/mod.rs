//! Planar Voronoi diagrams (Fortune's sweep)
//!
//! [`compute_diagram`] turns a set of sites and a clipping box into a
//! [`Diagram`]: flat arenas of cells, half-edges and edges that refer to each
//! other through integer handles. Cell `i` always belongs to input site `i`.
//!
//! # Example
//!
//! ```rust
//! use toon_ocean::geometry::{BBox, Point};
//! use toon_ocean::voronoi::compute_diagram;
//!
//! let sites = vec![Point::new(25.0, 25.0), Point::new(75.0, 25.0), Point::new(50.0, 75.0)];
//! let bbox = BBox::new(0.0, 100.0, 0.0, 100.0).unwrap();
//! let diagram = compute_diagram(&sites, bbox).unwrap();
//!
//! assert_eq!(diagram.cell_count(), 3);
//! let total: f64 = (0..3).map(|id| diagram.cell_area(id)).sum();
//! assert!((total - bbox.area()).abs() < 1e-6);
//! ```

mod beachline;
mod clip;
mod events;
mod sweep;

use crate::error::{CausticError, Result};
use crate::geometry::{polygon_area, BBox, Point};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// Index of an input site (and of its cell)
pub type SiteId = usize;
/// Index into [`Diagram::edges`]
pub type EdgeId = usize;
/// Index into the diagram's half-edge arena
pub type HalfEdgeId = usize;

/// A bisector segment between two neighbouring sites, or a border segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub left_site: SiteId,
    /// `None` for segments running along the bounding box
    pub right_site: Option<SiteId>,
    pub va: Point,
    pub vb: Point,
}

impl Edge {
    /// Whether the edge lies on the bounding box rather than between two cells
    #[inline]
    pub fn is_border(&self) -> bool {
        self.right_site.is_none()
    }
}

/// One directed side of an [`Edge`], bounding exactly one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    /// The cell (site) this half-edge bounds
    pub site: SiteId,
    pub edge: EdgeId,
    /// Ordering key around the site
    pub angle: f64,
}

/// The region of the bounding box closest to one site
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub site: SiteId,
    /// Position of the site
    pub position: Point,
    /// Boundary in a single rotational order; `end` of one half-edge is the
    /// `start` of the next. Empty for degenerate (coincident) sites.
    pub half_edges: Vec<HalfEdgeId>,
}

impl Cell {
    /// Cells of coincident sites never receive a boundary
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.half_edges.is_empty()
    }
}

/// Result of a Voronoi computation
///
/// Fully determined by its inputs; there is no hidden state.
#[derive(Clone)]
pub struct Diagram {
    bbox: BBox,
    sites: Vec<Point>,
    cells: Vec<Cell>,
    half_edges: Vec<HalfEdge>,
    edges: Vec<Edge>,
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

/// Compute the Voronoi diagram of `sites` clipped to `bbox`
///
/// # Errors
///
/// - `InvalidInput` if `sites` is empty or holds a non-finite coordinate
/// - `GenerationFailed` if a cell cannot be closed against the box
///   (numerical breakdown on pathological input)
pub fn compute_diagram(sites: &[Point], bbox: BBox) -> Result<Diagram> {
    validate_sites(sites)?;
    sweep::Sweep::new(sites, bbox).run()
}

fn validate_sites(sites: &[Point]) -> Result<()> {
    if sites.is_empty() {
        return Err(CausticError::InvalidInput(
            "at least one site is required".to_string(),
        ));
    }
    if let Some((i, p)) = sites.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        return Err(CausticError::InvalidInput(format!(
            "site {} has a non-finite coordinate ({}, {})",
            i, p.x, p.y
        )));
    }
    Ok(())
}

impl Diagram {
    pub(crate) fn from_parts(
        bbox: BBox,
        sites: Vec<Point>,
        cells: Vec<Cell>,
        half_edges: Vec<HalfEdge>,
        edges: Vec<Edge>,
    ) -> Self {
        #[cfg(feature = "spatial-index")]
        let spatial_index = SpatialIndex::new(&sites);

        Self {
            bbox,
            sites,
            cells,
            half_edges,
            edges,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        }
    }

    #[inline]
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    #[inline]
    pub fn sites(&self) -> &[Point] {
        &self.sites
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get a cell by site ID
    pub fn cell(&self, id: SiteId) -> Result<&Cell> {
        self.cells.get(id).ok_or(CausticError::CellNotFound(id))
    }

    /// All resolved edges, border segments included
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.half_edges[id]
    }

    /// Start point of a half-edge when walking around its cell
    pub fn start_point(&self, id: HalfEdgeId) -> Point {
        let he = &self.half_edges[id];
        let edge = &self.edges[he.edge];
        if edge.left_site == he.site {
            edge.va
        } else {
            edge.vb
        }
    }

    /// End point of a half-edge when walking around its cell
    pub fn end_point(&self, id: HalfEdgeId) -> Point {
        let he = &self.half_edges[id];
        let edge = &self.edges[he.edge];
        if edge.left_site == he.site {
            edge.vb
        } else {
            edge.va
        }
    }

    /// Polygon of a cell (start point of every half-edge, closed implicitly)
    ///
    /// Empty for degenerate cells and unknown ids.
    pub fn cell_polygon(&self, id: SiteId) -> Vec<Point> {
        self.cells
            .get(id)
            .map(|cell| cell.half_edges.iter().map(|&h| self.start_point(h)).collect())
            .unwrap_or_default()
    }

    /// Explicitly closed outline of a cell
    ///
    /// Start of the first half-edge followed by the end of every half-edge,
    /// so the first vertex is repeated at the end.
    pub fn cell_outline(&self, id: SiteId) -> Vec<Point> {
        let Some(cell) = self.cells.get(id) else {
            return Vec::new();
        };
        let Some(&first) = cell.half_edges.first() else {
            return Vec::new();
        };
        std::iter::once(self.start_point(first))
            .chain(cell.half_edges.iter().map(|&h| self.end_point(h)))
            .collect()
    }

    /// Unsigned area of a cell
    pub fn cell_area(&self, id: SiteId) -> f64 {
        polygon_area(&self.cell_polygon(id)).abs()
    }

    /// Sites sharing an edge with a cell, sorted
    pub fn cell_neighbors(&self, id: SiteId) -> Vec<SiteId> {
        let Some(cell) = self.cells.get(id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<SiteId> = cell
            .half_edges
            .iter()
            .filter_map(|&h| {
                let edge = &self.edges[self.half_edges[h].edge];
                match edge.right_site {
                    Some(r) if edge.left_site == id => Some(r),
                    Some(_) => Some(edge.left_site),
                    None => None,
                }
            })
            .collect();
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors
    }

    /// Cell whose site is nearest to `point`
    ///
    /// Returns `None` when the point lies outside the bounding box.
    pub fn find_cell_at(&self, point: Point) -> Option<SiteId> {
        if !self.bbox.contains(point) {
            return None;
        }
        #[cfg(feature = "spatial-index")]
        {
            Some(self.spatial_index.find_nearest(point))
        }
        #[cfg(not(feature = "spatial-index"))]
        {
            self.sites
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.distance_squared(point).total_cmp(&b.distance_squared(point)))
                .map(|(id, _)| id)
        }
    }
}

impl std::fmt::Debug for Diagram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagram")
            .field("bbox", &self.bbox)
            .field("cells", &self.cells.len())
            .field("edges", &self.edges.len())
            .finish()
    }
}
