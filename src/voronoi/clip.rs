//! Resolving the diagram against its bounding box
//!
//! After the sweep some edges still run off to infinity. They are first
//! connected to the box, then every edge is clipped with Liang–Barsky, and
//! finally each cell is closed by walking the box border between consecutive
//! half-edges that do not meet.

use super::beachline::EPSILON;
use super::sweep::{RawEdge, Sweep};
use super::{EdgeId, HalfEdgeId, SiteId};
use crate::error::{CausticError, Result};
use crate::geometry::Point;

#[inline]
fn eq_eps(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

#[inline]
fn lt_eps(a: f64, b: f64) -> bool {
    b - a > EPSILON
}

#[inline]
fn gt_eps(a: f64, b: f64) -> bool {
    a - b > EPSILON
}

impl<'a> Sweep<'a> {
    /// Connect and clip every edge; edges that fall outside are emptied
    pub(crate) fn clip_edges(&mut self) {
        for id in 0..self.edges.len() {
            let keep = self.connect_edge(id) && self.clip_edge(id) && !self.is_collapsed(id);
            if !keep {
                let edge = &mut self.edges[id];
                edge.va = None;
                edge.vb = None;
            }
        }
    }

    fn is_collapsed(&self, id: EdgeId) -> bool {
        match (self.edges[id].va, self.edges[id].vb) {
            (Some(a), Some(b)) => eq_eps(a.x, b.x) && eq_eps(a.y, b.y),
            _ => true,
        }
    }

    /// Give a dangling edge its missing end point(s) on the bounding box
    ///
    /// Returns `false` when the edge lies entirely outside the box.
    fn connect_edge(&mut self, id: EdgeId) -> bool {
        let RawEdge {
            left_site,
            right_site,
            va,
            vb,
        } = self.edges[id].clone();
        if vb.is_some() {
            return true;
        }
        let Some(right_site) = right_site else {
            return false;
        };

        let (xl, xr, yt, yb) = (
            self.bbox.left(),
            self.bbox.right(),
            self.bbox.top(),
            self.bbox.bottom(),
        );
        let l = self.sites[left_site];
        let r = self.sites[right_site];
        let fx = (l.x + r.x) / 2.0;
        let fy = (l.y + r.y) / 2.0;

        let mut va = va;
        let vb;
        if r.y == l.y {
            // Vertical bisector
            if fx < xl || fx >= xr {
                return false;
            }
            if l.x > r.x {
                if va.map_or(true, |a| a.y < yt) {
                    va = Some(Point::new(fx, yt));
                } else if va.map_or(false, |a| a.y >= yb) {
                    return false;
                }
                vb = Point::new(fx, yb);
            } else {
                if va.map_or(true, |a| a.y > yb) {
                    va = Some(Point::new(fx, yb));
                } else if va.map_or(false, |a| a.y < yt) {
                    return false;
                }
                vb = Point::new(fx, yt);
            }
        } else {
            let fm = (l.x - r.x) / (r.y - l.y);
            let fb = fy - fm * fx;
            if !(-1.0..=1.0).contains(&fm) {
                // Closer to vertical: intersect with top and bottom
                if l.x > r.x {
                    if va.map_or(true, |a| a.y < yt) {
                        va = Some(Point::new((yt - fb) / fm, yt));
                    } else if va.map_or(false, |a| a.y >= yb) {
                        return false;
                    }
                    vb = Point::new((yb - fb) / fm, yb);
                } else {
                    if va.map_or(true, |a| a.y > yb) {
                        va = Some(Point::new((yb - fb) / fm, yb));
                    } else if va.map_or(false, |a| a.y < yt) {
                        return false;
                    }
                    vb = Point::new((yt - fb) / fm, yt);
                }
            } else if l.y < r.y {
                // Closer to horizontal: intersect with left and right
                if va.map_or(true, |a| a.x < xl) {
                    va = Some(Point::new(xl, fm * xl + fb));
                } else if va.map_or(false, |a| a.x >= xr) {
                    return false;
                }
                vb = Point::new(xr, fm * xr + fb);
            } else {
                if va.map_or(true, |a| a.x > xr) {
                    va = Some(Point::new(xr, fm * xr + fb));
                } else if va.map_or(false, |a| a.x < xl) {
                    return false;
                }
                vb = Point::new(xl, fm * xl + fb);
            }
        }

        let edge = &mut self.edges[id];
        edge.va = va;
        edge.vb = Some(vb);
        true
    }

    /// Liang–Barsky clipping of a fully connected edge
    fn clip_edge(&mut self, id: EdgeId) -> bool {
        let (Some(a), Some(b)) = (self.edges[id].va, self.edges[id].vb) else {
            return false;
        };
        let (xl, xr, yt, yb) = (
            self.bbox.left(),
            self.bbox.right(),
            self.bbox.top(),
            self.bbox.bottom(),
        );
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;

        // (p, q) per box side: the edge is inside where p * t <= q
        let sides = [(-dx, a.x - xl), (dx, xr - a.x), (-dy, a.y - yt), (dy, yb - a.y)];
        for (p, q) in sides {
            if p == 0.0 {
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return false;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return false;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }

        let edge = &mut self.edges[id];
        if t0 > 0.0 {
            edge.va = Some(Point::new(a.x + t0 * dx, a.y + t0 * dy));
        }
        if t1 < 1.0 {
            edge.vb = Some(Point::new(a.x + t1 * dx, a.y + t1 * dy));
        }
        true
    }

    /// Order every cell's half-edges and close the gaps along the box border
    pub(crate) fn close_cells(&mut self) -> Result<()> {
        let edges = &self.edges;
        let half_edges = &self.half_edges;
        for ids in self.cells.iter_mut() {
            ids.retain(|&h| {
                let edge = &edges[half_edges[h].edge];
                edge.va.is_some() && edge.vb.is_some()
            });
            // Descending angle around the site
            ids.sort_by(|&a, &b| half_edges[b].angle.total_cmp(&half_edges[a].angle));
        }

        // No bisector crosses the box: the nearest site owns all of it
        if self.cells.iter().all(|ids| ids.is_empty()) {
            let center = Point::new(
                (self.bbox.left() + self.bbox.right()) / 2.0,
                (self.bbox.top() + self.bbox.bottom()) / 2.0,
            );
            if let Some((cell, _)) = self
                .sites
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.distance_squared(center).total_cmp(&b.distance_squared(center)))
            {
                self.enclose_box(cell);
            }
            return Ok(());
        }

        for cell in 0..self.cells.len() {
            let mut i_left = 0;
            while i_left < self.cells[cell].len() {
                let n = self.cells[cell].len();
                let current = self.cells[cell][i_left];
                let following = self.cells[cell][(i_left + 1) % n];
                let (Some((_, va)), Some((vz, _))) = (self.endpoints(current), self.endpoints(following))
                else {
                    return Err(CausticError::GenerationFailed(format!(
                        "cell {} kept an unresolved half-edge",
                        cell
                    )));
                };
                if !eq_eps(va.x, vz.x) || !eq_eps(va.y, vz.y) {
                    i_left = self.walk_border(cell, i_left, va, vz)?;
                }
                i_left += 1;
            }
        }
        Ok(())
    }

    /// Give `cell` the whole box as its boundary
    fn enclose_box(&mut self, cell: SiteId) {
        let (xl, xr, yt, yb) = (
            self.bbox.left(),
            self.bbox.right(),
            self.bbox.top(),
            self.bbox.bottom(),
        );
        let corners = [
            Point::new(xl, yt),
            Point::new(xl, yb),
            Point::new(xr, yb),
            Point::new(xr, yt),
        ];
        for i in 0..corners.len() {
            let va = corners[i];
            let vb = corners[(i + 1) % corners.len()];
            self.push_border_edge(cell, va, vb);
        }
    }

    fn push_border_edge(&mut self, cell: SiteId, va: Point, vb: Point) -> HalfEdgeId {
        let edge = self.edges.len();
        self.edges.push(RawEdge {
            left_site: cell,
            right_site: None,
            va: Some(va),
            vb: Some(vb),
        });
        self.push_half_edge(edge, cell, (vb.x - va.x).atan2(va.y - vb.y))
    }

    /// Insert border half-edges from `va` to `vz` after position `i_left`
    ///
    /// Walks the box counter-clockwise on screen (left, bottom, right, top)
    /// and returns the position of the last inserted half-edge.
    fn walk_border(&mut self, cell: SiteId, mut i_left: usize, va: Point, vz: Point) -> Result<usize> {
        let (xl, xr, yt, yb) = (
            self.bbox.left(),
            self.bbox.right(),
            self.bbox.top(),
            self.bbox.bottom(),
        );

        let first_side = if eq_eps(va.x, xl) && lt_eps(va.y, yb) {
            0
        } else if eq_eps(va.y, yb) && lt_eps(va.x, xr) {
            1
        } else if eq_eps(va.x, xr) && gt_eps(va.y, yt) {
            2
        } else if eq_eps(va.y, yt) && gt_eps(va.x, xl) {
            3
        } else {
            return Err(CausticError::GenerationFailed(format!(
                "cell {} is open at ({}, {}), away from the bounding box",
                cell, va.x, va.y
            )));
        };

        let mut va = va;
        for step in 0..(7 - first_side) {
            let (vb, last) = match (first_side + step) % 4 {
                0 => {
                    let last = eq_eps(vz.x, xl);
                    (Point::new(xl, if last { vz.y } else { yb }), last)
                }
                1 => {
                    let last = eq_eps(vz.y, yb);
                    (Point::new(if last { vz.x } else { xr }, yb), last)
                }
                2 => {
                    let last = eq_eps(vz.x, xr);
                    (Point::new(xr, if last { vz.y } else { yt }), last)
                }
                _ => {
                    let last = eq_eps(vz.y, yt);
                    (Point::new(if last { vz.x } else { xl }, yt), last)
                }
            };

            let half_edge = self.push_border_edge(cell, va, vb);
            // push_half_edge appends; move it right after the current one
            self.cells[cell].pop();
            i_left += 1;
            self.cells[cell].insert(i_left, half_edge);

            if last {
                return Ok(i_left);
            }
            va = vb;
        }

        Err(CausticError::GenerationFailed(format!(
            "cell {} could not be closed along the bounding box",
            cell
        )))
    }
}
