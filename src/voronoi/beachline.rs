//! Beach line of parabolic arcs
//!
//! Arcs live in an arena (`ArcId` stays valid while the arc is on the line)
//! and the left-to-right order is a plain `Vec<ArcId>`. New sites are located
//! with a binary search over the parabola breakpoints at the current sweep
//! position.

use super::events::CircleEvent;
use super::EdgeId;
use crate::geometry::Point;
use crate::voronoi::SiteId;

/// Breakpoint tolerance
pub(crate) const EPSILON: f64 = 1e-9;

pub(crate) type ArcId = usize;

/// One parabolic arc of the beach line
#[derive(Debug, Clone)]
pub(crate) struct Arc {
    pub site: SiteId,
    /// Edge traced by the breakpoint between this arc and its left neighbour
    pub edge: Option<EdgeId>,
    /// Live circle event for this arc, if any
    pub circle: Option<CircleEvent>,
}

/// Where a new site falls on the beach line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Location {
    /// Beach line is empty
    Empty,
    /// Strictly inside the arc at this position
    Inside(usize),
    /// Exactly on the breakpoint between two neighbouring arcs
    Between(usize, usize),
    /// Right of the last arc, which sits on the sweep line
    RightOf(usize),
}

#[derive(Debug, Default)]
pub(crate) struct BeachLine {
    arcs: Vec<Arc>,
    order: Vec<ArcId>,
}

impl BeachLine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Arc id at a position on the line
    #[inline]
    pub fn id_at(&self, pos: usize) -> ArcId {
        self.order[pos]
    }

    #[inline]
    pub fn arc(&self, id: ArcId) -> &Arc {
        &self.arcs[id]
    }

    #[inline]
    pub fn arc_mut(&mut self, id: ArcId) -> &mut Arc {
        &mut self.arcs[id]
    }

    #[inline]
    pub fn site_at(&self, pos: usize) -> SiteId {
        self.arcs[self.order[pos]].site
    }

    /// Create an arc for `site` and place it at `pos`
    pub fn insert(&mut self, pos: usize, site: SiteId) -> ArcId {
        let id = self.arcs.len();
        self.arcs.push(Arc {
            site,
            edge: None,
            circle: None,
        });
        self.order.insert(pos, id);
        id
    }

    /// Take the arc at `pos` off the line, dropping its circle event
    pub fn remove(&mut self, pos: usize) -> ArcId {
        let id = self.order.remove(pos);
        self.arcs[id].circle = None;
        id
    }

    /// Current position of an arc that is on the line
    pub fn position_of(&self, id: ArcId) -> Option<usize> {
        self.order.iter().position(|&a| a == id)
    }

    /// Whether a circle event is still the live event of its arc
    pub fn is_live(&self, event: &CircleEvent) -> bool {
        self.arcs
            .get(event.arc)
            .and_then(|arc| arc.circle)
            .map_or(false, |c| c.id == event.id)
    }

    /// x of the breakpoint on the left side of the arc at `pos`
    pub fn left_break_point(&self, pos: usize, directrix: f64, sites: &[Point]) -> f64 {
        let site = sites[self.site_at(pos)];
        let (rfocx, rfocy) = (site.x, site.y);
        let pby2 = rfocy - directrix;
        // parabola in degenerate case where focus is on directrix
        if pby2 == 0.0 {
            return rfocx;
        }
        if pos == 0 {
            return f64::NEG_INFINITY;
        }
        let left = sites[self.site_at(pos - 1)];
        let (lfocx, lfocy) = (left.x, left.y);
        let plby2 = lfocy - directrix;
        if plby2 == 0.0 {
            return lfocx;
        }
        let hl = lfocx - rfocx;
        let aby2 = 1.0 / pby2 - 1.0 / plby2;
        let b = hl / plby2;
        if aby2 != 0.0 {
            let discriminant = b * b
                - 2.0 * aby2 * (hl * hl / (-2.0 * plby2) - lfocy + plby2 / 2.0 + rfocy - pby2 / 2.0);
            return (-b + discriminant.max(0.0).sqrt()) / aby2 + rfocx;
        }
        // both parabolas have same distance to directrix, thus break point is midway
        (rfocx + lfocx) / 2.0
    }

    /// x of the breakpoint on the right side of the arc at `pos`
    pub fn right_break_point(&self, pos: usize, directrix: f64, sites: &[Point]) -> f64 {
        if pos + 1 < self.len() {
            return self.left_break_point(pos + 1, directrix, sites);
        }
        let site = sites[self.site_at(pos)];
        if site.y == directrix {
            site.x
        } else {
            f64::INFINITY
        }
    }

    /// Binary search for the arc(s) above `x` at sweep position `directrix`
    pub fn locate(&self, x: f64, directrix: f64, sites: &[Point]) -> Location {
        if self.order.is_empty() {
            return Location::Empty;
        }

        let mut lo = 0;
        let mut hi = self.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let dxl = self.left_break_point(mid, directrix, sites) - x;
            if dxl > EPSILON {
                hi = mid;
                continue;
            }
            let dxr = x - self.right_break_point(mid, directrix, sites);
            if dxr > EPSILON {
                lo = mid + 1;
                continue;
            }
            if dxl > -EPSILON && mid > 0 {
                return Location::Between(mid - 1, mid);
            }
            if dxr > -EPSILON {
                return if mid + 1 < self.len() {
                    Location::Between(mid, mid + 1)
                } else {
                    Location::RightOf(mid)
                };
            }
            return Location::Inside(mid);
        }

        // Only reachable past the right end of the line
        Location::RightOf(self.len() - 1)
    }
}
