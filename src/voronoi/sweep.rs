//! Fortune's sweep
//!
//! The sweep line moves in increasing y. Site events come from a sorted site
//! list, circle events from [`EventQueue`]. Edges and half-edges are created
//! into flat arenas as the beach line changes; dangling edges are resolved
//! against the bounding box afterwards (see `clip.rs`).

use super::beachline::{BeachLine, Location, EPSILON};
use super::events::{CircleEvent, EventQueue};
use super::{Cell, Diagram, Edge, EdgeId, HalfEdge, HalfEdgeId, SiteId};
use crate::error::{CausticError, Result};
use crate::geometry::{BBox, Point};

/// Edge under construction; endpoints may still be missing
#[derive(Debug, Clone)]
pub(crate) struct RawEdge {
    pub left_site: SiteId,
    /// `None` for segments running along the bounding box
    pub right_site: Option<SiteId>,
    pub va: Option<Point>,
    pub vb: Option<Point>,
}

pub(crate) struct Sweep<'a> {
    pub(crate) sites: &'a [Point],
    pub(crate) bbox: BBox,
    beach: BeachLine,
    queue: EventQueue,
    pub(crate) edges: Vec<RawEdge>,
    pub(crate) half_edges: Vec<HalfEdge>,
    /// Half-edges of each cell, indexed like `sites`
    pub(crate) cells: Vec<Vec<HalfEdgeId>>,
}

impl<'a> Sweep<'a> {
    pub fn new(sites: &'a [Point], bbox: BBox) -> Self {
        Self {
            sites,
            bbox,
            beach: BeachLine::new(),
            queue: EventQueue::new(),
            edges: Vec::new(),
            half_edges: Vec::new(),
            cells: vec![Vec::new(); sites.len()],
        }
    }

    /// Run the sweep, clip and close the cells
    pub fn run(mut self) -> Result<Diagram> {
        let sites = self.sites;
        let mut order: Vec<SiteId> = (0..sites.len()).collect();
        order.sort_by(|&a, &b| {
            sites[a]
                .y
                .total_cmp(&sites[b].y)
                .then_with(|| sites[a].x.total_cmp(&sites[b].x))
        });

        let mut next = 0;
        let mut last_position: Option<Point> = None;
        loop {
            let beach = &self.beach;
            let circle = self.queue.peek_live(|event| beach.is_live(event));
            let site = order.get(next).copied();

            match (site, circle) {
                (Some(site), circle)
                    if circle.map_or(true, |c| {
                        let p = sites[site];
                        p.y < c.y || (p.y == c.y && p.x < c.x)
                    }) =>
                {
                    // Coincident sites keep their (empty) cell but get no arc
                    let p = sites[site];
                    let coincident = last_position.map_or(false, |last| {
                        (p.x - last.x).abs() < EPSILON && (p.y - last.y).abs() < EPSILON
                    });
                    if !coincident {
                        self.add_beach_section(site)?;
                        last_position = Some(p);
                    }
                    next += 1;
                }
                (_, Some(circle)) => {
                    self.queue.pop();
                    self.remove_beach_section(circle)?;
                }
                _ => break,
            }
        }

        self.clip_edges();
        self.close_cells()?;
        Ok(self.finish())
    }

    fn add_beach_section(&mut self, site: SiteId) -> Result<()> {
        let p = self.sites[site];
        match self.beach.locate(p.x, p.y, self.sites) {
            Location::Empty => {
                self.beach.insert(0, site);
            }
            Location::Inside(pos) => {
                // Split the arc above the new site in two
                let l_arc = self.beach.id_at(pos);
                let l_site = self.beach.arc(l_arc).site;
                self.beach.arc_mut(l_arc).circle = None;

                let new_arc = self.beach.insert(pos + 1, site);
                let r_arc = self.beach.insert(pos + 2, l_site);
                let edge = self.create_edge(l_site, site, None, None);
                self.beach.arc_mut(new_arc).edge = Some(edge);
                self.beach.arc_mut(r_arc).edge = Some(edge);

                self.attach_circle(pos);
                self.attach_circle(pos + 2);
            }
            Location::RightOf(pos) => {
                // New site on the sweep line right of everything so far
                let l_site = self.beach.site_at(pos);
                let new_arc = self.beach.insert(pos + 1, site);
                let edge = self.create_edge(l_site, site, None, None);
                self.beach.arc_mut(new_arc).edge = Some(edge);
            }
            Location::Between(l, r) => {
                // New site exactly below a breakpoint: that breakpoint becomes a vertex
                let l_arc = self.beach.id_at(l);
                let r_arc = self.beach.id_at(r);
                let l_site = self.beach.arc(l_arc).site;
                let r_site = self.beach.arc(r_arc).site;
                self.beach.arc_mut(l_arc).circle = None;
                self.beach.arc_mut(r_arc).circle = None;

                let vertex = circumcenter(self.sites[l_site], p, self.sites[r_site]).ok_or_else(|| {
                    CausticError::GenerationFailed(format!(
                        "sites {}, {} and {} are collinear at a breakpoint",
                        l_site, site, r_site
                    ))
                })?;

                let new_arc = self.beach.insert(r, site);
                if let Some(edge) = self.beach.arc(r_arc).edge {
                    self.set_edge_start(edge, l_site, r_site, vertex);
                }
                let left_edge = self.create_edge(l_site, site, None, Some(vertex));
                let right_edge = self.create_edge(site, r_site, None, Some(vertex));
                self.beach.arc_mut(new_arc).edge = Some(left_edge);
                self.beach.arc_mut(r_arc).edge = Some(right_edge);

                self.attach_circle(l);
                self.attach_circle(r + 1);
            }
        }
        Ok(())
    }

    fn remove_beach_section(&mut self, event: CircleEvent) -> Result<()> {
        let pos = self.beach.position_of(event.arc).ok_or_else(|| {
            CausticError::GenerationFailed("circle event for an arc off the beach line".to_string())
        })?;
        if pos == 0 || pos + 1 >= self.beach.len() {
            return Err(CausticError::GenerationFailed(
                "vanishing arc has no neighbour on one side".to_string(),
            ));
        }

        let vertex = event.vertex();
        let converges = |c: Option<CircleEvent>| {
            c.map_or(false, |c| {
                (event.x - c.x).abs() < EPSILON && (event.y_center - c.y_center).abs() < EPSILON
            })
        };

        let mut disappearing = vec![self.beach.remove(pos)];

        // Neighbours vanishing at the same vertex go too
        let mut l = pos - 1;
        while l > 0 && converges(self.beach.arc(self.beach.id_at(l)).circle) {
            disappearing.insert(0, self.beach.remove(l));
            l -= 1;
        }
        let l_arc = self.beach.id_at(l);
        self.beach.arc_mut(l_arc).circle = None;
        disappearing.insert(0, l_arc);

        let r = l + 1;
        while r + 1 < self.beach.len() && converges(self.beach.arc(self.beach.id_at(r)).circle) {
            disappearing.push(self.beach.remove(r));
        }
        let r_arc = self.beach.id_at(r);
        self.beach.arc_mut(r_arc).circle = None;
        disappearing.push(r_arc);

        for pair in disappearing.windows(2) {
            let left_site = self.beach.arc(pair[0]).site;
            let right = self.beach.arc(pair[1]);
            if let Some(edge) = right.edge {
                let right_site = right.site;
                self.set_edge_start(edge, left_site, right_site, vertex);
            }
        }

        let l_site = self.beach.arc(l_arc).site;
        let r_site = self.beach.arc(r_arc).site;
        let edge = self.create_edge(l_site, r_site, None, Some(vertex));
        self.beach.arc_mut(r_arc).edge = Some(edge);

        self.attach_circle(l);
        self.attach_circle(l + 1);
        Ok(())
    }

    /// Schedule the circle event of the arc at `pos`, if its neighbours converge
    fn attach_circle(&mut self, pos: usize) {
        if pos == 0 || pos + 1 >= self.beach.len() {
            return;
        }
        let l_site = self.beach.site_at(pos - 1);
        let c_site = self.beach.site_at(pos);
        let r_site = self.beach.site_at(pos + 1);
        if l_site == r_site {
            return;
        }

        let b = self.sites[c_site];
        let a = self.sites[l_site] - b;
        let c = self.sites[r_site] - b;
        // Breakpoints diverge unless the three sites turn the right way
        let d = 2.0 * (a.x * c.y - a.y * c.x);
        if d >= -2e-12 {
            return;
        }
        let ha = a.length_squared();
        let hc = c.length_squared();
        let x = (c.y * ha - a.y * hc) / d;
        let y = (a.x * hc - c.x * ha) / d;
        let y_center = y + b.y;

        let arc = self.beach.id_at(pos);
        let event = CircleEvent {
            id: self.queue.next_id(),
            arc,
            x: x + b.x,
            y: y_center + (x * x + y * y).sqrt(),
            y_center,
        };
        self.beach.arc_mut(arc).circle = Some(event);
        self.queue.push(event);
    }

    pub(crate) fn create_edge(
        &mut self,
        left_site: SiteId,
        right_site: SiteId,
        va: Option<Point>,
        vb: Option<Point>,
    ) -> EdgeId {
        let id = self.edges.len();
        self.edges.push(RawEdge {
            left_site,
            right_site: Some(right_site),
            va: None,
            vb: None,
        });
        if let Some(v) = va {
            self.set_edge_start(id, left_site, right_site, v);
        }
        if let Some(v) = vb {
            self.set_edge_end(id, left_site, right_site, v);
        }

        let l = self.sites[left_site];
        let r = self.sites[right_site];
        self.push_half_edge(id, left_site, (r.y - l.y).atan2(r.x - l.x));
        self.push_half_edge(id, right_site, (l.y - r.y).atan2(l.x - r.x));
        id
    }

    pub(crate) fn push_half_edge(&mut self, edge: EdgeId, site: SiteId, angle: f64) -> HalfEdgeId {
        let id = self.half_edges.len();
        self.half_edges.push(HalfEdge { site, edge, angle });
        self.cells[site].push(id);
        id
    }

    fn set_edge_start(&mut self, edge: EdgeId, left_site: SiteId, right_site: SiteId, vertex: Point) {
        let e = &mut self.edges[edge];
        if e.va.is_none() && e.vb.is_none() {
            e.va = Some(vertex);
            e.left_site = left_site;
            e.right_site = Some(right_site);
        } else if e.left_site == right_site {
            e.vb = Some(vertex);
        } else {
            e.va = Some(vertex);
        }
    }

    fn set_edge_end(&mut self, edge: EdgeId, left_site: SiteId, right_site: SiteId, vertex: Point) {
        self.set_edge_start(edge, right_site, left_site, vertex);
    }

    /// Start and end of a half-edge, if its edge is resolved
    pub(crate) fn endpoints(&self, half_edge: HalfEdgeId) -> Option<(Point, Point)> {
        let he = &self.half_edges[half_edge];
        let edge = &self.edges[he.edge];
        let (va, vb) = (edge.va?, edge.vb?);
        if edge.left_site == he.site {
            Some((va, vb))
        } else {
            Some((vb, va))
        }
    }

    /// Drop unresolved edges and renumber everything into a [`Diagram`]
    fn finish(self) -> Diagram {
        let Sweep {
            sites,
            bbox,
            edges,
            half_edges,
            cells,
            ..
        } = self;

        let mut remap: Vec<Option<EdgeId>> = vec![None; edges.len()];
        let mut resolved = Vec::new();
        for (i, edge) in edges.iter().enumerate() {
            if let (Some(va), Some(vb)) = (edge.va, edge.vb) {
                remap[i] = Some(resolved.len());
                resolved.push(Edge {
                    left_site: edge.left_site,
                    right_site: edge.right_site,
                    va,
                    vb,
                });
            }
        }

        let mut kept_half_edges = Vec::new();
        let cells = cells
            .into_iter()
            .enumerate()
            .map(|(site, ids)| {
                let half_edge_ids = ids
                    .into_iter()
                    .filter_map(|h| {
                        let he = half_edges[h];
                        remap[he.edge].map(|edge| {
                            kept_half_edges.push(HalfEdge { edge, ..he });
                            kept_half_edges.len() - 1
                        })
                    })
                    .collect();
                Cell {
                    site,
                    position: sites[site],
                    half_edges: half_edge_ids,
                }
            })
            .collect();

        Diagram::from_parts(bbox, sites.to_vec(), cells, kept_half_edges, resolved)
    }
}

/// Circumcentre of three points, `None` when they are collinear
fn circumcenter(a: Point, b: Point, c: Point) -> Option<Point> {
    let bx = b.x - a.x;
    let by = b.y - a.y;
    let cx = c.x - a.x;
    let cy = c.y - a.y;
    let d = 2.0 * (bx * cy - by * cx);
    if d == 0.0 {
        return None;
    }
    let hb = bx * bx + by * by;
    let hc = cx * cx + cy * cy;
    let center = Point::new((cy * hb - by * hc) / d + a.x, (bx * hc - cx * hb) / d + a.y);
    center.is_finite().then_some(center)
}
