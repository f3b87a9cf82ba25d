//! Beach line
//!
//! The sequence of parabolic arcs closest to the sweep line, kept as a binary
//! tree in an arena. Leaves are arcs, internal nodes are the breakpoints
//! between the rightmost arc of their left subtree and the leftmost arc of
//! their right subtree. Arcs are also chained to their left and right
//! neighbors so that triples can be examined without walking the tree.
//!
//! A breakpoint traces one Voronoi edge while the sweep moves. It holds the
//! half-edge whose face is its left arc's site; that half-edge starts where
//! the breakpoint will stop, so its origin is set when the breakpoint
//! collapses in a circle event.

use std::fmt;

use glam::DVec2;

use super::circle;
use super::queue::{CircleEvent, CircleId, EventQueue, SiteId};
use crate::config::DiagramConfig;
use crate::dcel::{Dcel, FaceId, HalfEdgeId, TwinSide, VertexId};
use crate::error::{Result, VoronoiError};
use crate::geometry::breakpoint_x;

/// Index of a beach line node
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N({})", self.0)
    }
}

/// A parabolic arc (leaf)
#[derive(Debug, Clone)]
pub struct Arc {
    pub site: SiteId,
    pub parent: Option<NodeId>,
    /// Neighbor arc to the left along the beach line
    pub left: Option<NodeId>,
    /// Neighbor arc to the right along the beach line
    pub right: Option<NodeId>,
    /// Pending event that would squeeze this arc out
    pub circle: Option<CircleId>,
}

/// Meeting point of two adjacent arcs (internal node)
#[derive(Debug, Clone)]
pub struct Breakpoint {
    pub left_site: SiteId,
    pub right_site: SiteId,
    pub parent: Option<NodeId>,
    pub left_child: NodeId,
    pub right_child: NodeId,
    /// Half-edge on the left site's face traced by this breakpoint
    pub edge: HalfEdgeId,
}

#[derive(Debug, Clone)]
pub enum Node {
    Arc(Arc),
    Breakpoint(Breakpoint),
    Vacant,
}

/// Where a predicted vertex must lie relative to a freshly inserted site
#[derive(Debug, Clone, Copy)]
enum Guard {
    Free,
    LeftOf(f64),
    RightOf(f64),
}

/// Arena-backed beach line
#[derive(Debug, Clone)]
pub struct BeachLine {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    sites: Vec<DVec2>,
    /// Absolute tolerance for heights and circle bottoms
    tolerance: f64,
    /// Relative tolerance for collinear triples
    epsilon: f64,
}

impl BeachLine {
    /// Create an empty beach line over the given site positions
    pub fn new(sites: Vec<DVec2>, config: &DiagramConfig) -> Self {
        Self {
            nodes: Vec::with_capacity(sites.len() * 4),
            free: Vec::new(),
            root: None,
            tolerance: config.tolerance(&sites),
            epsilon: config.epsilon,
            sites,
        }
    }

    /// Absolute tolerance derived from the site coordinates
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn site(&self, site: SiteId) -> DVec2 {
        self.sites[site]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn arc(&self, id: NodeId) -> Result<&Arc> {
        match &self.nodes[id.0] {
            Node::Arc(arc) => Ok(arc),
            _ => Err(VoronoiError::BrokenTopology(format!("{:?} is not an arc", id))),
        }
    }

    fn arc_mut(&mut self, id: NodeId) -> Result<&mut Arc> {
        match &mut self.nodes[id.0] {
            Node::Arc(arc) => Ok(arc),
            _ => Err(VoronoiError::BrokenTopology(format!("{:?} is not an arc", id))),
        }
    }

    pub fn breakpoint(&self, id: NodeId) -> Result<&Breakpoint> {
        match &self.nodes[id.0] {
            Node::Breakpoint(bp) => Ok(bp),
            _ => Err(VoronoiError::BrokenTopology(format!("{:?} is not a breakpoint", id))),
        }
    }

    fn breakpoint_mut(&mut self, id: NodeId) -> Result<&mut Breakpoint> {
        match &mut self.nodes[id.0] {
            Node::Breakpoint(bp) => Ok(bp),
            _ => Err(VoronoiError::BrokenTopology(format!("{:?} is not a breakpoint", id))),
        }
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        match &self.nodes[id.0] {
            Node::Arc(arc) => arc.parent,
            Node::Breakpoint(bp) => bp.parent,
            Node::Vacant => None,
        }
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        match &mut self.nodes[id.0] {
            Node::Arc(arc) => arc.parent = parent,
            Node::Breakpoint(bp) => bp.parent = parent,
            Node::Vacant => {}
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id.0] = Node::Vacant;
        self.free.push(id);
    }

    /// Put `new` where `old` hangs below `parent` (or at the root)
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) -> Result<()> {
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                let bp = self.breakpoint_mut(p)?;
                if bp.left_child == old {
                    bp.left_child = new;
                } else if bp.right_child == old {
                    bp.right_child = new;
                } else {
                    return Err(VoronoiError::BrokenTopology(format!(
                        "{:?} is not a child of {:?}",
                        old, p
                    )));
                }
            }
        }
        self.set_parent(new, parent);
        Ok(())
    }

    /// Start the beach line with the arc of the first site
    pub fn init(&mut self, site: SiteId) -> NodeId {
        let arc = self.alloc(Node::Arc(Arc {
            site,
            parent: None,
            left: None,
            right: None,
            circle: None,
        }));
        self.root = Some(arc);
        arc
    }

    /// Current x of a breakpoint for a sweep line at `sweep_y`
    pub fn breakpoint_position(&self, id: NodeId, sweep_y: f64) -> Result<f64> {
        let bp = self.breakpoint(id)?;
        Ok(breakpoint_x(self.sites[bp.left_site], self.sites[bp.right_site], sweep_y))
    }

    /// Find the arc directly above `point`
    ///
    /// # Errors
    ///
    /// Returns `EmptyBeachLine` before the first site has been inserted.
    pub fn locate(&self, point: DVec2) -> Result<NodeId> {
        let mut current = self.root.ok_or(VoronoiError::EmptyBeachLine)?;
        loop {
            match &self.nodes[current.0] {
                Node::Arc(_) => return Ok(current),
                Node::Breakpoint(bp) => {
                    let x = breakpoint_x(self.sites[bp.left_site], self.sites[bp.right_site], point.y);
                    current = if x >= point.x { bp.left_child } else { bp.right_child };
                }
                Node::Vacant => {
                    return Err(VoronoiError::BrokenTopology(format!(
                        "descent reached vacant {:?}",
                        current
                    )))
                }
            }
        }
    }

    /// Insert the arc of `site` into `arc`, which lies directly above it
    ///
    /// The arc is cut in two around the new one and a twin pair of half-edges
    /// is created for the two new breakpoints. Returns the new arc.
    pub fn split<T>(
        &mut self,
        arc: NodeId,
        site: SiteId,
        queue: &mut EventQueue,
        dcel: &mut Dcel<T>,
    ) -> Result<NodeId> {
        let (old_site, parent, right, pending) = {
            let a = self.arc(arc)?;
            (a.site, a.parent, a.right, a.circle)
        };
        if let Some(id) = pending {
            queue.cancel(id);
        }

        let point = self.sites[site];
        if (self.sites[old_site].y - point.y).abs() <= self.tolerance {
            if let Some(new_arc) = self.split_level(arc, site, queue, dcel)? {
                return Ok(new_arc);
            }
        }

        let edge = dcel.add_edge(Some(FaceId::new(old_site)), Some(FaceId::new(site)));
        let twin = dcel.twin(edge);

        let middle = self.alloc(Node::Arc(Arc {
            site,
            parent: None,
            left: Some(arc),
            right: None,
            circle: None,
        }));
        let tail = self.alloc(Node::Arc(Arc {
            site: old_site,
            parent: None,
            left: Some(middle),
            right,
            circle: None,
        }));
        let inner = self.alloc(Node::Breakpoint(Breakpoint {
            left_site: site,
            right_site: old_site,
            parent: None,
            left_child: middle,
            right_child: tail,
            edge: twin,
        }));
        let outer = self.alloc(Node::Breakpoint(Breakpoint {
            left_site: old_site,
            right_site: site,
            parent,
            left_child: arc,
            right_child: inner,
            edge,
        }));

        self.replace_child(parent, arc, outer)?;
        self.set_parent(inner, Some(outer));
        self.set_parent(middle, Some(inner));
        self.set_parent(tail, Some(inner));
        self.arc_mut(middle)?.right = Some(tail);
        {
            let head = self.arc_mut(arc)?;
            head.parent = Some(outer);
            head.right = Some(middle);
            head.circle = None;
        }
        if let Some(r) = right {
            self.arc_mut(r)?.left = Some(tail);
        }

        self.refresh_circle(arc, point.y, queue, Guard::LeftOf(point.x))?;
        self.refresh_circle(tail, point.y, queue, Guard::RightOf(point.x))?;

        Ok(middle)
    }

    /// Insert a site lying at the same height as the arc above it
    ///
    /// The new arc goes beside the old one, on the side of the new site,
    /// separated from it by a vertical breakpoint. If an arc already sits on
    /// that side, it must be level too and the breakpoint between them must
    /// not have reached a vertex yet: that breakpoint is handed over to the
    /// new arc and its half-edge moves to the new site's face. Otherwise
    /// returns `None` and the caller splits the arc normally.
    fn split_level<T>(
        &mut self,
        arc: NodeId,
        site: SiteId,
        queue: &mut EventQueue,
        dcel: &mut Dcel<T>,
    ) -> Result<Option<NodeId>> {
        let (old_site, parent, left, right) = {
            let a = self.arc(arc)?;
            (a.site, a.parent, a.left, a.right)
        };
        let point = self.sites[site];
        let to_right = point.x > self.sites[old_site].x;

        let beside = if to_right { right } else { left };
        let shared = match beside {
            Some(neighbor) => {
                let neighbor_site = self.arc(neighbor)?.site;
                if (self.sites[neighbor_site].y - point.y).abs() > self.tolerance {
                    return Ok(None);
                }
                let shared = self.bounding_breakpoint(arc, to_right)?.ok_or_else(|| {
                    VoronoiError::BrokenTopology(format!("{:?} has a neighbor but no breakpoint to it", arc))
                })?;
                let edge = self.breakpoint(shared)?.edge;
                let twin = dcel.twin(edge);
                let unfinished = [edge, twin]
                    .iter()
                    .all(|&h| dcel.origin(h).is_none() && dcel.is_open_end(h) && dcel.is_open_start(h));
                if !unfinished {
                    return Ok(None);
                }
                Some(shared)
            }
            None => None,
        };

        // the breakpoint beside the old arc now bounds the new one
        if let Some(shared) = shared {
            let bp = self.breakpoint_mut(shared)?;
            let moved = if to_right {
                bp.left_site = site;
                bp.edge
            } else {
                bp.right_site = site;
                dcel.twin(bp.edge)
            };
            dcel.set_face(moved, Some(FaceId::new(site)));
        }

        let new_arc = self.alloc(Node::Arc(Arc {
            site,
            parent: None,
            left: None,
            right: None,
            circle: None,
        }));
        let (left_arc, right_arc, left_site, right_site) = if to_right {
            (arc, new_arc, old_site, site)
        } else {
            (new_arc, arc, site, old_site)
        };

        let edge = dcel.add_edge(Some(FaceId::new(left_site)), Some(FaceId::new(right_site)));
        let bp = self.alloc(Node::Breakpoint(Breakpoint {
            left_site,
            right_site,
            parent,
            left_child: left_arc,
            right_child: right_arc,
            edge,
        }));

        self.replace_child(parent, arc, bp)?;
        {
            let a = self.arc_mut(left_arc)?;
            a.parent = Some(bp);
            a.left = left;
            a.right = Some(right_arc);
        }
        {
            let a = self.arc_mut(right_arc)?;
            a.parent = Some(bp);
            a.left = Some(left_arc);
            a.right = right;
        }
        if let Some(l) = left {
            self.arc_mut(l)?.right = Some(left_arc);
        }
        if let Some(r) = right {
            self.arc_mut(r)?.left = Some(right_arc);
        }

        for id in [left, Some(left_arc), Some(right_arc), right].into_iter().flatten() {
            self.refresh_circle(id, point.y, queue, Guard::Free)?;
        }

        Ok(Some(new_arc))
    }

    /// The breakpoint on the right (or left) of an arc, `None` at the ends
    fn bounding_breakpoint(&self, arc: NodeId, right_side: bool) -> Result<Option<NodeId>> {
        let mut child = arc;
        let mut current = self.parent(arc);
        while let Some(id) = current {
            let bp = self.breakpoint(id)?;
            let found = if right_side {
                bp.left_child == child
            } else {
                bp.right_child == child
            };
            if found {
                return Ok(Some(id));
            }
            child = id;
            current = bp.parent;
        }
        Ok(None)
    }

    /// Squeeze `arc` out at a vertex located at `center`
    ///
    /// Both breakpoints around the arc stop at the new vertex. One of them is
    /// the arc's parent and disappears with it; the other now separates the
    /// two former neighbors and starts tracing a new edge. Returns the vertex.
    pub fn remove<T>(
        &mut self,
        arc: NodeId,
        center: DVec2,
        sweep_y: f64,
        queue: &mut EventQueue,
        dcel: &mut Dcel<T>,
    ) -> Result<VertexId> {
        let (left, right, parent) = {
            let a = self.arc(arc)?;
            (a.left, a.right, a.parent)
        };
        let (left, right, parent) = match (left, right, parent) {
            (Some(l), Some(r), Some(p)) => (l, r, p),
            _ => {
                return Err(VoronoiError::BrokenTopology(format!(
                    "{:?} is an end of the beach line",
                    arc
                )))
            }
        };

        let (left_bp, right_bp) = self.neighbor_breakpoints(arc)?;
        let survivor = if parent == left_bp {
            right_bp
        } else if parent == right_bp {
            left_bp
        } else {
            return Err(VoronoiError::BrokenTopology(format!(
                "parent of {:?} does not bound it",
                arc
            )));
        };

        // mesh
        let vertex = dcel.add_vertex(center);
        let left_edge = self.breakpoint(left_bp)?.edge;
        let right_edge = self.breakpoint(right_bp)?.edge;
        dcel.set_origin(left_edge, vertex);
        dcel.set_origin(right_edge, vertex);
        let left_twin = dcel.twin(left_edge);
        let right_twin = dcel.twin(right_edge);
        dcel.link(left_twin, right_edge);
        let edge = dcel.insert(right_twin, vertex, TwinSide::Splice(left_edge));
        let traced = dcel.twin(edge);

        // tree
        let sibling = {
            let bp = self.breakpoint(parent)?;
            if bp.left_child == arc {
                bp.right_child
            } else {
                bp.left_child
            }
        };
        let grandparent = self.parent(parent);
        self.replace_child(grandparent, parent, sibling)?;

        let left_site = self.arc(left)?.site;
        let right_site = self.arc(right)?.site;
        {
            let bp = self.breakpoint_mut(survivor)?;
            bp.left_site = left_site;
            bp.right_site = right_site;
            bp.edge = traced;
        }

        self.arc_mut(left)?.right = Some(right);
        self.arc_mut(right)?.left = Some(left);
        self.release(arc);
        self.release(parent);

        self.refresh_circle(left, sweep_y, queue, Guard::Free)?;
        self.refresh_circle(right, sweep_y, queue, Guard::Free)?;

        Ok(vertex)
    }

    /// The breakpoints immediately left and right of an arc
    fn neighbor_breakpoints(&self, arc: NodeId) -> Result<(NodeId, NodeId)> {
        let mut left = None;
        let mut right = None;
        let mut child = arc;
        let mut current = self.parent(arc);

        while let Some(id) = current {
            let bp = self.breakpoint(id)?;
            if left.is_none() && bp.right_child == child {
                left = Some(id);
            }
            if right.is_none() && bp.left_child == child {
                right = Some(id);
            }
            if left.is_some() && right.is_some() {
                break;
            }
            child = id;
            current = bp.parent;
        }

        match (left, right) {
            (Some(l), Some(r)) => Ok((l, r)),
            _ => Err(VoronoiError::BrokenTopology(format!(
                "{:?} is missing a bounding breakpoint",
                arc
            ))),
        }
    }

    /// Drop the arc's pending event and predict a new one from its triple
    fn refresh_circle(&mut self, arc: NodeId, sweep_y: f64, queue: &mut EventQueue, guard: Guard) -> Result<()> {
        let (site, left, right, pending) = {
            let a = self.arc(arc)?;
            (a.site, a.left, a.right, a.circle)
        };
        if let Some(id) = pending {
            queue.cancel(id);
            self.arc_mut(arc)?.circle = None;
        }

        let (left, right) = match (left, right) {
            (Some(l), Some(r)) => (l, r),
            _ => return Ok(()),
        };
        let ids = [self.arc(left)?.site, site, self.arc(right)?.site];
        let points = ids.map(|i| self.sites[i]);

        let circle = match circle::predict(ids, points, sweep_y, self.tolerance, self.epsilon) {
            Some(circle) => circle,
            None => return Ok(()),
        };
        let admitted = match guard {
            Guard::Free => true,
            Guard::LeftOf(x) => circle.center.x < x + self.tolerance,
            Guard::RightOf(x) => circle.center.x >= x - self.tolerance,
        };
        if !admitted {
            return Ok(());
        }

        let id = queue.push_circle(CircleEvent {
            sweep_y: circle.bottom(),
            center: circle.center,
            radius: circle.radius,
            arc,
            alive: true,
        });
        self.arc_mut(arc)?.circle = Some(id);
        log::trace!(
            "circle event for site {} at y={:.6}, center ({:.6}, {:.6})",
            site,
            circle.bottom(),
            circle.center.x,
            circle.center.y
        );
        Ok(())
    }

    /// Arcs from left to right, following the neighbor chain
    pub fn arcs(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = match self.root {
            Some(root) => root,
            None => return out,
        };
        while let Node::Breakpoint(bp) = &self.nodes[current.0] {
            current = bp.left_child;
        }

        let mut next = Some(current);
        while let Some(id) = next {
            out.push(id);
            if out.len() > self.nodes.len() {
                break;
            }
            next = match &self.nodes[id.0] {
                Node::Arc(arc) => arc.right,
                _ => None,
            };
        }
        out
    }

    /// Arcs from left to right, following the tree
    pub fn in_order_arcs(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            match &self.nodes[id.0] {
                Node::Arc(_) => out.push(id),
                Node::Breakpoint(bp) => {
                    stack.push(bp.right_child);
                    stack.push(bp.left_child);
                }
                Node::Vacant => {}
            }
        }
        out
    }

    /// Sites of the arcs from left to right
    pub fn arc_sites(&self) -> Vec<SiteId> {
        self.arcs()
            .into_iter()
            .filter_map(|id| self.arc(id).ok().map(|arc| arc.site))
            .collect()
    }

    fn leftmost_arc(&self, mut id: NodeId) -> Result<&Arc> {
        while let Node::Breakpoint(bp) = &self.nodes[id.0] {
            id = bp.left_child;
        }
        self.arc(id)
    }

    fn rightmost_arc(&self, mut id: NodeId) -> Result<&Arc> {
        while let Node::Breakpoint(bp) = &self.nodes[id.0] {
            id = bp.right_child;
        }
        self.arc(id)
    }

    /// Check that the tree and the neighbor chain describe the same beach line
    ///
    /// # Errors
    ///
    /// Returns `BrokenTopology` naming the first inconsistency.
    pub fn check_invariants(&self) -> Result<()> {
        let broken = |msg: String| Err(VoronoiError::BrokenTopology(msg));

        let chain = self.arcs();
        if chain != self.in_order_arcs() {
            return broken("neighbor chain and tree order disagree".to_string());
        }
        for pair in chain.windows(2) {
            if self.arc(pair[0])?.site == self.arc(pair[1])?.site {
                return broken(format!("{:?} and {:?} share a site", pair[0], pair[1]));
            }
            if self.arc(pair[1])?.left != Some(pair[0]) {
                return broken(format!("{:?}.left is not {:?}", pair[1], pair[0]));
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index);
            if let Node::Breakpoint(bp) = node {
                for child in [bp.left_child, bp.right_child] {
                    if self.parent(child) != Some(id) {
                        return broken(format!("{:?} does not point back to {:?}", child, id));
                    }
                }
                if self.rightmost_arc(bp.left_child)?.site != bp.left_site
                    || self.leftmost_arc(bp.right_child)?.site != bp.right_site
                {
                    return broken(format!("{:?} separates the wrong sites", id));
                }
            }
        }
        Ok(())
    }
}
