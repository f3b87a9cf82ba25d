//! Doubly-connected edge list for Voronoi cells
//!
//! Vertices, half-edges and faces live in arenas and refer to each other by
//! index. Every half-edge has its face on its left, so a face boundary walked
//! through `next` runs counter-clockwise (in a y-up frame).
//!
//! # Construction
//!
//! The sweep creates half-edges in twin pairs whose origins are unknown until
//! the breakpoints tracing them collapse. A fresh pair is a pair of 1-cycles
//! (`next` and `prev` point to the half-edge itself); a half-edge whose `next`
//! still points to itself is an open chain end. Frame closure caps and links
//! every open end, after which [`Dcel::validate`] holds.

use std::collections::HashSet;
use std::fmt;

use glam::DVec2;

use crate::error::{Result, VoronoiError};

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(usize);

        impl $name {
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(index)
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "H");
impl_index_type!(FaceId, "F");

/// A finalized mesh point
#[derive(Debug, Clone)]
pub struct Vertex {
    pub position: DVec2,
    /// One half-edge leaving this vertex
    pub incident_edge: Option<HalfEdgeId>,
}

/// One side of a boundary segment
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// Start of the half-edge, unset while its breakpoint is still moving
    pub origin: Option<VertexId>,
    pub twin: HalfEdgeId,
    pub next: HalfEdgeId,
    pub prev: HalfEdgeId,
    /// Face on the left; `None` outside the frame
    pub face: Option<FaceId>,
}

/// The cell of one site
#[derive(Debug, Clone)]
pub struct Face<T> {
    pub site: DVec2,
    pub attributes: T,
    /// A half-edge on the boundary loop
    pub outer_component: Option<HalfEdgeId>,
}

/// Where the twin of an inserted half-edge goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwinSide {
    /// Splice the twin into another face cycle, right before this half-edge
    Splice(HalfEdgeId),
    /// Leave the twin as an open 1-cycle on this face
    Detached(Option<FaceId>),
}

/// Half-edge mesh of a Voronoi diagram
#[derive(Debug, Clone)]
pub struct Dcel<T> {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) half_edges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face<T>>,
}

impl<T> Default for Dcel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dcel<T> {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            half_edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn half_edge_count(&self) -> usize {
        self.half_edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    #[inline]
    pub fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.half_edges[id.index()]
    }

    #[inline]
    pub fn face(&self, id: FaceId) -> &Face<T> {
        &self.faces[id.index()]
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices.iter().enumerate().map(|(i, v)| (VertexId(i), v))
    }

    pub fn half_edges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> + '_ {
        self.half_edges.iter().enumerate().map(|(i, h)| (HalfEdgeId(i), h))
    }

    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face<T>)> + '_ {
        self.faces.iter().enumerate().map(|(i, f)| (FaceId(i), f))
    }

    #[inline]
    pub fn twin(&self, id: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[id.index()].twin
    }

    #[inline]
    pub fn next(&self, id: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[id.index()].next
    }

    #[inline]
    pub fn prev(&self, id: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[id.index()].prev
    }

    #[inline]
    pub fn origin(&self, id: HalfEdgeId) -> Option<VertexId> {
        self.half_edges[id.index()].origin
    }

    /// End of a half-edge (the origin of its twin)
    #[inline]
    pub fn destination(&self, id: HalfEdgeId) -> Option<VertexId> {
        self.origin(self.twin(id))
    }

    #[inline]
    pub fn face_of(&self, id: HalfEdgeId) -> Option<FaceId> {
        self.half_edges[id.index()].face
    }

    /// True while nothing follows this half-edge in its face cycle
    #[inline]
    pub fn is_open_end(&self, id: HalfEdgeId) -> bool {
        self.next(id) == id
    }

    /// True while nothing precedes this half-edge in its face cycle
    #[inline]
    pub fn is_open_start(&self, id: HalfEdgeId) -> bool {
        self.prev(id) == id
    }

    /// Position of a half-edge's origin, if finalized
    pub fn origin_position(&self, id: HalfEdgeId) -> Option<DVec2> {
        self.origin(id).map(|v| self.vertex(v).position)
    }

    pub fn add_face(&mut self, site: DVec2, attributes: T) -> FaceId {
        self.faces.push(Face {
            site,
            attributes,
            outer_component: None,
        });
        FaceId(self.faces.len() - 1)
    }

    pub fn add_vertex(&mut self, position: DVec2) -> VertexId {
        self.vertices.push(Vertex {
            position,
            incident_edge: None,
        });
        VertexId(self.vertices.len() - 1)
    }

    /// Create a twin pair separating `face` (left of the returned half-edge)
    /// from `twin_face`
    ///
    /// Both half-edges start as 1-cycles without origins.
    pub fn add_edge(&mut self, face: Option<FaceId>, twin_face: Option<FaceId>) -> HalfEdgeId {
        let id = HalfEdgeId(self.half_edges.len());
        let twin = HalfEdgeId(id.0 + 1);

        self.half_edges.push(HalfEdge {
            origin: None,
            twin,
            next: id,
            prev: id,
            face,
        });
        self.half_edges.push(HalfEdge {
            origin: None,
            twin: id,
            next: twin,
            prev: twin,
            face: twin_face,
        });

        for (half_edge, face) in [(id, face), (twin, twin_face)] {
            if let Some(face) = face {
                let outer = &mut self.faces[face.index()].outer_component;
                if outer.is_none() {
                    *outer = Some(half_edge);
                }
            }
        }

        id
    }

    /// Fix the start of a half-edge
    pub fn set_origin(&mut self, id: HalfEdgeId, vertex: VertexId) {
        self.half_edges[id.index()].origin = Some(vertex);
        let incident = &mut self.vertices[vertex.index()].incident_edge;
        if incident.is_none() {
            *incident = Some(id);
        }
    }

    /// Move a half-edge that is not yet part of a cycle to another face
    pub fn set_face(&mut self, id: HalfEdgeId, face: Option<FaceId>) {
        if let Some(old) = self.half_edges[id.index()].face {
            let outer = &mut self.faces[old.index()].outer_component;
            if *outer == Some(id) {
                *outer = None;
            }
        }
        self.half_edges[id.index()].face = face;
        if let Some(face) = face {
            let outer = &mut self.faces[face.index()].outer_component;
            if outer.is_none() {
                *outer = Some(id);
            }
        }
    }

    /// Make `next` follow `prev` in their face cycle
    pub fn link(&mut self, prev: HalfEdgeId, next: HalfEdgeId) {
        self.half_edges[prev.index()].next = next;
        self.half_edges[next.index()].prev = prev;
    }

    /// Append a new half-edge starting at `at` right after `after` in its
    /// face cycle and return it
    ///
    /// The new half-edge's twin ends at `at`. With [`TwinSide::Splice`] the
    /// twin is linked in front of the given half-edge, which must start at
    /// `at`; with [`TwinSide::Detached`] it is left open on the given face.
    /// Open ends are kept open: if `after` had no successor, neither has the
    /// new half-edge.
    pub fn insert(&mut self, after: HalfEdgeId, at: VertexId, twin: TwinSide) -> HalfEdgeId {
        let face = self.face_of(after);
        let twin_face = match twin {
            TwinSide::Splice(before) => self.face_of(before),
            TwinSide::Detached(face) => face,
        };

        let edge = self.add_edge(face, twin_face);
        self.set_origin(edge, at);

        let next = self.next(after);
        self.link(after, edge);
        if next != after {
            self.link(edge, next);
        }

        if let TwinSide::Splice(before) = twin {
            let twin_edge = self.twin(edge);
            let prev = self.prev(before);
            self.link(twin_edge, before);
            if prev != before {
                self.link(prev, twin_edge);
            }
        }

        edge
    }

    /// Walk a cycle through `next` starting at `start`
    ///
    /// # Errors
    ///
    /// Returns `BrokenTopology` if the walk does not return to `start` within
    /// the number of half-edges in the mesh.
    pub fn walk(&self, start: HalfEdgeId) -> Result<Vec<HalfEdgeId>> {
        let limit = self.half_edges.len();
        let mut out = Vec::new();
        let mut current = start;

        loop {
            out.push(current);
            if out.len() > limit {
                return Err(VoronoiError::BrokenTopology(format!(
                    "cycle from {:?} does not close",
                    start
                )));
            }
            current = self.next(current);
            if current == start {
                return Ok(out);
            }
        }
    }

    /// Half-edges bounding a face, in order
    pub fn face_loop(&self, face: FaceId) -> Result<Vec<HalfEdgeId>> {
        let start = self.face(face).outer_component.ok_or_else(|| {
            VoronoiError::BrokenTopology(format!("{:?} has no boundary", face))
        })?;
        self.walk(start)
    }

    /// Corner positions of a face boundary, counter-clockwise
    pub fn face_polygon(&self, face: FaceId) -> Result<Vec<DVec2>> {
        self.face_loop(face)?
            .into_iter()
            .map(|h| {
                self.origin_position(h).ok_or_else(|| {
                    VoronoiError::BrokenTopology(format!("{:?} has no origin", h))
                })
            })
            .collect()
    }

    /// The loop of half-edges that have no face (the outside of the frame)
    pub fn outer_loop(&self) -> Result<Vec<HalfEdgeId>> {
        match self.half_edges().find(|(_, h)| h.face.is_none()) {
            Some((start, _)) => self.walk(start),
            None => Ok(Vec::new()),
        }
    }

    /// Half-edges leaving a vertex, rotating through `twin.next`
    pub fn outgoing(&self, vertex: VertexId) -> Result<Vec<HalfEdgeId>> {
        let start = match self.vertex(vertex).incident_edge {
            Some(h) => h,
            None => return Ok(Vec::new()),
        };

        let limit = self.half_edges.len();
        let mut out = Vec::new();
        let mut current = start;
        loop {
            out.push(current);
            if out.len() > limit {
                return Err(VoronoiError::BrokenTopology(format!(
                    "fan around {:?} does not close",
                    vertex
                )));
            }
            current = self.next(self.twin(current));
            if current == start {
                return Ok(out);
            }
        }
    }

    /// Check every structural invariant of a closed mesh
    ///
    /// # Errors
    ///
    /// Returns `BrokenTopology` describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        let broken = |msg: String| Err(VoronoiError::BrokenTopology(msg));

        for (id, h) in self.half_edges() {
            if self.twin(h.twin) != id {
                return broken(format!("{:?}.twin.twin != {:?}", id, id));
            }
            if h.next == id || h.prev == id {
                return broken(format!("{:?} is an open chain end", id));
            }
            if self.prev(h.next) != id || self.next(h.prev) != id {
                return broken(format!("{:?} next/prev links disagree", id));
            }
            if h.origin.is_none() {
                return broken(format!("{:?} has no origin", id));
            }
            if self.origin(h.next) != self.destination(id) {
                return broken(format!("{:?}.next does not start where {:?} ends", id, id));
            }
            if self.face_of(h.next) != h.face {
                return broken(format!("{:?}.next changes face", id));
            }
        }

        let mut seen = HashSet::new();
        for (id, face) in self.faces() {
            let start = match face.outer_component {
                Some(start) => start,
                None => return broken(format!("{:?} has no boundary", id)),
            };
            if self.face_of(start) != Some(id) {
                return broken(format!("{:?}.outer_component belongs elsewhere", id));
            }
            for h in self.walk(start)? {
                seen.insert(h);
            }
        }

        // every bounded half-edge must be reachable from its face
        for (id, h) in self.half_edges() {
            if h.face.is_some() && !seen.contains(&id) {
                return broken(format!("{:?} is not on its face's loop", id));
            }
        }

        Ok(())
    }
}
