//! Frame closure
//!
//! After the sweep, edges that reach infinity are still open. They are cut
//! where they leave a rectangle enclosing every site and vertex, and each
//! face's boundary is closed by walking the rectangle counter-clockwise from
//! where a chain leaves it to where the next chain of the same face enters.
//! The far side of every frame segment has no face; those half-edges form
//! the outer boundary cycle.

use std::collections::HashMap;

use glam::DVec2;

use crate::config::BoundingBox;
use crate::dcel::{Dcel, FaceId, HalfEdgeId, TwinSide, VertexId};
use crate::error::{Result, VoronoiError};

/// Rectangle used to cap infinite edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub min: DVec2,
    pub max: DVec2,
}

impl Frame {
    /// Smallest rectangle holding the box, the sites and the vertices, grown
    /// on every side by `margin` times its larger extent
    pub fn enclosing(bbox: &BoundingBox, sites: &[DVec2], vertices: &[DVec2], margin: f64) -> Self {
        let (lo, hi) = sites
            .iter()
            .chain(vertices)
            .fold((bbox.min(), bbox.max()), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let pad = (hi - lo).max_element() * margin;
        Self {
            min: lo - DVec2::splat(pad),
            max: hi + DVec2::splat(pad),
        }
    }

    #[inline]
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// Length of the boundary
    #[inline]
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.size().x + self.size().y)
    }

    /// Corners counter-clockwise, starting at the minimum
    pub fn corners(&self) -> [DVec2; 4] {
        [
            self.min,
            DVec2::new(self.max.x, self.min.y),
            self.max,
            DVec2::new(self.min.x, self.max.y),
        ]
    }

    /// Where a ray from an inside point leaves the frame
    ///
    /// Returns `None` for a zero direction.
    pub fn exit(&self, origin: DVec2, direction: DVec2) -> Option<DVec2> {
        let mut t = f64::INFINITY;
        if direction.x > 0.0 {
            t = t.min((self.max.x - origin.x) / direction.x);
        } else if direction.x < 0.0 {
            t = t.min((self.min.x - origin.x) / direction.x);
        }
        if direction.y > 0.0 {
            t = t.min((self.max.y - origin.y) / direction.y);
        } else if direction.y < 0.0 {
            t = t.min((self.min.y - origin.y) / direction.y);
        }

        if !t.is_finite() {
            return None;
        }
        Some((origin + direction * t.max(0.0)).clamp(self.min, self.max))
    }

    /// Distance along the boundary, counter-clockwise from the minimum corner,
    /// of a point on (or near) the boundary
    pub fn boundary_position(&self, point: DVec2) -> f64 {
        let size = self.size();
        let p = point.clamp(self.min, self.max);

        let sides = [
            (p.y - self.min.y, p.x - self.min.x),
            (self.max.x - p.x, size.x + (p.y - self.min.y)),
            (self.max.y - p.y, size.x + size.y + (self.max.x - p.x)),
            (p.x - self.min.x, 2.0 * size.x + size.y + (self.max.y - p.y)),
        ];
        let (_, position) = sides
            .iter()
            .copied()
            .fold((f64::INFINITY, 0.0), |best, side| if side.0 < best.0 { side } else { best });
        position.rem_euclid(self.perimeter())
    }

    fn corner_positions(&self) -> [f64; 4] {
        let size = self.size();
        [0.0, size.x, size.x + size.y, 2.0 * size.x + size.y]
    }
}

/// Cap every open edge at the frame and close all face boundaries
///
/// # Errors
///
/// Returns `BrokenTopology` when an open chain has no partner to close with.
pub fn close<T>(dcel: &mut Dcel<T>, frame: &Frame) -> Result<()> {
    if dcel.half_edge_count() == 0 {
        return match dcel.face_count() {
            0 => Ok(()),
            1 => close_lone_face(dcel, frame),
            n => Err(VoronoiError::BrokenTopology(format!("{} faces share no edge", n))),
        };
    }

    cap_open_edges(dcel, frame)?;

    // exits end on the frame, entries start on it
    let mut entries: HashMap<FaceId, Vec<(f64, HalfEdgeId)>> = HashMap::new();
    let mut exits = Vec::new();
    for (id, h) in dcel.half_edges() {
        let face = match h.face {
            Some(face) => face,
            None => continue,
        };
        if h.prev == id {
            let position = boundary_point(dcel, id, frame)?;
            entries.entry(face).or_default().push((position, id));
        }
        if h.next == id {
            exits.push((face, id));
        }
    }

    let perimeter = frame.perimeter();
    let corners = frame.corners();
    let corner_positions = frame.corner_positions();
    let mut claimed = Vec::new();

    for (face, exit) in exits {
        let end = dcel
            .destination(exit)
            .ok_or_else(|| VoronoiError::BrokenTopology(format!("{:?} has no end", exit)))?;
        let from = frame.boundary_position(dcel.vertex(end).position);

        let (span, entry) = entries
            .get(&face)
            .and_then(|candidates| {
                candidates
                    .iter()
                    .map(|&(to, entry)| ((to - from).rem_euclid(perimeter), entry))
                    .min_by(|a, b| a.0.total_cmp(&b.0))
            })
            .ok_or_else(|| {
                VoronoiError::BrokenTopology(format!("{:?} leaves the frame and never returns", face))
            })?;
        if claimed.contains(&entry) {
            return Err(VoronoiError::BrokenTopology(format!(
                "{:?} is entered twice along the frame",
                entry
            )));
        }
        claimed.push(entry);

        let start = dcel
            .origin(entry)
            .ok_or_else(|| VoronoiError::BrokenTopology(format!("{:?} has no origin", entry)))?;

        let mut passed: Vec<(f64, DVec2)> = corner_positions
            .iter()
            .zip(corners)
            .map(|(&at, corner)| ((at - from).rem_euclid(perimeter), corner))
            .filter(|&(offset, _)| offset > 0.0 && offset < span)
            .collect();
        passed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut current = exit;
        let mut at = end;
        for (_, corner) in passed {
            let next = dcel.add_vertex(corner);
            current = trace_segment(dcel, current, at, next);
            at = next;
        }
        current = trace_segment(dcel, current, at, start);
        dcel.link(current, entry);
    }

    link_outer_cycle(dcel)
}

/// Append a frame segment from `from` to `to` after `after`
fn trace_segment<T>(dcel: &mut Dcel<T>, after: HalfEdgeId, from: VertexId, to: VertexId) -> HalfEdgeId {
    let segment = dcel.insert(after, from, TwinSide::Detached(None));
    let twin = dcel.twin(segment);
    dcel.set_origin(twin, to);
    segment
}

fn boundary_point<T>(dcel: &Dcel<T>, id: HalfEdgeId, frame: &Frame) -> Result<f64> {
    dcel.origin_position(id)
        .map(|p| frame.boundary_position(p))
        .ok_or_else(|| VoronoiError::BrokenTopology(format!("{:?} has no origin", id)))
}

/// Give every half-edge without an origin a vertex on the frame
fn cap_open_edges<T>(dcel: &mut Dcel<T>, frame: &Frame) -> Result<()> {
    // edges open at both ends are full lines through the midpoint of their sites
    let open: Vec<(HalfEdgeId, bool)> = dcel
        .half_edges()
        .filter(|(_, h)| h.origin.is_none())
        .map(|(id, h)| (id, dcel.origin(h.twin).is_none()))
        .collect();

    for (id, is_line) in open {
        let twin = dcel.twin(id);
        let site = face_site(dcel, id)?;
        let other = face_site(dcel, twin)?;
        let direction = crate::geometry::bisector_direction(site, other);

        let anchor = if is_line {
            (site + other) / 2.0
        } else {
            dcel.origin_position(twin)
                .ok_or_else(|| VoronoiError::BrokenTopology(format!("{:?} has no end", id)))?
        };
        let point = frame.exit(anchor, -direction).ok_or(VoronoiError::DegenerateGeometry)?;
        let vertex = dcel.add_vertex(point);
        dcel.set_origin(id, vertex);
    }
    Ok(())
}

fn face_site<T>(dcel: &Dcel<T>, id: HalfEdgeId) -> Result<DVec2> {
    dcel.face_of(id)
        .map(|face| dcel.face(face).site)
        .ok_or_else(|| VoronoiError::BrokenTopology(format!("{:?} has no face", id)))
}

/// The only site owns the whole frame
fn close_lone_face<T>(dcel: &mut Dcel<T>, frame: &Frame) -> Result<()> {
    let face = FaceId::new(0);
    let corners: Vec<VertexId> = frame.corners().iter().map(|&c| dcel.add_vertex(c)).collect();

    let first = dcel.add_edge(Some(face), None);
    dcel.set_origin(first, corners[0]);
    let twin = dcel.twin(first);
    dcel.set_origin(twin, corners[1]);

    let mut current = first;
    for i in 1..4 {
        current = trace_segment(dcel, current, corners[i], corners[(i + 1) % 4]);
    }
    dcel.link(current, first);

    link_outer_cycle(dcel)
}

/// Chain the faceless half-edges into one cycle around the frame
fn link_outer_cycle<T>(dcel: &mut Dcel<T>) -> Result<()> {
    let outer: Vec<HalfEdgeId> = dcel
        .half_edges()
        .filter(|(_, h)| h.face.is_none())
        .map(|(id, _)| id)
        .collect();

    let mut by_origin = HashMap::with_capacity(outer.len());
    for &id in &outer {
        let origin = dcel
            .origin(id)
            .ok_or_else(|| VoronoiError::BrokenTopology(format!("{:?} has no origin", id)))?;
        if by_origin.insert(origin, id).is_some() {
            return Err(VoronoiError::BrokenTopology(format!(
                "two frame segments leave {:?}",
                origin
            )));
        }
    }

    for id in outer {
        let end = dcel
            .destination(id)
            .ok_or_else(|| VoronoiError::BrokenTopology(format!("{:?} has no end", id)))?;
        let next = *by_origin.get(&end).ok_or_else(|| {
            VoronoiError::BrokenTopology(format!("frame is broken at {:?}", end))
        })?;
        dcel.link(id, next);
    }

    log::trace!("frame closed with {} outer half-edges", by_origin.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiagramConfig;
    use crate::fortune::Sweep;
    use crate::geometry::{point_in_polygon, polygon_area};

    fn closed(points: &[(f64, f64)]) -> (Dcel<()>, Frame) {
        let config = DiagramConfig::default();
        let sites: Vec<DVec2> = points.iter().map(|&(x, y)| DVec2::new(x, y)).collect();
        let output = Sweep::new(sites.iter().map(|&p| (p, ())), &config)
            .unwrap()
            .run()
            .unwrap();
        let frame = Frame::enclosing(&config.bounding_box, &sites, &output.vertices, config.frame_margin);
        let mut dcel = output.dcel;
        close(&mut dcel, &frame).unwrap();
        (dcel, frame)
    }

    #[test]
    fn test_frame_encloses_everything() {
        let bbox = BoundingBox::new(0.0, 10.0, 0.0, 10.0).unwrap();
        let frame = Frame::enclosing(&bbox, &[DVec2::new(-10.0, 5.0)], &[DVec2::new(5.0, 30.0)], 0.5);
        // spans 20 x 30 before growing by 15 on each side
        assert_eq!(frame.min, DVec2::new(-25.0, -15.0));
        assert_eq!(frame.max, DVec2::new(25.0, 45.0));
        assert_eq!(frame.perimeter(), 220.0);
    }

    #[test]
    fn test_exit_and_boundary_position() {
        let frame = Frame {
            min: DVec2::ZERO,
            max: DVec2::new(4.0, 2.0),
        };
        let hit = frame.exit(DVec2::new(1.0, 1.0), DVec2::new(1.0, 1.0)).unwrap();
        assert!((hit - DVec2::new(2.0, 2.0)).length() < 1e-12);
        assert!(frame.exit(DVec2::ONE, DVec2::ZERO).is_none());

        assert_eq!(frame.boundary_position(DVec2::new(1.0, 0.0)), 1.0);
        assert_eq!(frame.boundary_position(DVec2::new(4.0, 1.0)), 5.0);
        assert_eq!(frame.boundary_position(DVec2::new(3.0, 2.0)), 7.0);
        assert_eq!(frame.boundary_position(DVec2::new(0.0, 1.5)), 10.5);
    }

    #[test]
    fn test_single_site_owns_frame() {
        let (dcel, frame) = closed(&[(40.0, 60.0)]);
        dcel.validate().unwrap();

        let polygon = dcel.face_polygon(FaceId::new(0)).unwrap();
        assert_eq!(polygon.len(), 4);
        assert!((polygon_area(&polygon) - frame.size().x * frame.size().y).abs() < 1e-9);
        assert_eq!(dcel.outer_loop().unwrap().len(), 4);
    }

    #[test]
    fn test_two_sites_split_frame() {
        let (dcel, frame) = closed(&[(0.0, 0.0), (10.0, 0.0)]);
        dcel.validate().unwrap();

        // frame [-25, 125]^2, divided at x = 5
        assert_eq!(frame.min, DVec2::splat(-25.0));
        let left = polygon_area(&dcel.face_polygon(FaceId::new(0)).unwrap());
        let right = polygon_area(&dcel.face_polygon(FaceId::new(1)).unwrap());
        assert!((left - 30.0 * 150.0).abs() < 1e-9);
        assert!((right - 120.0 * 150.0).abs() < 1e-9);
        assert_eq!(dcel.outer_loop().unwrap().len(), 6);
    }

    #[test]
    fn test_triangle_faces_tile_frame() {
        let (dcel, frame) = closed(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]);
        dcel.validate().unwrap();

        let mut total = 0.0;
        for (id, face) in dcel.faces() {
            let polygon = dcel.face_polygon(id).unwrap();
            let area = polygon_area(&polygon);
            assert!(area > 0.0);
            assert!(point_in_polygon(face.site, &polygon));
            total += area;
        }
        assert!((total - frame.size().x * frame.size().y).abs() < 1e-6);
    }

    #[test]
    fn test_collinear_strips_tile_frame() {
        let (dcel, frame) = closed(&[(10.0, 10.0), (30.0, 30.0), (50.0, 50.0), (70.0, 70.0)]);
        dcel.validate().unwrap();

        let total: f64 = dcel
            .faces()
            .map(|(id, _)| polygon_area(&dcel.face_polygon(id).unwrap()))
            .sum();
        assert!((total - frame.size().x * frame.size().y).abs() < 1e-6);
    }
}
