//! Fortune's sweep-line algorithm
//!
//! The sweep line starts above every site and moves toward smaller y,
//! stopping at site events (a new arc appears) and circle events (an arc
//! vanishes and a Voronoi vertex is fixed). The driver owns the event queue,
//! the beach line and the half-edge mesh for the duration of one run.
//!
//! # Example
//!
//! ```rust
//! use glam::DVec2;
//! use rust_voronoi_sweep::{DiagramConfig, Sweep};
//!
//! let sites = vec![
//!     (DVec2::new(0.0, 0.0), ()),
//!     (DVec2::new(10.0, 0.0), ()),
//!     (DVec2::new(5.0, 10.0), ()),
//! ];
//! let output = Sweep::new(sites, &DiagramConfig::default()).unwrap().run().unwrap();
//!
//! assert_eq!(output.vertices.len(), 1);
//! assert!((output.vertices[0] - DVec2::new(5.0, 3.75)).length() < 1e-9);
//! ```

pub mod beach_line;
pub mod circle;
pub mod queue;

use glam::DVec2;

use self::beach_line::BeachLine;
use self::queue::{Event, EventQueue};
use crate::config::DiagramConfig;
use crate::dcel::Dcel;
use crate::error::{Result, VoronoiError};

/// Lifecycle of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Idle,
    Running,
    Done,
}

/// What a finished sweep produced
#[derive(Debug, Clone)]
pub struct SweepOutput<T> {
    /// Voronoi vertices in the order their circle events were accepted
    ///
    /// Entry `i` is vertex `i` of the mesh.
    pub vertices: Vec<DVec2>,
    /// Half-edge mesh with one face per site, in input order
    ///
    /// Edges reaching infinity are still open.
    pub dcel: Dcel<T>,
}

/// Event loop over one set of sites
#[derive(Debug)]
pub struct Sweep<T> {
    state: SweepState,
    queue: EventQueue,
    beach_line: BeachLine,
    dcel: Dcel<T>,
    vertices: Vec<DVec2>,
    sweep_y: f64,
    processed: usize,
    false_alarms: usize,
}

impl<T> Sweep<T> {
    /// Prepare a sweep over sites with their attributes
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when there are no sites, a coordinate is not
    /// finite, or two sites coincide.
    pub fn new<I>(sites: I, config: &DiagramConfig) -> Result<Self>
    where
        I: IntoIterator<Item = (DVec2, T)>,
    {
        let mut positions = Vec::new();
        let mut dcel = Dcel::new();
        for (position, attributes) in sites {
            positions.push(position);
            dcel.add_face(position, attributes);
        }
        validate_sites(&positions)?;

        let mut queue = EventQueue::new();
        for (site, &position) in positions.iter().enumerate() {
            queue.push_site(site, position);
        }

        Ok(Self {
            state: SweepState::Idle,
            queue,
            beach_line: BeachLine::new(positions, config),
            dcel,
            vertices: Vec::new(),
            sweep_y: f64::INFINITY,
            processed: 0,
            false_alarms: 0,
        })
    }

    pub fn state(&self) -> SweepState {
        self.state
    }

    /// Height of the sweep line after the last processed event
    pub fn sweep_y(&self) -> f64 {
        self.sweep_y
    }

    pub fn beach_line(&self) -> &BeachLine {
        &self.beach_line
    }

    pub fn dcel(&self) -> &Dcel<T> {
        &self.dcel
    }

    /// Vertices accepted so far
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// Process the next event
    ///
    /// Returns the event that was handled, or `None` once the queue has run
    /// dry. Cancelled circle events are consumed without effect.
    pub fn step(&mut self) -> Result<Option<Event>> {
        match self.state {
            SweepState::Done => return Ok(None),
            SweepState::Idle => self.state = SweepState::Running,
            SweepState::Running => {}
        }

        if self.queue.is_empty() {
            self.state = SweepState::Done;
            log::debug!(
                "sweep finished: {} sites, {} vertices, {} events, {} false alarms",
                self.dcel.face_count(),
                self.vertices.len(),
                self.processed,
                self.false_alarms
            );
            return Ok(None);
        }

        let event = self.queue.pop()?;
        match event {
            Event::Site(site) => {
                let position = self.beach_line.site(site);
                self.sweep_y = position.y;
                log::trace!("site event {} at ({:.6}, {:.6})", site, position.x, position.y);

                if self.beach_line.is_empty() {
                    self.beach_line.init(site);
                } else {
                    let arc = self.beach_line.locate(position)?;
                    self.beach_line.split(arc, site, &mut self.queue, &mut self.dcel)?;
                }
            }
            Event::Circle(id) => {
                let circle = *self.queue.circle(id);
                if !circle.alive {
                    self.false_alarms += 1;
                } else {
                    self.sweep_y = self.sweep_y.min(circle.sweep_y);
                    log::trace!(
                        "circle event at y={:.6}, vertex ({:.6}, {:.6})",
                        circle.sweep_y,
                        circle.center.x,
                        circle.center.y
                    );
                    self.beach_line.remove(
                        circle.arc,
                        circle.center,
                        self.sweep_y,
                        &mut self.queue,
                        &mut self.dcel,
                    )?;
                    self.vertices.push(circle.center);
                }
            }
        }

        self.processed += 1;
        Ok(Some(event))
    }

    /// Process every remaining event and hand over the result
    pub fn run(mut self) -> Result<SweepOutput<T>> {
        while self.step()?.is_some() {}
        self.finish()
    }

    /// Hand over the result of a completed sweep
    ///
    /// # Errors
    ///
    /// Returns `BrokenTopology` if events are still pending.
    pub fn finish(self) -> Result<SweepOutput<T>> {
        if self.state != SweepState::Done {
            return Err(VoronoiError::BrokenTopology(format!(
                "sweep is {:?} with {} events pending",
                self.state,
                self.queue.len()
            )));
        }
        Ok(SweepOutput {
            vertices: self.vertices,
            dcel: self.dcel,
        })
    }
}

/// Reject empty, non-finite and duplicated site sets
pub(crate) fn validate_sites(sites: &[DVec2]) -> Result<()> {
    if sites.is_empty() {
        return Err(VoronoiError::InvalidInput("no sites".to_string()));
    }
    if let Some((i, p)) = sites.iter().enumerate().find(|(_, p)| !p.is_finite()) {
        return Err(VoronoiError::InvalidInput(format!(
            "site {} is not finite: ({}, {})",
            i, p.x, p.y
        )));
    }

    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_by(|&a, &b| {
        sites[a]
            .x
            .total_cmp(&sites[b].x)
            .then_with(|| sites[a].y.total_cmp(&sites[b].y))
    });
    for pair in order.windows(2) {
        if sites[pair[0]] == sites[pair[1]] {
            return Err(VoronoiError::InvalidInput(format!(
                "sites {} and {} coincide at ({}, {})",
                pair[0].min(pair[1]),
                pair[0].max(pair[1]),
                sites[pair[0]].x,
                sites[pair[0]].y
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(points: &[(f64, f64)]) -> Result<SweepOutput<()>> {
        let sites = points.iter().map(|&(x, y)| (DVec2::new(x, y), ()));
        Sweep::new(sites, &DiagramConfig::default())?.run()
    }

    #[test]
    fn test_triangle_has_one_vertex() {
        let output = sweep(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)]).unwrap();
        assert_eq!(output.vertices.len(), 1);
        assert!((output.vertices[0] - DVec2::new(5.0, 3.75)).length() < 1e-9);
        assert_eq!(output.dcel.face_count(), 3);
        assert_eq!(output.dcel.vertex_count(), 1);
    }

    #[test]
    fn test_two_sites_have_no_vertex() {
        let output = sweep(&[(0.0, 0.0), (10.0, 0.0)]).unwrap();
        assert!(output.vertices.is_empty());
        assert_eq!(output.dcel.half_edge_count(), 2);
    }

    #[test]
    fn test_collinear_sites_have_no_vertex() {
        let output = sweep(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]).unwrap();
        assert!(output.vertices.is_empty());
        assert_eq!(output.dcel.half_edge_count(), 6);
    }

    #[test]
    fn test_square_vertices() {
        // four cocircular sites meet at one point; it may be reported twice
        let output = sweep(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]).unwrap();
        assert!(!output.vertices.is_empty());
        for v in &output.vertices {
            assert!((*v - DVec2::new(5.0, 5.0)).length() < 1e-9);
        }
    }

    #[test]
    fn test_convex_position_gives_n_minus_two() {
        let n = 9;
        let points: Vec<(f64, f64)> = (0..n)
            .map(|i| {
                let angle = 0.3 + i as f64 * std::f64::consts::TAU / n as f64 + 0.05 * (i % 3) as f64;
                let radius = 40.0 + 3.0 * (i % 2) as f64;
                (50.0 + radius * angle.cos(), 50.0 + radius * angle.sin())
            })
            .collect();
        let output = sweep(&points).unwrap();
        assert_eq!(output.vertices.len(), n - 2);
    }

    #[test]
    fn test_step_walks_through_states() {
        let sites = vec![(DVec2::new(0.0, 0.0), ()), (DVec2::new(10.0, 0.0), ()), (DVec2::new(5.0, 10.0), ())];
        let mut sweep = Sweep::new(sites, &DiagramConfig::default()).unwrap();
        assert_eq!(sweep.state(), SweepState::Idle);

        assert_eq!(sweep.step().unwrap(), Some(Event::Site(2)));
        assert_eq!(sweep.state(), SweepState::Running);
        assert_eq!(sweep.beach_line().arc_sites(), vec![2]);

        assert_eq!(sweep.step().unwrap(), Some(Event::Site(0)));
        assert_eq!(sweep.step().unwrap(), Some(Event::Site(1)));
        assert_eq!(sweep.beach_line().arc_sites(), vec![2, 0, 2, 1, 2]);
        sweep.beach_line().check_invariants().unwrap();

        assert!(matches!(sweep.step().unwrap(), Some(Event::Circle(_))));
        assert_eq!(sweep.vertices().len(), 1);
        assert_eq!(sweep.beach_line().arc_sites(), vec![2, 0, 1, 2]);

        assert_eq!(sweep.step().unwrap(), None);
        assert_eq!(sweep.state(), SweepState::Done);
        assert_eq!(sweep.step().unwrap(), None);
        assert_eq!(sweep.finish().unwrap().vertices.len(), 1);
    }

    #[test]
    fn test_finish_before_done_is_rejected() {
        let sites = vec![(DVec2::new(0.0, 0.0), ()), (DVec2::new(1.0, 0.0), ())];
        let sweep = Sweep::new(sites, &DiagramConfig::default()).unwrap();
        assert!(matches!(sweep.finish(), Err(VoronoiError::BrokenTopology(_))));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(sweep(&[]), Err(VoronoiError::InvalidInput(_))));
        assert!(matches!(sweep(&[(0.0, f64::NAN)]), Err(VoronoiError::InvalidInput(_))));
        assert!(matches!(
            sweep(&[(1.0, 1.0), (2.0, 2.0), (1.0, 1.0)]),
            Err(VoronoiError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_single_site() {
        let output = sweep(&[(3.0, 4.0)]).unwrap();
        assert!(output.vertices.is_empty());
        assert_eq!(output.dcel.face_count(), 1);
        assert_eq!(output.dcel.half_edge_count(), 0);
    }

    #[test]
    fn test_beach_line_stays_consistent() {
        let points = [
            (12.0, 40.0),
            (55.0, 81.0),
            (73.0, 22.0),
            (31.0, 67.0),
            (90.0, 58.0),
            (44.0, 9.0),
            (66.0, 45.0),
            (8.0, 90.0),
        ];
        let sites = points.iter().map(|&(x, y)| (DVec2::new(x, y), ()));
        let mut sweep = Sweep::new(sites, &DiagramConfig::default()).unwrap();
        while sweep.step().unwrap().is_some() {
            sweep.beach_line().check_invariants().unwrap();
        }
        // general position, six sites on the hull
        let hull = 6;
        assert_eq!(sweep.vertices().len(), 2 * points.len() - 2 - hull);
    }
}
