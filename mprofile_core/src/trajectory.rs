//! Trajectory sources feeding the executor's top buffer.

use std::sync::Arc;

use mprofile_traits::TrajectoryPoint;

/// Read-only provider of the points for one profile run.
///
/// `load` is called once per arm; an empty result leaves the executor idle.
pub trait TrajectorySource {
    fn load(&mut self) -> Vec<TrajectoryPoint>;
}

impl<F> TrajectorySource for F
where
    F: FnMut() -> Vec<TrajectoryPoint>,
{
    fn load(&mut self) -> Vec<TrajectoryPoint> {
        self()
    }
}

/// Shared immutable point table; cloning is cheap so both sides can use one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trajectory {
    points: Arc<[TrajectoryPoint]>,
}

impl Trajectory {
    pub fn new(points: Vec<TrajectoryPoint>) -> Self {
        Self {
            points: points.into(),
        }
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TrajectorySource for Trajectory {
    fn load(&mut self) -> Vec<TrajectoryPoint> {
        self.points.to_vec()
    }
}

/// Make a loaded buffer well-formed for streaming.
///
/// Points after the first `is_last_point` are dropped; if none is flagged the
/// final point is. Returns the number of points dropped.
pub fn normalize(points: &mut Vec<TrajectoryPoint>) -> usize {
    if let Some(idx) = points.iter().position(|p| p.is_last_point) {
        let dropped = points.len() - idx - 1;
        points.truncate(idx + 1);
        dropped
    } else {
        if let Some(last) = points.last_mut() {
            last.is_last_point = true;
        }
        0
    }
}
