//! Distance and travel-time matrices over the expanded location sequence.

use crate::expand::ExpandedInstance;
use evrptw_core::{EvResult, EvrptwError};

/// Dense pairwise Euclidean distance and travel-time matrices,
/// `(n + 2) × (n + 2)` over expanded indices. Dummies of the same physical
/// station share coordinates, so their rows are identical.
#[derive(Debug, Clone)]
pub struct Matrices {
    size: usize,
    distance: Vec<f64>,
    travel_time: Vec<f64>,
}

impl Matrices {
    /// Compute both matrices. Travel time is distance divided by velocity;
    /// a non-positive velocity is rejected with
    /// [`EvrptwError::InvalidParameter`].
    pub fn build(exp: &ExpandedInstance<'_>) -> EvResult<Self> {
        let velocity = exp.instance().vehicle.velocity;
        if velocity <= 0.0 {
            return Err(EvrptwError::InvalidParameter(format!(
                "velocity must be positive, got {velocity}"
            )));
        }

        let size = exp.len();
        let mut distance = vec![0.0; size * size];
        let mut travel_time = vec![0.0; size * size];
        for i in 0..size {
            let a = exp.location(i);
            for j in 0..size {
                let d = a.distance_to(exp.location(j));
                distance[i * size + j] = d;
                travel_time[i * size + j] = d / velocity;
            }
        }

        Ok(Self {
            size,
            distance,
            travel_time,
        })
    }

    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Euclidean distance between expanded indices i and j.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance[i * self.size + j]
    }

    /// Travel time between expanded indices i and j.
    pub fn travel_time(&self, i: usize, j: usize) -> f64 {
        self.travel_time[i * self.size + j]
    }
}
