//! Dummy-station expansion.
//!
//! Every physical charging station may be visited more than once per
//! solution, but the arc formulation allows at most one outgoing arc per
//! node. The classic device is to replicate each station `k` times with
//! `k = nStations`, bounding total visits per physical station to
//! `nStations` — enough, since no solution needs more visits to one station
//! than there are stations.
//!
//! The expansion is an index mapping, not a physical duplication:
//! [`ExpandedInstance`] borrows the raw [`Instance`] and resolves expanded
//! indices back into its depot/station/customer arenas. Expanded index
//! layout:
//!
//! ```text
//! 0                          depot (start copy)
//! 1 ..= n_dummies            station dummies, n_stations per station
//! n_dummies + 1 ..= n        customers, in file order
//! n + 1                      depot (end copy, same record)
//! ```

use evrptw_core::{Instance, Location, LocationKind};

/// Index view over an instance after dummy-station expansion.
#[derive(Debug, Clone, Copy)]
pub struct ExpandedInstance<'a> {
    instance: &'a Instance,
    n_stations: usize,
    n_dummies: usize,
    n: usize,
}

impl<'a> ExpandedInstance<'a> {
    /// Expand an instance. `n_dummies = n_stations²`; a station-free
    /// instance degenerates to depot, customers, depot.
    pub fn new(instance: &'a Instance) -> Self {
        let n_stations = instance.num_stations();
        let n_dummies = n_stations * n_stations;
        Self {
            instance,
            n_stations,
            n_dummies,
            n: n_dummies + instance.num_customers(),
        }
    }

    /// The borrowed raw instance.
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Number of non-depot nodes (`n`): dummies plus customers.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of station dummies.
    pub fn n_dummies(&self) -> usize {
        self.n_dummies
    }

    /// Number of physical stations.
    pub fn n_stations(&self) -> usize {
        self.n_stations
    }

    /// Total sequence length including both depot copies (`n + 2`).
    pub fn len(&self) -> usize {
        self.n + 2
    }

    pub fn is_empty(&self) -> bool {
        false // always at least the two depot copies
    }

    /// Resolve an expanded index to its location record.
    ///
    /// # Panics
    /// Panics if `idx > n + 1`.
    pub fn location(&self, idx: usize) -> &'a Location {
        if idx == 0 || idx == self.n + 1 {
            &self.instance.depot
        } else if idx <= self.n_dummies {
            &self.instance.stations[(idx - 1) / self.n_stations]
        } else if idx <= self.n {
            &self.instance.customers[idx - self.n_dummies - 1]
        } else {
            panic!("expanded index {idx} out of range (n = {})", self.n);
        }
    }

    /// Kind of the location at an expanded index.
    pub fn kind_of(&self, idx: usize) -> LocationKind {
        self.location(idx).kind
    }

    /// Physical station identity for a station-dummy index, `None` for the
    /// depot copies and customers.
    pub fn station_of(&self, idx: usize) -> Option<usize> {
        if (1..=self.n_dummies).contains(&idx) {
            Some((idx - 1) / self.n_stations)
        } else {
            None
        }
    }

    /// Whether an expanded index is a station dummy.
    pub fn is_station_dummy(&self, idx: usize) -> bool {
        (1..=self.n_dummies).contains(&idx)
    }

    /// Latest depot return time, the big-M bound for time linearization.
    pub fn depot_due(&self) -> f64 {
        self.instance.depot.due as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::instance_with;
    use evrptw_core::LocationKind;

    #[test]
    fn test_dummy_count_is_squared() {
        let instance = instance_with(3, 4);
        let exp = ExpandedInstance::new(&instance);

        assert_eq!(exp.n_dummies(), 9);
        assert_eq!(exp.n(), 9 + 4);
        assert_eq!(exp.len(), 1 + 9 + 4 + 1);
    }

    #[test]
    fn test_depot_copies_identical() {
        let instance = instance_with(2, 3);
        let exp = ExpandedInstance::new(&instance);

        let start = exp.location(0);
        let end = exp.location(exp.n() + 1);
        assert_eq!(start, end);
        assert_eq!(start.kind, LocationKind::Depot);
    }

    #[test]
    fn test_station_identity_mapping() {
        let instance = instance_with(3, 1);
        let exp = ExpandedInstance::new(&instance);

        // dummies 1..=3 belong to station 0, 4..=6 to station 1, 7..=9 to 2
        assert_eq!(exp.station_of(1), Some(0));
        assert_eq!(exp.station_of(3), Some(0));
        assert_eq!(exp.station_of(4), Some(1));
        assert_eq!(exp.station_of(9), Some(2));
        assert_eq!(exp.station_of(0), None);
        assert_eq!(exp.station_of(10), None); // the customer

        // dummies of the same station resolve to the same record
        assert_eq!(exp.location(1), exp.location(3));
        assert_eq!(exp.location(1).id, instance.stations[0].id);
    }

    #[test]
    fn test_zero_stations_degenerates() {
        let instance = instance_with(0, 2);
        let exp = ExpandedInstance::new(&instance);

        assert_eq!(exp.n_dummies(), 0);
        assert_eq!(exp.len(), 4);
        assert_eq!(exp.kind_of(1), LocationKind::Customer);
        assert_eq!(exp.kind_of(3), LocationKind::Depot);
        assert!(!exp.is_station_dummy(1));
    }
}
