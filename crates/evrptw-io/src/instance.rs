//! Instance file loading.
//!
//! One instance is a pair of delimited files:
//!
//! - `<name>_locations.csv`: header row, then one row per location with
//!   columns `StringID, Type, x, y, demand, ReadyTime, DueDate, ServiceTime`.
//!   The type tag is `d` (depot), `f` (charging station) or `c` (customer);
//!   rows appear in depot, stations, customers order.
//! - `<name>_other.csv`: header row, then one row with the vehicle constants
//!   `Q, C, h, g, v` in fixed column positions.

use evrptw_core::{EvResult, EvrptwError, Instance, Location, LocationKind, VehicleParameters};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

fn field<T: FromStr>(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
    what: &str,
) -> EvResult<T> {
    let raw = record.get(idx).ok_or_else(|| {
        EvrptwError::MalformedInstance(format!("row {row}: missing {what} (column {idx})"))
    })?;
    raw.trim().parse().map_err(|_| {
        EvrptwError::MalformedInstance(format!("row {row}: cannot parse {what} from '{raw}'"))
    })
}

/// Read the location table of an instance.
///
/// Returns locations in file order. Fails with
/// [`EvrptwError::MalformedInstance`] on unknown type tags, non-numeric
/// fields, or a missing/duplicated depot row.
pub fn read_locations(path: &Path) -> EvResult<Vec<Location>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| {
            EvrptwError::MalformedInstance(format!("opening {}: {e}", path.display()))
        })?;

    let mut locations = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            EvrptwError::MalformedInstance(format!("{}: row {row}: {e}", path.display()))
        })?;
        let id = record
            .get(0)
            .ok_or_else(|| {
                EvrptwError::MalformedInstance(format!("row {row}: missing location id"))
            })?
            .trim()
            .to_string();
        let kind = LocationKind::from_tag(record.get(1).unwrap_or("").trim())?;
        locations.push(Location {
            id,
            kind,
            x: field(&record, 2, row, "x coordinate")?,
            y: field(&record, 3, row, "y coordinate")?,
            demand: field(&record, 4, row, "demand")?,
            ready: field(&record, 5, row, "ready time")?,
            due: field(&record, 6, row, "due time")?,
            service_time: field(&record, 7, row, "service time")?,
        });
    }

    if locations.is_empty() {
        return Err(EvrptwError::MalformedInstance(format!(
            "{}: no location rows",
            path.display()
        )));
    }

    Ok(locations)
}

/// Read the vehicle parameter row of an instance.
///
/// Parameter ranges are validated here, so a non-positive velocity surfaces
/// as [`EvrptwError::InvalidParameter`] before any model is built.
pub fn read_vehicle(path: &Path) -> EvResult<VehicleParameters> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| {
            EvrptwError::MalformedInstance(format!("opening {}: {e}", path.display()))
        })?;

    let record = reader
        .records()
        .next()
        .ok_or_else(|| {
            EvrptwError::MalformedInstance(format!(
                "{}: missing vehicle parameter row",
                path.display()
            ))
        })?
        .map_err(|e| EvrptwError::MalformedInstance(format!("{}: {e}", path.display())))?;

    let vehicle = VehicleParameters {
        battery_capacity: field(&record, 0, 0, "battery capacity")?,
        cargo_capacity: field(&record, 1, 0, "cargo capacity")?,
        consumption_rate: field(&record, 2, 0, "consumption rate")?,
        recharge_rate: field(&record, 3, 0, "recharge rate")?,
        velocity: field(&record, 4, 0, "velocity")?,
    };
    vehicle.validate()?;
    Ok(vehicle)
}

/// Load one named instance from a directory holding the
/// `<name>_locations.csv` / `<name>_other.csv` file pair.
pub fn load_instance(dir: &Path, name: &str) -> EvResult<Instance> {
    let locations = read_locations(&dir.join(format!("{name}_locations.csv")))?;
    let vehicle = read_vehicle(&dir.join(format!("{name}_other.csv")))?;

    let mut depot = None;
    let mut stations = Vec::new();
    let mut customers = Vec::new();
    for loc in locations {
        match loc.kind {
            LocationKind::Depot => {
                if depot.replace(loc).is_some() {
                    return Err(EvrptwError::MalformedInstance(format!(
                        "{name}: more than one depot row"
                    )));
                }
            }
            LocationKind::Station => stations.push(loc),
            LocationKind::Customer => customers.push(loc),
        }
    }

    let depot = depot.ok_or_else(|| {
        EvrptwError::MalformedInstance(format!("{name}: no depot row"))
    })?;

    debug!(
        instance = name,
        stations = stations.len(),
        customers = customers.len(),
        "loaded instance"
    );

    Ok(Instance {
        name: name.to_string(),
        vehicle,
        depot,
        stations,
        customers,
    })
}
