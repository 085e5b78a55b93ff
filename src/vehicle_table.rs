// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

//! Immutable, versioned table of live vehicles.
//!
//! Every merge produces a brand new [`VehicleTable`]. Readers holding an older
//! snapshot keep seeing exactly what was published to them.

use crate::extract::VehicleReading;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f32,
    pub latitude: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehiclePositionSample {
    pub coordinate: Coordinate,
    /// POSIX seconds, `None` when neither the vehicle nor the feed header carried one.
    pub timestamp: Option<u64>,
}

impl From<&VehicleReading> for VehiclePositionSample {
    fn from(reading: &VehicleReading) -> Self {
        VehiclePositionSample {
            coordinate: reading.coordinate,
            timestamp: reading.timestamp,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: String,
    pub route_id: String,
    pub current_position: VehiclePositionSample,
    /// Arrival order. The last element is always `current_position`.
    pub history: Vec<VehiclePositionSample>,
    pub last_seen_version: u64,
}

/// How long vehicles and their trails are kept.
///
/// The default keeps everything forever.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Drop a vehicle once this many merges have passed without a reading for it.
    pub max_missed_polls: Option<u64>,
    /// Keep at most this many of the newest samples per vehicle. `Some(0)` is
    /// treated as `Some(1)`.
    pub max_history: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleTable {
    version: u64,
    vehicles: AHashMap<String, VehicleRecord>,
}

impl VehicleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&VehicleRecord> {
        self.vehicles.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vehicles.contains_key(id)
    }

    /// Records in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &VehicleRecord> {
        self.vehicles.values()
    }

    pub fn to_records(&self) -> Vec<VehicleRecord> {
        self.vehicles.values().cloned().collect()
    }

    pub fn total_samples(&self) -> usize {
        self.vehicles.values().map(|record| record.history.len()).sum()
    }

    /// Merges readings with unbounded retention.
    pub fn merge_readings<I>(&self, readings: I) -> VehicleTable
    where
        I: IntoIterator<Item = VehicleReading>,
    {
        self.merge_readings_with(readings, &RetentionPolicy::default())
    }

    /// Returns a new table with `readings` applied in order.
    ///
    /// Each reading appends one sample to its vehicle's history, including
    /// repeated readings for the same vehicle in one batch.
    pub fn merge_readings_with<I>(&self, readings: I, retention: &RetentionPolicy) -> VehicleTable
    where
        I: IntoIterator<Item = VehicleReading>,
    {
        let version = self.version + 1;
        let mut vehicles = self.vehicles.clone();

        for reading in readings {
            let sample = VehiclePositionSample::from(&reading);

            match vehicles.get_mut(&reading.vehicle_id) {
                Some(record) => {
                    record.route_id = reading.route_id;
                    record.current_position = sample;
                    record.history.push(sample);
                    record.last_seen_version = version;
                }
                None => {
                    vehicles.insert(
                        reading.vehicle_id.clone(),
                        VehicleRecord {
                            id: reading.vehicle_id,
                            route_id: reading.route_id,
                            current_position: sample,
                            history: vec![sample],
                            last_seen_version: version,
                        },
                    );
                }
            }
        }

        if let Some(max_missed_polls) = retention.max_missed_polls {
            vehicles.retain(|_, record| version - record.last_seen_version <= max_missed_polls);
        }

        if let Some(max_history) = retention.max_history {
            let max_history = max_history.max(1);
            for record in vehicles.values_mut() {
                if record.history.len() > max_history {
                    let excess = record.history.len() - max_history;
                    record.history.drain(..excess);
                }
            }
        }

        VehicleTable { version, vehicles }
    }
}
