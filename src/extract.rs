// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

use crate::validate_gtfs_rt::FeedQualityReport;
use crate::vehicle_table::Coordinate;
use gtfs_realtime::{FeedEntity, FeedMessage};
use serde::Serialize;

/// One usable vehicle observation pulled out of a feed entity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleReading {
    pub vehicle_id: String,
    pub route_id: String,
    pub coordinate: Coordinate,
    pub timestamp: Option<u64>,
}

fn non_empty(value: Option<&String>) -> Option<&String> {
    value.filter(|value| !value.is_empty())
}

/// Returns `None` for entities without a vehicle payload, position, trip,
/// route id or vehicle id. Coordinates are passed through untouched.
pub fn extract_vehicle_reading(
    entity: &FeedEntity,
    header_timestamp: Option<u64>,
) -> Option<VehicleReading> {
    let vehicle = entity.vehicle.as_ref()?;
    let position = vehicle.position.as_ref()?;
    let trip = vehicle.trip.as_ref()?;

    let route_id = non_empty(trip.route_id.as_ref())?;
    let vehicle_id = non_empty(vehicle.vehicle.as_ref()?.id.as_ref())?;

    Some(VehicleReading {
        vehicle_id: vehicle_id.clone(),
        route_id: route_id.clone(),
        coordinate: Coordinate {
            longitude: position.longitude,
            latitude: position.latitude,
        },
        timestamp: vehicle.timestamp.or(header_timestamp),
    })
}

/// Extracts every valid reading in entity order and tallies what was skipped.
pub fn extract_vehicle_readings(feed: &FeedMessage) -> (Vec<VehicleReading>, FeedQualityReport) {
    let header_timestamp = feed.header.timestamp;

    let readings: Vec<VehicleReading> = feed
        .entity
        .iter()
        .filter_map(|entity| extract_vehicle_reading(entity, header_timestamp))
        .collect();

    let report = FeedQualityReport::new(feed, readings.len());

    (readings, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtfs_realtime::{
        FeedHeader, Position, TripDescriptor, VehicleDescriptor, VehiclePosition,
    };

    fn vehicle_entity(
        vehicle_id: Option<&str>,
        route_id: Option<&str>,
        position: Option<(f32, f32)>,
    ) -> FeedEntity {
        FeedEntity {
            id: String::from("entity"),
            vehicle: Some(VehiclePosition {
                trip: Some(TripDescriptor {
                    route_id: route_id.map(String::from),
                    ..Default::default()
                }),
                vehicle: Some(VehicleDescriptor {
                    id: vehicle_id.map(String::from),
                    ..Default::default()
                }),
                position: position.map(|(longitude, latitude)| Position {
                    longitude,
                    latitude,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_entity() {
        let entity = vehicle_entity(Some("V1"), Some("R1"), Some((10.0, 63.0)));

        let reading = extract_vehicle_reading(&entity, None).unwrap();

        assert_eq!(reading.vehicle_id, "V1");
        assert_eq!(reading.route_id, "R1");
        assert_eq!(
            reading.coordinate,
            Coordinate {
                longitude: 10.0,
                latitude: 63.0
            }
        );
        assert_eq!(reading.timestamp, None);
    }

    #[test]
    fn test_coordinates_are_not_clamped() {
        let entity = vehicle_entity(Some("V1"), Some("R1"), Some((-999.5, 1234.25)));

        let reading = extract_vehicle_reading(&entity, None).unwrap();

        assert_eq!(reading.coordinate.longitude, -999.5);
        assert_eq!(reading.coordinate.latitude, 1234.25);
    }

    #[test]
    fn test_missing_vehicle_payload() {
        let entity = FeedEntity {
            id: String::from("alert"),
            ..Default::default()
        };
        assert_eq!(extract_vehicle_reading(&entity, None), None);
    }

    #[test]
    fn test_missing_position() {
        let entity = vehicle_entity(Some("V1"), Some("R1"), None);
        assert_eq!(extract_vehicle_reading(&entity, None), None);
    }

    #[test]
    fn test_missing_trip() {
        let mut entity = vehicle_entity(Some("V1"), Some("R1"), Some((1.0, 1.0)));
        if let Some(vehicle) = entity.vehicle.as_mut() {
            vehicle.trip = None;
        }
        assert_eq!(extract_vehicle_reading(&entity, None), None);
    }

    #[test]
    fn test_missing_or_empty_route_id() {
        let missing = vehicle_entity(Some("V1"), None, Some((1.0, 1.0)));
        let empty = vehicle_entity(Some("V1"), Some(""), Some((1.0, 1.0)));

        assert_eq!(extract_vehicle_reading(&missing, None), None);
        assert_eq!(extract_vehicle_reading(&empty, None), None);
    }

    #[test]
    fn test_missing_or_empty_vehicle_id() {
        let missing = vehicle_entity(None, Some("R1"), Some((1.0, 1.0)));
        let empty = vehicle_entity(Some(""), Some("R1"), Some((1.0, 1.0)));
        let mut no_descriptor = vehicle_entity(Some("V1"), Some("R1"), Some((1.0, 1.0)));
        if let Some(vehicle) = no_descriptor.vehicle.as_mut() {
            vehicle.vehicle = None;
        }

        assert_eq!(extract_vehicle_reading(&missing, None), None);
        assert_eq!(extract_vehicle_reading(&empty, None), None);
        assert_eq!(extract_vehicle_reading(&no_descriptor, None), None);
    }

    #[test]
    fn test_timestamp_prefers_vehicle_then_header() {
        let mut entity = vehicle_entity(Some("V1"), Some("R1"), Some((1.0, 1.0)));

        let from_header = extract_vehicle_reading(&entity, Some(100)).unwrap();
        assert_eq!(from_header.timestamp, Some(100));

        if let Some(vehicle) = entity.vehicle.as_mut() {
            vehicle.timestamp = Some(42);
        }
        let from_vehicle = extract_vehicle_reading(&entity, Some(100)).unwrap();
        assert_eq!(from_vehicle.timestamp, Some(42));
    }

    #[test]
    fn test_extract_all_keeps_entity_order() {
        let feed = FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: String::from("2.0"),
                timestamp: Some(7),
                ..Default::default()
            },
            entity: vec![
                vehicle_entity(Some("B"), Some("R1"), Some((2.0, 2.0))),
                vehicle_entity(None, Some("R1"), Some((3.0, 3.0))),
                vehicle_entity(Some("A"), Some("R2"), Some((1.0, 1.0))),
            ],
        };

        let (readings, report) = extract_vehicle_readings(&feed);

        let ids: Vec<&str> = readings.iter().map(|r| r.vehicle_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert!(readings.iter().all(|r| r.timestamp == Some(7)));
        assert_eq!(report.accepted_readings, 2);
        assert_eq!(report.skipped_entities(), 1);
    }
}
