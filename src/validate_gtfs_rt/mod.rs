// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FeedQualityReport {
    pub total_entity_count: usize,
    pub vehicle_entity_count: usize,
    pub accepted_readings: usize,
    pub vehicles_at_null_island: usize,
}

impl FeedQualityReport {
    pub fn new(input: &gtfs_realtime::FeedMessage, accepted_readings: usize) -> Self {
        let total_entity_count = input.entity.len();
        let mut vehicle_entity_count: usize = 0;
        let mut vehicles_at_null_island: usize = 0;

        for entity in &input.entity {
            if let Some(vehicle) = &entity.vehicle {
                vehicle_entity_count += 1;

                if let Some(position) = &vehicle.position {
                    if f32::abs(0.0 - position.latitude) < 0.01
                        && f32::abs(0.0 - position.longitude) < 0.01
                    {
                        vehicles_at_null_island += 1;
                    }
                }
            }
        }

        FeedQualityReport {
            total_entity_count,
            vehicle_entity_count,
            accepted_readings,
            vehicles_at_null_island,
        }
    }

    /// Entities with a vehicle payload that did not make it into a reading.
    pub fn skipped_entities(&self) -> usize {
        self.vehicle_entity_count.saturating_sub(self.accepted_readings)
    }
}
