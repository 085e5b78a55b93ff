// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::op_ref
)]

pub mod config;
pub mod errors;
pub mod extract;
pub mod feed_source;
pub mod gtfs_rt_handlers;
pub mod poll_scheduler;
pub mod tracker;
pub mod validate_gtfs_rt;
pub mod vehicle_table;

pub use config::{ClientIdentity, TrackerConfig};
pub use errors::{ConfigError, PollError};
pub use extract::{VehicleReading, extract_vehicle_reading, extract_vehicle_readings};
pub use feed_source::{FeedSource, HttpFeedSource};
pub use poll_scheduler::PollScheduler;
pub use tracker::{PollReport, VehicleSubscriber, VehicleTracker};
pub use vehicle_table::{
    Coordinate, RetentionPolicy, VehiclePositionSample, VehicleRecord, VehicleTable,
};
