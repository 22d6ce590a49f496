//! Data structures for game configuration.
//!
//! This module contains pure data structures that define ship stats,
//! building curves and global tuning. All structs are designed to be
//! deserialized from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by the service layer.

mod building_data;
mod ship_data;

pub use building_data::{BuildingCurve, BuildingTables};
pub use ship_data::{RapidFireEntry, ShipData};
