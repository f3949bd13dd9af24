pub mod error;
pub mod location;
pub mod location_log;
pub mod raw_location;
pub mod responses;
