pub mod location_logger;
pub mod normalizer;
pub mod routes;
