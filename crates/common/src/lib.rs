//! Error taxonomy and JSON wire types shared by the asset gateway and its clients.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
