//! Conversions between domain models and the `shared` DTOs

pub mod citizen_mapper;
pub mod form_mapper;

pub use citizen_mapper::CitizenMapper;
pub use form_mapper::FormMapper;
