pub mod meter;

pub use meter::Meter;
