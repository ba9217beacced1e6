pub mod manufactured;
pub mod swe;
