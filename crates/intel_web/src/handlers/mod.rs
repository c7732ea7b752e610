pub mod analyze;
pub mod probe;

pub use analyze::analyze;
pub use probe::probe;
