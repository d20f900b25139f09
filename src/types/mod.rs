mod marker;
pub use marker::{CoordKey, MarkerRecord};

mod status;
pub use status::Status;
