mod float64;

pub use float64::Float64;
pub use ulid::Ulid;
