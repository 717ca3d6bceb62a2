/// Default limits and locations
pub mod limits;
