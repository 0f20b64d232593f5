mod handler;
pub mod model;

pub use handler::{common_dates, create_gathering, find_by_short_id, join_gathering};
