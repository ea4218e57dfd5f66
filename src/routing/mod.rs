pub mod cidr;
pub mod error;
pub mod table;

pub use error::Error;
pub use table::{NextHop, RoundRobinRoutingTable};
