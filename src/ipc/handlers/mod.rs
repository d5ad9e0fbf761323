pub mod attendance;
pub mod core;
pub mod laundry;
pub mod spending;
