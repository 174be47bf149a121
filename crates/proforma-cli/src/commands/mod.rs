pub mod deal;
pub mod mortgage;
pub mod returns;
