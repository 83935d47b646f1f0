pub mod evaluation;
pub mod frame;
pub mod mapdata;
pub mod series;
pub mod session;
