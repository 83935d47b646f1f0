pub mod geo;
pub mod macros;
pub mod observation;
pub mod region;
pub mod selection;

pub use observation::*;
pub use region::*;
pub use selection::*;
