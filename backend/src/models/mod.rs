pub mod mapping;
pub mod scheduler;

pub use mapping::*;
pub use scheduler::*;
