pub mod lenient;
pub mod record;
pub mod rows;

pub use record::*;
pub use rows::*;
