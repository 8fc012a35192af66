mod flight;

pub use flight::{Airport, Company, Flight};
