mod customer;

pub use customer::*;
