mod customers;

pub use customers::*;
