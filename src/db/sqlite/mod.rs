mod customers;

pub use customers::SqliteCustomerRepo;
