mod customers;

pub use customers::PostgresCustomerRepo;
