//! Employee records as exchanged with the remote employee API.

pub mod employee;
pub mod filter;

pub use employee::{Employee, NewEmployee};
pub use filter::EmployeeFilter;
