//! HR vertical slice: employee records with an email-uniqueness rule.

mod error;
mod model;
mod service;
mod store;

pub use error::{HrError, HrResult, StoreError, StoreResult};
pub use model::{Employee, NewEmployee, normalize_email};
pub use service::EmployeeService;
pub use store::{EmployeeStore, SeaOrmEmployeeStore};
