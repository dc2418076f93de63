pub mod category_service;
pub mod payment_service;
pub mod salary_service;
pub mod summary_service;

pub use category_service::CategoryService;
pub use payment_service::PaymentService;
pub use salary_service::SalaryService;
pub use summary_service::SummaryService;

use crate::core::errors::LedgerError;

pub type ServiceResult<T> = Result<T, LedgerError>;
