pub mod app_data;
pub mod category;
pub mod common;
pub mod month;
pub mod payment;

pub use app_data::AppData;
pub use category::Category;
pub use common::{Displayable, Identifiable, NamedEntity};
pub use month::YearMonth;
pub use payment::{Payment, PaymentDraft, PaymentPatch, Recurrence, RecurrenceFrequency};
