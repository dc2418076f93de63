//! Recurrence expansion, category resolution and month aggregation.

pub mod categories;
pub mod month_view;
pub mod recurrence;

pub use categories::CategoryResolver;
pub use month_view::{
    payments_for_month, timeline, DisplayPayment, MonthOverview, MonthSummary,
    DEFAULT_TIMELINE_SPAN,
};
pub use recurrence::{expand, installment_date, schedule, ScheduledInstance};
