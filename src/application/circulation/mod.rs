mod circulation_service;
mod errors;
mod locks;
mod overdue_scanner;
mod policy;

pub use circulation_service::{
    LoanView, ServiceDependencies, book_inventory, borrow_book, member_loans, return_book,
};
pub use errors::{CirculationError, Result};
pub use locks::{CirculationGuard, CirculationLocks, KeyedLocks};
pub use overdue_scanner::{collect_overdue, scan_overdue};
pub use policy::{CirculationConfig, LoanHistoryPolicy};
