pub mod book;
pub mod commands;
pub mod errors;
pub mod events;
pub mod loan;
pub mod member;
pub mod session;
pub mod value_objects;

pub use book::Book;
pub use errors::*;
pub use events::*;
pub use loan::{LOAN_PERIOD_DAYS, Loan, LoanStatus};
pub use member::Member;
pub use session::Actor;
pub use value_objects::*;
