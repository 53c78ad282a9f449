//! Credit-card billing cycles: which calendar window an invoice covers and what it owes.

pub mod card;
pub mod invoice;
pub mod statement;

pub use card::{available_limit, committed_amount, CardConfig};
pub use invoice::{
    closing_date_for, resolve, resolve_for_date, resolve_with_clock, InvoiceStatus, InvoiceWindow,
};
pub use statement::{installments_in_window, statement, InvoiceStatement};
