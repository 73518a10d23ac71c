// Application layer - use cases over the loan repository.
// The CLI and the io module both go through LoanService.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
