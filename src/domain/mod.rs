mod currency;
mod form;
mod ledger;
mod loan;
mod money;
mod profile;

pub use currency::*;
pub use form::*;
pub use ledger::*;
pub use loan::*;
pub use money::*;
pub use profile::*;
