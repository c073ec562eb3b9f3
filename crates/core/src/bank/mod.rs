//! Bank accounts and bank deposits.

pub mod deposit;
pub mod types;

pub use deposit::{DepositRequest, DepositService, PreparedDeposit};
pub use types::{BankAccountInfo, BankAccountType, BankAccountTypeView, BankTransactionType};
