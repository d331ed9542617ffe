pub mod account;
pub mod read;
pub mod social;
