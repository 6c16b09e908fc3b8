pub mod check;
pub mod grant;
pub mod provision;
pub mod start;
pub mod status;
pub mod unit;
