pub mod replay;
pub mod requests;
