pub mod contact;
pub mod deal;
