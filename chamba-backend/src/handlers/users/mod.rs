pub mod ban;
pub mod create;
pub mod dto;
pub mod get;
pub mod prime;
