pub mod apply;
pub mod assign;
pub mod complete;
pub mod create;
pub mod dto;
pub mod feedback;
pub mod get;
pub mod list;
pub mod pay;
pub mod reassign;
pub mod release;
pub mod search;
