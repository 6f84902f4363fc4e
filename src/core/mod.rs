pub mod annotations;
pub mod approvals;
pub mod config;
pub mod keys;
pub mod tool_calls;
pub mod views;
