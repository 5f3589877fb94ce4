pub mod broker;
pub mod bus;
pub mod event;
