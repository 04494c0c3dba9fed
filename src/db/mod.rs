pub mod accounts;
pub mod activities;
pub mod notifications;
pub mod submissions;
