pub mod activity;
pub mod admin_clients;
pub mod admin_forms;
pub mod admin_jobs;
pub mod admins;
pub mod me;
pub mod notification;
