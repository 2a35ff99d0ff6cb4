//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod activity_log_repo;
pub mod app_form_repo;
pub mod client_repo;
pub mod form_image_repo;
pub mod notification_repo;
pub mod profile_repo;

pub use activity_log_repo::ActivityLogRepo;
pub use app_form_repo::AppFormRepo;
pub use client_repo::ClientRepo;
pub use form_image_repo::FormImageRepo;
pub use notification_repo::NotificationRepo;
pub use profile_repo::ProfileRepo;
