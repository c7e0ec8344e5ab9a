pub mod accounts;
pub mod announcements;
pub mod health;
pub mod neighborhoods;
pub mod residences;
pub mod visits;
