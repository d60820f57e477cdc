pub mod cases;
pub mod config;
pub mod dispatch;
pub mod grade;
pub mod helpers;
pub mod inspect;
pub mod mcq;
pub mod payload;
pub mod progress;
