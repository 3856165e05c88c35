pub mod debate;
pub mod dispatch;
pub mod show;
pub mod transcripts;
