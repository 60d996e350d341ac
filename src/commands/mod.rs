pub mod check;
pub mod dispatch;
pub mod play;
pub mod render;
pub mod walk;
