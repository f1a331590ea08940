pub mod money;
pub mod signal;
pub mod slug;
pub mod video;
