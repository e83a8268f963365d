pub mod chat;
pub mod notification;
pub mod post;
pub mod user;

pub use chat::{Chat, ChatMessage};
pub use notification::{Notification, NotificationKind};
pub use post::{Comment, Post};
pub use user::User;
