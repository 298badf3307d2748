pub mod conversations;
pub mod friends;
pub mod groups;
pub mod messages;
pub mod users;
