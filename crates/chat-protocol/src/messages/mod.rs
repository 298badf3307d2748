pub mod auth;
pub mod common;
pub mod conversations;
pub mod friends;
pub mod groups;
pub mod messaging;

pub use auth::*;
pub use common::*;
pub use conversations::*;
pub use friends::*;
pub use groups::*;
pub use messaging::*;
