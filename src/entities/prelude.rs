pub use super::follows::Entity as Follows;
pub use super::likes::Entity as Likes;
pub use super::messages::Entity as Messages;
pub use super::users::Entity as Users;
