#![allow(unused_imports)]

pub use super::custom_link::Entity as CustomLink;
pub use super::profile::Entity as Profile;
pub use super::profile_view::Entity as ProfileView;
pub use super::session::Entity as Session;
pub use super::social_link::Entity as SocialLink;
