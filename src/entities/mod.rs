pub mod prelude;

pub mod custom_link;
pub mod profile;
pub mod profile_view;
pub mod session;
pub mod social_link;
