pub mod prelude;

pub mod actor;
pub mod login;
pub mod login_actor_link;
pub mod login_token;
pub mod node_config;
