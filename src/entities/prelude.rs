pub use super::actor::Entity as Actor;
pub use super::login::Entity as Login;
pub use super::login_actor_link::Entity as LoginActorLink;
pub use super::login_token::Entity as LoginToken;
pub use super::node_config::Entity as NodeConfig;
