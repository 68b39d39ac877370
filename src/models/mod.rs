pub mod actor;
pub mod config;
pub mod login;

pub use actor::{Actor, ActorLink, Link, LoginWithActors};
pub use config::{SignupPolicy, StartupAccountsState};
pub use login::Login;
