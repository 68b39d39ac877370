mod account;
mod create_account;
mod enable_login;
mod link;
mod signup_policy;

pub use account::cmd_account;
pub use create_account::cmd_create_account;
pub use enable_login::cmd_enable_login;
pub use link::cmd_link;
pub use signup_policy::cmd_signup_policy;
