pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginOutcome};
pub use auth_service_impl::SeaOrmAuthService;

pub mod config_gate;
pub mod config_gate_impl;
pub use config_gate::{ConfigGate, ConfigGateError, SetConfigOutcome};
pub use config_gate_impl::SeaOrmConfigGate;

pub mod credential_service;
pub mod credential_service_impl;
pub use credential_service::{CredentialError, CredentialStore, VerifyOutcome};
pub use credential_service_impl::SeaOrmCredentialStore;

pub mod provision_service;
pub mod provision_service_impl;
pub use provision_service::{AccountProvisioner, NewAccount, ProvisionError, ProvisionResult};
pub use provision_service_impl::SeaOrmAccountProvisioner;

pub mod signup_service;
pub mod signup_service_impl;
pub use signup_service::{
    SignupError, SignupOutcome, SignupRequest, SignupService, SignupTokenOutcome,
};
pub use signup_service_impl::DefaultSignupService;

pub mod startup;
pub use startup::{StartupReport, create_startup_accounts};

pub mod token_service;
pub use token_service::{Claims, InvalidReason, SessionLifetime, TokenService, TokenVerdict};
