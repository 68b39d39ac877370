//! CLI module - administrative commands for a swanpipe node
//!
//! Argument parsing uses clap; each command lives in `commands/`.

mod commands;

use clap::{Parser, Subcommand};

/// swanpipe - identity provisioning for a federated social node
#[derive(Parser)]
#[command(name = "swanpipe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create a login, an actor and the link between them
    #[command(alias = "create")]
    CreateAccount {
        login_id: String,

        password: String,

        /// Actor name; defaults to the login id
        #[arg(long)]
        pun: Option<String>,

        /// Link the actor without ownership
        #[arg(long)]
        not_owner: bool,

        /// Roles stored in the login data, e.g. --role admin
        #[arg(long = "role")]
        roles: Vec<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Enable (or with --disable, disable) a login
    EnableLogin {
        login_id: String,

        #[arg(long)]
        disable: bool,
    },

    /// Link an existing login to an existing actor
    Link {
        login_id: String,

        pun: String,

        #[arg(long)]
        owner: bool,
    },

    /// Show a login and its actors
    #[command(alias = "info")]
    Account { login_id: String },

    /// Show the signup policy
    SignupPolicy,
}

pub use commands::*;
