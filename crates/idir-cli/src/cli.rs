use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{
    Admins, Board, Forms, Members, Obituaries, Payments, Posts, RegisterMember,
};

#[derive(Parser, Debug)]
#[clap(name = "idir", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Database file
    #[clap(long, env = "IDIR_DB", default_value = "idir.sqlite3")]
    pub db: String,

    /// Directory for uploaded images and documents
    #[clap(long, env = "IDIR_MEDIA_DIR", default_value = "media")]
    pub media_dir: PathBuf,

    /// Directory for the persisted roster caches
    #[clap(long, env = "IDIR_STATE_DIR", default_value = ".idir")]
    pub state_dir: PathBuf,

    /// Preferred language for names in listings (en or am)
    #[clap(long, env = "IDIR_LANG", default_value = "en")]
    pub lang: String,

    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn init() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the member roster
    #[clap(subcommand)]
    Members(Members),
    /// Manage payment rounds and the ledger
    #[clap(subcommand)]
    Payments(Payments),
    /// Manage posts and announcements
    #[clap(subcommand)]
    Posts(Posts),
    /// Manage downloadable forms
    #[clap(subcommand)]
    Forms(Forms),
    /// Manage obituaries
    #[clap(subcommand)]
    Obituaries(Obituaries),
    /// Manage the board page
    #[clap(subcommand)]
    Board(Board),
    /// Manage back-office accounts
    #[clap(subcommand)]
    Admins(Admins),
    /// Register a new member (public registration form)
    #[clap(name = "register")]
    Register(RegisterMember),
}
