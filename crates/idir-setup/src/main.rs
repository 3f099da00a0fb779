use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use inquire::Password;
use tracing_subscriber::EnvFilter;

use idir_data::{password, Admin, AdminRole, Insert};
use idir_db::{schema, Connection};

#[derive(Parser, Debug)]
#[clap(name = "idir-setup")]
struct Cli {
    #[clap(long, env = "IDIR_DB", default_value = "idir.sqlite3")]
    pub db: String,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the database
    Init,
    /// Create the first superAdmin account
    Bootstrap(Bootstrap),
}

#[derive(Args, Debug)]
pub struct Bootstrap {
    #[clap(long)]
    pub email: String,
    #[clap(long)]
    pub name: String,
}

async fn db_init(filename: &str) -> Result<()> {
    let conn = Connection::open(filename).await?;
    schema::install(&conn).await?;
    Ok(())
}

async fn bootstrap(filename: &str, cmd: &Bootstrap) -> Result<()> {
    let conn = Connection::open(filename).await?;
    let pass = Password::new("Password:").prompt()?;

    let admin = conn
        .insert(Admin {
            uid: password::generate_uid(),
            email: cmd.email.clone(),
            name: cmd.name.clone(),
            role: AdminRole::SuperAdmin,
            password_hash: password::hash_password(&pass),
        })
        .await?;
    println!("superAdmin {} created.", admin.email);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Init => db_init(&cli.db).await?,
        Command::Bootstrap(cmd) => bootstrap(&cli.db, &cmd).await?,
    }
    Ok(())
}
