use anyhow::Result;
use clap::{Args, Subcommand};
use inquire::{Confirm, Password};

use idir_data::{password, Admin, AdminFilter, AdminRole, Delete, Insert, Query};

use crate::context::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Admins {
    /// List back-office accounts
    #[clap(name = "list")]
    List(ListAdmins),
    /// Create an account
    #[clap(name = "add")]
    Add(AddAdmin),
    /// Change an account's role
    #[clap(name = "set-role")]
    SetRole(SetAdminRole),
    /// Set a new password for an account
    #[clap(name = "reset-password")]
    ResetPassword(ResetAdminPassword),
    /// Delete an account
    #[clap(name = "delete")]
    Delete(DeleteAdmin),
    /// Check credentials
    #[clap(name = "login")]
    Login(AdminLogin),
}

impl Admins {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Admins::List(cmd) => cmd.run(ctx).await,
            Admins::Add(cmd) => cmd.run(ctx).await,
            Admins::SetRole(cmd) => cmd.run(ctx).await,
            Admins::ResetPassword(cmd) => cmd.run(ctx).await,
            Admins::Delete(cmd) => cmd.run(ctx).await,
            Admins::Login(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListAdmins {
    /// regularAdmin, superAdmin or blocked
    #[clap(short, long)]
    pub role: Option<String>,
}

impl ListAdmins {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let role = match self.role {
            Some(r) => Some(r.parse::<AdminRole>()?),
            None => None,
        };
        let admins: Vec<Admin> = ctx
            .db
            .query(&AdminFilter {
                role,
                ..Default::default()
            })
            .await?;
        println!("{} accounts.", admins.len());
        admins.print_formatted(ctx.lang);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddAdmin {
    #[clap(long)]
    pub email: String,
    #[clap(long)]
    pub name: String,
    #[clap(long, default_value = "regularAdmin")]
    pub role: String,
}

impl AddAdmin {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let role: AdminRole = self.role.parse()?;
        let pass = Password::new("Password:").prompt()?;

        let admin = ctx
            .db
            .insert(Admin {
                uid: password::generate_uid(),
                email: self.email,
                name: self.name,
                role,
                password_hash: password::hash_password(&pass),
            })
            .await?;
        println!("Account {} created.", admin.email);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SetAdminRole {
    #[clap(long)]
    pub email: String,
    #[clap(long)]
    pub role: String,
}

impl SetAdminRole {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let role: AdminRole = self.role.parse()?;
        let admin = ctx.db.admin_by_email(&self.email).await?;
        println!("{}: {} -> {}", admin.email, admin.role, role);

        let confirm = Confirm::new("Change role?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        ctx.db.set_admin_role(&admin.uid, role).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ResetAdminPassword {
    #[clap(long)]
    pub email: String,
}

impl ResetAdminPassword {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let admin = ctx.db.admin_by_email(&self.email).await?;
        let pass = Password::new("New password:").prompt()?;

        ctx.db.reset_admin_password(&admin.uid, &pass).await?;
        println!("Password updated for {}.", admin.email);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteAdmin {
    #[clap(long)]
    pub email: String,
}

impl DeleteAdmin {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let admin = ctx.db.admin_by_email(&self.email).await?;
        println!("{} ({})", admin.email, admin.role);

        let confirm = Confirm::new("Delete account?").with_default(false);
        if !confirm.prompt()? {
            return Ok(());
        }

        ctx.db.delete(admin).await?;
        println!("Account deleted.");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AdminLogin {
    #[clap(long)]
    pub email: String,
}

impl AdminLogin {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let pass = Password::new("Password:").prompt()?;
        let admin = ctx.db.verify_login(&self.email, &pass).await?;
        println!("Welcome, {} ({}).", admin.name, admin.role);
        Ok(())
    }
}
