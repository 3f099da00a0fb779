use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use inquire::Confirm;

use idir_data::{BoardMember, BoardMemberFilter, Delete, Insert, Query, Retrieve};
use idir_storage::MediaKind;

use crate::context::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Board {
    /// List board members
    #[clap(name = "list")]
    List(ListBoard),
    /// Add a board member
    #[clap(name = "add")]
    Add(AddBoardMember),
    /// Remove a board member
    #[clap(name = "delete")]
    Delete(DeleteBoardMember),
}

impl Board {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Board::List(cmd) => cmd.run(ctx).await,
            Board::Add(cmd) => cmd.run(ctx).await,
            Board::Delete(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListBoard {
    #[clap(short, long)]
    pub name: Option<String>,
}

impl ListBoard {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let board: Vec<BoardMember> = ctx
            .db
            .query(&BoardMemberFilter {
                id: None,
                name: self.name,
            })
            .await?;
        println!("{} board members.", board.len());
        board.print_formatted(ctx.lang);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddBoardMember {
    #[clap(long)]
    pub first_name: String,
    #[clap(long)]
    pub last_name: String,
    #[clap(long, default_value = "")]
    pub first_name_am: String,
    #[clap(long, default_value = "")]
    pub last_name_am: String,
    /// Role on the board, e.g. Chairperson
    #[clap(long)]
    pub role: String,
    /// Path to a portrait to upload
    #[clap(long)]
    pub image: Option<PathBuf>,
}

impl AddBoardMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let message = format!(
            "Add {} {} as {}?",
            self.first_name, self.last_name, self.role
        );
        let confirm = Confirm::new(&message).with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let image_url = match &self.image {
            Some(path) => {
                let data = tokio::fs::read(path).await?;
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| anyhow!("invalid image path"))?;
                Some(ctx.media.store(MediaKind::Board, name, &data).await?)
            }
            None => None,
        };

        let board_member = ctx
            .db
            .insert(BoardMember {
                first_name: self.first_name,
                last_name: self.last_name,
                first_name_am: self.first_name_am,
                last_name_am: self.last_name_am,
                role_title: self.role,
                image_url,
                created_at: chrono::Local::now().naive_local(),
                ..BoardMember::default()
            })
            .await?;
        println!("Board member {} added.", board_member.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteBoardMember {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteBoardMember {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let board_member: BoardMember = ctx.db.retrieve(self.id).await?;
        println!(
            "{}: {} ({})",
            board_member.id,
            board_member.full_name(),
            board_member.role_title
        );

        let confirm = Confirm::new("Remove board member?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        if let Some(image) = &board_member.image_url {
            ctx.media.delete(image).await?;
        }
        ctx.db.delete(board_member).await?;
        println!("Board member removed.");
        Ok(())
    }
}
