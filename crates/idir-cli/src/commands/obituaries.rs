use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use inquire::Confirm;

use idir_data::{Delete, Insert, Obituary, ObituaryFilter, Query, Retrieve};
use idir_storage::MediaKind;

use crate::context::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Obituaries {
    /// List obituaries
    #[clap(name = "list")]
    List(ListObituaries),
    /// Post an obituary
    #[clap(name = "add")]
    Add(AddObituary),
    /// Delete an obituary
    #[clap(name = "delete")]
    Delete(DeleteObituary),
}

impl Obituaries {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Obituaries::List(cmd) => cmd.run(ctx).await,
            Obituaries::Add(cmd) => cmd.run(ctx).await,
            Obituaries::Delete(cmd) => cmd.run(ctx).await,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListObituaries {
    #[clap(short, long)]
    pub name: Option<String>,
}

impl ListObituaries {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let obituaries: Vec<Obituary> = ctx
            .db
            .query(&ObituaryFilter {
                id: None,
                name: self.name,
            })
            .await?;
        println!("{} obituaries.", obituaries.len());
        obituaries.print_formatted(ctx.lang);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddObituary {
    #[clap(long)]
    pub first_name: String,
    #[clap(long)]
    pub last_name: String,
    #[clap(long, default_value = "")]
    pub first_name_am: String,
    #[clap(long, default_value = "")]
    pub last_name_am: String,
    #[clap(long)]
    pub died_on: Option<NaiveDate>,
    /// Path to a portrait to upload
    #[clap(long)]
    pub image: Option<PathBuf>,
}

impl AddObituary {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let message = format!(
            "Post obituary for {} {}?",
            self.first_name, self.last_name
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
                Some(ctx.media.store(MediaKind::Obituaries, name, &data).await?)
            }
            None => None,
        };

        let obituary = ctx
            .db
            .insert(Obituary {
                first_name: self.first_name,
                last_name: self.last_name,
                first_name_am: self.first_name_am,
                last_name_am: self.last_name_am,
                died_on: self.died_on,
                image_url,
                created_at: chrono::Local::now().naive_local(),
                ..Obituary::default()
            })
            .await?;
        println!("Obituary {} posted.", obituary.id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeleteObituary {
    #[clap(short, long)]
    pub id: u32,
}

impl DeleteObituary {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let obituary: Obituary = ctx.db.retrieve(self.id).await?;
        println!("{}: {}", obituary.id, obituary.full_name());

        let confirm = Confirm::new("Delete obituary?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        if let Some(image) = &obituary.image_url {
            ctx.media.delete(image).await?;
        }
        ctx.db.delete(obituary).await?;
        println!("Obituary deleted.");
        Ok(())
    }
}
