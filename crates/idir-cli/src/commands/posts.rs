use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use inquire::Confirm;

use idir_data::{Delete, Insert, Post, PostFilter, PostSection, Query, Retrieve, Update};
use idir_storage::MediaKind;

use crate::context::Context;
use crate::formatting::PrintFormatted;

#[derive(Subcommand, Debug)]
pub enum Posts {
    /// List posts, optionally within one section
    #[clap(name = "list")]
    List(ListPosts),
    /// Add a post at the end of its section
    #[clap(name = "add")]
    Add(AddPost),
    /// Update a post's content
    #[clap(name = "set")]
    Update(UpdatePost),
    /// Move a post to a new position within its section
    #[clap(name = "move")]
    Move(MovePost),
    /// Delete a post
    #[clap(name = "delete")]
    Delete(DeletePost),
}

impl Posts {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        match self {
            Posts::List(cmd) => cmd.run(ctx).await,
            Posts::Add(cmd) => cmd.run(ctx).await,
            Posts::Update(cmd) => cmd.run(ctx).await,
            Posts::Move(cmd) => cmd.run(ctx).await,
            Posts::Delete(cmd) => cmd.run(ctx).await,
        }
    }
}

async fn upload_image(ctx: &Context, path: &PathBuf) -> Result<String> {
    let data = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("invalid image path"))?;
    let url = ctx.media.store(MediaKind::Posts, name, &data).await?;
    Ok(url)
}

#[derive(Args, Debug)]
pub struct ListPosts {
    /// blog, home, about or announcement
    #[clap(short, long)]
    pub section: Option<String>,
}

impl ListPosts {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let section = match self.section {
            Some(s) => Some(s.parse::<PostSection>()?),
            None => None,
        };
        let posts: Vec<Post> = ctx
            .db
            .query(&PostFilter { id: None, section })
            .await?;
        println!("{} posts.", posts.len());
        posts.print_formatted(ctx.lang);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct AddPost {
    #[clap(long)]
    pub header: String,
    #[clap(long, default_value = "")]
    pub header_am: String,
    #[clap(long)]
    pub body: String,
    #[clap(long, default_value = "")]
    pub body_am: String,
    #[clap(long, default_value = "blog")]
    pub section: String,
    /// Path to an image to upload
    #[clap(long)]
    pub image: Option<PathBuf>,
}

impl AddPost {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let section: PostSection = self.section.parse()?;

        let message = format!("Add post \"{}\"?", self.header);
        let confirm = Confirm::new(&message).with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        let image_url = match &self.image {
            Some(path) => Some(upload_image(ctx, path).await?),
            None => None,
        };

        let post = ctx
            .db
            .insert(Post {
                header: self.header,
                header_am: self.header_am,
                body: self.body,
                body_am: self.body_am,
                image_url,
                section,
                created_at: chrono::Local::now().naive_local(),
                ..Post::default()
            })
            .await?;
        println!(
            "Post {} added to {} at position {}.",
            post.id, post.section, post.position
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct UpdatePost {
    #[clap(long)]
    pub id: u32,
    #[clap(long)]
    pub header: Option<String>,
    #[clap(long)]
    pub header_am: Option<String>,
    #[clap(long)]
    pub body: Option<String>,
    #[clap(long)]
    pub body_am: Option<String>,
    /// Path to a replacement image
    #[clap(long)]
    pub image: Option<PathBuf>,
}

impl UpdatePost {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let mut post: Post = ctx.db.retrieve(self.id).await?;

        if let Some(header) = self.header {
            post.header = header;
        }
        if let Some(header_am) = self.header_am {
            post.header_am = header_am;
        }
        if let Some(body) = self.body {
            post.body = body;
        }
        if let Some(body_am) = self.body_am {
            post.body_am = body_am;
        }

        let message = format!("Update post {}?", post.id);
        let confirm = Confirm::new(&message).with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        if let Some(path) = &self.image {
            if let Some(old) = &post.image_url {
                ctx.media.delete(old).await?;
            }
            post.image_url = Some(upload_image(ctx, path).await?);
        }

        ctx.db.update(post).await?;
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct MovePost {
    #[clap(long)]
    pub id: u32,
    /// Target position within the post's section, clamped to its end
    #[clap(long)]
    pub position: u32,
}

impl MovePost {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let post = ctx.db.move_post(self.id, self.position).await?;
        println!(
            "Post {} now at position {} in {}.",
            post.id, post.position, post.section
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct DeletePost {
    #[clap(short, long)]
    pub id: u32,
}

impl DeletePost {
    pub async fn run(self, ctx: &Context) -> Result<()> {
        let post: Post = ctx.db.retrieve(self.id).await?;
        println!("{}: {}", post.id, post.header);

        let confirm = Confirm::new("Delete post?").with_default(true);
        if !confirm.prompt()? {
            return Ok(());
        }

        if let Some(image) = &post.image_url {
            ctx.media.delete(image).await?;
        }
        ctx.db.delete(post).await?;
        println!("Post deleted.");
        Ok(())
    }
}
