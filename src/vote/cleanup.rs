use super::checks::holds_team_role;
use super::provision::is_vote_name;
use crate::util::text::comma_join;
use crate::{AppError, Context};
use anyhow::{Context as _, Result};
use serenity::all::ChannelType;
use tracing::{info, warn};

const ROLE_CLEANUP_REASON: &str = "Cleanup process";
const CHANNEL_CLEANUP_REASON: &str = "Cleanup vote channels command issued";

async fn handle_delete_vote_channels(ctx: Context<'_>) -> Result<String> {
    let guild_id = ctx
        .guild_id()
        .context("vote channels only exist in servers")?;
    let http = ctx.http();
    let pacer = &ctx.data().pacer;
    let mut leftovers = Vec::new();

    let roles = guild_id.roles(http).await.context("fetch guild roles")?;
    for role in roles.values().filter(|role| is_vote_name(&role.name)) {
        match pacer
            .run(http.delete_role(guild_id, role.id, Some(ROLE_CLEANUP_REASON)))
            .await
        {
            Ok(()) => info!(role = %role.name, "deleted vote role"),
            Err(e) => {
                warn!(role = %role.name, error = %e, "failed to delete vote role");
                leftovers.push(format!("role {}", role.name));
            }
        }
    }

    let channels = guild_id
        .channels(http)
        .await
        .context("fetch guild channels")?;
    let vote_channels = channels
        .values()
        .filter(|channel| channel.kind == ChannelType::Text && is_vote_name(&channel.name));
    for channel in vote_channels {
        match pacer
            .run(http.delete_channel(channel.id, Some(CHANNEL_CLEANUP_REASON)))
            .await
        {
            Ok(_) => info!(channel = %channel.name, "deleted vote channel"),
            Err(e) => {
                warn!(channel = %channel.name, error = %e, "failed to delete vote channel");
                leftovers.push(format!("channel {}", channel.name));
            }
        }
    }

    Ok(match leftovers.len() {
        0 => String::from("All vote channels have been cleaned up."),
        1.. => format!(
            "Cleaned up vote channels, but could not remove {}.",
            comma_join(leftovers.iter())
        ),
    })
}

/// Delete every vote channel and vote role
#[poise::command(
    prefix_command,
    slash_command,
    rename = "deletevotechannels",
    guild_only,
    check = "holds_team_role"
)]
pub(crate) async fn delete_vote_channels(ctx: Context<'_>) -> Result<(), AppError> {
    ctx.defer().await?;
    let resp = handle_delete_vote_channels(ctx)
        .await
        .unwrap_or_else(|e| format!("Error: {e:#}"));
    info!("{resp}");
    ctx.say(resp).await?;
    Ok(())
}
