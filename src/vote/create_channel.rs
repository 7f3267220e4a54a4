use super::assign::assign_role_to_members;
use super::checks::holds_team_role;
use super::discord_helpers::{SerenityGrantor, find_role_by_name, guild_members_with_role};
use super::provision::{
    WELCOME_MESSAGE, create_vote_channel, create_voter_role, provision_summary,
    requested_sample_size, vote_channel_name, vote_channel_overwrites,
};
use super::sample::sample;
use crate::{AppError, Context};
use anyhow::{Context as _, Result};
use itertools::Itertools as _;
use std::num::NonZeroUsize;
use tracing::{debug, info};

const INVALID_SIZE: &str = "Please specify a valid number of members to sample.";

async fn handle_create_sample_channel(
    ctx: Context<'_>,
    size: NonZeroUsize,
    name: Option<&str>,
) -> Result<String> {
    let guild_id = ctx
        .guild_id()
        .context("vote channels only exist in servers")?;
    let vars = &ctx.data().env.vote;
    let http = ctx.http();
    let channel_name = vote_channel_name(name);

    let source_role = find_role_by_name(http, guild_id, &vars.source_role_name)
        .await?
        .with_context(|| format!("{} role not found", vars.source_role_name))?;
    let candidates = guild_members_with_role(http, guild_id, source_role.id).await?;
    let sampled = sample(&candidates, size.get(), &mut rand::rng());
    info!(
        channel = %channel_name,
        candidates = candidates.len(),
        sampled = sampled.len(),
        "sampled vote members"
    );

    let pollmaster = find_role_by_name(http, guild_id, &vars.pollmaster_role_name)
        .await?
        .with_context(|| format!("{} role not found", vars.pollmaster_role_name))?;

    let voter_role = create_voter_role(http, guild_id, &channel_name).await?;
    let grantor = SerenityGrantor::new(ctx.serenity_context().http.clone(), guild_id);
    let report = assign_role_to_members(&grantor, &ctx.data().pacer, &sampled, &voter_role).await;
    for (member, outcome) in report.outcomes() {
        debug!(%member, ?outcome, "grant outcome");
    }
    info!(
        role = %voter_role.name,
        confirmed = report.confirmed().count(),
        "vote role assigned"
    );

    let bot_id = ctx.serenity_context().cache.current_user().id;
    let overwrites = vote_channel_overwrites(guild_id, bot_id, pollmaster.id, voter_role.id);
    let channel =
        create_vote_channel(http, guild_id, &channel_name, vars.category_id, overwrites).await?;
    channel
        .say(http, WELCOME_MESSAGE)
        .await
        .context("send welcome message")?;
    info!(channel = %channel.name, "vote channel ready");

    let exhausted = report
        .exhausted()
        .map(|(member, _)| member.clone())
        .collect_vec();
    Ok(provision_summary(&channel.name, sampled.len(), &exhausted))
}

/// Sample members into a new private vote channel
#[poise::command(
    prefix_command,
    slash_command,
    rename = "createsamplechannel",
    guild_only,
    check = "holds_team_role"
)]
pub(crate) async fn create_sample_channel(
    ctx: Context<'_>,
    #[description = "How many members to sample"] size: Option<String>,
    #[description = "Name for the vote channel"]
    #[rest]
    name: Option<String>,
) -> Result<(), AppError> {
    let Ok(size) = requested_sample_size(size.as_deref()) else {
        ctx.say(INVALID_SIZE).await?;
        return Ok(());
    };

    ctx.defer().await?;
    let resp = handle_create_sample_channel(ctx, size, name.as_deref())
        .await
        .unwrap_or_else(|e| format!("Error: {e:#}"));
    info!("{resp}");
    ctx.say(resp).await?;
    Ok(())
}
