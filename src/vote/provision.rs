use crate::model::{MemberHandle, RoleHandle};
use crate::util::text::{comma_join, remove_markdown};
use anyhow::{Context as _, Result, bail};
use pluralizer::pluralize;
use serenity::all::{
    ChannelId, ChannelType, CreateChannel, EditRole, GuildChannel, GuildId, Http,
    PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId,
};
use std::num::NonZeroUsize;

/// Every vote channel and vote role name starts with this.
pub(crate) const VOTE_CHANNEL_PREFIX: &str = "🗳｜vote-";

pub(crate) const WELCOME_MESSAGE: &str = "Welcome to the vote channel! Please react to the next \
    message to cast your vote. You can change your vote by reacting again. Voting rewards will be \
    distributed every month. 🗳️.";

const ROLE_REASON: &str = "Vote channel provisioning";

/// Parses the requested sample size, which must be a positive whole number.
pub(crate) fn parse_sample_size(arg: &str) -> Result<NonZeroUsize> {
    let size = arg
        .trim()
        .parse::<usize>()
        .with_context(|| format!("`{arg}` is not a number"))?;
    let Some(size) = NonZeroUsize::new(size) else {
        bail!("sample size must be at least 1");
    };
    Ok(size)
}

/// Reads the sample size argument, which may be missing entirely.
pub(crate) fn requested_sample_size(arg: Option<&str>) -> Result<NonZeroUsize> {
    let arg = arg.context("no sample size given")?;
    parse_sample_size(arg)
}

/// Builds the channel (and role) name from the words after the sample size.
pub(crate) fn vote_channel_name(words: Option<&str>) -> String {
    let suffix = match words.map(str::trim) {
        Some(words) if !words.is_empty() => words,
        _ => "0",
    };
    format!("{VOTE_CHANNEL_PREFIX}{suffix}")
}

pub(crate) fn is_vote_name(name: &str) -> bool {
    name.starts_with(VOTE_CHANNEL_PREFIX)
}

/// Permissions carried by the sampled voters' role, both guild-wide and inside the channel.
pub(crate) fn voter_permissions() -> Permissions {
    Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY | Permissions::ADD_REACTIONS
}

/// Hides the channel from everyone except the bot, pollmasters and the sampled voters.
pub(crate) fn vote_channel_overwrites(
    guild_id: GuildId,
    bot_id: UserId,
    pollmaster_role: RoleId,
    voter_role: RoleId,
) -> Vec<PermissionOverwrite> {
    vec![
        // @everyone shares the guild's ID
        PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(RoleId::new(guild_id.get())),
        },
        PermissionOverwrite {
            allow: Permissions::MANAGE_CHANNELS | Permissions::VIEW_CHANNEL,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(bot_id),
        },
        PermissionOverwrite {
            allow: Permissions::VIEW_CHANNEL
                | Permissions::SEND_MESSAGES
                | Permissions::READ_MESSAGE_HISTORY
                | Permissions::ADD_REACTIONS
                | Permissions::MANAGE_MESSAGES
                | Permissions::EMBED_LINKS,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(pollmaster_role),
        },
        PermissionOverwrite {
            allow: voter_permissions(),
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Role(voter_role),
        },
    ]
}

pub(crate) async fn create_voter_role(
    http: &Http,
    guild_id: GuildId,
    name: &str,
) -> Result<RoleHandle> {
    let role = guild_id
        .create_role(
            http,
            EditRole::new()
                .name(name)
                .permissions(voter_permissions())
                .audit_log_reason(ROLE_REASON),
        )
        .await
        .with_context(|| format!("create role {name}"))?;

    Ok(RoleHandle::from(&role))
}

pub(crate) async fn create_vote_channel(
    http: &Http,
    guild_id: GuildId,
    name: &str,
    category: Option<ChannelId>,
    overwrites: Vec<PermissionOverwrite>,
) -> Result<GuildChannel> {
    let mut builder = CreateChannel::new(name)
        .kind(ChannelType::Text)
        .permissions(overwrites)
        .audit_log_reason(ROLE_REASON);
    if let Some(category) = category {
        builder = builder.category(category);
    }

    guild_id
        .create_channel(http, builder)
        .await
        .with_context(|| format!("create channel {name}"))
}

/// What the invoker sees once provisioning is done.
pub(crate) fn provision_summary(
    channel_name: &str,
    sampled: usize,
    exhausted: &[MemberHandle],
) -> String {
    let mut summary = format!(
        "A new channel has been created: {channel_name} with {}.",
        pluralize("member", sampled as isize, true)
    );

    if !exhausted.is_empty() {
        let names = exhausted
            .iter()
            .map(|m| remove_markdown(&m.tag))
            .collect::<Vec<_>>();
        summary.push_str(&format!(
            "\nI couldn't give the vote role to {}; please add it by hand.",
            comma_join(names.iter())
        ));
    }

    summary
}
