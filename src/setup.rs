use crate::util::ContextExtras;
use crate::vote::checks::NO_PERMISSION;
use crate::vote::pacer::DEFAULT_PACING_DELAY;
use crate::{AppError, AppVars, AppVarsInner};
use crate::{meta, vote};
use anyhow::{Context as _, Result};
use clap::ArgMatches;
use itertools::Itertools;
use pluralizer::pluralize;
use poise::{
    BoxFuture, Command, Framework, FrameworkError, FrameworkOptions, PrefixFrameworkOptions,
};
use serenity::FutureExt;
use serenity::all::{ChannelId, Context, GuildId, RoleId};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub(crate) fn load_env(args: &ArgMatches) {
    if let Some(path) = args.get_one::<PathBuf>("config") {
        dotenv::from_filename(path).ok();
    }
}

pub(crate) fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

// Env Setup
pub(crate) struct Vars {
    pub(crate) bot: BotVars,
    pub(crate) vote: VoteVars,
}

pub(crate) struct BotVars {
    pub(crate) token: String,
    pub(crate) prefix: String,
    pub(crate) register_globally: bool,
    pub(crate) command_guilds: Vec<GuildId>,
}

pub(crate) struct VoteVars {
    pub(crate) team_role_id: RoleId,
    pub(crate) source_role_name: String,
    pub(crate) pollmaster_role_name: String,
    pub(crate) category_id: Option<ChannelId>,
    pub(crate) pacing_delay: Duration,
}

fn parse_snowflake(key: &str, value: &str) -> Result<u64> {
    let id = value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a valid snowflake"))?;
    anyhow::ensure!(id != 0, "{key} must be a valid snowflake");
    Ok(id)
}

impl Vars {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; blank values count as unset.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).with_context(|| format!("${key} is not set"));

        let command_guilds = get("BOT_COMMAND_GUILDS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|id| parse_snowflake("BOT_COMMAND_GUILDS", id).map(GuildId::new))
            .collect::<Result<Vec<_>>>()?;

        let pacing_delay = match get("VOTE_PACING_DELAY_MS") {
            Some(ms) => Duration::from_millis(
                ms.trim()
                    .parse()
                    .context("VOTE_PACING_DELAY_MS must be a whole number of milliseconds")?,
            ),
            None => DEFAULT_PACING_DELAY,
        };

        Ok(Self {
            bot: BotVars {
                token: required("DISCORD_BOT_TOKEN")?,
                prefix: get("BOT_COMMAND_PREFIX").unwrap_or_else(|| String::from("!")),
                register_globally: get("BOT_REGISTER_GLOBALLY").is_some(),
                command_guilds,
            },
            vote: VoteVars {
                team_role_id: RoleId::new(parse_snowflake(
                    "VOTE_TEAM_ROLE_ID",
                    &required("VOTE_TEAM_ROLE_ID")?,
                )?),
                source_role_name: get("VOTE_SOURCE_ROLE_NAME")
                    .unwrap_or_else(|| String::from("Baby Dragon")),
                pollmaster_role_name: get("VOTE_POLLMASTER_ROLE_NAME")
                    .unwrap_or_else(|| String::from("RT Pollmaster")),
                category_id: get("VOTE_CATEGORY_ID")
                    .map(|id| parse_snowflake("VOTE_CATEGORY_ID", &id).map(ChannelId::new))
                    .transpose()?,
                pacing_delay,
            },
        })
    }
}

// Bot setup

pub(crate) async fn register_commands(
    data: &AppVarsInner,
    ctx: &Context,
    framework: &Framework<AppVars, AppError>,
) -> Result<(), AppError> {
    let is_global = data.env.bot.register_globally;
    let no_commands = &[] as &[Command<AppVars, AppError>];
    let commands = &framework.options().commands;
    let global_registration = if is_global { commands } else { no_commands };
    let local_registration = if is_global { no_commands } else { commands };
    let guilds = &data.env.bot.command_guilds;

    poise::builtins::register_globally(ctx, global_registration).await?;

    for id in guilds.iter() {
        poise::builtins::register_in_guild(ctx, local_registration, *id).await?;
    }

    let commands_text = pluralize("command", commands.len() as isize, true);
    if is_global {
        info!("registered {commands_text} globally");
    } else {
        let guilds_text = pluralize("guild", guilds.len() as isize, true);
        info!(
            guilds = %guilds.iter().join(", "),
            "registered {commands_text} locally in {guilds_text}"
        );
    }

    Ok(())
}

fn handle_framework_error(error: FrameworkError<AppVars, AppError>) -> BoxFuture<()> {
    async move {
        error!("framework error: {error}");

        let Some(ctx) = error.ctx() else { return };
        let error_res = match error {
            FrameworkError::Command {
                error: wrapped_error,
                ..
            } => {
                ctx.reply_ephemeral(format!("An unexpected error occurred: {wrapped_error:?}"))
                    .await
            }
            FrameworkError::CommandCheckFailed { error: None, .. } => {
                ctx.reply_ephemeral(NO_PERMISSION).await
            }
            FrameworkError::ArgumentParse { error, input, .. } => {
                let text = match input {
                    Some(input) => format!("Couldn't read `{input}`: {error}"),
                    None => format!("Missing arguments: {error}"),
                };
                ctx.reply_ephemeral(text).await
            }
            _ => ctx.reply_ephemeral("An unknown error occurred").await,
        };
        if let Err(e) = error_res {
            error!("a further error occurred sending the error message to discord: {e:?}")
        }
    }
    .boxed()
}

fn get_bot_commands() -> Vec<Command<AppVars, AppError>> {
    vec![
        meta::ping::ping(),
        vote::create_channel::create_sample_channel(),
        vote::cleanup::delete_vote_channels(),
    ]
}

pub(crate) fn create_bot_framework_options(env: &Vars) -> FrameworkOptions<AppVars, AppError> {
    FrameworkOptions {
        on_error: handle_framework_error,
        commands: get_bot_commands(),
        prefix_options: PrefixFrameworkOptions {
            prefix: Some(env.bot.prefix.clone()),
            case_insensitive_commands: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let vars = Vars::from_lookup(lookup(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("VOTE_TEAM_ROLE_ID", "1215214403121848350"),
        ]))
        .unwrap();

        assert_eq!(vars.bot.prefix, "!");
        assert!(!vars.bot.register_globally);
        assert!(vars.bot.command_guilds.is_empty());
        assert_eq!(vars.vote.team_role_id, RoleId::new(1215214403121848350));
        assert_eq!(vars.vote.source_role_name, "Baby Dragon");
        assert_eq!(vars.vote.pollmaster_role_name, "RT Pollmaster");
        assert_eq!(vars.vote.category_id, None);
        assert_eq!(vars.vote.pacing_delay, DEFAULT_PACING_DELAY);
    }

    #[test]
    fn explicit_settings_are_parsed() {
        let vars = Vars::from_lookup(lookup(&[
            ("DISCORD_BOT_TOKEN", "token"),
            ("VOTE_TEAM_ROLE_ID", "42"),
            ("VOTE_CATEGORY_ID", "1220447576378314877"),
            ("VOTE_PACING_DELAY_MS", "750"),
            ("BOT_COMMAND_GUILDS", "1, 2,,3"),
            ("BOT_REGISTER_GLOBALLY", "yes"),
        ]))
        .unwrap();

        assert_eq!(
            vars.vote.category_id,
            Some(ChannelId::new(1220447576378314877))
        );
        assert_eq!(vars.vote.pacing_delay, Duration::from_millis(750));
        assert_eq!(
            vars.bot.command_guilds,
            vec![GuildId::new(1), GuildId::new(2), GuildId::new(3)]
        );
        assert!(vars.bot.register_globally);
    }

    #[test]
    fn missing_or_bad_values_are_rejected() {
        assert!(Vars::from_lookup(lookup(&[("VOTE_TEAM_ROLE_ID", "42")])).is_err());
        assert!(Vars::from_lookup(lookup(&[("DISCORD_BOT_TOKEN", "token")])).is_err());
        assert!(
            Vars::from_lookup(lookup(&[
                ("DISCORD_BOT_TOKEN", "token"),
                ("VOTE_TEAM_ROLE_ID", "team"),
            ]))
            .is_err()
        );
        assert!(
            Vars::from_lookup(lookup(&[
                ("DISCORD_BOT_TOKEN", "token"),
                ("VOTE_TEAM_ROLE_ID", "0"),
            ]))
            .is_err()
        );
    }
}
