mod handler;
mod meta;
mod model;
mod setup;
mod util;
mod vote;

use crate::setup::Vars;
use crate::vote::pacer::Pacer;
use anyhow::Context as _;
use clap::{Arg, value_parser};
use serenity::Client;
use serenity::all::GatewayIntents;
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) struct AppVarsInner {
    pub(crate) env: Vars,
    /// Shared by every command so Discord calls stay paced across invocations.
    pub(crate) pacer: Pacer,
}

pub(crate) type AppVars = Arc<AppVarsInner>;
pub(crate) type AppError = anyhow::Error;
pub(crate) type Context<'a> = poise::Context<'a, AppVars, AppError>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = clap::Command::new("vote-sampler")
        .about("Samples server members into private vote channels")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("dotenv file to read settings from")
                .value_parser(value_parser!(PathBuf))
                .default_value(".env"),
        )
        .get_matches();

    setup::load_env(&args);
    setup::init_tracing();

    let env = Vars::from_env().context("load settings")?;
    let token = env.bot.token.clone();
    let options = setup::create_bot_framework_options(&env);
    let data: AppVars = Arc::new(AppVarsInner {
        pacer: Pacer::new(env.vote.pacing_delay),
        env,
    });

    let framework = poise::Framework::builder()
        .options(options)
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                setup::register_commands(&data, ctx, framework).await?;
                Ok(data)
            })
        })
        .build();

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&token, intents)
        .event_handler(handler::VoteEventHandler)
        .framework(framework)
        .await
        .context("couldn't make client")?;

    client.start().await.context("client error")?;
    Ok(())
}
