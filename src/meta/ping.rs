use crate::util::ContextExtras as _;
use crate::{AppError, Context};

/// Check bot is alive, get numerical ping to Discord
#[poise::command(prefix_command, slash_command)]
pub(crate) async fn ping(ctx: Context<'_>) -> Result<(), AppError> {
    let ping_num = ctx.ping().await.as_millis();

    ctx.reply_ephemeral(match ping_num {
        0 => String::from("ok, waiting for more data to report ping"),
        _ => format!("hi, heartbeat is pinging in {ping_num} ms"),
    })
    .await?;
    Ok(())
}
