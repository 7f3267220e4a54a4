use crate::util::text::bot_invite_url;
use serenity::all::{Context, EventHandler, Permissions, Ready};
use serenity::async_trait;
use tracing::info;

/// Permissions the bot needs to provision and tear down vote channels.
fn required_permissions() -> Permissions {
    Permissions::MANAGE_ROLES
        | Permissions::MANAGE_CHANNELS
        | Permissions::VIEW_CHANNEL
        | Permissions::SEND_MESSAGES
        | Permissions::READ_MESSAGE_HISTORY
        | Permissions::ADD_REACTIONS
        | Permissions::MANAGE_MESSAGES
        | Permissions::EMBED_LINKS
}

pub(crate) struct VoteEventHandler;

#[async_trait]
impl EventHandler for VoteEventHandler {
    async fn ready(&self, _ctx: Context, ready_info: Ready) {
        info!(
            user = %ready_info.user.tag(),
            uid = %ready_info.user.id,
            api_version = ready_info.version,
            "connected"
        );
        info!(
            "invite link: {}",
            bot_invite_url(ready_info.user.id, required_permissions(), true)
        );
    }
}
