pub(crate) mod text;

use crate::Context;
use poise::{CreateReply, ReplyHandle};

pub trait ContextExtras<'a> {
    async fn reply_ephemeral(
        self,
        text: impl Into<String>,
    ) -> Result<ReplyHandle<'a>, serenity::Error>;
}

impl<'a> ContextExtras<'a> for Context<'a> {
    async fn reply_ephemeral(
        self,
        text: impl Into<String>,
    ) -> Result<ReplyHandle<'a>, serenity::Error> {
        self.send(
            CreateReply::default()
                .content(text)
                .reply(true)
                .ephemeral(true),
        )
        .await
    }
}
