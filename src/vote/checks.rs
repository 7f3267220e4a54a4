use crate::{AppError, Context};

pub(crate) const NO_PERMISSION: &str = "You do not have permission to use this command.";

/// Vote commands are limited to members of the configured team role.
pub(crate) async fn holds_team_role(ctx: Context<'_>) -> Result<bool, AppError> {
    let team_role = ctx.data().env.vote.team_role_id;

    Ok(ctx
        .author_member()
        .await
        .is_some_and(|member| member.roles.contains(&team_role)))
}
