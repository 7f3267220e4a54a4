use super::assign::RoleGrantor;
use crate::model::{MemberHandle, RoleHandle};
use anyhow::{Context as _, Result};
use itertools::Itertools as _;
use serenity::all::{GuildId, Http, Member, RoleId, UserId};
use std::sync::Arc;

const GRANT_REASON: &str = "Sampled into a vote channel";

/// Only humans holding `role_id` can be sampled.
pub(crate) fn is_candidate(member: &Member, role_id: RoleId) -> bool {
    !member.user.bot && member.roles.contains(&role_id)
}

/// Returns every non-bot guild member holding the specified role ID.
pub(crate) async fn guild_members_with_role(
    http: &Http,
    guild_id: GuildId,
    role_id: RoleId,
) -> Result<Vec<MemberHandle>> {
    // max number of pages to try to fetch (to avoid infinite loops in the event of the server
    // response format changing in a way that breaks the end-of-page detection)
    const MAX_PAGES: u64 = 20;

    // maximum number of members to request per page
    const PAGE_LIMIT: u64 = 1000;

    let mut last_member: Option<UserId> = None;
    let mut members_with_role = Vec::new();

    for _ in 0..MAX_PAGES {
        let page = guild_id
            .members(http, Some(PAGE_LIMIT), last_member)
            .await
            .context("fetch guild members page")?;

        members_with_role.extend(
            page.iter()
                .filter(|m| is_candidate(m, role_id))
                .map(MemberHandle::from),
        );

        match page.last() {
            Some(last) if page.len() >= PAGE_LIMIT as usize => last_member = Some(last.user.id),
            _ => break,
        }
    }

    Ok(members_with_role)
}

/// Looks a role up by its exact name. When several roles share the name, the lowest ID wins.
pub(crate) async fn find_role_by_name(
    http: &Http,
    guild_id: GuildId,
    name: &str,
) -> Result<Option<RoleHandle>> {
    let roles = guild_id.roles(http).await.context("fetch guild roles")?;

    Ok(roles
        .values()
        .filter(|role| role.name == name)
        .sorted_by_key(|role| role.id)
        .map(RoleHandle::from)
        .next())
}

/// Grants roles through Discord's add-member-role endpoint.
pub(crate) struct SerenityGrantor {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl SerenityGrantor {
    pub(crate) fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }
}

impl RoleGrantor for SerenityGrantor {
    // Discord answers 204 for members who already hold the role, so retries are safe
    async fn grant_role(&self, member: &MemberHandle, role: &RoleHandle) -> Result<()> {
        self.http
            .add_member_role(self.guild_id, member.id, role.id, Some(GRANT_REASON))
            .await
            .with_context(|| format!("add role {} to {}", role.name, member.tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(bot: bool, roles: &[u64]) -> Member {
        let mut member = Member::default();
        member.user.bot = bot;
        member.roles = roles.iter().copied().map(RoleId::new).collect();
        member
    }

    #[test]
    fn candidates_are_humans_holding_the_role() {
        let source = RoleId::new(7);

        assert!(!is_candidate(&member(true, &[7]), source));
        assert!(!is_candidate(&member(false, &[]), source));
        assert!(!is_candidate(&member(false, &[3, 8]), source));
        assert!(is_candidate(&member(false, &[7]), source));
        assert!(is_candidate(&member(false, &[3, 7, 8]), source));
    }
}
