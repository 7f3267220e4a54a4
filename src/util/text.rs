use discord_md::generate::{ToMarkdownString, ToMarkdownStringOption};
use itertools::Itertools;
use serenity::all::{Permissions, UserId};
use std::fmt::Display;

pub(crate) fn bot_invite_url(
    id: UserId,
    permissions: Permissions,
    with_slash_commands: bool,
) -> String {
    let scopes = if with_slash_commands {
        "bot+applications.commands"
    } else {
        "bot"
    };
    format!(
        "https://discord.com/oauth2/authorize?client_id={id}&permissions={}&integration_type=0&scope={scopes}",
        permissions.bits()
    )
}

/// Strips Discord formatting so member tags print as typed.
pub(crate) fn remove_markdown(input: &str) -> String {
    let doc = discord_md::parse(input);

    doc.to_markdown_string(&ToMarkdownStringOption::new().omit_format(true))
}

/// Joins items as an English list: `a`, `a and b`, `a, b, and c`.
pub(crate) fn comma_join(items: impl Iterator<Item = impl Display>) -> String {
    let all = items.map(|it| it.to_string()).collect_vec();
    match all.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_join_reads_like_english() {
        assert_eq!(comma_join(std::iter::empty::<&str>()), "");
        assert_eq!(comma_join(["alice"].iter()), "alice");
        assert_eq!(comma_join(["alice", "bob"].iter()), "alice and bob");
        assert_eq!(
            comma_join(["alice", "bob", "carol"].iter()),
            "alice, bob, and carol"
        );
    }

    #[test]
    fn invite_url_carries_permissions_and_scopes() {
        let url = bot_invite_url(UserId::new(5), Permissions::MANAGE_ROLES, true);
        assert!(url.contains("client_id=5"));
        assert!(url.contains(&format!("permissions={}", Permissions::MANAGE_ROLES.bits())));
        assert!(url.ends_with("scope=bot+applications.commands"));

        assert!(bot_invite_url(UserId::new(5), Permissions::empty(), false).ends_with("scope=bot"));
    }
}
