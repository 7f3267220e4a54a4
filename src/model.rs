use serenity::all::{Member, Role, RoleId, UserId};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// A guild member as seen by the vote feature: only identity and a display tag.
#[derive(Clone, Debug)]
pub(crate) struct MemberHandle {
    pub(crate) id: UserId,
    pub(crate) tag: String,
}

impl MemberHandle {
    pub(crate) fn new(id: impl Into<UserId>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
        }
    }
}

impl From<&Member> for MemberHandle {
    fn from(member: &Member) -> Self {
        Self::new(member.user.id, member.user.tag())
    }
}

impl PartialEq<Self> for MemberHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MemberHandle {}

impl Hash for MemberHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for MemberHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tag)
    }
}

/// A guild role the vote feature grants, referenced by id and name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RoleHandle {
    pub(crate) id: RoleId,
    pub(crate) name: String,
}

impl RoleHandle {
    pub(crate) fn new(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&Role> for RoleHandle {
    fn from(role: &Role) -> Self {
        Self::new(role.id, role.name.clone())
    }
}
