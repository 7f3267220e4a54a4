use super::pacer::Pacer;
use crate::model::{MemberHandle, RoleHandle};
use std::future::Future;
use tracing::{info, warn};

/// Something that can attach a role to a guild member.
///
/// Granting must be idempotent: a member who already holds the role counts as a success.
pub(crate) trait RoleGrantor {
    fn grant_role(
        &self,
        member: &MemberHandle,
        role: &RoleHandle,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum GrantOutcome {
    Confirmed { attempts: u8 },
    Failed { reason: String },
}

/// Final state of every member in a batch, in the order the batch was given.
#[derive(Debug)]
pub(crate) struct AssignmentReport {
    outcomes: Vec<(MemberHandle, GrantOutcome)>,
}

impl AssignmentReport {
    pub(crate) fn outcomes(&self) -> &[(MemberHandle, GrantOutcome)] {
        &self.outcomes
    }

    pub(crate) fn confirmed(&self) -> impl Iterator<Item = &MemberHandle> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, GrantOutcome::Confirmed { .. }))
            .map(|(member, _)| member)
    }

    /// Members that failed both the first pass and their retry.
    pub(crate) fn exhausted(&self) -> impl Iterator<Item = (&MemberHandle, &str)> {
        self.outcomes
            .iter()
            .filter_map(|(member, outcome)| match outcome {
                GrantOutcome::Failed { reason } => Some((member, reason.as_str())),
                GrantOutcome::Confirmed { .. } => None,
            })
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.exhausted().next().is_none()
    }
}

async fn try_grant(
    grantor: &impl RoleGrantor,
    pacer: &Pacer,
    member: &MemberHandle,
    role: &RoleHandle,
    attempt: u8,
) -> Result<(), String> {
    match pacer.run(grantor.grant_role(member, role)).await {
        Ok(()) => {
            info!(member = %member.tag, role = %role.name, attempt, "granted role");
            Ok(())
        }
        Err(e) => {
            warn!(member = %member.tag, role = %role.name, attempt, error = %e, "failed to grant role");
            Err(format!("{e:#}"))
        }
    }
}

/// Grants `role` to every member, one paced call at a time.
///
/// The first pass tries each member once in order. Members that fail are retried exactly once,
/// oldest failure first; a second failure is final. A failure never aborts the batch, it only
/// shows up in the returned report.
pub(crate) async fn assign_role_to_members(
    grantor: &impl RoleGrantor,
    pacer: &Pacer,
    members: &[MemberHandle],
    role: &RoleHandle,
) -> AssignmentReport {
    let mut outcomes = Vec::with_capacity(members.len());
    let mut retry_queue = Vec::new();

    for (idx, member) in members.iter().enumerate() {
        let outcome = match try_grant(grantor, pacer, member, role, 1).await {
            Ok(()) => GrantOutcome::Confirmed { attempts: 1 },
            Err(reason) => {
                retry_queue.push(idx);
                GrantOutcome::Failed { reason }
            }
        };
        outcomes.push(outcome);
    }

    if !retry_queue.is_empty() {
        info!(
            role = %role.name,
            pending = retry_queue.len(),
            gap = ?pacer.gap(),
            "retrying failed role grants"
        );
    }

    // never re-queued: this loop is the one and only retry
    for idx in retry_queue {
        let member = &members[idx];
        outcomes[idx] = match try_grant(grantor, pacer, member, role, 2).await {
            Ok(()) => GrantOutcome::Confirmed { attempts: 2 },
            Err(reason) => GrantOutcome::Failed { reason },
        };
    }

    let report = AssignmentReport {
        outcomes: members.iter().cloned().zip(outcomes).collect(),
    };

    if !report.is_complete() {
        warn!(
            role = %role.name,
            failed = report.exhausted().count(),
            "some members never received the role"
        );
    }

    report
}
