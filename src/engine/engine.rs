use std::{collections::BTreeSet, sync::Arc};

use crate::{
    directory::{DirectoryPort, Principal},
    engine::{
        decision::{Decision, directory_failure, entitlement_mismatch, not_found},
        ports::DeprovisionPort,
    },
    policy::{ConfigError, PolicyAdvisory, ServicePolicy},
};

pub const PRINCIPAL_NOT_FOUND_REASON: &str = "principal not found";
pub const OVERRIDE_REASON: &str = "override group member";

/// Decides whether principals may use one service.
///
/// The policy is validated and override membership is resolved once, at
/// construction. Requests share only that read-only state, so one engine can
/// serve concurrent callers.
pub struct EligibilityEngine {
    policy: ServicePolicy,
    directory: Arc<dyn DirectoryPort>,
    override_members: BTreeSet<String>,
}

impl EligibilityEngine {
    pub async fn new(
        policy: ServicePolicy,
        directory: Arc<dyn DirectoryPort>,
    ) -> Result<Self, ConfigError> {
        let advisories = policy.validate().into_result()?;
        log_advisories(&policy, &advisories);

        let override_members =
            resolve_override_members(directory.as_ref(), &policy.override_groups).await?;
        tracing::info!(
            target: "eligibility",
            service = %policy.service_label,
            decision_mode = %policy.decision_mode(),
            override_groups = policy.override_groups.len(),
            override_members = override_members.len(),
            "eligibility_engine_ready"
        );

        Ok(Self {
            policy,
            directory,
            override_members,
        })
    }

    pub fn policy(&self) -> &ServicePolicy {
        &self.policy
    }

    pub fn override_members(&self) -> &BTreeSet<String> {
        &self.override_members
    }

    /// Re-runs policy validation against the current policy.
    pub fn revalidate(&self) -> Result<Vec<PolicyAdvisory>, ConfigError> {
        let advisories = self.policy.validate().into_result()?;
        log_advisories(&self.policy, &advisories);
        Ok(advisories)
    }

    /// Applies `update` to a copy of the policy and installs it only if it
    /// validates. Override membership is re-resolved when the group list changes.
    pub async fn update_policy<F>(&mut self, update: F) -> Result<Vec<PolicyAdvisory>, ConfigError>
    where
        F: FnOnce(&mut ServicePolicy),
    {
        let mut candidate = self.policy.clone();
        update(&mut candidate);

        let advisories = candidate.validate().into_result()?;
        log_advisories(&candidate, &advisories);

        if candidate.override_groups != self.policy.override_groups {
            self.override_members =
                resolve_override_members(self.directory.as_ref(), &candidate.override_groups)
                    .await?;
        }
        self.policy = candidate;
        Ok(advisories)
    }

    /// Checks eligibility, cross-validating entitlement data against affiliation.
    pub async fn check_eligibility(&self, principal_id: &str) -> Decision {
        self.check_eligibility_with(principal_id, true).await
    }

    /// `validate_affiliation` only matters for services that trust an entitlement
    /// key; use it before destructive actions to guard against bad entitlement data.
    pub async fn check_eligibility_with(
        &self,
        principal_id: &str,
        validate_affiliation: bool,
    ) -> Decision {
        let decision = self.evaluate(principal_id, validate_affiliation).await;
        tracing::info!(
            target: "eligibility",
            service = %self.policy.service_label,
            principal_id = %principal_id,
            eligible = decision.eligible,
            reason = %decision.reason,
            error = ?decision.error.as_ref().map(|err| err.kind),
            "eligibility_decided"
        );
        decision
    }

    async fn evaluate(&self, principal_id: &str, validate_affiliation: bool) -> Decision {
        let principal = match self.directory.fetch_principal(principal_id).await {
            Ok(principal) => principal,
            Err(err) if err.is_not_found() => {
                return Decision::new(
                    false,
                    PRINCIPAL_NOT_FOUND_REASON,
                    Principal::missing(principal_id),
                )
                .with_error(not_found(err.message));
            }
            Err(err) => {
                return Decision::new(false, err.to_string(), Principal::missing(principal_id))
                    .with_error(directory_failure(err.message));
            }
        };

        if self.override_members.contains(principal_id) {
            return Decision::new(true, OVERRIDE_REASON, principal);
        }

        let Some(entitlement_key) = self.policy.entitlement_key.as_deref() else {
            return self.check_affiliation_eligibility(principal);
        };

        let entitled = principal.has_service_entitlement(entitlement_key);
        let reason = format!("{entitlement_key} entitlement is {entitled}");
        if !validate_affiliation {
            return Decision::new(entitled, reason, principal);
        }

        let (affiliation_eligible, _) = self.affiliation_verdict(&principal);
        if !entitled && affiliation_eligible {
            let message = format!(
                "highest affiliation {} shows {} should have a valid {} entitlement but they do not",
                principal.highest_affiliation(),
                principal.label(),
                entitlement_key
            );
            tracing::warn!(
                target: "eligibility",
                principal_id = %principal.id(),
                principal = %principal.label(),
                entity_id = %principal.entity_id(),
                highest_affiliation = %principal.highest_affiliation(),
                raw_affiliations = ?principal.raw_affiliations(),
                entitlement_key = %entitlement_key,
                "entitlement_affiliation_mismatch"
            );
            return Decision::new(true, message.clone(), principal)
                .with_error(entitlement_mismatch(message));
        }

        tracing::debug!(
            target: "eligibility",
            principal_id = %principal.id(),
            entitled,
            highest_affiliation = %principal.highest_affiliation(),
            "entitlement_validated_against_affiliation"
        );
        Decision::new(entitled, reason, principal)
    }

    /// Decides from affiliation and sponsorship level alone.
    pub fn check_affiliation_eligibility(&self, principal: Principal) -> Decision {
        let (eligible, reason) = self.affiliation_verdict(&principal);
        Decision::new(eligible, reason, principal)
    }

    fn affiliation_verdict(&self, principal: &Principal) -> (bool, String) {
        let label = &self.policy.service_label;
        if let Some(level) = principal.sponsorship_level() {
            let eligible = self.policy.admits_sponsorship_level(level);
            let verdict = if eligible { "are" } else { "are not" };
            return (
                eligible,
                format!("Sponsored affiliates t{level} {verdict} eligible for {label}"),
            );
        }

        let tier = principal.highest_affiliation();
        let eligible = self.policy.admits_affiliation(tier);
        let verdict = if eligible { "are" } else { "are not" };
        (eligible, format!("{tier} {verdict} eligible for {label}"))
    }

    /// Deprovisions `principal_id` when they are ineligible.
    ///
    /// Nothing is done when the decision carries an error. Returns whether the
    /// collaborator reported a completed deprovision.
    pub async fn deprovision_if_ineligible(
        &self,
        principal_id: &str,
        deprovisioner: &dyn DeprovisionPort,
    ) -> bool {
        let decision = self.check_eligibility(principal_id).await;
        if let Some(error) = &decision.error {
            tracing::warn!(
                target: "deprovision",
                principal_id = %principal_id,
                error_kind = ?error.kind,
                error = %error,
                "deprovision_skipped_on_uncertain_data"
            );
            return false;
        }
        if decision.eligible {
            return false;
        }

        match deprovisioner.deprovision(principal_id).await {
            Ok(deprovisioned) => {
                tracing::info!(
                    target: "deprovision",
                    service = %self.policy.service_label,
                    principal_id = %principal_id,
                    deprovisioned,
                    reason = %decision.reason,
                    "deprovision_completed"
                );
                deprovisioned
            }
            Err(err) => {
                tracing::error!(
                    target: "deprovision",
                    service = %self.policy.service_label,
                    principal_id = %principal_id,
                    error = %err,
                    "deprovision_failed"
                );
                false
            }
        }
    }
}

async fn resolve_override_members(
    directory: &dyn DirectoryPort,
    group_names: &BTreeSet<String>,
) -> Result<BTreeSet<String>, ConfigError> {
    let mut members = BTreeSet::new();
    for name in group_names {
        let group = match directory.fetch_group(name).await {
            Ok(group) => group,
            Err(err) if err.is_not_found() => {
                return Err(ConfigError::OverrideGroupMissing {
                    group: name.clone(),
                });
            }
            Err(source) => {
                return Err(ConfigError::OverrideGroupLookup {
                    group: name.clone(),
                    source,
                });
            }
        };
        if !group.exists {
            return Err(ConfigError::OverrideGroupMissing {
                group: name.clone(),
            });
        }
        if group.member_ids.is_empty() {
            return Err(ConfigError::OverrideGroupEmpty {
                group: name.clone(),
            });
        }
        members.extend(group.member_ids);
    }
    Ok(members)
}

fn log_advisories(policy: &ServicePolicy, advisories: &[PolicyAdvisory]) {
    for advisory in advisories {
        tracing::warn!(
            target: "policy",
            service = %policy.service_label,
            advisory = %advisory,
            "policy_advisory"
        );
    }
}
