use std::sync::Arc;

use eligibility_checker::{
    affiliation::Affiliation,
    directory::DirectoryPort,
    engine::{DecisionErrorKind, OVERRIDE_REASON, PRINCIPAL_NOT_FOUND_REASON},
};

use crate::support::{
    BROKEN_PRINCIPAL, FakeDirectory, affiliation_policy, build_engine, entitlement_policy,
};

#[tokio::test]
async fn given_override_member_when_checking_then_eligible_regardless_of_data() {
    let (engine, _) = build_engine(entitlement_policy()).await;

    for validate_affiliation in [true, false] {
        let decision = engine
            .check_eligibility_with("nemcarda", validate_affiliation)
            .await;
        assert!(decision.eligible);
        assert_eq!(decision.reason, OVERRIDE_REASON);
        assert!(decision.error.is_none());
        assert_eq!(decision.principal.id(), "nemcarda");
    }

    let (engine, _) = build_engine(affiliation_policy()).await;
    let decision = engine.check_eligibility("nemcarda").await;
    assert!(decision.eligible);
    assert_eq!(decision.reason, OVERRIDE_REASON);
}

#[tokio::test]
async fn given_lapsed_entitlement_without_validation_when_checking_then_entitlement_decides() {
    let (engine, _) = build_engine(entitlement_policy()).await;

    let decision = engine.check_eligibility_with("nemcardr", false).await;

    assert!(!decision.eligible);
    assert_eq!(decision.reason, "enterprise entitlement is false");
    assert!(decision.error.is_none());
}

#[tokio::test]
async fn given_lapsed_entitlement_and_ineligible_affiliation_when_validating_then_ineligible() {
    let (engine, _) = build_engine(entitlement_policy()).await;

    let decision = engine.check_eligibility("nemcardr").await;

    assert!(!decision.eligible);
    assert_eq!(decision.reason, "enterprise entitlement is false");
    assert!(decision.error.is_none());
}

#[tokio::test]
async fn given_granted_entitlement_when_checking_then_eligible() {
    let (engine, _) = build_engine(entitlement_policy()).await;

    let unvalidated = engine.check_eligibility_with("nemcards", false).await;
    assert!(unvalidated.eligible);
    assert_eq!(unvalidated.reason, "enterprise entitlement is true");

    let validated = engine.check_eligibility("nemcardsa1").await;
    assert!(validated.eligible);
    assert_eq!(validated.reason, "enterprise entitlement is true");
    assert!(validated.error.is_none());
}

#[tokio::test]
async fn given_faculty_without_entitlement_when_validating_then_eligible_with_mismatch_error() {
    let (engine, _) = build_engine(entitlement_policy()).await;

    let decision = engine.check_eligibility("nemcardferr").await;

    assert!(decision.eligible);
    let error = decision.error.as_ref().expect("mismatch must be reported");
    assert_eq!(error.kind, DecisionErrorKind::EntitlementMismatch);
    assert_eq!(
        decision.reason,
        "highest affiliation Faculty shows Test nemcardferr should have a valid enterprise entitlement but they do not"
    );
    assert_eq!(error.message, decision.reason);
}

#[tokio::test]
async fn given_nameless_staff_without_entitlement_when_validating_then_mismatch_names_the_id() {
    let (engine, _) = build_engine(entitlement_policy()).await;

    let decision = engine.check_eligibility("nemcardrsn").await;

    assert!(decision.eligible);
    assert_eq!(
        decision.error.as_ref().map(|err| err.kind),
        Some(DecisionErrorKind::EntitlementMismatch)
    );
    assert_eq!(
        decision.reason,
        "highest affiliation RegularStaff shows nemcardrsn should have a valid enterprise entitlement but they do not"
    );
}

#[tokio::test]
async fn given_faculty_without_entitlement_when_not_validating_then_entitlement_decides() {
    let (engine, _) = build_engine(entitlement_policy()).await;

    let decision = engine.check_eligibility_with("nemcardferr", false).await;

    assert!(!decision.eligible);
    assert!(decision.error.is_none());
}

#[tokio::test]
async fn given_alumnus_with_lingering_entitlement_when_validating_then_entitlement_is_trusted() {
    let (engine, _) = build_engine(entitlement_policy()).await;

    let decision = engine.check_eligibility("nemcardaerr").await;

    assert!(decision.eligible);
    assert_eq!(decision.reason, "enterprise entitlement is true");
    assert!(decision.error.is_none());
}

#[tokio::test]
async fn given_unknown_principal_when_checking_then_not_found_is_reported_as_data() {
    for policy in [entitlement_policy(), affiliation_policy()] {
        let (engine, _) = build_engine(policy).await;

        let decision = engine.check_eligibility("ghost").await;

        assert!(!decision.eligible);
        assert_eq!(decision.reason, PRINCIPAL_NOT_FOUND_REASON);
        assert_eq!(
            decision.error.as_ref().map(|err| err.kind),
            Some(DecisionErrorKind::NotFound)
        );
        assert_eq!(decision.principal.id(), "ghost");
        assert!(!decision.principal.exists());
    }
}

#[tokio::test]
async fn given_directory_failure_when_checking_then_failure_is_reported_as_data() {
    let (engine, _) = build_engine(entitlement_policy()).await;

    let decision = engine.check_eligibility(BROKEN_PRINCIPAL).await;

    assert!(!decision.eligible);
    assert_eq!(decision.reason, "directory search timed out");
    assert_eq!(
        decision.error.as_ref().map(|err| err.kind),
        Some(DecisionErrorKind::Directory)
    );
}

#[tokio::test]
async fn given_affiliation_only_service_when_checking_then_tier_decides() {
    let (engine, _) = build_engine(affiliation_policy()).await;

    let retiree = engine.check_eligibility("nemcardr").await;
    assert!(!retiree.eligible);
    assert_eq!(retiree.reason, "Retiree are not eligible for Test Service with no uSE");
    assert!(retiree.error.is_none());

    let student = engine.check_eligibility("nemcards").await;
    assert!(student.eligible);
    assert_eq!(student.reason, "Student are eligible for Test Service with no uSE");

    let unaffiliated = engine.check_eligibility("nemcardu").await;
    assert!(!unaffiliated.eligible);
    assert_eq!(
        unaffiliated.reason,
        "Unknown are not eligible for Test Service with no uSE"
    );
}

#[tokio::test]
async fn given_affiliation_only_service_when_checking_faculty_without_entitlement_then_no_error() {
    let (engine, _) = build_engine(affiliation_policy()).await;

    let decision = engine.check_eligibility("nemcardferr").await;

    assert!(decision.eligible);
    assert_eq!(decision.reason, "Faculty are eligible for Test Service with no uSE");
    assert!(decision.error.is_none());
}

#[tokio::test]
async fn given_sponsored_affiliates_when_checking_affiliation_then_level_decides() {
    let (engine, _) = build_engine(entitlement_policy()).await;
    let directory = FakeDirectory::new();

    let level_one = directory.fetch_principal("nemcardsa1").await.expect("fixture");
    let decision = engine.check_affiliation_eligibility(level_one);
    assert!(decision.eligible);
    assert_eq!(
        decision.reason,
        "Sponsored affiliates t1 are eligible for Test Service with uSE"
    );
    assert!(decision.error.is_none());

    let level_two = directory.fetch_principal("nemcardsa2").await.expect("fixture");
    assert_eq!(level_two.sponsorship_level(), Some(2));
    assert!(!engine.check_affiliation_eligibility(level_two).eligible);

    let level_three = directory.fetch_principal("um999999").await.expect("fixture");
    let decision = engine.check_affiliation_eligibility(level_three);
    assert!(!decision.eligible);
    assert_eq!(
        decision.reason,
        "Sponsored affiliates t3 are not eligible for Test Service with uSE"
    );
}

#[tokio::test]
async fn given_core_tiers_when_checking_affiliation_then_policy_list_decides() {
    let (mut engine, _) = build_engine(entitlement_policy()).await;
    let directory = FakeDirectory::new();

    let faculty = directory.fetch_principal("nemcardf").await.expect("fixture");
    let decision = engine.check_affiliation_eligibility(faculty);
    assert!(decision.eligible);
    assert_eq!(decision.reason, "Faculty are eligible for Test Service with uSE");
    assert_eq!(
        decision.principal.resolved_affiliation(),
        Some(Affiliation::Faculty)
    );

    let student = directory.fetch_principal("nemcards").await.expect("fixture");
    assert!(engine.check_affiliation_eligibility(student.clone()).eligible);

    engine
        .update_policy(|policy| {
            policy.eligible_affiliations.remove("Student");
        })
        .await
        .expect("three tiers is advisory only");
    let decision = engine.check_affiliation_eligibility(student);
    assert!(!decision.eligible);
    assert_eq!(decision.reason, "Student are not eligible for Test Service with uSE");
}

#[tokio::test]
async fn given_shared_engine_when_checking_concurrently_then_each_request_is_independent() {
    let (engine, _) = build_engine(entitlement_policy()).await;
    let engine = Arc::new(engine);

    let expectations = [
        ("nemcards", true),
        ("nemcardr", false),
        ("nemcarda", true),
        ("ghost", false),
        ("nemcardsa2", false),
    ];
    let handles: Vec<_> = expectations
        .into_iter()
        .map(|(id, expected)| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { (engine.check_eligibility(id).await, expected) })
        })
        .collect();

    for handle in handles {
        let (decision, expected) = handle.await.expect("check task should not panic");
        assert_eq!(decision.eligible, expected, "{}", decision.principal.id());
    }
}
