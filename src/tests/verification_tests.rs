use crate::verification::*;
use crate::Error;
use std::time::Duration;

fn jane() -> IdentityInfo {
    IdentityInfo::new("Jane Doe", "190407022", "Science")
}

#[test]
fn test_new_verification_is_unverified() {
    let verification = Verification::new();

    assert_eq!(verification.status(), &VerificationState::Unverified);
    assert!(!verification.is_verified());
    assert!(verification.identity().is_none());
}

#[test]
fn test_submit_then_complete() {
    let mut verification = Verification::new();

    let state = verification.submit(jane()).expect("submit failed");
    assert_eq!(state, VerificationState::Pending);
    assert_eq!(verification.identity(), Some(&jane()));

    let state = verification.complete().expect("complete failed");
    assert_eq!(state, VerificationState::Verified);
    assert!(verification.is_verified());
}

#[test]
fn test_submit_with_blank_field_leaves_state_unchanged() {
    let blanks = [
        IdentityInfo::new("", "190407022", "Science"),
        IdentityInfo::new("Jane Doe", "   ", "Science"),
        IdentityInfo::new("Jane Doe", "190407022", ""),
    ];

    for identity in blanks.clone() {
        let mut verification = Verification::new();
        let err = verification.submit(identity).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(verification.status(), &VerificationState::Unverified);
    }

    for identity in blanks {
        let mut verification = Verification::new();
        verification.submit(jane()).unwrap();
        let err = verification.submit(identity).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(verification.status(), &VerificationState::Pending);
        assert_eq!(verification.identity(), Some(&jane()));
    }
}

#[test]
fn test_validation_names_missing_field() {
    let err = IdentityInfo::new("Jane Doe", "", "Science").validate().unwrap_err();
    assert!(err.to_string().contains("ID number"));
}

#[test]
fn test_complete_requires_pending() {
    let mut verification = Verification::new();

    let err = verification.complete().unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
    assert_eq!(verification.status(), &VerificationState::Unverified);
}

#[test]
fn test_verified_is_terminal() {
    let mut verification = Verification::new();
    verification.submit(jane()).unwrap();
    verification.complete().unwrap();

    assert!(matches!(
        verification.submit(jane()),
        Err(Error::InvalidTransition { .. })
    ));
    assert!(matches!(
        verification.complete(),
        Err(Error::InvalidTransition { .. })
    ));
    assert!(matches!(
        verification.reject("late"),
        Err(Error::InvalidTransition { .. })
    ));
    assert!(verification.is_verified());
}

#[test]
fn test_reject_and_resubmit() {
    let mut verification = Verification::new();
    verification.submit(jane()).unwrap();

    let state = verification.reject("ID card expired").unwrap();
    assert_eq!(
        state,
        VerificationState::Rejected {
            reason: "ID card expired".to_string()
        }
    );
    assert!(verification.complete().is_err());

    let state = verification
        .submit(IdentityInfo::new("Jane Doe", "190407023", "Science"))
        .unwrap();
    assert_eq!(state, VerificationState::Pending);
    assert_eq!(verification.identity().unwrap().id_number, "190407023");
}

#[test]
fn test_state_serialization() {
    let json = serde_json::to_string(&VerificationState::Pending).unwrap();
    assert_eq!(json, r#"{"state":"PENDING"}"#);

    let rejected = VerificationState::Rejected {
        reason: "mismatch".to_string(),
    };
    let loaded: VerificationState =
        serde_json::from_str(&serde_json::to_string(&rejected).unwrap()).unwrap();
    assert_eq!(loaded, rejected);
}

#[tokio::test]
async fn test_check_reports_steps_and_verifies() {
    let mut verification = Verification::new();
    verification.submit(jane()).unwrap();

    let mut steps = Vec::new();
    let state = VerificationCheck::new(Duration::ZERO)
        .run(&mut verification, |step| steps.push(step.to_string()))
        .await
        .expect("check failed");

    assert_eq!(state, VerificationState::Verified);
    assert_eq!(steps.len(), CHECK_STEPS.len() + 1);
    assert_eq!(steps[0], "Scanning facial features...");
    assert_eq!(steps.last().unwrap(), CHECK_SUCCESS);
}

#[tokio::test]
async fn test_check_requires_pending() {
    let mut verification = Verification::new();

    let result = VerificationCheck::new(Duration::ZERO)
        .run(&mut verification, |_| {})
        .await;

    assert!(matches!(result, Err(Error::InvalidTransition { .. })));
}

#[tokio::test]
async fn test_check_mismatch_rejects() {
    let mut verification = Verification::new();
    verification.submit(jane()).unwrap();

    let check = VerificationCheck::new(Duration::ZERO).with_matcher(|identity| {
        (identity.id_number != "000000000").then(|| "Not on the school roster".to_string())
    });

    let mut last_step = String::new();
    let state = check
        .run(&mut verification, |step| last_step = step.to_string())
        .await
        .unwrap();

    assert_eq!(
        state,
        VerificationState::Rejected {
            reason: "Not on the school roster".to_string()
        }
    );
    assert_eq!(last_step, CHECK_MISMATCH);
}

#[test]
fn test_check_runs_on_blocking_executor() {
    let mut verification = Verification::new();
    verification.submit(jane()).unwrap();

    let state = tokio_test::block_on(
        VerificationCheck::new(Duration::ZERO).run(&mut verification, |_| {}),
    )
    .unwrap();

    assert!(state.is_verified());
}
