//! End-to-end verification against in-memory and file-backed directories.

mod common;

use std::sync::Arc;

use stampbook_core::code::customer_code;
use stampbook_core::directory::{CustomerProfile, Enrollment, MemoryDirectory, Role};
use stampbook_core::error::Error;
use stampbook_core::lookup::Resolver;
use stampbook_core::session::{Session, SessionFile};
use stampbook_core::store::JsonStore;
use stampbook_core::verify::{EnrollmentVerifier, NotFoundReason, VerifyOutcome};

use common::{
    jane_doe_directory, verifier, JANE_CODE, JANE_ID, JOINED_BUSINESS, UNJOINED_BUSINESS,
};

#[test]
fn test_jane_doe_code() {
    assert_eq!(customer_code(Some(JANE_ID)), JANE_CODE);
}

#[tokio::test]
async fn test_jane_doe_not_enrolled_at_unjoined_business() {
    let outcome = verifier(jane_doe_directory())
        .find_enrolled_customer(JANE_CODE, UNJOINED_BUSINESS)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        VerifyOutcome::NotFound(NotFoundReason::NotEnrolled {
            customer_id: JANE_ID.to_string(),
            display_name: "Jane Doe".to_string(),
        })
    );
}

#[tokio::test]
async fn test_jane_doe_found_at_joined_business() {
    let outcome = verifier(jane_doe_directory())
        .find_enrolled_customer(JANE_CODE, JOINED_BUSINESS)
        .await
        .unwrap();

    let customer = outcome.customer().expect("Jane should be found");
    assert_eq!(customer.customer_id, JANE_ID);
    assert_eq!(customer.display_name, "Jane Doe");
    assert_eq!(customer.points, 120);
}

#[tokio::test]
async fn test_typed_code_variants_agree() {
    let verifier = verifier(jane_doe_directory());
    let canonical = verifier
        .find_enrolled_customer(JANE_CODE, JOINED_BUSINESS)
        .await
        .unwrap();

    for typed in ["sun-873-vpv", "sun873vpv", " Sun 873 Vpv "] {
        let outcome = verifier
            .find_enrolled_customer(typed, JOINED_BUSINESS)
            .await
            .unwrap();
        assert_eq!(outcome, canonical, "{typed:?}");
    }
}

#[tokio::test]
async fn test_unknown_and_malformed_codes() {
    let verifier = verifier(jane_doe_directory());

    let outcome = verifier
        .find_enrolled_customer("ZZZ-999-ZZZ", JOINED_BUSINESS)
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::NotFound(NotFoundReason::UnknownCode));

    for malformed in ["", "SUN-873", "123-ABC-456", "SU?"] {
        let outcome = verifier
            .find_enrolled_customer(malformed, JOINED_BUSINESS)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            VerifyOutcome::NotFound(NotFoundReason::MalformedCode),
            "{malformed:?}"
        );
    }
}

#[tokio::test]
async fn test_missing_name_falls_back_to_placeholder() {
    let nameless = "22222222-2222-2222-2222-222222222222";
    let code = customer_code(Some(nameless));

    let outcome = verifier(jane_doe_directory())
        .find_enrolled_customer(&code, UNJOINED_BUSINESS)
        .await
        .unwrap();
    assert_eq!(outcome.customer().unwrap().display_name, "Customer");

    let outcome = verifier(jane_doe_directory())
        .with_placeholder_name("Guest")
        .find_enrolled_customer(&code, UNJOINED_BUSINESS)
        .await
        .unwrap();
    assert_eq!(outcome.customer().unwrap().display_name, "Guest");
}

#[tokio::test]
async fn test_blank_name_falls_back_to_placeholder() {
    let directory = MemoryDirectory::new()
        .with_customer("customer-1", Some("   "))
        .with_enrollment(Enrollment::new("customer-1", "biz-1"));

    let outcome = verifier(directory)
        .find_enrolled_customer("QJS-327-GDD", "biz-1")
        .await
        .unwrap();
    assert_eq!(outcome.customer().unwrap().display_name, "Customer");
}

#[tokio::test]
async fn test_business_profile_is_not_a_customer() {
    let directory = MemoryDirectory::new()
        .with_profile(CustomerProfile::customer(JANE_ID, None).with_role(Role::Business))
        .with_enrollment(Enrollment::new(JANE_ID, JOINED_BUSINESS));

    let outcome = verifier(directory)
        .find_enrolled_customer(JANE_CODE, JOINED_BUSINESS)
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::NotFound(NotFoundReason::UnknownCode));
}

#[tokio::test]
async fn test_outcome_into_result_errors() {
    let verifier = verifier(jane_doe_directory());

    let err = verifier
        .find_enrolled_customer(JANE_CODE, UNJOINED_BUSINESS)
        .await
        .unwrap()
        .into_result(JANE_CODE, UNJOINED_BUSINESS)
        .unwrap_err();
    assert_eq!(err.code(), Some("E003"));
    assert!(matches!(err, Error::NotEnrolled { .. }));

    let err = verifier
        .find_enrolled_customer("ZZZ-999-ZZZ", UNJOINED_BUSINESS)
        .await
        .unwrap()
        .into_result("ZZZ-999-ZZZ", UNJOINED_BUSINESS)
        .unwrap_err();
    assert_eq!(err.code(), Some("E002"));
}

#[tokio::test]
async fn test_store_backed_verification() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("store.json");

    {
        let mut store = JsonStore::load_from(&path).unwrap();
        store
            .add_profile(CustomerProfile::customer(JANE_ID, Some("Jane Doe".into())))
            .unwrap();
        store
            .add_profile(CustomerProfile::customer("customer-1", None))
            .unwrap();
        store.enroll(JANE_ID, JOINED_BUSINESS).unwrap();
    }

    let store = Arc::new(JsonStore::load_from(&path).unwrap());
    let verifier = EnrollmentVerifier::with_resolver(
        Resolver::new(store.clone()).with_cache(0),
        store,
    );

    let outcome = verifier
        .find_enrolled_customer("sun873vpv", JOINED_BUSINESS)
        .await
        .unwrap();
    assert_eq!(outcome.customer().unwrap().display_name, "Jane Doe");

    let outcome = verifier
        .find_enrolled_customer(JANE_CODE, UNJOINED_BUSINESS)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        VerifyOutcome::NotFound(NotFoundReason::NotEnrolled { .. })
    ));
}

#[tokio::test]
async fn test_session_drives_business_identity() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = SessionFile::new(temp_dir.path().join("session.json"));
    file.save(&Session::new(JOINED_BUSINESS).with_operator("till 2"))
        .unwrap();

    let session = file.load().unwrap();
    let outcome = verifier(jane_doe_directory())
        .find_enrolled_customer(JANE_CODE, &session.business_id)
        .await
        .unwrap();
    assert!(outcome.customer().is_some());
}
