//! Contract integration tests
//!
//! Drives the contract end to end over the in-memory ledger:
//! - Role resolution and collection policies
//! - Per-group update authorization and no-op rejection
//! - Suggest / approve / deny with queue compaction
//! - Administrative logs, override and bulk reclassification

use std::sync::Arc;

use access_policy::{CollectionPolicy, PolicyCategory, PolicyPatch, RoleCode, RoleSet};
use biodiversity::{
    BiodiversityContract, ContractConfig, ContractError, EntityKind, OverridePatch, Specimen,
    SpecimenFields, TransferNote, UpdateRequest,
};
use ledger_state::{InMemoryLedger, Ledger, LedgerError};

const X: &str = "X";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn roles(codes: &str) -> RoleSet {
    RoleSet::parse(codes).unwrap()
}

/// Collection X: only Managers create, students may not rename taxa.
fn policy_x() -> PolicyPatch {
    PolicyPatch::new()
        .with(PolicyCategory::CreateSpecimen, roles("M"))
        .with(PolicyCategory::PrimaryUpdate, roles("MC"))
        .with(PolicyCategory::SecondaryUpdate, roles("MCA"))
        .with(PolicyCategory::Georeference, roles("MC"))
        .with(PolicyCategory::LinkImages, roles("MCAS"))
        .with(PolicyCategory::TaxonName, roles("MC"))
        .with(PolicyCategory::TaxonClass, roles("M"))
        .with(PolicyCategory::RegisterLoan, roles("MC"))
        .with(PolicyCategory::RegisterUse, roles("MC"))
        .with(PolicyCategory::Query, roles("MCASP"))
        .with(PolicyCategory::FlagError, roles("MCASP"))
}

async fn setup() -> (InMemoryLedger, BiodiversityContract) {
    init_tracing();
    let ledger = InMemoryLedger::new();
    let contract = BiodiversityContract::new(Arc::new(ledger.clone()));

    for user in ["manager", "student", "bob"] {
        contract.register_user(user).await.unwrap();
    }
    contract
        .register_collection(X, "manager", &policy_x())
        .await
        .unwrap();
    contract
        .grant_permission("manager", "student", X, RoleCode::Student)
        .await
        .unwrap();

    (ledger, contract)
}

async fn setup_with_specimen() -> (InMemoryLedger, BiodiversityContract) {
    let (ledger, contract) = setup().await;
    contract
        .create(
            "42",
            X,
            "manager",
            SpecimenFields {
                taxon: "A".into(),
                location: "Lawrence".into(),
                notes: "original".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    (ledger, contract)
}

fn change(actor: &str, fields: SpecimenFields) -> UpdateRequest {
    UpdateRequest::new("42", X, actor, fields, "")
}

// =============================================================================
// Role Resolution & Policies
// =============================================================================

#[tokio::test]
async fn test_unregistered_member_cannot_create() {
    let (_, contract) = setup().await;

    let err = contract
        .create("42", X, "bob", SpecimenFields::default())
        .await
        .unwrap_err();
    match err {
        ContractError::PermissionDenied(denied) => {
            assert_eq!(denied.actor, "bob");
            assert_eq!(denied.role, RoleCode::Public);
            assert_eq!(denied.required, roles("M"));
        }
        other => panic!("expected PermissionDenied, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_policy_strings_keep_values() {
    let (_, contract) = setup().await;

    let mut positional = vec![String::new(); 13];
    positional[7] = "MC".into();
    let patch = PolicyPatch::from_positional(&positional[..]).unwrap();
    let updated = contract.update_collection(X, "manager", &patch).await.unwrap();

    assert_eq!(updated.allowed(PolicyCategory::TaxonClass), roles("MC"));
    assert_eq!(updated.allowed(PolicyCategory::CreateSpecimen), roles("M"));
    // Categories never set at registration stay closed
    assert!(updated.allowed(PolicyCategory::LinkAuxiliary).is_empty());
}

// =============================================================================
// Field-Group Authorization
// =============================================================================

#[tokio::test]
async fn test_student_taxon_change_denied_manager_location_allowed() {
    let (_, contract) = setup_with_specimen().await;

    let err = contract
        .update(&change(
            "student",
            SpecimenFields {
                taxon: "B".into(),
                ..Default::default()
            },
        ))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ContractError::PermissionDenied(ref d) if d.action.contains("taxonomy")),
        "{err}"
    );

    let updated = contract
        .update(&change(
            "manager",
            SpecimenFields {
                location: "Topeka".into(),
                ..Default::default()
            },
        ))
        .await
        .unwrap();
    assert_eq!(updated.location, "Topeka");
    assert_eq!(updated.taxon, "A");
}

#[tokio::test]
async fn test_all_blank_update_is_noop() {
    let (ledger, contract) = setup_with_specimen().await;
    let versions = ledger.history_of("42").await.unwrap().len();

    let err = contract
        .update(&change("manager", SpecimenFields::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::NoOpUpdate(_)));
    assert!(err.to_string().contains("equivalent to old specimen"));
    assert_eq!(ledger.history_of("42").await.unwrap().len(), versions);
}

// =============================================================================
// Suggest / Approve / Deny
// =============================================================================

#[tokio::test]
async fn test_suggest_then_approve() {
    let (_, contract) = setup_with_specimen().await;

    let mut request = change(
        "bob",
        SpecimenFields {
            notes: "label is smudged".into(),
            ..Default::default()
        },
    );
    request.collection.clear();
    contract.suggest_update(&request, "checked the drawer").await.unwrap();

    let specimen = contract.approve_transaction("42", "manager", "0").await.unwrap();
    assert!(specimen.notes.starts_with("original"));
    assert!(specimen.notes.contains("label is smudged"));
    assert!(specimen.notes.contains("Approved update suggested by user bob"));
    assert!(contract.list_pending("42").await.unwrap().is_empty());

    // Approving the same index again finds an empty queue
    assert!(matches!(
        contract.approve_transaction("42", "manager", "0").await,
        Err(ContractError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_approve_shifts_later_entries() {
    let (_, contract) = setup_with_specimen().await;
    for note in ["one", "two", "three"] {
        let request = change(
            "student",
            SpecimenFields {
                notes: note.into(),
                ..Default::default()
            },
        );
        contract.suggest_update(&request, note).await.unwrap();
    }

    contract.approve_transaction("42", "manager", "1").await.unwrap();
    let pending = contract.list_pending("42").await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].transaction.reason, "one");
    assert_eq!(pending[1].transaction.reason, "three");
    assert_eq!(pending[1].index, 1);

    let denied = contract.deny_transaction("42", "manager", "1").await.unwrap();
    assert_eq!(denied.reason, "three");
}

#[tokio::test]
async fn test_missing_queue() {
    let (_, contract) = setup_with_specimen().await;
    assert!(matches!(
        contract.deny_transaction("42", "manager", "0").await,
        Err(ContractError::NotFound {
            kind: EntityKind::PendingTransactions,
            ..
        })
    ));
}

// =============================================================================
// Permission Granting
// =============================================================================

#[tokio::test]
async fn test_curator_cannot_touch_managers() {
    let (_, contract) = setup().await;
    contract.register_user("carol").await.unwrap();
    contract
        .grant_permission("manager", "carol", X, RoleCode::Curator)
        .await
        .unwrap();

    for role in [RoleCode::Assistant, RoleCode::Student, RoleCode::Public, RoleCode::Curator] {
        contract.grant_permission("carol", "bob", X, role).await.unwrap();
    }
    assert!(contract
        .grant_permission("carol", "bob", X, RoleCode::Manager)
        .await
        .is_err());
    assert!(contract
        .grant_permission("carol", "manager", X, RoleCode::Public)
        .await
        .is_err());
}

// =============================================================================
// Administrative Logs
// =============================================================================

#[tokio::test]
async fn test_logs_append_until_override_clears() {
    let (_, contract) = setup_with_specimen().await;
    let note = TransferNote::new("skin", "Field Museum", "2021-03-04");

    contract.register_loan("42", "manager", &note).await.unwrap();
    contract.return_loan("42", "manager", &note).await.unwrap();
    contract.register_grant("42", "manager", &note).await.unwrap();
    let specimen = contract
        .update(&change(
            "manager",
            SpecimenFields {
                condition: "faded".into(),
                ..Default::default()
            },
        ))
        .await
        .unwrap();
    assert_eq!(specimen.loans.lines().count(), 2);
    assert_eq!(specimen.grants.lines().count(), 1);
    assert_eq!(specimen.condition, "faded \n");

    let cleared = contract
        .override_history(
            "42",
            "manager",
            &OverridePatch {
                condition: "None".into(),
                loans: "None".into(),
                grants: "None".into(),
                notes: "None".into(),
            },
        )
        .await
        .unwrap();
    assert!(cleared.condition.is_empty());
    assert!(cleared.loans.is_empty());
    assert!(cleared.grants.is_empty());
    assert!(cleared.notes.is_empty());
}

#[tokio::test]
async fn test_custom_clear_sentinel() {
    let (_, contract) = setup_with_specimen().await;
    let config = ContractConfig::from_yaml("override_clear_sentinel: CLEAR\n").unwrap();
    let contract = contract.with_config(config);

    let specimen = contract
        .override_history(
            "42",
            "manager",
            &OverridePatch {
                notes: "CLEAR".into(),
                condition: "None".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(specimen.notes.is_empty());
    assert_eq!(specimen.condition, "None\n");
}

// =============================================================================
// Bulk Reclassification
// =============================================================================

#[tokio::test]
async fn test_taxon_class_partial_failure_keeps_earlier_writes() {
    let (ledger, contract) = setup().await;
    for guid in ["1", "2", "3"] {
        contract
            .create(
                guid,
                X,
                "manager",
                SpecimenFields {
                    taxon: "Aves".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    ledger.fail_writes_after(1);
    let err = contract
        .update_taxon_class(X, "manager", "Aves", "Dinosauria")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ContractError::Ledger(LedgerError::WriteRejected { ref key, .. }) if key == "2"
    ));

    ledger.clear_write_faults();
    let taxa: Vec<String> = contract
        .query_all_specimens()
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.specimen.taxon)
        .collect();
    assert_eq!(taxa, vec!["Dinosauria", "Aves", "Aves"]);

    // A retry picks up the rest
    let changed = contract
        .update_taxon_class(X, "manager", "Aves", "Dinosauria")
        .await
        .unwrap();
    assert_eq!(changed, 2);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_records_roundtrip() {
    let collection = CollectionPolicy::from_patch(X, &policy_x());
    let json = serde_json::to_string(&collection).unwrap();
    assert!(json.contains(r#""createSpecimen":"M""#));
    assert_eq!(serde_json::from_str::<CollectionPolicy>(&json).unwrap(), collection);

    let (_, contract) = tokio_test::block_on(setup_with_specimen());
    let specimen = tokio_test::block_on(contract.query("42", "bob")).unwrap();
    let json = serde_json::to_string(&specimen).unwrap();
    assert!(json.contains(r#""loans":"""#));
    assert_eq!(serde_json::from_str::<Specimen>(&json).unwrap(), specimen);
}
