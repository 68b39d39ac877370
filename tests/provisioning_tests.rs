use std::sync::Arc;

use chrono::{DateTime, Duration};
use serde_json::json;
use swanpipe::clock::ManualClock;
use swanpipe::config::{Config, StartupAccountConfig};
use swanpipe::db::Store;
use swanpipe::domain::ConflictReason;
use swanpipe::models::config::SIGNUP_CONFIG_ID;
use swanpipe::services::{
    NewAccount, ProvisionResult, SignupOutcome, SignupRequest, SignupTokenOutcome, VerifyOutcome,
    create_startup_accounts,
};
use swanpipe::state::SharedState;

fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config.security.memory_cost_kib = 1024;
    config.security.time_cost = 1;
    config.security.parallelism = 1;
    config.security.actor_key_bits = 1024;
    config.tokens.signing_secret = "integration-secret".to_string();
    config
}

async fn setup() -> (SharedState, Arc<ManualClock>) {
    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open store");
    let start = DateTime::from_timestamp(1_760_000_000, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let state = SharedState::with_store(test_config(), store, clock.clone());
    (state, clock)
}

async fn open_registration(state: &SharedState) {
    state
        .store
        .config()
        .put(
            SIGNUP_CONFIG_ID,
            json!({
                "allowOpenRegistration": true,
                "minSignupSeconds": 10,
                "maxSignupSeconds": 3600,
                "confirmationRequired": false
            }),
        )
        .await
        .unwrap();
}

async fn provision(
    state: &SharedState,
    login_id: &str,
    password: &str,
    pun: &str,
) -> ProvisionResult {
    state
        .provisioner
        .provision(NewAccount::new(login_id, password, pun, true))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_conflicts_follow_insertion_order() {
    let (state, _) = setup().await;

    let created = provision(&state, "alice", "pw1", "alicepub").await;
    match &created {
        ProvisionResult::Created {
            login,
            actor,
            owner,
        } => {
            assert_eq!(login.id, "alice");
            assert_eq!(actor.pun, "alicepub");
            assert!(*owner);
            assert!(actor.public_key_pem.contains("BEGIN PUBLIC KEY"));
        }
        ProvisionResult::Conflict { reason } => panic!("unexpected conflict: {reason}"),
    }

    let result = provision(&state, "alice", "pw2", "bobpub").await;
    assert_eq!(result.conflict(), Some(ConflictReason::LoginId));
    assert!(state.store.actors().get("bobpub").await.unwrap().is_none());

    let result = provision(&state, "carol", "pw3", "alicepub").await;
    assert_eq!(result.conflict(), Some(ConflictReason::Pun));
    assert!(state.store.logins().get("carol").await.unwrap().is_none());

    // Both identifiers taken: the login is checked first.
    let result = provision(&state, "alice", "pw4", "alicepub").await;
    assert_eq!(result.conflict(), Some(ConflictReason::LoginId));
}

#[tokio::test]
async fn test_conflict_leaves_no_partial_rows() {
    let (state, _) = setup().await;

    provision(&state, "alice", "pw1", "alicepub").await;

    let account = NewAccount::new("carol", "pw3", "alicepub", true).with_signup_token("tok-1");
    let result = state.provisioner.provision(account).await.unwrap();
    assert_eq!(result.conflict(), Some(ConflictReason::Pun));

    assert!(state.store.logins().get("carol").await.unwrap().is_none());
    assert!(
        state
            .store
            .login_tokens()
            .consumed_by("tok-1")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        state
            .store
            .links()
            .list_for_actor("alicepub")
            .await
            .unwrap()
            .iter()
            .all(|link| link.login_id == "alice")
    );

    // The token was never consumed, so it still works.
    let account = NewAccount::new("carol", "pw3", "carolpub", true).with_signup_token("tok-1");
    let result = state.provisioner.provision(account).await.unwrap();
    assert_eq!(result.conflict(), None);
    assert_eq!(
        state
            .store
            .login_tokens()
            .consumed_by("tok-1")
            .await
            .unwrap()
            .as_deref(),
        Some("carol")
    );
}

#[tokio::test]
async fn test_link_upsert_keeps_one_row() {
    let (state, _) = setup().await;

    provision(&state, "alice", "pw1", "alicepub").await;

    let link = state
        .store
        .links()
        .upsert("alice", "alicepub", true)
        .await
        .unwrap();
    assert!(link.owner);

    let link = state
        .store
        .links()
        .upsert("alice", "alicepub", false)
        .await
        .unwrap();
    assert!(!link.owner);

    let account = state
        .store
        .get_login_with_actors("alice")
        .await
        .unwrap()
        .expect("login exists");
    assert_eq!(account.actors.len(), 1);
    assert_eq!(account.actors[0].pun, "alicepub");
    assert!(!account.actors[0].owner);
}

#[tokio::test]
async fn test_signup_token_is_single_use() {
    let (state, _) = setup().await;

    let first = NewAccount::new("dave", "pw", "davepub", true).with_signup_token("T");
    let result = state.provisioner.provision(first).await.unwrap();
    assert_eq!(result.conflict(), None);

    let second = NewAccount::new("erin", "pw", "erinpub", true).with_signup_token("T");
    let result = state.provisioner.provision(second).await.unwrap();
    assert_eq!(result.conflict(), Some(ConflictReason::SignupToken));

    assert!(state.store.logins().get("erin").await.unwrap().is_none());
    assert!(state.store.actors().get("erinpub").await.unwrap().is_none());
}

#[tokio::test]
async fn test_password_round_trip() {
    let (state, _) = setup().await;

    provision(&state, "hana", "correct horse", "hanapub").await;

    let outcome = state
        .credentials
        .verify("hana", "correct horse")
        .await
        .unwrap();
    assert!(matches!(outcome, VerifyOutcome::Authenticated(ref login) if login.id == "hana"));

    let outcome = state
        .credentials
        .verify("hana", "correct horse ")
        .await
        .unwrap();
    assert_eq!(outcome, VerifyOutcome::Rejected);

    let outcome = state.credentials.verify("nobody", "pw").await.unwrap();
    assert_eq!(outcome, VerifyOutcome::NotFound);
}

#[tokio::test]
async fn test_disabled_login_is_rejected() {
    let (state, _) = setup().await;

    provision(&state, "ivan", "pw", "ivanpub").await;
    assert!(!state.credentials.enable("ivan", false).await.unwrap());

    let outcome = state.credentials.verify("ivan", "pw").await.unwrap();
    assert_eq!(outcome, VerifyOutcome::Rejected);

    let login = state.store.logins().get("ivan").await.unwrap().unwrap();
    assert!(!login.enabled);
    assert!(login.data["lastFailedLogin"].is_string());

    state.credentials.enable("ivan", true).await.unwrap();
    let outcome = state.credentials.verify("ivan", "pw").await.unwrap();
    assert!(matches!(outcome, VerifyOutcome::Authenticated(_)));
}

#[tokio::test]
async fn test_signup_flow_with_clock() {
    let (state, clock) = setup().await;

    let SignupTokenOutcome::Issued {
        token,
        open_registration: registration_open,
    } = state
        .signup_service
        .issue_signup_token("192.0.2.10")
        .await
        .unwrap()
    else {
        panic!("signup policy is seeded");
    };
    assert!(!registration_open);

    let request = SignupRequest {
        login_id: "judy".to_string(),
        pun: None,
        password: "pw".to_string(),
        email: Some("judy@example.com".to_string()),
        token: Some(token.clone()),
    };

    let outcome = state.signup_service.signup(request.clone()).await.unwrap();
    assert_eq!(outcome, SignupOutcome::RegistrationClosed);

    open_registration(&state).await;

    let outcome = state.signup_service.signup(request.clone()).await.unwrap();
    assert!(matches!(outcome, SignupOutcome::InvalidToken { .. }));

    clock.advance(Duration::seconds(11));
    let outcome = state.signup_service.signup(request.clone()).await.unwrap();
    assert_eq!(
        outcome,
        SignupOutcome::Created {
            login_id: "judy".to_string(),
            pun: "judy".to_string(),
            confirmation_required: false,
            email: Some("judy@example.com".to_string()),
        }
    );

    let login = state.store.logins().get("judy").await.unwrap().unwrap();
    assert_eq!(login.data["email"], "judy@example.com");

    let again = SignupRequest {
        login_id: "judy2".to_string(),
        ..request.clone()
    };
    let outcome = state.signup_service.signup(again).await.unwrap();
    assert_eq!(
        outcome,
        SignupOutcome::Conflict {
            reason: ConflictReason::SignupToken
        }
    );

    clock.advance(Duration::seconds(3600));
    let late = SignupRequest {
        login_id: "judy3".to_string(),
        ..request
    };
    let outcome = state.signup_service.signup(late).await.unwrap();
    assert!(matches!(outcome, SignupOutcome::InvalidToken { .. }));
}

#[tokio::test]
async fn test_startup_accounts_run_once() {
    let (state, _) = setup().await;

    let accounts = vec![StartupAccountConfig {
        login_id: "admin".to_string(),
        password: "admin-pw".to_string(),
        pun: None,
        owner: None,
        email: None,
        roles: vec!["admin".to_string()],
    }];

    let report = create_startup_accounts(
        &accounts,
        state.config_gate.as_ref(),
        state.provisioner.as_ref(),
    )
    .await
    .unwrap()
    .expect("first run creates accounts");
    assert_eq!(report.created, 1);
    assert_eq!(report.conflicts, 0);

    let login = state.store.logins().get("admin").await.unwrap().unwrap();
    assert!(login.has_role("admin"));

    let second = create_startup_accounts(
        &accounts,
        state.config_gate.as_ref(),
        state.provisioner.as_ref(),
    )
    .await
    .unwrap();
    assert!(second.is_none());
}
