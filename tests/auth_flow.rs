//! Authentication Flow Tests
//!
//! Drives registration, login and the access checks through the library
//! API against a file-backed database.

mod common;

use std::sync::Arc;

use common::test_auth_config;
use roleguard::auth::{authorize, identify, LoginRequest, RegistrationRequest};
use roleguard::{
    AccessError, AuthError, AuthService, Database, PasswordHasher, Role, RoleSet, TokenService,
    UserRepository,
};
use tempfile::TempDir;

async fn service(dir: &TempDir) -> (Database, AuthService<UserRepository>) {
    let db = Database::open(dir.path().join("roleguard.db")).await.unwrap();
    let config = test_auth_config();
    let service = AuthService::new(
        UserRepository::new(db.pool().clone()),
        PasswordHasher::new(&config).unwrap(),
        Arc::new(TokenService::from_config(&config)),
    );
    (db, service)
}

#[tokio::test]
async fn test_register_login_and_authorize() {
    let dir = TempDir::new().unwrap();
    let (_db, auth) = service(&dir).await;

    let registered = auth
        .register(RegistrationRequest::new("alice", "secret1", "manager"))
        .await
        .unwrap();
    assert_eq!(registered.username, "alice");

    let issued = auth
        .login(LoginRequest::new("alice", "secret1"))
        .await
        .unwrap();
    assert_eq!(issued.expires_in, 3600);

    let header = format!("Bearer {}", issued.token);
    let claims = identify(Some(&header), auth.tokens()).unwrap();
    assert_eq!(claims.role, Role::Manager);

    let staff = RoleSet::new(Role::Admin, [Role::Manager]);
    assert!(authorize(Some(&claims), &staff).is_ok());

    let err = authorize(Some(&claims), &RoleSet::only(Role::Admin)).unwrap_err();
    assert!(matches!(
        err,
        AccessError::InsufficientRole { actual: Role::Manager, .. }
    ));
}

#[tokio::test]
async fn test_users_survive_reopen() {
    let dir = TempDir::new().unwrap();

    {
        let (db, auth) = service(&dir).await;
        auth.register(RegistrationRequest::new("alice", "secret1", "user"))
            .await
            .unwrap();
        db.close().await;
    }

    let (_db, auth) = service(&dir).await;
    assert!(auth.login(LoginRequest::new("alice", "secret1")).await.is_ok());

    let err = auth
        .register(RegistrationRequest::new("alice", "secret1", "user"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Conflict));
}

#[tokio::test]
async fn test_stored_hash_is_not_the_password() {
    let dir = TempDir::new().unwrap();
    let (_db, auth) = service(&dir).await;

    auth.register(RegistrationRequest::new("alice", "secret1", "user"))
        .await
        .unwrap();

    let user = auth
        .store()
        .get_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(user.password_hash, "secret1");
    assert!(user.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_concurrent_registrations_store_one_record() {
    let dir = TempDir::new().unwrap();
    let (_db, auth) = service(&dir).await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let auth = auth.clone();
            tokio::spawn(async move {
                auth.register(RegistrationRequest::new("alice", "secret1", "user"))
                    .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AuthError::Conflict) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(auth.store().count().await.unwrap(), 1);
}
