use accounts_auth::{Credentials, SessionService, SessionToken};
use accounts_config::{AuthConfig, DatabaseConfig};
use accounts_database::{initialize_database, AccountRepository, NewAccount};
use sqlx::SqlitePool;
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn auth_config(ttl: u64) -> AuthConfig {
    AuthConfig {
        session_ttl_seconds: ttl,
        cookie_secure: false,
    }
}

struct TestContext {
    pool: SqlitePool,
    sessions: SessionService,
    account_id: i64,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new(config: AuthConfig) -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("auth.sqlite");

        let pool = initialize_database(&DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 5,
        })
        .await?;

        let password_hash = Credentials.hash("s3cret")?;
        let account = AccountRepository::new(pool.clone())
            .create(&NewAccount {
                username: "alice".into(),
                email: "alice@example.com".into(),
                password_hash,
                name: "Alice".into(),
                address: "1 Main St".into(),
                phone_number: "1234567890".into(),
                is_staff: false,
                is_superuser: false,
            })
            .await?;

        let sessions = SessionService::new(pool.clone(), &config);

        Ok(Self {
            pool,
            sessions,
            account_id: account.id,
            _temp_dir: temp_dir,
        })
    }

    async fn new_default() -> TestResult<Self> {
        Self::new(auth_config(3_600)).await
    }
}

#[tokio::test]
async fn create_persists_session_with_configured_expiry() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let issued = ctx.sessions.create(ctx.account_id).await?;

    let expires_at: String = sqlx::query_scalar("SELECT expires_at FROM sessions WHERE token = ?")
        .bind(issued.token.as_str())
        .fetch_one(&ctx.pool)
        .await?;
    let stored = chrono::DateTime::parse_from_rfc3339(&expires_at)?.with_timezone(&chrono::Utc);

    assert_eq!(stored.timestamp(), issued.expires_at.timestamp());
    let remaining = issued.expires_at - chrono::Utc::now();
    assert!(remaining.num_seconds() > 3_500 && remaining.num_seconds() <= 3_600);

    Ok(())
}

#[tokio::test]
async fn current_account_id_resolves_live_session() -> TestResult {
    let ctx = TestContext::new_default().await?;

    let issued = ctx.sessions.create(ctx.account_id).await?;

    assert_eq!(
        ctx.sessions.current_account_id(&issued.token).await?,
        Some(ctx.account_id)
    );
    assert_eq!(
        ctx.sessions
            .current_account_id(&SessionToken::new("unknown"))
            .await?,
        None
    );

    Ok(())
}

#[tokio::test]
async fn destroyed_session_no_longer_resolves() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let issued = ctx.sessions.create(ctx.account_id).await?;

    assert!(ctx.sessions.destroy(&issued.token).await?);
    assert_eq!(ctx.sessions.current_account_id(&issued.token).await?, None);
    assert!(!ctx.sessions.destroy(&issued.token).await?);

    Ok(())
}

#[tokio::test]
async fn expired_session_is_discarded_on_lookup() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let issued = ctx.sessions.create(ctx.account_id).await?;

    sqlx::query("UPDATE sessions SET expires_at = ? WHERE token = ?")
        .bind((chrono::Utc::now() - chrono::Duration::minutes(5)).to_rfc3339())
        .bind(issued.token.as_str())
        .execute(&ctx.pool)
        .await?;

    assert_eq!(ctx.sessions.current_account_id(&issued.token).await?, None);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
        .fetch_one(&ctx.pool)
        .await?;
    assert_eq!(remaining, 0, "expired session row should be deleted");

    Ok(())
}

#[tokio::test]
async fn zero_ttl_sessions_never_resolve() -> TestResult {
    let ctx = TestContext::new(auth_config(0)).await?;
    let issued = ctx.sessions.create(ctx.account_id).await?;

    assert_eq!(ctx.sessions.current_account_id(&issued.token).await?, None);
    assert_eq!(ctx.sessions.purge_expired().await?, 0);

    Ok(())
}

#[tokio::test]
async fn destroy_all_revokes_every_session_of_account() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let first = ctx.sessions.create(ctx.account_id).await?;
    let second = ctx.sessions.create(ctx.account_id).await?;
    assert_ne!(first.token, second.token);

    assert_eq!(ctx.sessions.destroy_all(ctx.account_id).await?, 2);
    assert_eq!(ctx.sessions.current_account_id(&first.token).await?, None);
    assert_eq!(ctx.sessions.current_account_id(&second.token).await?, None);

    Ok(())
}

#[tokio::test]
async fn purge_expired_removes_only_stale_sessions() -> TestResult {
    let ctx = TestContext::new_default().await?;
    let stale = ctx.sessions.create(ctx.account_id).await?;
    let live = ctx.sessions.create(ctx.account_id).await?;

    sqlx::query("UPDATE sessions SET expires_at = ? WHERE token = ?")
        .bind((chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339())
        .bind(stale.token.as_str())
        .execute(&ctx.pool)
        .await?;

    assert_eq!(ctx.sessions.purge_expired().await?, 1);
    assert_eq!(
        ctx.sessions.current_account_id(&live.token).await?,
        Some(ctx.account_id)
    );

    Ok(())
}

#[tokio::test]
async fn oversized_ttl_is_clamped() -> TestResult {
    let ctx = TestContext::new(auth_config(u64::MAX)).await?;

    let issued = ctx.sessions.create(ctx.account_id).await?;
    assert!(ctx.sessions.session_ttl().num_days() <= 3_650);
    assert_eq!(
        ctx.sessions.current_account_id(&issued.token).await?,
        Some(ctx.account_id)
    );

    Ok(())
}
