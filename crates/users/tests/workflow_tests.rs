use accounts_auth::{Credentials, SessionService};
use accounts_config::{AuthConfig, DatabaseConfig};
use accounts_database::{initialize_database, AccountFlags, AccountRepository};
use accounts_users::{
    locations, AccountField, AccountWorkflow, DatabaseWorkflow, FieldError, LoginForm,
    ProfileForm, RegistrationForm, WorkflowError,
};
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

struct TestContext {
    workflow: DatabaseWorkflow,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("workflow.sqlite");

        let pool = initialize_database(&DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 5,
        })
        .await?;

        let workflow = AccountWorkflow::new(
            AccountRepository::new(pool.clone()),
            Credentials,
            SessionService::new(pool, &AuthConfig::default()),
        );

        Ok(Self {
            workflow,
            _temp_dir: temp_dir,
        })
    }
}

fn registration(username: &str, email: &str) -> RegistrationForm {
    RegistrationForm {
        username: username.into(),
        password: "correct horse battery".into(),
        password_confirmation: "correct horse battery".into(),
        email: email.into(),
        address: "221B Baker Street".into(),
        phone_number: "5551234567".into(),
        name: "Sherlock".into(),
    }
}

fn login(username: &str, password: &str) -> LoginForm {
    LoginForm {
        username: username.into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn full_lifecycle_against_sqlite() -> TestResult {
    let ctx = TestContext::new().await?;

    let registered = ctx
        .workflow
        .register(&registration("sherlock", "sherlock@example.com"))
        .await?;
    assert_eq!(registered.redirect, locations::LOGIN);
    assert!(registered.value.password_hash.starts_with("$argon2"));

    let session = ctx
        .workflow
        .login(&login("sherlock", "correct horse battery"), None)
        .await?
        .value;
    let account = ctx
        .workflow
        .current_account(&session.token)
        .await?
        .ok_or("session should resolve")?;
    assert_eq!(account.id, registered.value.id);
    assert!(account.last_login.is_some());

    let form = ProfileForm {
        address: "187 North Gower Street".into(),
        ..ctx.workflow.profile(account.id).await?
    };
    let updated = ctx.workflow.edit_profile(account.id, &form).await?;
    assert_eq!(updated.value.address, "187 North Gower Street");

    ctx.workflow.logout(&session.token).await?;
    assert!(ctx.workflow.current_account(&session.token).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn database_uniqueness_surfaces_as_duplicate_account() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.workflow
        .register(&registration("sherlock", "sherlock@example.com"))
        .await?;

    let username_clash = ctx
        .workflow
        .register(&registration("sherlock", "holmes@example.com"))
        .await
        .err()
        .ok_or("duplicate username accepted")?;
    assert!(matches!(
        username_clash,
        WorkflowError::DuplicateAccount(AccountField::Username)
    ));

    let email_clash = ctx
        .workflow
        .register(&registration("holmes", "sherlock@example.com"))
        .await
        .err()
        .ok_or("duplicate email accepted")?;
    assert!(matches!(
        email_clash,
        WorkflowError::DuplicateAccount(AccountField::Email)
    ));

    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_user_fail_identically() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.workflow
        .register(&registration("sherlock", "sherlock@example.com"))
        .await?;

    let wrong = ctx
        .workflow
        .login(&login("sherlock", "moriarty"), None)
        .await
        .err()
        .ok_or("wrong password accepted")?;
    let unknown = ctx
        .workflow
        .login(&login("moriarty", "moriarty"), None)
        .await
        .err()
        .ok_or("unknown user accepted")?;

    assert_eq!(wrong.to_string(), unknown.to_string());
    assert!(matches!(wrong, WorkflowError::AuthenticationFailure));

    Ok(())
}

#[tokio::test]
async fn invalid_phone_edit_leaves_record_unchanged() -> TestResult {
    let ctx = TestContext::new().await?;
    let account = ctx
        .workflow
        .register(&registration("sherlock", "sherlock@example.com"))
        .await?
        .value;

    let form = ProfileForm {
        phone_number: "12345abcde".into(),
        ..ctx.workflow.profile(account.id).await?
    };
    let errors = ctx
        .workflow
        .edit_profile(account.id, &form)
        .await
        .err()
        .and_then(|error| error.field_errors())
        .ok_or("invalid phone number accepted")?;
    assert!(errors.contains("phone_number", &FieldError::InvalidPhoneNumber));

    let stored = ctx.workflow.profile(account.id).await?;
    assert_eq!(stored.phone_number, "5551234567");

    Ok(())
}

#[tokio::test]
async fn directory_search_and_flags() -> TestResult {
    let ctx = TestContext::new().await?;
    let admin = ctx
        .workflow
        .create_superuser(&registration("mycroft", "mycroft@example.com"))
        .await?;
    let john = ctx
        .workflow
        .register(&registration("john", "John.Watson@example.com"))
        .await?
        .value;

    let found = ctx.workflow.search_accounts(admin.id, "watson").await?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, john.id);

    let all = ctx.workflow.search_accounts(admin.id, "").await?;
    let emails: Vec<_> = all.iter().map(|a| a.email.as_str()).collect();
    assert_eq!(emails, vec!["John.Watson@example.com", "mycroft@example.com"]);

    assert!(matches!(
        ctx.workflow.search_accounts(john.id, "").await,
        Err(WorkflowError::AccessDenied)
    ));

    let session = ctx
        .workflow
        .login(&login("john", "correct horse battery"), None)
        .await?
        .value;
    ctx.workflow
        .set_flags(
            "john",
            AccountFlags {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await?;
    assert!(ctx.workflow.current_account(&session.token).await?.is_none());
    assert!(matches!(
        ctx.workflow
            .login(&login("john", "correct horse battery"), None)
            .await,
        Err(WorkflowError::AuthenticationFailure)
    ));

    Ok(())
}

#[tokio::test]
async fn mismatched_passwords_create_nothing() -> TestResult {
    let ctx = TestContext::new().await?;
    let form = RegistrationForm {
        password_confirmation: "different".into(),
        ..registration("sherlock", "sherlock@example.com")
    };

    let errors = ctx
        .workflow
        .register(&form)
        .await
        .err()
        .and_then(|error| error.field_errors())
        .ok_or("mismatched passwords accepted")?;
    assert!(errors.contains("password_confirmation", &FieldError::PasswordMismatch));
    assert!(ctx.workflow.list_accounts("").await?.is_empty());

    Ok(())
}
