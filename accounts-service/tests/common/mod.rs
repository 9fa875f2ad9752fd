use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use accounts_service::account::errors::AccountError;
use accounts_service::account::errors::ConflictField;
use accounts_service::domain::account::models::Account;
use accounts_service::domain::account::models::AccountId;
use accounts_service::domain::account::ports::AccountRepository;
use accounts_service::domain::account::service::AccountService;
use accounts_service::inbound::http::router::create_router;
use async_trait::async_trait;
use auth::TokenPair;
use auth::TokenService;
use auth::TokenSettings;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryAccountRepository>,
    pub api_client: reqwest::Client,
}

/// Account store kept in process memory.
///
/// Conflict checks and the insert run under one lock, matching the
/// atomicity of the Postgres transaction.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();

        let taken = |field: ConflictField| {
            accounts.values().any(|existing| match field {
                ConflictField::Username => existing.username == account.username,
                ConflictField::Email => {
                    account.email.is_some() && existing.email == account.email
                }
                ConflictField::Phone => {
                    account.phone.is_some() && existing.phone == account.phone
                }
            })
        };

        for field in [
            ConflictField::Username,
            ConflictField::Email,
            ConflictField::Phone,
        ] {
            if taken(field) {
                return Err(AccountError::Conflict(field));
            }
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        Ok(self.accounts.lock().unwrap().get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AccountError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.username.as_str() == username)
            .cloned())
    }

    async fn update_password(
        &self,
        id: &AccountId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| AccountError::NotFound(id.to_string()))?;
        account.password_hash = password_hash.to_string();
        account.updated_at = updated_at;
        Ok(())
    }
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(TokenSettings::default()).await
    }

    pub async fn spawn_with_settings(settings: TokenSettings) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryAccountRepository::default());
        let account_service = Arc::new(AccountService::new(Arc::clone(&repository)));
        let tokens = Arc::new(TokenService::new(TEST_SECRET, settings));

        let router = create_router(account_service, tokens);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            repository,
            api_client: reqwest::Client::new(),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Tokens for `subject` signed with the server secret but already expired.
    pub fn expired_tokens(&self, subject: &str) -> TokenPair {
        let settings = TokenSettings {
            access_token_lifetime: Duration::seconds(-60),
            refresh_token_lifetime: Duration::seconds(-60),
        };
        TokenService::new(TEST_SECRET, settings)
            .issue(subject)
            .expect("Failed to issue tokens")
    }

    pub async fn register(&self, body: serde_json::Value) -> reqwest::Response {
        self.post("/accounts/create/")
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.post("/accounts/login/")
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register `username` and return its access token.
    pub async fn register_and_login(&self, username: &str, password: &str) -> String {
        let response = self
            .register(serde_json::json!({ "username": username, "password": password }))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let response = self.login(username, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        body["data"]["access_token"]
            .as_str()
            .expect("access token missing")
            .to_string()
    }
}
