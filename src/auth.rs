// src/auth.rs
use graflog::app_log;
use crate::core::config_manager::AuthSettings;
use crate::core::Database;
use crate::profiles::{Profile, ProfileRepository};
use crate::session::Session;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};

/// Access-token claims as issued by the hosted auth provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    #[serde(default)]
    pub email: Option<String>,
    pub aud: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: String,
    audience: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: &str, audience: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            audience: audience.to_string(),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Result<Self> {
        if settings.jwt_secret.is_empty() {
            anyhow::bail!("JWT secret is not configured. Set JOBTRAIL_JWT_SECRET");
        }
        Ok(Self::new(&settings.jwt_secret, &settings.audience))
    }

    /// Verify an HS256 access token and turn it into a session snapshot
    pub fn verify_token(&self, token: &str) -> Result<Session> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?;
        let claims = token_data.claims;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0)
            .ok_or_else(|| anyhow::anyhow!("Token expiry out of range"))?;

        Ok(Session {
            user_id: claims.sub,
            email: claims.email.unwrap_or_default(),
            expires_at,
        })
    }

    /// Mint a token with the same shape the auth provider issues. Used by the
    /// CLI for local accounts and by tests.
    pub fn issue_token(&self, user_id: &str, email: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .context("Token lifetime is out of range")?;
        let claims = Claims {
            sub: user_id.to_string(),
            email: Some(email.to_string()),
            aud: self.audience.clone(),
            exp: expires_at.timestamp() as usize,
            iat: Some(now.timestamp() as usize),
            role: Some("authenticated".to_string()),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;
        Ok(token)
    }
}

/// Authenticated request: the verified session plus the user's profile row.
pub struct AuthenticatedUser {
    pub session: Session,
    pub profile: Profile,
}

impl AuthenticatedUser {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn user_id(&self) -> &str {
        &self.session.user_id
    }

    pub fn email(&self) -> &str {
        &self.session.email
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::DatabaseError)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let database = match req.guard::<&State<Database>>().await {
            Outcome::Success(db) => db,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::DatabaseError)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) if header.starts_with("Bearer ") => &header[7..],
            Some(_) => {
                app_log!(warn, "Invalid Authorization header format");
                return Outcome::Error((Status::Unauthorized, AuthError::InvalidToken));
            }
            None => {
                app_log!(warn, "Missing Authorization header");
                return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
            }
        };

        let session = match auth_config.verify_token(token) {
            Ok(session) => session,
            Err(e) => {
                app_log!(error, "Token verification failed: {}", e);
                return Outcome::Error((Status::Unauthorized, AuthError::TokenVerificationFailed));
            }
        };

        let profile = match ProfileRepository::new(database.pool())
            .get_or_create(&session.user_id, &session.email)
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                app_log!(
                    error,
                    "Failed to load profile for {}: {}",
                    session.email,
                    e
                );
                return Outcome::Error((Status::InternalServerError, AuthError::DatabaseError));
            }
        };

        app_log!(debug, "User {} authenticated", session.email);

        Outcome::Success(AuthenticatedUser { session, profile })
    }
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalAuth {
    pub user: Option<AuthenticatedUser>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAuth {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AuthenticatedUser::from_request(req).await {
            Outcome::Success(auth) => Outcome::Success(OptionalAuth { user: Some(auth) }),
            _ => Outcome::Success(OptionalAuth { user: None }),
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    DatabaseError,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::DatabaseError => "Database error occurred",
        }
    }
}
