use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::user::{
        self, ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel,
        ROLE_CUSTOMER,
    },
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    /// Optional phone number for OTP delivery
    pub phone_number: Option<String>,
}

/// User payload with the password and OTP fields stripped.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserModel> for UserResponse {
    fn from(model: UserModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            phone_number: model.phone_number,
            created_at: model.created_at,
        }
    }
}

/// Account service: registration, credential checks, and the OTP lifecycle.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    otp_ttl: Duration,
}

impl UserService {
    pub fn new(db_pool: Arc<DbPool>, otp_ttl_secs: u64) -> Self {
        Self {
            db_pool,
            otp_ttl: Duration::seconds(otp_ttl_secs as i64),
        }
    }

    /// Creates a new customer account. Email addresses are unique.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let existing = UserEntity::find()
            .filter(user::Column::Email.eq(request.email.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let user_id = Uuid::new_v4();
        let active_model = UserActiveModel {
            id: Set(user_id),
            name: Set(request.name),
            email: Set(request.email),
            password: Set(request.password),
            role: Set(ROLE_CUSTOMER.to_string()),
            phone_number: Set(request.phone_number),
            otp_code: Set(None),
            otp_expires_at: Set(None),
            ..Default::default()
        };

        let model = active_model.insert(db).await?;
        info!(user_id = %user_id, "User registered");

        Ok(UserResponse::from(model))
    }

    /// Credential check by email and plain-text password equality.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserModel, ServiceError> {
        let user = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db_pool)
            .await?;

        match user {
            Some(user) if user.password == password => Ok(user),
            _ => Err(ServiceError::Unauthorized(
                "Invalid email or password".to_string(),
            )),
        }
    }

    /// Password login returning the sanitized user.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserResponse, ServiceError> {
        let user = self.authenticate(email, password).await?;
        Ok(UserResponse::from(user))
    }

    /// Validates credentials and stores a fresh OTP against the account.
    ///
    /// Returns the user together with the generated code so the caller can
    /// dispatch it; a previously pending code is superseded.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn issue_otp(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(UserModel, String), ServiceError> {
        let user = self.authenticate(email, password).await?;

        if user.phone_number.is_none() {
            return Err(ServiceError::BadRequest(
                "No phone number associated with this account".to_string(),
            ));
        }

        let otp = generate_otp();
        let expires_at = Utc::now() + self.otp_ttl;

        let user_id = user.id;
        let mut active: UserActiveModel = user.into();
        active.otp_code = Set(Some(otp.clone()));
        active.otp_expires_at = Set(Some(expires_at));
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db_pool).await?;
        info!(user_id = %user_id, "OTP issued");

        Ok((updated, otp))
    }

    /// Checks a submitted OTP and clears it on success so it cannot be
    /// replayed. Wrong and expired codes are both rejected as unauthorized.
    #[instrument(skip(self, otp), fields(email = %email))]
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<UserResponse, ServiceError> {
        let user = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db_pool)
            .await?;

        let user = match user {
            Some(user) if user.otp_code.is_some() && user.otp_expires_at.is_some() => user,
            _ => {
                return Err(ServiceError::BadRequest(
                    "OTP not found or expired".to_string(),
                ))
            }
        };

        let stored_code = user.otp_code.clone().unwrap_or_default();
        let expires_at = user.otp_expires_at.unwrap_or_else(Utc::now);

        if stored_code != otp {
            warn!(user_id = %user.id, "OTP mismatch");
            return Err(ServiceError::Unauthorized("Invalid OTP".to_string()));
        }
        if Utc::now() > expires_at {
            warn!(user_id = %user.id, "OTP expired");
            return Err(ServiceError::Unauthorized("OTP has expired".to_string()));
        }

        let user_id = user.id;
        let mut active: UserActiveModel = user.into();
        active.otp_code = Set(None);
        active.otp_expires_at = Set(None);
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db_pool).await?;
        info!(user_id = %user_id, "OTP verified");

        Ok(UserResponse::from(updated))
    }

    /// Loads a user by id, for collaborators resolving order contacts.
    pub async fn find_user(&self, user_id: Uuid) -> Result<Option<UserModel>, ServiceError> {
        Ok(UserEntity::find_by_id(user_id).one(&*self.db_pool).await?)
    }
}

/// Random 6-digit numeric login code.
fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}
