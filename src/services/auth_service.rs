use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::auth::{Claims, CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest, UserList},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure},
    models::{Role, User},
    response::{ApiResponse, Meta},
};

/// Database row including the credential hash. Never serialized; everything
/// leaving this module goes through [`User`].
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    full_name: String,
    phone: Option<String>,
    email: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_public(self) -> AppResult<User> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown role {}", self.role)))?;
        Ok(User {
            id: self.id,
            username: self.username,
            role,
            full_name: self.full_name,
            phone: self.phone,
            email: self.email,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub async fn login_user(
    pool: &DbPool,
    jwt_secret: &str,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { username, password } = payload;
    let user: Option<UserRow> =
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = $1 AND active = TRUE")
            .bind(username.as_str())
            .fetch_optional(pool)
            .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid username or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid username or password".into()));
    }

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let user_id = user.id;
    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        user: user.into_public()?,
    };

    if let Err(err) = log_audit(
        pool,
        Some(user_id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn create_user(
    pool: &DbPool,
    actor: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure(actor, Capability::ManageUsers)?;

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
        .bind(payload.username.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Username is already taken".into()));
    }

    if payload.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".into(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let id = Uuid::new_v4();

    let user: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, password_hash, role, full_name, phone, email)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payload.username.as_str())
    .bind(password_hash)
    .bind(payload.role.as_str())
    .bind(payload.full_name.as_str())
    .bind(payload.phone.as_deref())
    .bind(payload.email.as_deref())
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(actor.user_id),
        "user_create",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id, "role": user.role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("User created", user.into_public()?, None))
}

pub async fn list_users(pool: &DbPool, actor: &AuthUser) -> AppResult<ApiResponse<UserList>> {
    ensure(actor, Capability::ManageUsers)?;

    let rows: Vec<UserRow> = sqlx::query_as("SELECT * FROM users ORDER BY created_at")
        .fetch_all(pool)
        .await?;
    let items = rows
        .into_iter()
        .map(UserRow::into_public)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    pool: &DbPool,
    actor: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure(actor, Capability::ManageUsers)?;

    let existing: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let password_hash = match payload.password.as_deref() {
        Some(p) if p.len() < 8 => {
            return Err(AppError::BadRequest(
                "Password must be at least 8 characters".into(),
            ));
        }
        Some(p) => hash_password(p)?,
        None => existing.password_hash.clone(),
    };
    let role = payload
        .role
        .map(|r| r.as_str().to_string())
        .unwrap_or(existing.role);
    let full_name = payload.full_name.unwrap_or(existing.full_name);
    let phone = payload.phone.or(existing.phone);
    let email = payload.email.or(existing.email);
    let active = payload.active.unwrap_or(existing.active);

    let user: UserRow = sqlx::query_as(
        r#"
        UPDATE users
        SET password_hash = $2, role = $3, full_name = $4, phone = $5, email = $6, active = $7
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(password_hash)
    .bind(role)
    .bind(full_name)
    .bind(phone)
    .bind(email)
    .bind(active)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(actor.user_id),
        "user_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User updated",
        user.into_public()?,
        Some(Meta::empty()),
    ))
}
