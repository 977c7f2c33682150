use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use bandshare_core::{
    Band, BandCode, BandId, BandShareState, BandStatus, FieldSet, Profile, ShareField, ShareToken,
    TokenStatus, TokenValue, UserId,
};
use bandshare_state::error::StateError;
use bandshare_state::store::{BandStore, ProfileStore, ShareStateStore, TokenStore};

use crate::config::PostgresConfig;
use crate::migrations;

/// `SQLSTATE` for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Build `PgConnectOptions` from a [`PostgresConfig`], applying SSL settings
/// when configured.
pub(crate) fn build_connect_options(
    config: &PostgresConfig,
) -> Result<sqlx::postgres::PgConnectOptions, StateError> {
    let mut options: sqlx::postgres::PgConnectOptions = config
        .url
        .parse()
        .map_err(|e: sqlx::Error| StateError::Connection(e.to_string()))?;

    if let Some(ref mode) = config.ssl_mode {
        let ssl_mode = match mode.as_str() {
            "disable" => sqlx::postgres::PgSslMode::Disable,
            "prefer" => sqlx::postgres::PgSslMode::Prefer,
            "require" => sqlx::postgres::PgSslMode::Require,
            "verify-ca" => sqlx::postgres::PgSslMode::VerifyCa,
            "verify-full" => sqlx::postgres::PgSslMode::VerifyFull,
            other => {
                return Err(StateError::Connection(format!("unknown ssl_mode: {other}")));
            }
        };
        options = options.ssl_mode(ssl_mode);
    }

    if let Some(ref path) = config.ssl_root_cert {
        options = options.ssl_root_cert(path);
    }

    Ok(options)
}

/// Map a `sqlx` error onto the store error taxonomy.
///
/// Pool exhaustion and I/O failures are reported as unavailability so the
/// gateway can tell them apart from query bugs.
fn map_sqlx(e: sqlx::Error) -> StateError {
    match &e {
        sqlx::Error::PoolTimedOut => StateError::Timeout(Duration::ZERO),
        sqlx::Error::Io(_) | sqlx::Error::PoolClosed | sqlx::Error::Tls(_) => {
            StateError::Connection(e.to_string())
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StateError::Conflict(db.message().to_owned())
        }
        _ => StateError::Backend(e.to_string()),
    }
}

fn fields_to_column(fields: &FieldSet) -> Vec<String> {
    fields.iter().map(|f| f.as_str().to_owned()).collect()
}

/// Identifiers the current build no longer knows are dropped with a warning.
fn fields_from_column(raw: Vec<String>) -> FieldSet {
    raw.into_iter()
        .filter_map(|s| match s.parse::<ShareField>() {
            Ok(field) => Some(field),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring stored share field");
                None
            }
        })
        .collect()
}

fn band_from_row(row: &sqlx::postgres::PgRow) -> Result<Band, StateError> {
    let id: String = row.try_get("id").map_err(map_sqlx)?;
    let code: String = row.try_get("code").map_err(map_sqlx)?;
    let status: String = row.try_get("status").map_err(map_sqlx)?;
    let owner: Option<String> = row.try_get("owner_user_id").map_err(map_sqlx)?;
    Ok(Band {
        id: BandId::new(id),
        code: BandCode::new(code),
        status: BandStatus::from_stored(&status),
        owner: owner.map(UserId::new),
    })
}

fn token_from_row(row: &sqlx::postgres::PgRow) -> Result<ShareToken, StateError> {
    let token: String = row.try_get("token").map_err(map_sqlx)?;
    let band_id: String = row.try_get("band_id").map_err(map_sqlx)?;
    let status: String = row.try_get("status").map_err(map_sqlx)?;
    Ok(ShareToken {
        token: TokenValue::new(token),
        band_id: BandId::new(band_id),
        status: TokenStatus::from_stored(&status),
        expires_at: row.try_get("expires_at").map_err(map_sqlx)?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
    })
}

/// PostgreSQL-backed implementation of the share lifecycle stores.
///
/// The token claim is a single conditional `UPDATE ... RETURNING`, so row
/// locking in the database serializes concurrent claims.
pub struct PostgresStateStore {
    pool: PgPool,
    config: Arc<PostgresConfig>,
}

impl PostgresStateStore {
    /// Create a new `PostgresStateStore` from the provided configuration.
    ///
    /// Connects to `PostgreSQL`, creates the connection pool, and runs
    /// migrations to ensure the required tables exist.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Connection`] if pool creation fails, or
    /// [`StateError::Backend`] if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StateError> {
        let connect_options = build_connect_options(&config)?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect_with(connect_options)
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        Self::from_pool(pool, config).await
    }

    /// Create a `PostgresStateStore` from an existing pool and config.
    /// Runs migrations on creation.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Backend`] if migrations fail.
    pub async fn from_pool(pool: PgPool, config: PostgresConfig) -> Result<Self, StateError> {
        migrations::run_migrations(&pool, &config)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        Ok(Self {
            pool,
            config: Arc::new(config),
        })
    }
}

#[async_trait]
impl BandStore for PostgresStateStore {
    async fn band_by_code(&self, code: &BandCode) -> Result<Option<Band>, StateError> {
        let table = self.config.bands_table();
        let query =
            format!("SELECT id, code, status, owner_user_id FROM {table} WHERE code = $1");
        let row = sqlx::query(&query)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(band_from_row).transpose()
    }

    async fn band_by_id(&self, id: &BandId) -> Result<Option<Band>, StateError> {
        let table = self.config.bands_table();
        let query = format!("SELECT id, code, status, owner_user_id FROM {table} WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(band_from_row).transpose()
    }

    async fn put_band(&self, band: &Band) -> Result<Band, StateError> {
        let table = self.config.bands_table();
        // The existing row keeps its id; only status and owner move.
        let query = format!(
            "INSERT INTO {table} (id, code, status, owner_user_id) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (code) DO UPDATE SET \
               status = EXCLUDED.status, \
               owner_user_id = EXCLUDED.owner_user_id \
             RETURNING id, code, status, owner_user_id"
        );
        let row = sqlx::query(&query)
            .bind(band.id.as_str())
            .bind(band.code.as_str())
            .bind(band.status.as_str())
            .bind(band.owner.as_ref().map(UserId::as_str))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        band_from_row(&row)
    }
}

#[async_trait]
impl ShareStateStore for PostgresStateStore {
    async fn share_state(&self, band_id: &BandId) -> Result<Option<BandShareState>, StateError> {
        let table = self.config.band_state_table();
        let query = format!(
            "SELECT armed, armed_fields, armed_until, updated_at FROM {table} WHERE band_id = $1"
        );
        let Some(row) = sqlx::query(&query)
            .bind(band_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
        else {
            return Ok(None);
        };

        let fields: Vec<String> = row.try_get("armed_fields").map_err(map_sqlx)?;
        Ok(Some(BandShareState {
            band_id: band_id.clone(),
            armed: row.try_get("armed").map_err(map_sqlx)?,
            armed_fields: fields_from_column(fields),
            armed_until: row.try_get("armed_until").map_err(map_sqlx)?,
            updated_at: row.try_get("updated_at").map_err(map_sqlx)?,
        }))
    }

    async fn upsert_share_state(&self, state: &BandShareState) -> Result<(), StateError> {
        let table = self.config.band_state_table();
        let query = format!(
            "INSERT INTO {table} (band_id, armed, armed_fields, armed_until, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (band_id) DO UPDATE SET \
               armed = EXCLUDED.armed, \
               armed_fields = EXCLUDED.armed_fields, \
               armed_until = EXCLUDED.armed_until, \
               updated_at = EXCLUDED.updated_at"
        );
        sqlx::query(&query)
            .bind(state.band_id.as_str())
            .bind(state.armed)
            .bind(fields_to_column(&state.armed_fields))
            .bind(state.armed_until)
            .bind(state.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn release_share(&self, band_id: &BandId, now: DateTime<Utc>) -> Result<(), StateError> {
        let table = self.config.band_state_table();
        let query = format!(
            "UPDATE {table} SET armed = FALSE, armed_until = NULL, updated_at = $2 \
             WHERE band_id = $1"
        );
        sqlx::query(&query)
            .bind(band_id.as_str())
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PostgresStateStore {
    async fn profile(&self, user_id: &UserId) -> Result<Option<Profile>, StateError> {
        let table = self.config.profiles_table();
        let query = format!(
            "SELECT name, phone, email, website, instagram, tiktok, linkedin, x, youtube, \
             whatsapp, snapchat, venmo, cashapp FROM {table} WHERE user_id = $1"
        );
        let Some(row) = sqlx::query(&query)
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
        else {
            return Ok(None);
        };

        let mut profile = Profile::new(user_id.clone());
        profile.name = row.try_get("name").map_err(map_sqlx)?;
        for field in ShareField::ALL {
            *profile.slot_mut(field) = row.try_get(field.as_str()).map_err(map_sqlx)?;
        }
        Ok(Some(profile))
    }

    async fn put_profile(&self, profile: &Profile) -> Result<(), StateError> {
        let table = self.config.profiles_table();
        let query = format!(
            "INSERT INTO {table} (user_id, name, phone, email, website, instagram, tiktok, \
               linkedin, x, youtube, whatsapp, snapchat, venmo, cashapp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             ON CONFLICT (user_id) DO UPDATE SET \
               name = EXCLUDED.name, phone = EXCLUDED.phone, email = EXCLUDED.email, \
               website = EXCLUDED.website, instagram = EXCLUDED.instagram, \
               tiktok = EXCLUDED.tiktok, linkedin = EXCLUDED.linkedin, x = EXCLUDED.x, \
               youtube = EXCLUDED.youtube, whatsapp = EXCLUDED.whatsapp, \
               snapchat = EXCLUDED.snapchat, venmo = EXCLUDED.venmo, \
               cashapp = EXCLUDED.cashapp"
        );
        let mut q = sqlx::query(&query)
            .bind(profile.user_id.as_str())
            .bind(profile.name.as_deref());
        // Column order matches ShareField::ALL.
        for field in ShareField::ALL {
            q = q.bind(profile.raw(field));
        }
        q.execute(&self.pool).await.map_err(map_sqlx)?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for PostgresStateStore {
    async fn insert_token(&self, token: &ShareToken) -> Result<(), StateError> {
        let table = self.config.share_tokens_table();
        let query = format!(
            "INSERT INTO {table} (token, band_id, status, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, $5)"
        );
        sqlx::query(&query)
            .bind(token.token.as_str())
            .bind(token.band_id.as_str())
            .bind(token.status.as_str())
            .bind(token.expires_at)
            .bind(token.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match map_sqlx(e) {
                StateError::Conflict(_) => StateError::Conflict(format!(
                    "token {} already exists",
                    token.token.redacted()
                )),
                other => other,
            })?;
        Ok(())
    }

    async fn find_token(&self, token: &TokenValue) -> Result<Option<ShareToken>, StateError> {
        let table = self.config.share_tokens_table();
        let query = format!(
            "SELECT token, band_id, status, expires_at, created_at \
             FROM {table} WHERE token = $1"
        );
        let row = sqlx::query(&query)
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(token_from_row).transpose()
    }

    async fn claim_token(
        &self,
        token: &TokenValue,
        now: DateTime<Utc>,
    ) -> Result<Option<ShareToken>, StateError> {
        let table = self.config.share_tokens_table();
        let query = format!(
            "UPDATE {table} SET status = 'used' \
             WHERE token = $1 AND status = 'active' AND expires_at > $2 \
             RETURNING token, band_id, status, expires_at, created_at"
        );
        let row = sqlx::query(&query)
            .bind(token.as_str())
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(token_from_row).transpose()
    }
}
