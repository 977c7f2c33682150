use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Run database migrations, creating required tables if they do not exist.
///
/// This creates the bands, share state, share token, and profile tables in
/// the configured schema with the configured table prefix.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any DDL statement fails.
pub async fn run_migrations(pool: &PgPool, config: &PostgresConfig) -> Result<(), sqlx::Error> {
    let bands_table = config.bands_table();
    let band_state_table = config.band_state_table();
    let share_tokens_table = config.share_tokens_table();
    let profiles_table = config.profiles_table();

    // A claimed band always has an owner and an unclaimed one never does.
    let create_bands = format!(
        "CREATE TABLE IF NOT EXISTS {bands_table} (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL DEFAULT 'unclaimed',
            owner_user_id TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CHECK ((status = 'claimed') = (owner_user_id IS NOT NULL))
        )"
    );

    let create_band_state = format!(
        "CREATE TABLE IF NOT EXISTS {band_state_table} (
            band_id TEXT PRIMARY KEY,
            armed BOOLEAN NOT NULL DEFAULT FALSE,
            armed_fields TEXT[] NOT NULL DEFAULT '{{}}',
            armed_until TIMESTAMPTZ,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"
    );

    let create_share_tokens = format!(
        "CREATE TABLE IF NOT EXISTS {share_tokens_table} (
            token TEXT PRIMARY KEY,
            band_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            expires_at TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"
    );

    let create_share_tokens_idx = format!(
        "CREATE INDEX IF NOT EXISTS {}share_tokens_band_idx ON {share_tokens_table} (band_id)",
        config.table_prefix
    );

    let create_profiles = format!(
        "CREATE TABLE IF NOT EXISTS {profiles_table} (
            user_id TEXT PRIMARY KEY,
            name TEXT,
            phone TEXT,
            email TEXT,
            website TEXT,
            instagram TEXT,
            tiktok TEXT,
            linkedin TEXT,
            x TEXT,
            youtube TEXT,
            whatsapp TEXT,
            snapchat TEXT,
            venmo TEXT,
            cashapp TEXT
        )"
    );

    sqlx::query(&create_bands).execute(pool).await?;
    sqlx::query(&create_band_state).execute(pool).await?;
    sqlx::query(&create_share_tokens).execute(pool).await?;
    sqlx::query(&create_share_tokens_idx).execute(pool).await?;
    sqlx::query(&create_profiles).execute(pool).await?;

    Ok(())
}
