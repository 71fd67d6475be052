//! Identity directory persistence.

use sqlx::PgPool;
use uuid::Uuid;

use ptw_core::{Identity, PrincipalId, Role};

/// Insert or replace an identity.
pub async fn upsert(pool: &PgPool, identity: &Identity) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO identities (id, display_name, role) VALUES ($1, $2, $3)
         ON CONFLICT (id) DO UPDATE SET display_name = EXCLUDED.display_name, role = EXCLUDED.role",
    )
    .bind(identity.id.as_uuid())
    .bind(&identity.display_name)
    .bind(identity.role.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

/// Load the whole directory. Rows with an unknown role are skipped.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Identity>, sqlx::Error> {
    let rows = sqlx::query_as::<_, IdentityRow>("SELECT id, display_name, role FROM identities")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().filter_map(IdentityRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    display_name: String,
    role: String,
}

impl IdentityRow {
    fn into_record(self) -> Option<Identity> {
        match self.role.parse::<Role>() {
            Ok(role) => Some(Identity::new(PrincipalId(self.id), self.display_name, role)),
            Err(e) => {
                tracing::warn!(id = %self.id, role = %self.role, error = %e, "skipping identity with unknown role");
                None
            }
        }
    }
}
