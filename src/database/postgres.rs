use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::store::{StoreError, TowerStore};
use crate::config::DatabaseConfig;
use crate::filter::TowerFilter;
use crate::model::{Coordinates, Tenant, Tower};
use crate::types::Page;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS "towers" (
        "id" UUID PRIMARY KEY,
        "tower_code" TEXT NOT NULL,
        "address" TEXT NOT NULL,
        "tower_type" TEXT NOT NULL,
        "status" TEXT NOT NULL,
        "latitude" DOUBLE PRECISION NOT NULL,
        "longitude" DOUBLE PRECISION NOT NULL,
        "description" TEXT,
        "installation_date" DATE,
        "height" DOUBLE PRECISION,
        "capacity" INTEGER,
        "last_updated" TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE UNIQUE INDEX IF NOT EXISTS "towers_tower_code_key" ON "towers" (lower("tower_code"))"#,
    r#"CREATE TABLE IF NOT EXISTS "tower_tenants" (
        "id" UUID PRIMARY KEY,
        "tower_id" UUID NOT NULL REFERENCES "towers" ("id") ON DELETE CASCADE,
        "name" TEXT NOT NULL,
        "tenant_type" TEXT NOT NULL,
        "contract_start" DATE NOT NULL,
        "contract_end" DATE NOT NULL,
        "monthly_revenue" NUMERIC(14, 2) NOT NULL
    )"#,
    r#"CREATE INDEX IF NOT EXISTS "tower_tenants_tower_id_idx" ON "tower_tenants" ("tower_id")"#,
];

const TOWER_COLUMNS: &str = r#""id", "tower_code", "address", "tower_type", "status", "latitude", "longitude", "description", "installation_date", "height", "capacity", "last_updated""#;

const TENANT_COLUMNS: &str = r#""id", "tower_id", "name", "tenant_type", "contract_start", "contract_end", "monthly_revenue""#;

#[derive(Debug, FromRow)]
struct TowerRow {
    id: Uuid,
    tower_code: String,
    address: String,
    tower_type: String,
    status: String,
    latitude: f64,
    longitude: f64,
    description: Option<String>,
    installation_date: Option<NaiveDate>,
    height: Option<f64>,
    capacity: Option<i32>,
    last_updated: DateTime<Utc>,
}

impl TowerRow {
    fn into_tower(self, tenants: Vec<Tenant>) -> Result<Tower, StoreError> {
        Ok(Tower {
            id: self.id,
            tower_type: self
                .tower_type
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("tower {}: {}", self.id, e)))?,
            status: self
                .status
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("tower {}: {}", self.id, e)))?,
            tower_code: self.tower_code,
            address: self.address,
            coordinates: Coordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            description: self.description,
            installation_date: self.installation_date,
            height: self.height,
            capacity: self.capacity,
            last_updated: self.last_updated,
            tenants,
        })
    }
}

#[derive(Debug, FromRow)]
struct TenantRow {
    id: Uuid,
    tower_id: Uuid,
    name: String,
    tenant_type: String,
    contract_start: NaiveDate,
    contract_end: NaiveDate,
    monthly_revenue: Decimal,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = StoreError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        Ok(Tenant {
            id: row.id,
            tenant_type: row
                .tenant_type
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("tenant {}: {}", row.id, e)))?,
            name: row.name,
            contract_start: row.contract_start,
            contract_end: row.contract_end,
            monthly_revenue: row.monthly_revenue,
        })
    }
}

/// Postgres-backed store. Tables are created on connect when missing.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        let store = Self::from_pool(pool);
        store.ensure_schema().await?;
        info!("Connected tower store to Postgres");
        Ok(store)
    }

    /// Wrap an existing pool; the schema is not touched.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Attach tenants to tower rows, keeping row order.
    async fn hydrate(&self, rows: Vec<TowerRow>) -> Result<Vec<Tower>, StoreError> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let sql = format!(
            "SELECT {TENANT_COLUMNS} FROM \"tower_tenants\" WHERE \"tower_id\" = ANY($1) ORDER BY \"contract_start\", \"id\""
        );
        let tenant_rows = sqlx::query_as::<_, TenantRow>(&sql)
            .bind(ids.as_slice())
            .fetch_all(&self.pool)
            .await?;

        let mut by_tower: HashMap<Uuid, Vec<Tenant>> = HashMap::new();
        for row in tenant_rows {
            let tower_id = row.tower_id;
            by_tower.entry(tower_id).or_default().push(Tenant::try_from(row)?);
        }

        rows.into_iter()
            .map(|row| {
                let tenants = by_tower.remove(&row.id).unwrap_or_default();
                row.into_tower(tenants)
            })
            .collect()
    }

    async fn fetch_rows(&self, sql: &str, params: &[String]) -> Result<Vec<TowerRow>, StoreError> {
        let mut q = sqlx::query_as::<_, TowerRow>(sql);
        for p in params {
            q = q.bind(p.as_str());
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    async fn count_rows(&self, sql: &str, params: &[String]) -> Result<i64, StoreError> {
        let mut q = sqlx::query_scalar::<_, i64>(sql);
        for p in params {
            q = q.bind(p.as_str());
        }
        Ok(q.fetch_one(&self.pool).await?)
    }
}

async fn touch_tower(conn: &mut PgConnection, tower_id: Uuid) -> Result<(), StoreError> {
    let result = sqlx::query("UPDATE \"towers\" SET \"last_updated\" = $2 WHERE \"id\" = $1")
        .bind(tower_id)
        .bind(Utc::now())
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StoreError::tower_not_found(tower_id));
    }
    Ok(())
}

async fn insert_tenant(conn: &mut PgConnection, tower_id: Uuid, tenant: &Tenant) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO \"tower_tenants\" (\"id\", \"tower_id\", \"name\", \"tenant_type\", \"contract_start\", \"contract_end\", \"monthly_revenue\")
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(tenant.id)
    .bind(tower_id)
    .bind(&tenant.name)
    .bind(tenant.tenant_type.as_str())
    .bind(tenant.contract_start)
    .bind(tenant.contract_end)
    .bind(tenant.monthly_revenue)
    .execute(conn)
    .await?;
    Ok(())
}

fn map_write_error(err: sqlx::Error, code: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => StoreError::duplicate_code(code),
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl TowerStore for PgStore {
    async fn list(&self, filter: &TowerFilter) -> Result<Page<Tower>, StoreError> {
        let select = filter.to_sql(TOWER_COLUMNS);
        let count = filter.to_count_sql();

        let (rows, total) = futures::try_join!(
            self.fetch_rows(&select.query, &select.params),
            self.count_rows(&count.query, &count.params),
        )?;

        Ok(Page {
            items: self.hydrate(rows).await?,
            total: u64::try_from(total).unwrap_or(0),
            page: filter.page,
            limit: filter.limit,
        })
    }

    async fn all(&self) -> Result<Vec<Tower>, StoreError> {
        let sql = format!("SELECT {TOWER_COLUMNS} FROM \"towers\" ORDER BY \"tower_code\" COLLATE \"C\", \"id\"");
        let rows = self.fetch_rows(&sql, &[]).await?;
        self.hydrate(rows).await
    }

    async fn by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tower>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!("SELECT {TOWER_COLUMNS} FROM \"towers\" WHERE \"id\" = ANY($1) ORDER BY \"tower_code\" COLLATE \"C\", \"id\"");
        let rows = sqlx::query_as::<_, TowerRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn get(&self, id: Uuid) -> Result<Tower, StoreError> {
        let sql = format!("SELECT {TOWER_COLUMNS} FROM \"towers\" WHERE \"id\" = $1");
        let row = sqlx::query_as::<_, TowerRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::tower_not_found(id))?;
        self.hydrate(vec![row])
            .await?
            .pop()
            .ok_or_else(|| StoreError::tower_not_found(id))
    }

    async fn insert(&self, tower: Tower) -> Result<Tower, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO \"towers\" ({TOWER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(tower.id)
        .bind(&tower.tower_code)
        .bind(&tower.address)
        .bind(tower.tower_type.as_str())
        .bind(tower.status.as_str())
        .bind(tower.coordinates.latitude)
        .bind(tower.coordinates.longitude)
        .bind(&tower.description)
        .bind(tower.installation_date)
        .bind(tower.height)
        .bind(tower.capacity)
        .bind(tower.last_updated)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, &tower.tower_code))?;

        for tenant in &tower.tenants {
            insert_tenant(&mut tx, tower.id, tenant).await?;
        }

        tx.commit().await?;
        Ok(tower)
    }

    async fn replace(&self, tower: Tower) -> Result<Tower, StoreError> {
        let result = sqlx::query(
            "UPDATE \"towers\" SET \"tower_code\" = $2, \"address\" = $3, \"tower_type\" = $4, \"status\" = $5,
                \"latitude\" = $6, \"longitude\" = $7, \"description\" = $8, \"installation_date\" = $9,
                \"height\" = $10, \"capacity\" = $11, \"last_updated\" = $12
             WHERE \"id\" = $1",
        )
        .bind(tower.id)
        .bind(&tower.tower_code)
        .bind(&tower.address)
        .bind(tower.tower_type.as_str())
        .bind(tower.status.as_str())
        .bind(tower.coordinates.latitude)
        .bind(tower.coordinates.longitude)
        .bind(&tower.description)
        .bind(tower.installation_date)
        .bind(tower.height)
        .bind(tower.capacity)
        .bind(tower.last_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &tower.tower_code))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::tower_not_found(tower.id));
        }
        self.get(tower.id).await
    }

    async fn delete(&self, id: Uuid) -> Result<Tower, StoreError> {
        let tower = self.get(id).await?;
        sqlx::query("DELETE FROM \"towers\" WHERE \"id\" = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(tower)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM \"towers\" WHERE \"id\" = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn add_tenant(&self, tower_id: Uuid, tenant: Tenant) -> Result<Tower, StoreError> {
        let mut tx = self.pool.begin().await?;
        touch_tower(&mut tx, tower_id).await?;
        insert_tenant(&mut tx, tower_id, &tenant).await?;
        tx.commit().await?;
        self.get(tower_id).await
    }

    async fn update_tenant(&self, tower_id: Uuid, tenant: Tenant) -> Result<Tower, StoreError> {
        let mut tx = self.pool.begin().await?;
        touch_tower(&mut tx, tower_id).await?;
        let result = sqlx::query(
            "UPDATE \"tower_tenants\" SET \"name\" = $3, \"tenant_type\" = $4, \"contract_start\" = $5,
                \"contract_end\" = $6, \"monthly_revenue\" = $7
             WHERE \"id\" = $1 AND \"tower_id\" = $2",
        )
        .bind(tenant.id)
        .bind(tower_id)
        .bind(&tenant.name)
        .bind(tenant.tenant_type.as_str())
        .bind(tenant.contract_start)
        .bind(tenant.contract_end)
        .bind(tenant.monthly_revenue)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::tenant_not_found(tenant.id));
        }
        tx.commit().await?;
        self.get(tower_id).await
    }

    async fn remove_tenant(&self, tower_id: Uuid, tenant_id: Uuid) -> Result<Tower, StoreError> {
        let mut tx = self.pool.begin().await?;
        touch_tower(&mut tx, tower_id).await?;
        let result = sqlx::query("DELETE FROM \"tower_tenants\" WHERE \"id\" = $1 AND \"tower_id\" = $2")
            .bind(tenant_id)
            .bind(tower_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::tenant_not_found(tenant_id));
        }
        tx.commit().await?;
        self.get(tower_id).await
    }

    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
