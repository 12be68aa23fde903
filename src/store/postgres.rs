//! PostgreSQL store. Tables live in a configurable schema (default `public`).

use super::VehicleStore;
use crate::error::AppError;
use crate::model::{NewVehicle, Vehicle};
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgConnection, PgPool};
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgVehicleStore {
    pool: PgPool,
    schema: String,
}

impl PgVehicleStore {
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    fn table(&self, name: &str) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(name))
    }

    /// Create the schema and both tables if missing. Unit names carry a UNIQUE
    /// constraint; unit resolution relies on it.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&self.schema)))
            .execute(&self.pool)
            .await?;

        let unit_ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            )
            "#,
            self.table("unit")
        );
        sqlx::query(&unit_ddl).execute(&self.pool).await?;

        let vehicle_ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                capacity DOUBLE PRECISION NOT NULL CHECK (capacity >= 0),
                unit_id BIGINT NOT NULL REFERENCES {} (id)
            )
            "#,
            self.table("vehicle"),
            self.table("unit")
        );
        sqlx::query(&vehicle_ddl).execute(&self.pool).await?;
        Ok(())
    }

    fn select_vehicles(&self) -> String {
        format!(
            "SELECT v.id, v.capacity, u.name FROM {} v JOIN {} u ON u.id = v.unit_id",
            self.table("vehicle"),
            self.table("unit")
        )
    }

    /// Find or create every named unit, returning name -> id.
    ///
    /// Names are resolved in sorted order, and the insert is `DO NOTHING`, so no
    /// unit row is locked. Concurrent batches naming the same units in a different
    /// order cannot deadlock. Only an insert racing a not-yet-committed insert of
    /// the same name waits, and sorted order rules out cycles there too.
    async fn resolve_units<'a, I>(&self, tx: &mut PgConnection, names: I) -> Result<HashMap<String, i64>, AppError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: BTreeSet<&str> = names.into_iter().collect();
        let insert_sql = format!(
            "INSERT INTO {} (name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id",
            self.table("unit")
        );
        let select_sql = format!("SELECT id FROM {} WHERE name = $1", self.table("unit"));
        let mut ids = HashMap::with_capacity(names.len());
        for name in names {
            tracing::debug!(sql = %insert_sql, name = %name, "query (tx)");
            let inserted: Option<(i64,)> = sqlx::query_as(&insert_sql)
                .bind(name)
                .fetch_optional(&mut *tx)
                .await?;
            let id = match inserted {
                Some((id,)) => {
                    tracing::debug!(unit_id = id, name = %name, "created unit");
                    id
                }
                None => {
                    tracing::debug!(sql = %select_sql, name = %name, "query (tx)");
                    let (id,): (i64,) = sqlx::query_as(&select_sql)
                        .bind(name)
                        .fetch_one(&mut *tx)
                        .await?;
                    id
                }
            };
            ids.insert(name.to_string(), id);
        }
        Ok(ids)
    }
}

fn to_vehicle((id, capacity, unit): (i64, f64, String)) -> Vehicle {
    Vehicle { id, capacity, unit }
}

#[async_trait]
impl VehicleStore for PgVehicleStore {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        let sql = format!("{} ORDER BY v.id", self.select_vehicles());
        tracing::debug!(sql = %sql, "query");
        let rows: Vec<(i64, f64, String)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(to_vehicle).collect())
    }

    async fn find_vehicle(&self, id: i64) -> Result<Option<Vehicle>, AppError> {
        let sql = format!("{} WHERE v.id = $1", self.select_vehicles());
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<(i64, f64, String)> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(to_vehicle))
    }

    async fn insert_vehicles(&self, vehicles: &[NewVehicle]) -> Result<Vec<Vehicle>, AppError> {
        let sql = format!(
            "INSERT INTO {} (capacity, unit_id) VALUES ($1, $2) RETURNING id",
            self.table("vehicle")
        );
        let mut out = Vec::with_capacity(vehicles.len());
        let mut tx = self.pool.begin().await?;
        let unit_ids = self.resolve_units(&mut tx, vehicles.iter().map(|v| v.unit.as_str())).await?;
        for v in vehicles {
            let unit_id = unit_ids[&v.unit];
            tracing::debug!(sql = %sql, capacity = v.capacity, unit_id, "query (tx)");
            let (id,): (i64,) = sqlx::query_as(&sql)
                .bind(v.capacity)
                .bind(unit_id)
                .fetch_one(&mut *tx)
                .await?;
            out.push(Vehicle {
                id,
                capacity: v.capacity,
                unit: v.unit.clone(),
            });
        }
        tx.commit().await?;
        Ok(out)
    }

    async fn update_vehicle(&self, id: i64, vehicle: &NewVehicle) -> Result<Option<Vehicle>, AppError> {
        let sql = format!(
            "UPDATE {} SET capacity = $1, unit_id = $2 WHERE id = $3 RETURNING id",
            self.table("vehicle")
        );
        let mut tx = self.pool.begin().await?;
        let unit_ids = self.resolve_units(&mut tx, [vehicle.unit.as_str()]).await?;
        let unit_id = unit_ids[&vehicle.unit];
        tracing::debug!(sql = %sql, id, capacity = vehicle.capacity, unit_id, "query (tx)");
        let updated: Option<(i64,)> = sqlx::query_as(&sql)
            .bind(vehicle.capacity)
            .bind(unit_id)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if updated.is_none() {
            // Dropping the transaction rolls back the unit upsert as well.
            return Ok(None);
        }
        tx.commit().await?;
        Ok(Some(Vehicle {
            id,
            capacity: vehicle.capacity,
            unit: vehicle.unit.clone(),
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| sqlx::Error::Configuration("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
