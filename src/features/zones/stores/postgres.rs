use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::config::CascadeMode;
use crate::core::error::{AppError, Result};
use crate::features::zones::models::{Area, Governorate, PriceChangeRecord, PriceEntityType};
use crate::features::zones::stores::{
    AreaPriceChange, AreaPriceUpdate, GovernoratePriceChange, GovernoratePriceUpdate,
    PriceHistoryFilter, PricingStore,
};

const INSERT_HISTORY_SQL: &str = r#"
    INSERT INTO price_change_history
        (entity_type, entity_id, old_price, new_price, reason, changed_by)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

/// PostgreSQL-backed price store. Every write runs in a single transaction.
pub struct PgPricingStore {
    pool: PgPool,
}

impl PgPricingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PricingStore for PgPricingStore {
    async fn find_governorate(&self, id: Uuid) -> Result<Option<Governorate>> {
        let sql = format!(
            "SELECT {} FROM governorates WHERE id = $1",
            Governorate::COLUMNS
        );
        sqlx::query_as::<_, Governorate>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch governorate {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn find_area(&self, id: Uuid) -> Result<Option<Area>> {
        let sql = format!("SELECT {} FROM areas WHERE id = $1", Area::COLUMNS);
        sqlx::query_as::<_, Area>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch area {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn update_governorate_price(
        &self,
        change: GovernoratePriceChange,
    ) -> Result<GovernoratePriceUpdate> {
        let id = change.governorate_id;
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin governorate price transaction: {:?}", e);
            AppError::Database(e)
        })?;

        // 1. Old value, locked until commit
        let old_price = sqlx::query_scalar::<_, Decimal>(
            "SELECT delivery_price FROM governorates WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read price of governorate {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Governorate '{}' not found", id)))?;

        // 2. New price
        let sql = format!(
            "UPDATE governorates SET delivery_price = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            Governorate::COLUMNS
        );
        let governorate = sqlx::query_as::<_, Governorate>(&sql)
            .bind(change.new_price)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update price of governorate {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        // 3. Audit row
        sqlx::query(INSERT_HISTORY_SQL)
            .bind(PriceEntityType::Governorate)
            .bind(id)
            .bind(Some(old_price))
            .bind(Some(change.new_price))
            .bind(&change.reason)
            .bind(change.changed_by.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record price change of governorate {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        // 4. Cascade into inheriting areas; these writes are not audited individually
        let materialized_areas = match change.cascade {
            CascadeMode::Materialize => sqlx::query(
                r#"
                UPDATE areas
                SET delivery_price = $1, updated_at = NOW()
                WHERE governorate_id = $2 AND delivery_price IS NULL
                "#,
            )
            .bind(change.new_price)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to cascade price of governorate {} into areas: {:?}",
                    id,
                    e
                );
                AppError::Database(e)
            })?
            .rows_affected(),
            CascadeMode::Virtual => 0,
        };

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit governorate price change {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(GovernoratePriceUpdate {
            governorate,
            old_price,
            materialized_areas,
        })
    }

    async fn update_area_price(&self, change: AreaPriceChange) -> Result<AreaPriceUpdate> {
        let id = change.area_id;
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin area price transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let old_price = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT delivery_price FROM areas WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read price of area {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Area '{}' not found", id)))?;

        let sql = format!(
            "UPDATE areas SET delivery_price = $1, updated_at = NOW() WHERE id = $2 RETURNING {}",
            Area::COLUMNS
        );
        let area = sqlx::query_as::<_, Area>(&sql)
            .bind(change.new_price)
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update price of area {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        sqlx::query(INSERT_HISTORY_SQL)
            .bind(PriceEntityType::Area)
            .bind(id)
            .bind(old_price)
            .bind(change.new_price)
            .bind(&change.reason)
            .bind(change.changed_by.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record price change of area {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        let governorate_price = sqlx::query_scalar::<_, Decimal>(
            "SELECT delivery_price FROM governorates WHERE id = $1",
        )
        .bind(area.governorate_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to read parent price of area {}: {:?}", id, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| {
            AppError::DataIntegrity(format!(
                "Area '{}' references missing governorate '{}'",
                id, area.governorate_id
            ))
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit area price change {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(AreaPriceUpdate {
            area,
            old_price,
            governorate_price,
        })
    }

    async fn list_price_history(
        &self,
        filter: &PriceHistoryFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<PriceChangeRecord>, i64)> {
        const WHERE_CLAUSE: &str = r#"
            WHERE ($1::price_entity_type IS NULL OR entity_type = $1)
              AND ($2::uuid IS NULL OR entity_id = $2)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM price_change_history {}",
            WHERE_CLAUSE
        ))
        .bind(filter.entity_type)
        .bind(filter.entity_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count price history: {:?}", e);
            AppError::Database(e)
        })?;

        let sql = format!(
            "SELECT {} FROM price_change_history {} ORDER BY created_at DESC, id DESC OFFSET $3 LIMIT $4",
            PriceChangeRecord::COLUMNS,
            WHERE_CLAUSE
        );
        let records = sqlx::query_as::<_, PriceChangeRecord>(&sql)
            .bind(filter.entity_type)
            .bind(filter.entity_id)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list price history: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((records, total))
    }
}
