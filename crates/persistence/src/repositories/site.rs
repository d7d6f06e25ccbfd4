//! Site repository for database operations.

use domain::models::site::SiteImportRow;
use sqlx::PgPool;

use crate::entities::SiteEntity;
use crate::metrics::QueryTimer;

/// Repository for site database operations.
#[derive(Clone)]
pub struct SiteRepository {
    pool: PgPool,
}

impl SiteRepository {
    /// Creates a new SiteRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Replace the whole site register with the imported rows.
    ///
    /// Runs in one transaction so a failed import leaves the previous
    /// register intact. Cluster names seen in the import are upserted
    /// into the clusters table.
    pub async fn replace_all(&self, rows: &[SiteImportRow]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("replace_all_sites");
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sites").execute(&mut *tx).await?;

        let mut inserted = 0u64;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO sites (global_id, cluster, site_name, latitude, longitude)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&row.global_id)
            .bind(&row.cluster)
            .bind(&row.site_name)
            .bind(row.latitude)
            .bind(row.longitude)
            .execute(&mut *tx)
            .await?;
            inserted += 1;

            sqlx::query(
                r#"
                INSERT INTO clusters (name) VALUES ($1) ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(&row.cluster)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        timer.record();
        Ok(inserted)
    }

    /// List sites, optionally filtered by cluster.
    pub async fn list(&self, cluster: Option<&str>) -> Result<Vec<SiteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_sites");
        let result = sqlx::query_as::<_, SiteEntity>(
            r#"
            SELECT * FROM sites
            WHERE ($1::text IS NULL OR cluster = $1)
            ORDER BY cluster, site_name
            "#,
        )
        .bind(cluster)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a site by its customer-assigned global id.
    pub async fn find_by_global_id(
        &self,
        global_id: &str,
    ) -> Result<Option<SiteEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_site_by_global_id");
        let result = sqlx::query_as::<_, SiteEntity>(
            r#"
            SELECT * FROM sites WHERE global_id = $1
            "#,
        )
        .bind(global_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count sites in the register.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_sites");
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sites")
            .fetch_one(&self.pool)
            .await?;
        timer.record();
        Ok(count.0)
    }

    /// Distinct cluster names in alphabetical order.
    pub async fn list_clusters(&self) -> Result<Vec<String>, sqlx::Error> {
        let timer = QueryTimer::new("list_clusters");
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT name FROM clusters ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        timer.record();
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_repository_creation() {
        // This test verifies the SiteRepository can be created
        // Actual database tests are integration tests
    }
}
