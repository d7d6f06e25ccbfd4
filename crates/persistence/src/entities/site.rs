//! Site entity.

use domain::models::site::Site;
use sqlx::FromRow;

/// Row of the `sites` table.
#[derive(Debug, Clone, FromRow)]
pub struct SiteEntity {
    pub id: i64,
    pub global_id: String,
    pub cluster: String,
    pub site_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<SiteEntity> for Site {
    fn from(e: SiteEntity) -> Self {
        Site {
            id: e.id,
            global_id: e.global_id,
            cluster: e.cluster,
            site_name: e.site_name,
            latitude: e.latitude,
            longitude: e.longitude,
        }
    }
}
