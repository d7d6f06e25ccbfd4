//! Site domain model.
//!
//! Sites are the physical locations tasks are carried out at. They are
//! loaded in bulk from CSV exports of the customer's asset register.

use serde::{Deserialize, Serialize};

/// Represents a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: i64,
    /// Customer-assigned identifier, unique across all sites.
    pub global_id: String,
    pub cluster: String,
    pub site_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Site payload returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResponse {
    pub global_id: String,
    pub cluster: String,
    pub site_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<Site> for SiteResponse {
    fn from(s: Site) -> Self {
        Self {
            global_id: s.global_id,
            cluster: s.cluster,
            site_name: s.site_name,
            latitude: s.latitude,
            longitude: s.longitude,
        }
    }
}

/// A parsed row from a site import file.
#[derive(Debug, Clone)]
pub struct SiteImportRow {
    pub global_id: String,
    pub cluster: String,
    pub site_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_response_from_site() {
        let site = Site {
            id: 1,
            global_id: "IN-HYD-0042".to_string(),
            cluster: "Hyderabad West".to_string(),
            site_name: "Gachibowli Tower".to_string(),
            latitude: Some(17.44),
            longitude: Some(78.35),
        };
        let response = SiteResponse::from(site);
        assert_eq!(response.global_id, "IN-HYD-0042");
        assert_eq!(response.latitude, Some(17.44));
    }

    #[test]
    fn test_site_serializes_camel_case() {
        let site = Site {
            id: 1,
            global_id: "G1".to_string(),
            cluster: "C".to_string(),
            site_name: "S".to_string(),
            latitude: None,
            longitude: None,
        };
        let json = serde_json::to_string(&site).unwrap();
        assert!(json.contains("\"globalId\""));
        assert!(json.contains("\"siteName\""));
    }
}
