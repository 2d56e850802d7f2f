//! Response DTOs for the demo article service
//!
//! Defines the structure of outgoing HTTP response bodies. Reads return
//! `Fetched` directly.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the DELETE operation (DELETE /articles/:id)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The deleted article id
    pub id: u64,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(id: u64) -> Self {
        Self {
            message: format!("Article {} deleted successfully", id),
            id,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Reads served from the cache
    pub hits: u64,
    /// Reads served from the repository
    pub misses: u64,
    /// Cache entries written
    pub writes: u64,
    /// Keys invalidated
    pub invalidations: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            writes: stats.writes,
            invalidations: stats.invalidations,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_response_serialize() {
        let resp = DeleteResponse::new(7);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"id\":7"));
        assert!(json.contains("deleted"));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let resp = StatsResponse::from(CacheStats {
            hits: 80,
            misses: 20,
            writes: 5,
            invalidations: 6,
        });
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.invalidations, 6);
    }

    #[test]
    fn test_stats_response_zero_requests() {
        let resp = StatsResponse::from(CacheStats::default());
        assert_eq!(resp.hit_rate, 0.0);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
