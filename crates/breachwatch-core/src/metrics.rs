// ── Metrics loading ──
//
// Statistics come from the backend when it answers; otherwise they are
// derived from the fallback dataset so the dashboard always has numbers.

use serde::Serialize;
use tracing::warn;

use crate::backend::SearchBackend;
use crate::model::{ResultRecord, SecurityMetrics};
use crate::session::ResultSource;

/// Metrics plus where they came from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsReport {
    pub metrics: SecurityMetrics,
    pub source: ResultSource,
    /// Why the backend could not be used, when `source` is `Fallback`.
    pub error: Option<String>,
}

impl MetricsReport {
    pub fn using_fallback(&self) -> bool {
        self.source == ResultSource::Fallback
    }
}

/// Fetch statistics, degrading to counts over `fallback` on any failure.
pub async fn load_metrics<B: SearchBackend>(backend: &B, fallback: &[ResultRecord]) -> MetricsReport {
    match backend.statistics().await {
        Ok(metrics) => MetricsReport {
            metrics,
            source: ResultSource::Backend,
            error: None,
        },
        Err(e) => {
            warn!(error = %e, "statistics unavailable; deriving from fallback data");
            MetricsReport {
                metrics: SecurityMetrics::from_records(fallback),
                source: ResultSource::Fallback,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use breachwatch_api::SearchParams;

    use super::*;
    use crate::backend::SearchPage;
    use crate::error::CoreError;
    use crate::mock::fallback_records;

    struct Down;

    impl SearchBackend for Down {
        async fn search(&self, _params: &SearchParams) -> Result<SearchPage, CoreError> {
            Err(CoreError::Timeout)
        }

        async fn statistics(&self) -> Result<SecurityMetrics, CoreError> {
            Err(CoreError::Timeout)
        }
    }

    struct Up;

    impl SearchBackend for Up {
        async fn search(&self, _params: &SearchParams) -> Result<SearchPage, CoreError> {
            Ok(SearchPage::default())
        }

        async fn statistics(&self) -> Result<SecurityMetrics, CoreError> {
            Ok(SecurityMetrics {
                total: 99,
                ..SecurityMetrics::default()
            })
        }
    }

    #[tokio::test]
    async fn backend_metrics_win() {
        let report = load_metrics(&Up, &fallback_records()).await;
        assert_eq!(report.metrics.total, 99);
        assert!(!report.using_fallback());
    }

    #[tokio::test]
    async fn failure_derives_from_fallback() {
        let records = fallback_records();
        let report = load_metrics(&Down, &records).await;

        assert!(report.using_fallback());
        assert_eq!(report.metrics, SecurityMetrics::from_records(&records));
        assert_eq!(
            report.error.as_deref(),
            Some("Backend request timed out")
        );
    }
}
