// ── Search backend seam ──
//
// The session talks to the backend through this trait so tests can swap
// in an in-memory fake and drive the state machine on a paused clock.

use std::future::Future;

use breachwatch_api::{BreachClient, SearchParams};

use crate::convert::records_from_wire;
use crate::error::CoreError;
use crate::model::{ResultRecord, SecurityMetrics};

/// One page of backend results, already normalized.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub records: Vec<ResultRecord>,
    pub total: Option<u64>,
    pub pages: Option<u64>,
}

/// Anything that can answer searches and statistics.
pub trait SearchBackend: Send + Sync + 'static {
    fn search(
        &self,
        params: &SearchParams,
    ) -> impl Future<Output = Result<SearchPage, CoreError>> + Send;

    fn statistics(&self) -> impl Future<Output = Result<SecurityMetrics, CoreError>> + Send;
}

impl SearchBackend for BreachClient {
    async fn search(&self, params: &SearchParams) -> Result<SearchPage, CoreError> {
        let resp = BreachClient::search(self, params).await?;
        Ok(SearchPage {
            records: records_from_wire(resp.results),
            total: resp.total,
            pages: resp.pages,
        })
    }

    async fn statistics(&self) -> Result<SecurityMetrics, CoreError> {
        let stats = BreachClient::statistics(self).await?;
        Ok(stats.into())
    }
}
