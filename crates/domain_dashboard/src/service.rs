//! Dashboard service: load a snapshot, aggregate, hand back the figures

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use core_kernel::{Clock, Currency, Timezone};

use crate::aggregate::{aggregate, AggregationContext};
use crate::error::DashboardError;
use crate::ports::DashboardSource;
use crate::stats::DashboardStats;

#[derive(Clone)]
pub struct DashboardService {
    source: Arc<dyn DashboardSource>,
    clock: Arc<dyn Clock>,
    timezone: Timezone,
    currency: Currency,
}

impl DashboardService {
    pub fn new(
        source: Arc<dyn DashboardSource>,
        clock: Arc<dyn Clock>,
        timezone: Timezone,
    ) -> Self {
        Self {
            source,
            clock,
            timezone,
            currency: Currency::default(),
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn source(&self) -> &Arc<dyn DashboardSource> {
        &self.source
    }

    pub async fn stats(&self) -> Result<DashboardStats, DashboardError> {
        let started = Instant::now();
        let snapshot = self.source.load_snapshot().await?;
        debug!(
            reclamations = snapshot.reclamations.len(),
            interventions = snapshot.interventions.len(),
            invoices = snapshot.invoices.len(),
            "Dashboard snapshot loaded"
        );

        let ctx = AggregationContext::new(self.clock.now(), self.timezone)
            .with_currency(self.currency);
        let stats = aggregate(&snapshot, &ctx)?;

        info!(
            total = stats.reclamations.total,
            open = stats.reclamations.open,
            overdue = stats.reclamations.overdue,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dashboard computed"
        );
        Ok(stats)
    }
}
