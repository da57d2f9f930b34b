//! Snapshot source port
//!
//! Adapters:
//!
//! - **PostgreSQL**: `infra_db::repositories::PostgresDashboardSource`
//! - **In-memory**: [`memory::InMemoryDashboardSource`]

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError};

use crate::snapshot::DashboardSnapshot;

#[async_trait]
pub trait DashboardSource: DomainPort + HealthCheckable {
    /// Reads everything the dashboard needs, soft-deleted reclamations included
    async fn load_snapshot(&self) -> Result<DashboardSnapshot, PortError>;
}

/// Snapshot held in memory, reclamations read live from a reclamation port
pub mod memory {
    use super::*;
    use std::sync::Arc;
    use chrono::Utc;
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;
    use domain_billing::Invoice;
    use domain_client::Client;
    use domain_intervention::Intervention;
    use domain_inventory::Part;
    use domain_reclamation::{ReclamationPort, ReclamationQuery};

    #[derive(Clone)]
    pub struct InMemoryDashboardSource {
        reclamations: Arc<dyn ReclamationPort>,
        rest: Arc<RwLock<DashboardSnapshot>>,
    }

    impl InMemoryDashboardSource {
        pub fn new(reclamations: Arc<dyn ReclamationPort>) -> Self {
            Self {
                reclamations,
                rest: Arc::new(RwLock::new(DashboardSnapshot::default())),
            }
        }

        pub async fn add_intervention(&self, intervention: Intervention) {
            self.rest.write().await.interventions.push(intervention);
        }

        pub async fn add_part(&self, part: Part) {
            self.rest.write().await.parts.push(part);
        }

        pub async fn add_client(&self, client: Client) {
            self.rest.write().await.clients.push(client);
        }

        pub async fn add_invoice(&self, invoice: Invoice) {
            self.rest.write().await.invoices.push(invoice);
        }
    }

    impl DomainPort for InMemoryDashboardSource {}

    #[async_trait]
    impl HealthCheckable for InMemoryDashboardSource {
        async fn health_check(&self) -> HealthCheckResult {
            let mut result = self.reclamations.health_check().await;
            result.adapter_id = "dashboard-memory".to_string();
            result.checked_at = Utc::now();
            result
        }
    }

    #[async_trait]
    impl DashboardSource for InMemoryDashboardSource {
        async fn load_snapshot(&self) -> Result<DashboardSnapshot, PortError> {
            let query = ReclamationQuery {
                include_deleted: true,
                ..Default::default()
            };
            let reclamations = self.reclamations.list_reclamations(&query).await?;
            let rest = self.rest.read().await;

            Ok(DashboardSnapshot {
                reclamations,
                interventions: rest.interventions.clone(),
                parts: rest.parts.clone(),
                clients: rest.clients.clone(),
                invoices: rest.invoices.clone(),
            })
        }
    }
}
