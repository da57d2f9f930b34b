//! Input of the aggregation

use domain_billing::Invoice;
use domain_client::Client;
use domain_intervention::Intervention;
use domain_inventory::Part;
use domain_reclamation::Reclamation;

/// Everything the dashboard looks at, read in one go
///
/// Reclamations include soft-deleted rows; the aggregation filters them.
#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub reclamations: Vec<Reclamation>,
    pub interventions: Vec<Intervention>,
    pub parts: Vec<Part>,
    pub clients: Vec<Client>,
    pub invoices: Vec<Invoice>,
}
