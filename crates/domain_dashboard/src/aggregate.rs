//! Dashboard aggregation
//!
//! A pure function of the snapshot and the evaluation context. Months are
//! calendar months in the business time zone; rates are `Decimal` rounded to
//! four places and 0 whenever their denominator is 0.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use core_kernel::{Currency, Money, MonthWindow, TechnicianId, Timezone};
use domain_billing::InvoiceStatus;
use domain_intervention::InterventionStatus;
use domain_reclamation::{sla_status, Priority, ReclamationStatus, SlaStatus};

use crate::error::DashboardError;
use crate::snapshot::DashboardSnapshot;
use crate::stats::{
    ClientStats, DashboardStats, InterventionStats, InventoryStats, LowStockPart,
    ReclamationStats, RevenueStats, TechnicianLoad,
};

const RATE_SCALE: u32 = 4;

/// When and where the figures are evaluated
#[derive(Debug, Clone, Copy)]
pub struct AggregationContext {
    pub now: DateTime<Utc>,
    pub timezone: Timezone,
    /// Amounts in other currencies are left out of money totals
    pub currency: Currency,
}

impl AggregationContext {
    pub fn new(now: DateTime<Utc>, timezone: Timezone) -> Self {
        Self {
            now,
            timezone,
            currency: Currency::default(),
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

/// `numerator / denominator`, or 0 for an empty denominator
pub fn ratio(numerator: u64, denominator: u64) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(numerator) / Decimal::from(denominator)).round_dp(RATE_SCALE)
}

pub fn aggregate(
    snapshot: &DashboardSnapshot,
    ctx: &AggregationContext,
) -> Result<DashboardStats, DashboardError> {
    let month = MonthWindow::containing(ctx.now, ctx.timezone)?;
    let previous = month.previous(ctx.timezone)?;

    Ok(DashboardStats {
        generated_at: ctx.now,
        timezone: ctx.timezone.name().to_string(),
        reclamations: reclamation_stats(snapshot, ctx, &month),
        interventions: intervention_stats(snapshot, ctx, &month),
        revenue: revenue_stats(snapshot, ctx, &month, &previous)?,
        inventory: inventory_stats(snapshot, ctx)?,
        clients: client_stats(snapshot, &month),
    })
}

fn reclamation_stats(
    snapshot: &DashboardSnapshot,
    ctx: &AggregationContext,
    month: &MonthWindow,
) -> ReclamationStats {
    let mut stats = ReclamationStats {
        by_status: ReclamationStatus::ALL.iter().map(|s| (*s, 0)).collect(),
        by_priority: Priority::ALL.iter().map(|p| (*p, 0)).collect(),
        ..Default::default()
    };

    let mut closed = 0u64;
    let mut closed_within_sla = 0u64;
    let mut resolution_seconds = Vec::new();

    for rec in snapshot.reclamations.iter().filter(|r| !r.is_deleted) {
        stats.total += 1;
        *stats.by_status.entry(rec.status).or_default() += 1;
        *stats.by_priority.entry(rec.priority).or_default() += 1;

        if rec.is_open() {
            stats.open += 1;
        }
        match sla_status(ctx.now, rec.sla_deadline, rec.status) {
            SlaStatus::Overdue => stats.overdue += 1,
            SlaStatus::NearDeadline => stats.near_deadline += 1,
            SlaStatus::OnTime => {}
        }
        if rec.status == ReclamationStatus::Closed {
            closed += 1;
            if rec.resolved_within_sla() {
                closed_within_sla += 1;
            }
        }
        if let Some(elapsed) = rec.resolution_time() {
            resolution_seconds.push(elapsed.num_seconds());
        }
        if month.contains(rec.created_at) {
            stats.created_this_month += 1;
        }
    }

    stats.resolution_rate = ratio(closed, stats.total);
    stats.sla_compliance_rate = ratio(closed_within_sla, closed);
    stats.average_resolution_hours = average_hours(&resolution_seconds);
    stats
}

fn average_hours(seconds: &[i64]) -> Option<Decimal> {
    if seconds.is_empty() {
        return None;
    }
    let total: i64 = seconds.iter().sum();
    let mean = Decimal::from(total) / Decimal::from(seconds.len() as u64);
    Some((mean / Decimal::from(3600)).round_dp(2))
}

fn intervention_stats(
    snapshot: &DashboardSnapshot,
    ctx: &AggregationContext,
    month: &MonthWindow,
) -> InterventionStats {
    let today = ctx.timezone.local_date(ctx.now);
    let mut stats = InterventionStats {
        by_status: InterventionStatus::ALL.iter().map(|s| (*s, 0)).collect(),
        ..Default::default()
    };
    let mut load: BTreeMap<TechnicianId, (u64, u64)> = BTreeMap::new();

    for intervention in &snapshot.interventions {
        stats.total += 1;
        *stats.by_status.entry(intervention.status).or_default() += 1;

        let entry = load.entry(intervention.technician_id).or_default();
        if !intervention.status.is_terminal() {
            entry.0 += 1;
            if ctx.timezone.local_date(intervention.scheduled_at) == today {
                stats.scheduled_today += 1;
            }
        }
        if intervention.completed_at.is_some_and(|at| month.contains(at)) {
            entry.1 += 1;
            stats.completed_this_month += 1;
        }
    }

    let mut workload: Vec<TechnicianLoad> = load
        .into_iter()
        .map(|(technician_id, (active, completed_this_month))| TechnicianLoad {
            technician_id,
            active,
            completed_this_month,
        })
        .collect();
    // Stable: ties keep technician id order from the BTreeMap
    workload.sort_by(|a, b| {
        b.active
            .cmp(&a.active)
            .then(b.completed_this_month.cmp(&a.completed_this_month))
    });
    stats.workload = workload;
    stats
}

fn revenue_stats(
    snapshot: &DashboardSnapshot,
    ctx: &AggregationContext,
    month: &MonthWindow,
    previous: &MonthWindow,
) -> Result<RevenueStats, DashboardError> {
    let today = ctx.timezone.local_date(ctx.now);
    let mut current = Money::zero(ctx.currency);
    let mut last = Money::zero(ctx.currency);
    let mut outstanding = Money::zero(ctx.currency);
    let mut overdue_invoices = 0;
    let mut skipped_foreign_currency = 0;

    for invoice in &snapshot.invoices {
        if invoice.is_overdue(today) {
            overdue_invoices += 1;
        }
        if invoice.currency != ctx.currency {
            if invoice.status == InvoiceStatus::Paid {
                skipped_foreign_currency += 1;
            }
            continue;
        }
        if invoice.status == InvoiceStatus::Issued {
            outstanding = outstanding.checked_add(&invoice.total)?;
        }
        if let Some((paid_at, amount)) = invoice.revenue() {
            if month.contains(paid_at) {
                current = current.checked_add(&amount)?;
            } else if previous.contains(paid_at) {
                last = last.checked_add(&amount)?;
            }
        }
    }

    let growth_rate = if last.is_zero() {
        Decimal::ZERO
    } else {
        ((current.amount() - last.amount()) / last.amount()).round_dp(RATE_SCALE)
    };

    Ok(RevenueStats {
        current_month: current,
        previous_month: last,
        growth_rate,
        outstanding,
        overdue_invoices,
        skipped_foreign_currency,
    })
}

fn inventory_stats(
    snapshot: &DashboardSnapshot,
    ctx: &AggregationContext,
) -> Result<InventoryStats, DashboardError> {
    let mut low_stock: Vec<LowStockPart> = snapshot
        .parts
        .iter()
        .filter(|p| p.is_low_stock())
        .map(|p| LowStockPart {
            part_id: p.id,
            reference: p.reference.clone(),
            name: p.name.clone(),
            stock_quantity: p.stock_quantity,
            min_stock_level: p.min_stock_level,
        })
        .collect();
    low_stock.sort_by(|a, b| a.reference.cmp(&b.reference));

    let values: Vec<Money> = snapshot
        .parts
        .iter()
        .map(|p| p.stock_value())
        .filter(|v| v.currency() == ctx.currency)
        .collect();

    Ok(InventoryStats {
        total_parts: snapshot.parts.len() as u64,
        low_stock,
        stock_value: Money::sum(ctx.currency, &values)?,
    })
}

fn client_stats(snapshot: &DashboardSnapshot, month: &MonthWindow) -> ClientStats {
    ClientStats {
        total: snapshot.clients.len() as u64,
        active: snapshot.clients.iter().filter(|c| c.is_active).count() as u64,
        new_this_month: snapshot
            .clients
            .iter()
            .filter(|c| c.registered_between(month.start, month.end))
            .count() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(4, 10), dec!(0.4));
        assert_eq!(ratio(3, 4), dec!(0.75));
        assert_eq!(ratio(1, 3), dec!(0.3333));
        assert_eq!(ratio(5, 0), Decimal::ZERO);
    }

    #[test]
    fn test_average_hours() {
        assert_eq!(average_hours(&[]), None);
        assert_eq!(average_hours(&[3600, 7200]), Some(dec!(1.5)));
    }

    #[test]
    fn test_empty_snapshot() {
        let ctx = AggregationContext::new(Utc::now(), Timezone::default());
        let stats = aggregate(&DashboardSnapshot::default(), &ctx).unwrap();
        assert_eq!(stats.reclamations.total, 0);
        assert_eq!(stats.reclamations.resolution_rate, Decimal::ZERO);
        assert_eq!(stats.reclamations.by_status.len(), ReclamationStatus::ALL.len());
        assert!(stats.revenue.current_month.is_zero());
        assert_eq!(stats.revenue.growth_rate, Decimal::ZERO);
        assert_eq!(stats.timezone, "Europe/Paris");
    }
}
