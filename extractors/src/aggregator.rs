use rust_decimal::Decimal;
use shared_types::{MonthlyAggregate, Order, Source, SourceTotal, SpendReport};
use std::collections::{BTreeMap, BTreeSet};

/// Fold an order sequence into the spend report: overall totals, the
/// ascending monthly trend series, and the descending per-source share
/// series. Orders outside `sources` are ignored. Pure reduction — the same
/// order set yields the identical report whatever the input ordering, and
/// an empty input yields zero totals rather than an error.
pub fn aggregate(orders: &[Order], sources: &BTreeSet<Source>) -> SpendReport {
    let mut included: Vec<Order> = orders
        .iter()
        .filter(|o| sources.contains(&o.source))
        .cloned()
        .collect();
    // Stable output ordering independent of fetch order.
    included.sort_by(|a, b| {
        (a.order_date, &a.order_id).cmp(&(b.order_date, &b.order_id))
    });

    let mut months: BTreeMap<String, MonthlyAggregate> = BTreeMap::new();
    let mut source_totals: BTreeMap<Source, Decimal> = BTreeMap::new();
    let mut total_spent = Decimal::ZERO;

    for order in &included {
        let entry = months
            .entry(order.year_month())
            .or_insert_with(|| MonthlyAggregate {
                year_month: order.year_month(),
                total_spent: Decimal::ZERO,
                order_count: 0,
                per_source_totals: BTreeMap::new(),
            });
        entry.total_spent += order.amount;
        entry.order_count += 1;
        *entry
            .per_source_totals
            .entry(order.source)
            .or_insert(Decimal::ZERO) += order.amount;

        *source_totals.entry(order.source).or_insert(Decimal::ZERO) += order.amount;
        total_spent += order.amount;
    }

    let total_orders = included.len() as u32;
    let average_order = if total_orders == 0 {
        Decimal::ZERO
    } else {
        total_spent / Decimal::from(total_orders)
    };

    // Share series: largest spend first; source order breaks ties so the
    // output stays deterministic.
    let mut per_source_series: Vec<SourceTotal> = source_totals
        .into_iter()
        .map(|(source, amount)| SourceTotal { source, amount })
        .collect();
    per_source_series.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.source.cmp(&b.source)));

    SpendReport {
        total_spent,
        average_order,
        total_orders,
        monthly_series: months.into_values().collect(),
        per_source_series,
        orders: included,
    }
}
