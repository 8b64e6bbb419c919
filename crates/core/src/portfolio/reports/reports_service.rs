use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use rust_decimal::Decimal;

use lotbook_market_data::{Quote, QuoteSource};

use super::reports_model::{
    percent_of, InvestmentSummary, NameMatchSummary, PositionAggregate, PurchaseSummary,
    SaleSummary,
};
use crate::ledger::{Ledger, Lot};

/// Read-only reports over a [`Ledger`].
///
/// Quotes are never cached: every row issues its own request, and a row whose
/// quote fails (or whose percentages would divide by zero) is logged and left
/// out rather than failing the whole report.
pub struct ReportService<'a> {
    ledger: &'a Ledger,
}

impl<'a> ReportService<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        ReportService { ledger }
    }

    fn quotes(&self) -> &'a dyn QuoteSource {
        self.ledger.quote_source()
    }

    fn live_price(&self, symbol: &str) -> Option<Decimal> {
        match self.quotes().get_quote(symbol) {
            Ok(quote) => Some(quote.price),
            Err(e) => {
                warn!("Skipping {} in report: quote failed: {}", symbol, e);
                None
            }
        }
    }

    /// One row per held symbol, in the order symbols were first acquired.
    pub fn list_all_investments(&self) -> Vec<InvestmentSummary> {
        self.summarize(self.ledger.lots().iter())
    }

    /// Like [`list_all_investments`](Self::list_all_investments), limited to
    /// lots whose class name equals `asset_type` exactly (e.g. "Equity").
    pub fn list_by_type(&self, asset_type: &str) -> Vec<InvestmentSummary> {
        self.summarize(
            self.ledger
                .lots()
                .iter()
                .filter(|lot| lot.asset_class.as_str() == asset_type),
        )
    }

    fn summarize<'l>(&self, lots: impl Iterator<Item = &'l Lot>) -> Vec<InvestmentSummary> {
        PositionAggregate::from_lots(lots)
            .into_iter()
            .filter_map(|position| self.investment_row(position))
            .collect()
    }

    fn investment_row(&self, position: PositionAggregate) -> Option<InvestmentSummary> {
        let Some(average_cost) = position.average_cost() else {
            warn!("Skipping {} in report: no units held", position.symbol);
            return None;
        };
        let current_price = self.live_price(&position.symbol)?;
        let difference = current_price - average_cost;
        let Some(difference_percent) = percent_of(difference, average_cost) else {
            warn!("Skipping {} in report: average cost is zero", position.symbol);
            return None;
        };

        Some(InvestmentSummary {
            name: position.name,
            symbol: position.symbol,
            asset_class: position.asset_class,
            average_cost,
            current_price,
            units: position.units,
            difference,
            difference_percent,
        })
    }

    /// One row per search term that matches at least one open lot.
    ///
    /// A lot matches when its name or symbol contains the term
    /// (case-sensitive). Each term is aggregated on its own.
    pub fn list_by_name(&self, terms: &[String]) -> Vec<NameMatchSummary> {
        let mut rows = Vec::new();

        for term in terms {
            let matches: Vec<&Lot> = self
                .ledger
                .lots()
                .iter()
                .filter(|lot| {
                    lot.name.contains(term.as_str()) || lot.symbol.contains(term.as_str())
                })
                .collect();

            let Some(last) = matches.last() else {
                debug!("No lots match '{}'", term);
                continue;
            };

            let mut totals = PositionAggregate::new(&last.symbol, &last.name, last.asset_class);
            for lot in &matches {
                totals.add(lot.unit_cost, lot.units);
            }
            let Some(average_cost) = totals.average_cost() else {
                warn!("Skipping '{}' in report: no units held", term);
                continue;
            };
            let Some(current_price) = self.live_price(&last.symbol) else {
                continue;
            };

            rows.push(NameMatchSummary {
                term: term.clone(),
                symbol: last.symbol.clone(),
                name: last.name.clone(),
                average_cost,
                current_price,
                units: totals.units,
                match_count: totals.entries,
            });
        }

        rows
    }

    /// Open lots acquired strictly between `start` and `end`, oldest first.
    pub fn list_purchases_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<PurchaseSummary> {
        let mut lots: Vec<&Lot> = self
            .ledger
            .lots()
            .iter()
            .filter(|lot| lot.acquired_at > start && lot.acquired_at < end)
            .collect();
        lots.sort_by_key(|lot| lot.acquired_at);

        lots.into_iter()
            .filter_map(|lot| {
                let current_price = self.live_price(&lot.symbol)?;
                let Some(cost_to_price_percent) = percent_of(lot.unit_cost, current_price) else {
                    warn!("Skipping lot {} in report: live price is zero", lot.id);
                    return None;
                };
                Some(PurchaseSummary {
                    lot_id: lot.id.clone(),
                    name: lot.name.clone(),
                    symbol: lot.symbol.clone(),
                    acquired_at: lot.acquired_at,
                    unit_cost: lot.unit_cost,
                    units: lot.units,
                    current_price,
                    difference: current_price - lot.unit_cost,
                    cost_to_price_percent,
                })
            })
            .collect()
    }

    /// Sale records whose originating lot was acquired strictly between
    /// `start` and `end`, ordered by sale time.
    ///
    /// The average cost on each row spans every sale of that symbol, not only
    /// the ones in range.
    pub fn list_sales_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<SaleSummary> {
        let sales = self.ledger.sales();
        let positions = PositionAggregate::from_sales(sales);

        let mut in_range: Vec<_> = sales
            .iter()
            .filter(|sale| sale.acquired_at > start && sale.acquired_at < end)
            .collect();
        in_range.sort_by_key(|sale| sale.sold_at);

        in_range
            .into_iter()
            .filter_map(|sale| {
                let average_cost = positions
                    .iter()
                    .find(|p| p.symbol == sale.symbol)
                    .and_then(PositionAggregate::average_cost)?;
                let current_price = self.live_price(&sale.symbol)?;
                let profit_loss = current_price - average_cost;
                let Some(profit_loss_percent) = percent_of(profit_loss, average_cost) else {
                    warn!("Skipping sale of {} in report: average cost is zero", sale.symbol);
                    return None;
                };
                Some(SaleSummary {
                    lot_id: sale.lot_id.clone(),
                    name: sale.name.clone(),
                    symbol: sale.symbol.clone(),
                    acquired_at: sale.acquired_at,
                    sold_at: sale.sold_at,
                    units: sale.units,
                    average_cost,
                    sale_price: sale.sale_price,
                    current_price,
                    profit_loss,
                    profit_loss_percent,
                    realized_gain: sale.realized_gain(),
                })
            })
            .collect()
    }

    /// Live quotes for `symbols`. Empty when the lookup fails.
    pub fn get_asset_information(&self, symbols: &[String]) -> Vec<Quote> {
        self.quotes().get_quotes(symbols).unwrap_or_else(|e| {
            error!("Asset lookup for {:?} failed: {}", symbols, e);
            Vec::new()
        })
    }

    /// Trending symbols for `region`. Empty when the lookup fails.
    pub fn get_trending_for_region(&self, region: &str) -> Vec<String> {
        self.quotes()
            .get_trending_for_region(region)
            .unwrap_or_else(|e| {
                error!("Trending lookup for {} failed: {}", region, e);
                Vec::new()
            })
    }
}
