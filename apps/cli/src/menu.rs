//! Numbered terminal menu over a [`Ledger`].

use std::io::{BufRead, Write};

use chrono::{DateTime, NaiveDate, Utc};
use lotbook_core::constants::DEFAULT_TRENDING_REGION;
use lotbook_core::portfolio::reports::{
    render_investments, render_name_matches, render_purchases, render_sales,
};
use lotbook_core::{calculate_portfolio_value, Ledger, ReportService};
use lotbook_market_data::Quote;
use rust_decimal::Decimal;

const EXIT_CHOICE: u32 = 12;

const MENU: &str = "\
0. Add Funds
1. Withdraw Funds
2. Purchase Asset
3. Sell Asset
4. Get Quote of Asset
5. Full Value of Your Portfolio
6. View Investments
7. Filter Assets by Type
8. Search Assets by Name or Symbol
9. Filter Purchases by Date
10. Filter Sales by Date
11. Trending Symbols for Region
12. Exit";

pub struct Menu<'a, R, W> {
    ledger: &'a mut Ledger,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(ledger: &'a mut Ledger, input: R, output: W) -> Self {
        Menu {
            ledger,
            input,
            output,
        }
    }

    /// Runs until the user picks Exit or the input ends.
    pub fn run(&mut self) -> anyhow::Result<()> {
        writeln!(self.output, "Welcome to the Lotbook portfolio manager")?;
        loop {
            writeln!(self.output, "\n---- Menu ----")?;
            writeln!(self.output, "Balance: ${:.2}", self.ledger.balance())?;
            writeln!(self.output, "{}", MENU)?;

            let Some(choice) = self.read_line()? else {
                return Ok(());
            };
            match choice.parse::<u32>() {
                Ok(EXIT_CHOICE) => return Ok(()),
                Ok(choice) => {
                    if !self.dispatch(choice)? {
                        return Ok(());
                    }
                }
                Err(_) => writeln!(self.output, "Please enter a number from the menu")?,
            }
        }
    }

    /// Handles one menu entry. Returns `false` when the input ran out mid-entry.
    fn dispatch(&mut self, choice: u32) -> anyhow::Result<bool> {
        match choice {
            0 => {
                let Some(amount) = self.prompt_parsed::<Decimal>("Amount of funds to deposit:")?
                else {
                    return Ok(false);
                };
                match self.ledger.add_funds(amount) {
                    Ok(()) => writeln!(self.output, "Deposited ${:.2}", amount)?,
                    Err(e) => writeln!(self.output, "Error: {}", e)?,
                }
            }
            1 => {
                let Some(amount) = self.prompt_parsed::<Decimal>("Amount of funds to withdraw:")?
                else {
                    return Ok(false);
                };
                match self.ledger.withdraw_funds(amount) {
                    Ok(true) => writeln!(self.output, "Withdrew ${:.2}", amount)?,
                    Ok(false) => writeln!(self.output, "Insufficient funds")?,
                    Err(e) => writeln!(self.output, "Error: {}", e)?,
                }
            }
            2 => {
                let Some(symbol) = self.prompt("Asset to purchase:")? else {
                    return Ok(false);
                };
                let Some(units) = self.prompt_parsed::<Decimal>("Amount to purchase:")? else {
                    return Ok(false);
                };
                match self.ledger.record_purchase(&symbol, units) {
                    Ok(true) => writeln!(self.output, "Purchased {} {}", units.trunc(), symbol)?,
                    Ok(false) => writeln!(self.output, "Insufficient funds to buy {}", symbol)?,
                    Err(e) => writeln!(self.output, "Error: {}", e)?,
                }
            }
            3 => {
                let Some(symbol) = self.prompt("Asset to sell:")? else {
                    return Ok(false);
                };
                let Some(units) = self.prompt_parsed::<u64>("Amount to sell:")? else {
                    return Ok(false);
                };
                match self.ledger.record_sale(&symbol, units) {
                    Ok(true) => writeln!(self.output, "Sold {} {}", units, symbol)?,
                    Ok(false) => {
                        writeln!(self.output, "Not enough {} held to sell {}", symbol, units)?
                    }
                    Err(e) => writeln!(self.output, "Error: {}", e)?,
                }
            }
            4 => {
                let symbols = self.prompt_list("Asset to get a quote of (enter n to stop):")?;
                let quotes = ReportService::new(self.ledger).get_asset_information(&symbols);
                for quote in &quotes {
                    self.write_quote(quote)?;
                }
            }
            5 => {
                let value = calculate_portfolio_value(self.ledger);
                writeln!(self.output, "Value of portfolio: ${:.2}", value)?;
            }
            6 => {
                let rows = ReportService::new(self.ledger).list_all_investments();
                writeln!(self.output, "{}", render_investments(&rows))?;
            }
            7 => {
                let Some(asset_type) =
                    self.prompt("Type of investment (Equity, Currency, Cryptocurrency):")?
                else {
                    return Ok(false);
                };
                let rows = ReportService::new(self.ledger).list_by_type(&asset_type);
                writeln!(self.output, "{}", render_investments(&rows))?;
            }
            8 => {
                let terms = self.prompt_list("Search (enter n to stop):")?;
                let rows = ReportService::new(self.ledger).list_by_name(&terms);
                writeln!(self.output, "{}", render_name_matches(&rows))?;
            }
            9 | 10 => {
                let Some((start, end)) = self.prompt_range()? else {
                    return Ok(false);
                };
                let reports = ReportService::new(self.ledger);
                let text = if choice == 9 {
                    render_purchases(&reports.list_purchases_in_range(start, end))
                } else {
                    render_sales(&reports.list_sales_in_range(start, end))
                };
                writeln!(self.output, "{}", text)?;
            }
            11 => {
                let Some(region) =
                    self.prompt(&format!("Region (blank for {}):", DEFAULT_TRENDING_REGION))?
                else {
                    return Ok(false);
                };
                let region = if region.is_empty() {
                    DEFAULT_TRENDING_REGION.to_string()
                } else {
                    region
                };
                for symbol in ReportService::new(self.ledger).get_trending_for_region(&region) {
                    writeln!(self.output, "{}", symbol)?;
                }
            }
            _ => writeln!(self.output, "Unknown option {}", choice)?,
        }
        Ok(true)
    }

    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        writeln!(self.output, "{}", label)?;
        self.output.flush()?;
        self.read_line()
    }

    /// Prompts until the answer parses or the input ends.
    fn prompt_parsed<T: std::str::FromStr>(&mut self, label: &str) -> anyhow::Result<Option<T>> {
        loop {
            let Some(answer) = self.prompt(label)? else {
                return Ok(None);
            };
            match answer.parse() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "'{}' is not a valid value", answer)?,
            }
        }
    }

    /// Collects answers until "n" or the end of input.
    fn prompt_list(&mut self, label: &str) -> anyhow::Result<Vec<String>> {
        let mut answers = Vec::new();
        while let Some(answer) = self.prompt(label)? {
            if answer == "n" {
                break;
            }
            if !answer.is_empty() {
                answers.push(answer);
            }
        }
        Ok(answers)
    }

    fn prompt_range(&mut self) -> anyhow::Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        let Some(start) = self.prompt_parsed::<NaiveDate>("Start date (YYYY-MM-DD):")? else {
            return Ok(None);
        };
        let Some(end) = self.prompt_parsed::<NaiveDate>("End date (YYYY-MM-DD):")? else {
            return Ok(None);
        };
        let midnight = |date: NaiveDate| date.and_time(chrono::NaiveTime::MIN).and_utc();
        Ok(Some((midnight(start), midnight(end))))
    }

    fn write_quote(&mut self, quote: &Quote) -> anyhow::Result<()> {
        writeln!(self.output, "----------")?;
        writeln!(self.output, "Name: {}", quote.name)?;
        writeln!(self.output, "Asset Symbol: {}", quote.symbol)?;
        writeln!(self.output, "Asset Type: {}", quote.asset_class)?;
        writeln!(self.output, "Quote Timestamp: {}", quote.timestamp.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(self.output, "Price: ${:.2}", quote.price)?;
        writeln!(self.output, "Regular Market Change: {:.2}", quote.change)?;
        writeln!(self.output, "Regular Market Change Percentage: {:.2}%", quote.change_percent)?;
        writeln!(self.output, "Regular Market Previous Close: {:.2}", quote.previous_close)?;
        writeln!(self.output, "Regular Market Open: {:.2}", quote.open)?;
        writeln!(self.output, "----------")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use lotbook_market_data::{AssetClass, StaticQuoteSource};
    use rust_decimal_macros::dec;
    use std::io::Cursor;
    use std::sync::Arc;

    fn run(ledger: &mut Ledger, script: &str) -> String {
        let mut output = Vec::new();
        Menu::new(ledger, Cursor::new(script.to_string()), &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn ledger(balance: Decimal) -> Ledger {
        Ledger::with_balance(balance, Arc::new(StaticQuoteSource::new()))
    }

    #[test]
    fn test_deposit_buy_and_sell() {
        let mut ledger = ledger(dec!(0));
        let out = run(&mut ledger, "0\n1000\n2\nAAPL\n3\n3\nAAPL\n1\n12\n");

        assert!(out.contains("Deposited $1000.00"));
        assert!(out.contains("Purchased 3 AAPL"));
        assert!(out.contains("Sold 1 AAPL"));
        assert_eq!(ledger.balance(), dec!(690));
        assert_eq!(ledger.units_held("AAPL"), 2);
    }

    #[test]
    fn test_refusals_are_reported() {
        let mut ledger = ledger(dec!(100));
        let out = run(&mut ledger, "1\n500\n2\nX\n1\n3\nX\n1\n0\n-5\n12\n");

        assert!(out.contains("Insufficient funds"));
        assert!(out.contains("Insufficient funds to buy X"));
        assert!(out.contains("Not enough X held to sell 1"));
        assert!(out.contains("Error: Ledger operation rejected"));
        assert_eq!(ledger.balance(), dec!(100));
    }

    #[test]
    fn test_invalid_numbers_are_reprompted() {
        let mut ledger = ledger(dec!(0));
        let out = run(&mut ledger, "abc\n0\nten\n10\n12\n");

        assert!(out.contains("Please enter a number from the menu"));
        assert!(out.contains("'ten' is not a valid value"));
        assert_eq!(ledger.balance(), dec!(10));
    }

    #[test]
    fn test_reports_and_lookups() {
        let mut ledger = ledger(dec!(0));
        ledger.record_historical_purchase(
            "BTC-USD",
            "Bitcoin USD",
            AssetClass::Cryptocurrency,
            dec!(2),
            Utc::now(),
            dec!(100),
        );
        let out = run(
            &mut ledger,
            "5\n6\n7\nCryptocurrency\n8\nBitcoin\nn\n4\nMSFT\nn\n11\n\n12\n",
        );

        assert!(out.contains("Value of portfolio: $310.00"));
        assert!(out.contains("Symbol: BTC-USD Average Purchase Price: $100.00"));
        assert!(out.contains("Asset Symbol: BTC-USD"));
        assert!(out.contains("Asset Symbol: MSFT"));
        assert!(out.contains("AAPL\nMSFT\n"));
    }

    #[test]
    fn test_date_range_reports() {
        let mut ledger = ledger(dec!(0));
        ledger.record_historical_purchase(
            "TSLA",
            "Tesla Inc.",
            AssetClass::Equity,
            dec!(10),
            Utc.with_ymd_and_hms(2021, 10, 1, 0, 0, 0).unwrap(),
            dec!(755.22),
        );
        let out = run(&mut ledger, "9\n2021-09-30\n2021-10-02\n10\n2021-01-01\n2022-01-01\n12\n");

        assert!(out.contains("Name: Tesla Inc."));
        assert!(out.contains("Date: 2021-10-01 00:00"));
    }

    #[test]
    fn test_end_of_input_exits() {
        let mut ledger = ledger(dec!(0));
        run(&mut ledger, "2\nAAPL\n");
        assert!(ledger.lots().is_empty());
    }
}
