//! CSV export for tick summaries and trades.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::ledger::Trade;
use crate::sim::types::TickSummary;

/// Column header for per-tick telemetry.
pub const TELEMETRY_HEADER: &str = "tick,day,hour,price,supply,demand,volume,weather,\
                                    cash,energy_balance,battery_level,total_profit";

/// Column header for the trade ledger.
pub const TRADES_HEADER: &str =
    "id,trader_id,kind,amount,price,total_value,automated,day,hour,timestamp";

/// Exports tick summaries to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_telemetry(rows: &[TickSummary], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_telemetry(rows, io::BufWriter::new(file))
}

/// Writes tick summaries as CSV to any writer, one row per tick.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_telemetry(rows: &[TickSummary], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TELEMETRY_HEADER.split(',').map(str::trim))?;

    for r in rows {
        wtr.write_record(&[
            r.tick.to_string(),
            r.day.to_string(),
            r.hour.to_string(),
            format!("{:.4}", r.price),
            format!("{:.0}", r.supply),
            format!("{:.0}", r.demand),
            format!("{:.2}", r.volume),
            r.weather.to_string(),
            format!("{:.2}", r.cash),
            format!("{:.4}", r.energy_balance),
            format!("{:.4}", r.battery_level),
            format!("{:.2}", r.total_profit),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports trades to a CSV file at `path`, in the order given.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_trades<'a>(
    trades: impl IntoIterator<Item = &'a Trade>,
    path: &Path,
) -> io::Result<()> {
    let file = File::create(path)?;
    write_trades(trades, io::BufWriter::new(file))
}

/// Writes trades as CSV to any writer. Timestamps are RFC 3339.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_trades<'a>(
    trades: impl IntoIterator<Item = &'a Trade>,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(TRADES_HEADER.split(','))?;

    for t in trades {
        wtr.write_record(&[
            t.id.to_string(),
            t.trader_id.clone(),
            t.kind.to_string(),
            format!("{:.4}", t.amount),
            format!("{:.4}", t.price),
            format!("{:.4}", t.total_value),
            t.automated.to_string(),
            t.day.to_string(),
            t.hour.to_string(),
            t.timestamp.to_rfc3339(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
