use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::models::{Diagnostic, ExpenseRecord, ParseResult, PricingUnit};

const DELIMITER: char = '|';

/// Receipt footer lines that look like items but are not purchases.
const SUMMARY_ROWS: &[&str] = &[
    "SUBTOTAL",
    "SALES TAX",
    "TAX",
    "TOTAL",
    "CASH",
    "CASH PAID",
    "CHANGE",
];

static RE_LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").unwrap());
static RE_FIRST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?|\.[0-9]+").unwrap());
static RE_SLASH_LB: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\s*lb").unwrap());
static RE_PER_LB: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bper\s*lb\b").unwrap());
static RE_LB: Lazy<Regex> = Lazy::new(|| Regex::new(r"\blb\b").unwrap());

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round to a fixed number of fractional digits. Non-finite input becomes 0.
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(places);
    let scaled = value * factor;
    if !scaled.is_finite() {
        // No fractional digits left at this magnitude.
        return value;
    }
    scaled.round() / factor
}

fn leading_number(s: &str) -> f64 {
    RE_LEADING_NUMBER
        .find(s)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// `"**$1,234.50**"` -> 1234.5. Anything unparseable is 0, never an error.
pub fn parse_currency(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '*' | '$' | ','))
        .collect();
    leading_number(cleaned.trim())
}

/// `"$3.77 each"` -> (3.77, Each), `"$10.99 / lb"` -> (10.99, ByWeight).
pub fn parse_unit_price(raw: &str) -> (f64, PricingUnit) {
    let cleaned = raw.replace('*', "").trim().to_lowercase();
    if cleaned.is_empty() {
        return (0.0, PricingUnit::Each);
    }
    let price = parse_currency(&cleaned);
    // An explicit "each" and no marker at all both mean per piece.
    let unit = if RE_SLASH_LB.is_match(&cleaned) || RE_PER_LB.is_match(&cleaned) {
        PricingUnit::ByWeight
    } else {
        PricingUnit::Each
    };
    (price, unit)
}

/// `"0.560 lb"` -> (0.56, ByWeight), `"2"` -> (2.0, Each).
pub fn parse_quantity(raw: &str) -> (f64, PricingUnit) {
    let cleaned = raw.replace('*', "").trim().to_lowercase();
    let qty = RE_FIRST_NUMBER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0);
    let unit = if RE_LB.is_match(&cleaned) {
        PricingUnit::ByWeight
    } else {
        PricingUnit::Each
    };
    (qty, unit)
}

pub fn is_summary_row(item_cell: &str) -> bool {
    let normalized = item_cell.replace('*', "").trim().to_uppercase();
    if normalized.is_empty() {
        return false;
    }
    SUMMARY_ROWS.iter().any(|k| normalized.starts_with(k))
}

fn strip_bold(cell: &str) -> String {
    cell.replace("**", "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Table location
// ---------------------------------------------------------------------------

/// `|---|:---:|` style separator between header and body.
fn is_alignment_row(line: &str) -> bool {
    !line.is_empty()
        && line
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
}

struct LocatedTable<'a> {
    header: &'a str,
    body: Vec<&'a str>,
}

fn locate_table(text: &str) -> Result<LocatedTable<'_>, Diagnostic> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(Diagnostic::global("No markdown table found."));
    }

    let header_idx = lines
        .iter()
        .position(|l| l.contains(DELIMITER) && !is_alignment_row(l))
        .ok_or_else(|| Diagnostic::global("Header row not found."))?;

    let mut body = &lines[header_idx + 1..];
    if body.first().is_some_and(|l| is_alignment_row(l)) {
        body = &body[1..];
    }

    Ok(LocatedTable {
        header: lines[header_idx],
        body: body.to_vec(),
    })
}

/// Split one table line into trimmed cells. Escaped pipes are not supported.
pub fn split_row(line: &str) -> Vec<&str> {
    let line = line.trim();
    let line = line.strip_prefix(DELIMITER).unwrap_or(line);
    let line = line.strip_suffix(DELIMITER).unwrap_or(line);
    line.split(DELIMITER).map(str::trim).collect()
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Item,
    Category,
    Store,
    Date,
    UnitPrice,
    Quantity,
    Price,
}

const ROLE_COUNT: usize = 7;

/// Resolution order: a header cell claimed by a role is not offered to the
/// roles after it.
const ROLES: [Role; ROLE_COUNT] = [
    Role::Item,
    Role::Category,
    Role::Store,
    Role::Date,
    Role::UnitPrice,
    Role::Quantity,
    Role::Price,
];

impl Role {
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Self::Item => &["item"],
            Self::Category => &["category"],
            Self::Store => &["store"],
            Self::Date => &["date"],
            Self::UnitPrice => &["unit price", "unitprice", "price per", "per"],
            Self::Quantity => &["weight/qty", "qty", "weight", "amount"],
            Self::Price => &["price", "total"],
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Self::Item | Self::Date | Self::UnitPrice | Self::Quantity
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Item => "Item",
            Self::Category => "Category",
            Self::Store => "Store",
            Self::Date => "Date",
            Self::UnitPrice => "Unit Price",
            Self::Quantity => "Weight/Qty or Qty",
            Self::Price => "Price",
        }
    }
}

/// Zero-based column index per role; `None` when no header cell matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<usize>; ROLE_COUNT],
}

impl ColumnMap {
    /// `header` cells must already be lower-cased.
    ///
    /// Roles resolve in `ROLES` order. Each role tries its candidates in
    /// priority order and takes the leftmost cell containing one that no
    /// earlier role has claimed.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Self {
        let cells: Vec<&str> = header.iter().map(AsRef::as_ref).collect();
        let mut map = Self::default();
        let mut claimed = vec![false; cells.len()];
        for (slot, role) in ROLES.iter().enumerate() {
            let found = role.candidates().iter().find_map(|&candidate| {
                cells
                    .iter()
                    .enumerate()
                    .position(|(idx, cell)| !claimed[idx] && cell.contains(candidate))
            });
            if let Some(idx) = found {
                claimed[idx] = true;
                map.columns[slot] = Some(idx);
            }
        }
        map
    }

    pub fn index(&self, role: Role) -> Option<usize> {
        ROLES
            .iter()
            .position(|r| *r == role)
            .and_then(|slot| self.columns[slot])
    }

    pub fn missing_required(&self) -> Vec<Role> {
        ROLES
            .iter()
            .filter(|r| r.is_required() && self.index(**r).is_none())
            .copied()
            .collect()
    }

    fn cell<'a>(&self, cells: &[&'a str], role: Role) -> &'a str {
        self.index(role)
            .and_then(|i| cells.get(i).copied())
            .unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Row building
// ---------------------------------------------------------------------------

enum RowOutcome {
    Summary,
    Blank,
    Built {
        record: ExpenseRecord,
        reasons: Vec<String>,
    },
}

fn build_row(cells: &[&str], columns: &ColumnMap) -> RowOutcome {
    let item_cell = columns.cell(cells, Role::Item);
    if is_summary_row(item_cell) {
        return RowOutcome::Summary;
    }
    let item = strip_bold(item_cell);
    if item.is_empty() {
        return RowOutcome::Blank;
    }

    let category = match strip_bold(columns.cell(cells, Role::Category)) {
        c if c.is_empty() => "Other".to_string(),
        c => c,
    };
    let store = strip_bold(columns.cell(cells, Role::Store));
    let date = strip_bold(columns.cell(cells, Role::Date));

    let (price_per_unit, price_unit) = parse_unit_price(columns.cell(cells, Role::UnitPrice));
    let (qty, qty_unit) = parse_quantity(columns.cell(cells, Role::Quantity));

    // Never multiply a per-pound price by a piece count (or the reverse):
    // price with zero quantity and flag the row instead.
    let mismatch = price_unit != qty_unit;
    let effective_qty = if mismatch { 0.0 } else { qty };

    let explicit_price = parse_currency(columns.cell(cells, Role::Price));
    let price = if explicit_price > 0.0 {
        explicit_price
    } else {
        round_to(price_per_unit * effective_qty, 2)
    };

    let mut reasons = Vec::new();
    if date.is_empty() {
        reasons.push("Missing date".to_string());
    }
    if price_per_unit <= 0.0 {
        reasons.push("Invalid unit price".to_string());
    }
    if effective_qty <= 0.0 {
        reasons.push("Invalid qty/weight".to_string());
    }
    if mismatch {
        reasons.push(format!(
            "Qty unit ({qty_unit}) doesn't match unit price ({price_unit})"
        ));
    }

    RowOutcome::Built {
        record: ExpenseRecord {
            item,
            category,
            store,
            date,
            unit_price: round_to(price_per_unit, 2),
            // The stored quantity is what was pasted, even when pricing used 0.
            qty: round_to(qty, 3),
            price: round_to(price, 2),
            pricing_unit: price_unit,
        },
        reasons,
    }
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

/// Parse a pasted GitHub-style Markdown table into expense records.
///
/// Expected headers (case-insensitive, matched by substring):
/// `Item | Category | Store | Date | Unit Price | Weight/Qty | Price`.
/// Never fails: every problem is reported as a [`Diagnostic`] next to
/// whatever rows could be salvaged.
pub fn parse(text: &str) -> ParseResult {
    let table = match locate_table(text) {
        Ok(table) => table,
        Err(diagnostic) => {
            debug!(%diagnostic, "no usable table in input");
            return ParseResult {
                records: Vec::new(),
                diagnostics: vec![diagnostic],
            };
        }
    };

    let header: Vec<String> = split_row(table.header)
        .iter()
        .map(|h| h.replace('*', "").to_lowercase())
        .collect();
    let columns = ColumnMap::from_header(&header);
    debug!(?columns, "resolved header columns");

    let mut diagnostics = Vec::new();
    let missing = columns.missing_required();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|r| r.label()).collect();
        diagnostics.push(Diagnostic::global(format!(
            "Missing required columns: {}",
            names.join(", ")
        )));
    }

    let mut records = Vec::new();
    for (idx, line) in table.body.iter().enumerate() {
        if !line.contains(DELIMITER) {
            continue;
        }
        let line_no = idx + 1;
        let cells = split_row(line);
        match build_row(&cells, &columns) {
            RowOutcome::Summary => debug!(line = line_no, "skipping summary row"),
            RowOutcome::Blank => debug!(line = line_no, "skipping row without item"),
            RowOutcome::Built { record, reasons } => {
                if !reasons.is_empty() {
                    diagnostics.push(Diagnostic::Row {
                        line: line_no,
                        reasons,
                    });
                }
                records.push(record);
            }
        }
    }

    info!(
        records = records.len(),
        diagnostics = diagnostics.len(),
        "parsed markdown table"
    );
    ParseResult {
        records,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEIPT: &str = "\
Here is what I bought today:

| Item | Category | Store | Date | Unit Price | Weight/Qty | Price |
|------|----------|-------|------|-----------:|-----------:|------:|
| **Bananas** | Produce | Aldi | 2024-01-05 | $0.59 each | 2 | $1.18 |
| Ground Beef | **Meat** | Aldi | 2024-01-05 | $5.49 / lb | 1.25 lb | $6.86 |
| **SUBTOTAL** | | | | | | **$8.04** |
| Sales Tax | | | | | | $0.00 |
| **TOTAL** | | | | | | **$8.04** |
| CASH PAID | | | | | | $10.00 |
| Change | | | | | | $1.96 |
";

    fn simple_table(rows: &[&str]) -> String {
        let mut md = String::from("| Item | Date | Unit Price | Qty | Price |\n|---|---|---|---|---|\n");
        for row in rows {
            md.push_str(row);
            md.push('\n');
        }
        md
    }

    fn row_messages(result: &ParseResult) -> Vec<String> {
        result.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("**$1,234.50**"), 1234.5);
        assert_eq!(parse_currency(""), 0.0);
        assert_eq!(parse_currency("  $ 12  "), 12.0);
        assert_eq!(parse_currency("3.77 each"), 3.77);
        assert_eq!(parse_currency("free"), 0.0);
    }

    #[test]
    fn test_parse_unit_price() {
        assert_eq!(parse_unit_price("$3.77 each"), (3.77, PricingUnit::Each));
        assert_eq!(parse_unit_price("$10.99 / lb"), (10.99, PricingUnit::ByWeight));
        assert_eq!(parse_unit_price("**$4.99/LB**"), (4.99, PricingUnit::ByWeight));
        assert_eq!(parse_unit_price("$2.49 per lb"), (2.49, PricingUnit::ByWeight));
        assert_eq!(parse_unit_price("3.50"), (3.5, PricingUnit::Each));
        assert_eq!(parse_unit_price(""), (0.0, PricingUnit::Each));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("1"), (1.0, PricingUnit::Each));
        assert_eq!(parse_quantity("0.560 lb"), (0.56, PricingUnit::ByWeight));
        assert_eq!(parse_quantity("**2**"), (2.0, PricingUnit::Each));
        assert_eq!(parse_quantity("approx .5 LB"), (0.5, PricingUnit::ByWeight));
        assert_eq!(parse_quantity("a few"), (0.0, PricingUnit::Each));
        assert_eq!(parse_quantity(""), (0.0, PricingUnit::Each));
        // "lbs" is not the standalone word "lb"
        assert_eq!(parse_quantity("2 lbs"), (2.0, PricingUnit::Each));
    }

    #[test]
    fn test_is_summary_row() {
        for cell in ["SUBTOTAL", "**TAX**", "total", "Cash", "CASH PAID", "**Change**", "Sales Tax"] {
            assert!(is_summary_row(cell), "{cell} should be a summary row");
        }
        assert!(!is_summary_row("Bananas"));
        assert!(!is_summary_row(""));
    }

    #[test]
    fn test_split_row() {
        assert_eq!(split_row("| a | b |  c |"), vec!["a", "b", "c"]);
        assert_eq!(split_row("a | b"), vec!["a", "b"]);
        assert_eq!(split_row("| a | |"), vec!["a", ""]);
    }

    #[test]
    fn test_alignment_rows() {
        assert!(is_alignment_row("|---|:---:|---:|"));
        assert!(is_alignment_row("--- | ---"));
        assert!(!is_alignment_row("| Item | Qty |"));
        assert!(!is_alignment_row(""));
    }

    #[test]
    fn test_column_map_full_header() {
        let header = ["item", "category", "store", "date", "unit price", "weight/qty", "price"];
        let map = ColumnMap::from_header(&header);
        assert_eq!(map.index(Role::Item), Some(0));
        assert_eq!(map.index(Role::Category), Some(1));
        assert_eq!(map.index(Role::Store), Some(2));
        assert_eq!(map.index(Role::Date), Some(3));
        assert_eq!(map.index(Role::UnitPrice), Some(4));
        assert_eq!(map.index(Role::Quantity), Some(5));
        assert_eq!(map.index(Role::Price), Some(6));
        assert!(map.missing_required().is_empty());
    }

    #[test]
    fn test_column_map_unit_price_header_is_not_the_total() {
        let map = ColumnMap::from_header(&["item", "date", "unit price", "qty"]);
        assert_eq!(map.index(Role::UnitPrice), Some(2));
        assert_eq!(map.index(Role::Price), None);
    }

    #[test]
    fn test_column_map_alternate_names() {
        let map = ColumnMap::from_header(&["item", "date", "price per unit", "amount", "total"]);
        assert_eq!(map.index(Role::UnitPrice), Some(2));
        assert_eq!(map.index(Role::Quantity), Some(3));
        assert_eq!(map.index(Role::Price), Some(4));
    }

    #[test]
    fn test_column_map_candidate_priority_beats_position() {
        let map = ColumnMap::from_header(&["item", "date", "unit price", "amount", "weight/qty"]);
        assert_eq!(map.index(Role::Quantity), Some(4));

        let map = ColumnMap::from_header(&["item", "date", "unit price", "weight", "qty"]);
        assert_eq!(map.index(Role::Quantity), Some(4));
    }

    #[test]
    fn test_column_map_leftmost_cell_wins_within_a_candidate() {
        let map = ColumnMap::from_header(&["item", "date", "unit price", "qty", "qty (lb)"]);
        assert_eq!(map.index(Role::Quantity), Some(3));
    }

    #[test]
    fn test_parse_amount_column_left_of_weight_qty() {
        let text = "\
| Item | Date | Unit Price | Amount | Weight/Qty |
|---|---|---|---|---|
| Beef | 2024-01-05 | $5.00 / lb | $7.50 | 1.5 lb |
";
        let result = parse(text);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let beef = &result.records[0];
        assert_eq!(beef.qty, 1.5);
        assert_eq!(beef.pricing_unit, PricingUnit::ByWeight);
        assert_eq!(beef.price, 7.5);
    }

    #[test]
    fn test_parse_receipt() {
        let result = parse(RECEIPT);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert_eq!(result.records.len(), 2);

        let bananas = &result.records[0];
        assert_eq!(bananas.item, "Bananas");
        assert_eq!(bananas.category, "Produce");
        assert_eq!(bananas.store, "Aldi");
        assert_eq!(bananas.date, "2024-01-05");
        assert_eq!(bananas.unit_price, 0.59);
        assert_eq!(bananas.qty, 2.0);
        assert_eq!(bananas.price, 1.18);
        assert_eq!(bananas.pricing_unit, PricingUnit::Each);

        let beef = &result.records[1];
        assert_eq!(beef.category, "Meat");
        assert_eq!(beef.qty, 1.25);
        assert_eq!(beef.price, 6.86);
        assert_eq!(beef.pricing_unit, PricingUnit::ByWeight);
    }

    #[test]
    fn test_parse_is_pure() {
        assert_eq!(parse(RECEIPT), parse(RECEIPT));
        let noisy = simple_table(&["| Steak | | $10.99 / lb | 2 | |"]);
        assert_eq!(parse(&noisy), parse(&noisy));
    }

    #[test]
    fn test_summary_rows_produce_nothing() {
        let md = simple_table(&[
            "| **SUBTOTAL** | | | | $5.00 |",
            "| tax | | | | $0.40 |",
            "| Total | | | | $5.40 |",
            "| CASH | | | | $10.00 |",
            "| cash paid | | | | $10.00 |",
            "| **CHANGE** | | | | $4.60 |",
        ]);
        let result = parse(&md);
        assert!(result.records.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_fallback_pricing_when_price_cell_empty() {
        let md = simple_table(&["| Bananas | 2024-01-05 | $0.59 each | 2 | |"]);
        let result = parse(&md);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.records[0].price, 1.18);
    }

    #[test]
    fn test_explicit_price_wins_over_computed() {
        let md = simple_table(&["| Bananas | 2024-01-05 | $0.59 each | 2 | $1.00 |"]);
        assert_eq!(parse(&md).records[0].price, 1.0);
    }

    #[test]
    fn test_unit_mismatch_zeroes_price_but_keeps_qty() {
        let md = simple_table(&["| Steak | 2024-01-05 | $10.99 / lb | 2 | |"]);
        let result = parse(&md);
        let record = &result.records[0];
        assert_eq!(record.price, 0.0);
        // Pricing used a quantity of zero; the stored quantity is still the pasted one.
        assert_eq!(record.qty, 2.0);
        assert_eq!(record.unit_price, 10.99);
        assert_eq!(
            row_messages(&result),
            vec!["Row 1: Invalid qty/weight; Qty unit (each) doesn't match unit price (lb)"]
        );
    }

    #[test]
    fn test_unit_mismatch_each_price_with_weighed_qty() {
        let md = simple_table(&["| Melon | 2024-01-05 | $2.00 each | 1 lb | |"]);
        let result = parse(&md);
        assert_eq!(result.records[0].price, 0.0);
        assert_eq!(result.records[0].qty, 1.0);
        assert!(row_messages(&result)[0].contains("Qty unit (lb) doesn't match unit price (each)"));
    }

    #[test]
    fn test_unit_mismatch_keeps_explicit_price() {
        let md = simple_table(&["| Steak | 2024-01-05 | $10.99 / lb | 2 | $21.98 |"]);
        let result = parse(&md);
        assert_eq!(result.records[0].price, 21.98);
        assert!(row_messages(&result)[0].contains("doesn't match"));
    }

    #[test]
    fn test_missing_quantity_column() {
        let md = "\
| Item | Date | Unit Price |
|---|---|---|
| Apples | 2024-01-05 | $1.00 each |
| Pears | 2024-01-05 | $1.50 each |
";
        let result = parse(md);
        let messages = row_messages(&result);
        assert_eq!(messages[0], "Missing required columns: Weight/Qty or Qty");
        assert_eq!(result.records.len(), 2);
        assert!(result.records.iter().all(|r| r.qty == 0.0 && r.price == 0.0));
        assert_eq!(messages[1], "Row 1: Invalid qty/weight");
    }

    #[test]
    fn test_missing_columns_listed_in_one_diagnostic() {
        let md = "| Product | Cost |\n|---|---|\n| Soap | $2 |\n";
        let result = parse(md);
        assert_eq!(
            result.diagnostics[0].to_string(),
            "Missing required columns: Item, Date, Unit Price, Weight/Qty or Qty"
        );
        // Without an item column every row is blank and silently dropped.
        assert!(result.records.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_rounding() {
        let md = simple_table(&[
            "| Widget | 2024-01-05 | $3.3333333 each | 3 | |",
            "| Cheese | 2024-01-05 | $8.00/lb | 0.4567 lb | |",
        ]);
        let result = parse(&md);
        assert_eq!(result.records[0].price, 10.0);
        assert_eq!(result.records[0].unit_price, 3.33);
        assert_eq!(result.records[1].qty, 0.457);
        assert_eq!(result.records[1].price, 3.65);
    }

    #[test]
    fn test_row_reasons_are_ordered_and_joined() {
        let md = simple_table(&["| Mystery | | free | none | |"]);
        let result = parse(&md);
        assert_eq!(result.records.len(), 1);
        assert_eq!(
            row_messages(&result),
            vec!["Row 1: Missing date; Invalid unit price; Invalid qty/weight"]
        );
    }

    #[test]
    fn test_blank_items_are_dropped_silently() {
        let md = simple_table(&[
            "| | 2024-01-05 | $1.00 each | 1 | |",
            "| **** | 2024-01-05 | $1.00 each | 1 | |",
            "| Milk | 2024-01-05 | $3.49 each | 1 | |",
        ]);
        let result = parse(&md);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].item, "Milk");
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_defaults_for_optional_columns() {
        let md = simple_table(&["| Milk | 2024-01-05 | $3.49 each | 1 | |"]);
        let record = &parse(&md).records[0];
        assert_eq!(record.category, "Other");
        assert_eq!(record.store, "");
    }

    #[test]
    fn test_row_numbers_count_body_lines() {
        let md = simple_table(&[
            "| Milk | 2024-01-05 | $3.49 each | 1 | |",
            "(coupon applied)",
            "| Bread | | $2.99 each | 1 | |",
        ]);
        let result = parse(&md);
        assert_eq!(result.records.len(), 2);
        assert_eq!(row_messages(&result), vec!["Row 3: Missing date"]);
    }

    #[test]
    fn test_global_diagnostic_precedes_row_diagnostics() {
        let md = "| Item | Unit Price | Qty |\n| Milk | $3.49 each | 1 |\n";
        let result = parse(md);
        assert!(matches!(result.diagnostics[0], Diagnostic::Global { .. }));
        assert_eq!(result.diagnostics[1].to_string(), "Row 1: Missing date");
    }

    #[test]
    fn test_table_without_alignment_row() {
        let md = "| Item | Date | Unit Price | Qty |\n| Milk | 2024-01-05 | $3.49 each | 2 |\n";
        let result = parse(md);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].price, 6.98);
    }

    #[test]
    fn test_structural_failures() {
        let empty = parse("");
        assert!(empty.records.is_empty());
        assert_eq!(row_messages(&empty), vec!["No markdown table found."]);

        let single = parse("| Item | Date |");
        assert_eq!(row_messages(&single), vec!["No markdown table found."]);

        let prose = parse("just some notes\nabout groceries\n");
        assert!(prose.records.is_empty());
        assert_eq!(row_messages(&prose), vec!["Header row not found."]);

        let only_rules = parse("|---|---|\n|:--|--:|\n");
        assert_eq!(row_messages(&only_rules), vec!["Header row not found."]);
    }

    #[test]
    fn test_windows_line_endings() {
        let md = "| Item | Date | Unit Price | Qty |\r\n|---|---|---|---|\r\n| Milk | 2024-01-05 | $3.49 each | 1 |\r\n";
        let result = parse(md);
        assert_eq!(result.records.len(), 1);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_diagnostics_are_single_line() {
        let result = parse(&simple_table(&["| X\t| | bad | bad | |"]));
        for d in &result.diagnostics {
            assert!(!d.to_string().chars().any(|c| c.is_control()));
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(9.9999999, 2), 10.0);
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(f64::INFINITY, 2), 0.0);
        assert_eq!(round_to(f64::NAN, 2), 0.0);
        assert_eq!(round_to(1e307, 2), 1e307);
        assert_eq!(round_to(f64::MAX, 3), f64::MAX);
        assert_eq!(round_to(f64::NAN, 2), 0.0);
    }
}
