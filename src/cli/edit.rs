use crate::db;
use crate::entry::ExpenseDraft;
use crate::error::Result;
use crate::fmt::money;
use crate::ledger::{get_expense, update_expense};
use crate::settings::{db_path, load_settings};

/// Fields to overwrite; `None` keeps the stored value.
#[derive(Default)]
pub struct ExpenseChanges {
    pub item: Option<String>,
    pub date: Option<String>,
    pub unit_price: Option<f64>,
    pub qty: Option<f64>,
    pub category: Option<String>,
    pub store: Option<String>,
    pub price: Option<f64>,
}

impl ExpenseChanges {
    /// Overlay onto a draft loaded with `ExpenseDraft::from_record`.
    ///
    /// The stored price is kept unless `price` is given, or unit price or
    /// quantity changed on a row that is not unpriced.
    fn apply(self, draft: &mut ExpenseDraft) {
        let reprice = (self.unit_price.is_some() || self.qty.is_some()) && !draft.is_unpriced();
        if let Some(v) = self.item {
            draft.item = v;
        }
        if let Some(v) = self.date {
            draft.date = v;
        }
        if let Some(v) = self.unit_price {
            draft.unit_price = v;
        }
        if let Some(v) = self.qty {
            draft.qty = v;
        }
        if let Some(v) = self.category {
            draft.category = Some(v);
        }
        if let Some(v) = self.store {
            draft.store = v;
        }
        if self.price.is_some() {
            draft.price = self.price;
        } else if reprice {
            draft.price = None;
        }
    }
}

pub fn run(id: i64, changes: ExpenseChanges) -> Result<()> {
    let settings = load_settings();
    let conn = db::open(&db_path())?;
    let stored = get_expense(&conn, id)?;

    let mut draft = ExpenseDraft::from_record(&stored.record);
    changes.apply(&mut draft);
    let record = draft.validate(&settings.default_category)?;
    update_expense(&conn, id, &record)?;

    println!("Updated #{id}: {} {}", record.item, money(record.price));
    Ok(())
}
