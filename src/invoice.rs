use std::fmt;

use chrono::{Local, NaiveDate};
use num_format::{Locale, ToFormattedString};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::counter::CounterStore;
use crate::error::{StoreError, ValidationError};

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LineItem {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub quantity: Decimal,
    pub rate: Decimal,
}

impl LineItem {
    pub fn amount(&self) -> Decimal {
        (self.quantity * self.rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} | qty {} @ {} = {}",
            self.description,
            self.quantity.normalize(),
            usd(self.rate),
            usd(self.amount())
        )
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Sender {
    pub name: String,
    pub email: String,
    pub payment_method: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Recipient {
    pub name: String,
    pub company: Option<String>,
}

/// A finished invoice, numbered (or deliberately unnumbered) and ready
/// to lay out.
#[derive(Debug, PartialEq, Clone)]
pub struct Invoice {
    pub number: Option<String>,
    pub title: String,
    pub date: NaiveDate,
    pub from: Sender,
    pub to: Recipient,
    pub items: Vec<LineItem>,
    pub notes: Option<String>,
}

impl Invoice {
    pub fn compose(draft: Draft, number: Option<String>, config: &Config) -> Self {
        Self {
            number,
            title: draft.title,
            date: draft.date.unwrap_or_else(|| Local::now().date_naive()),
            from: Sender {
                name: draft
                    .from_name
                    .unwrap_or_else(|| config.from_name.clone()),
                email: draft
                    .from_email
                    .unwrap_or_else(|| config.from_email.clone()),
                payment_method: draft
                    .payment_method
                    .unwrap_or_else(|| config.payment_method.clone()),
            },
            to: Recipient {
                name: draft.to,
                company: draft.to_company.filter(|c| !c.trim().is_empty()),
            },
            items: draft.items,
            notes: draft.notes.filter(|n| !n.trim().is_empty()),
        }
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::amount).sum()
    }

    pub fn to_draft(&self) -> Draft {
        Draft {
            title: self.title.clone(),
            to: self.to.name.clone(),
            to_company: self.to.company.clone(),
            items: self.items.clone(),
            invoice_number: self.number.clone(),
            date: Some(self.date),
            from_name: Some(self.from.name.clone()),
            from_email: Some(self.from.email.clone()),
            payment_method: Some(self.from.payment_method.clone()),
            notes: self.notes.clone(),
        }
    }
}

/// Invoice data as it arrives from any of the input paths, before the
/// numbering decision. Doubles as the JSON schema for --from-json and
/// --save-json.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Draft {
    pub title: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_company: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Draft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.to.trim().is_empty() {
            return Err(ValidationError::MissingRecipient);
        }
        for item in self.items.iter() {
            if item.quantity <= Decimal::ZERO {
                return Err(ValidationError::Quantity {
                    description: item.description.clone(),
                });
            }
            if item.rate < Decimal::ZERO {
                return Err(ValidationError::Rate {
                    description: item.description.clone(),
                });
            }
        }
        Ok(())
    }
}

pub enum Numbering {
    Auto,
    Manual(String),
    Skip,
}

impl Numbering {
    /// Only Auto touches the counter; a manual or skipped number must
    /// not burn a slot in the sequence.
    pub fn resolve(
        self,
        counter: &mut CounterStore,
    ) -> Result<Option<String>, StoreError> {
        match self {
            Numbering::Auto => counter.assign_next().map(Some),
            Numbering::Manual(number) => Ok(Some(number)),
            Numbering::Skip => Ok(None),
        }
    }
}

/* Item strings look like "description,detail,quantity,rate". Trailing
 * fields may be left off or empty: quantity falls back to 1, rate to 0,
 * and the rate may carry a leading dollar sign. */
pub fn parse_item(raw: &str) -> Result<LineItem, ValidationError> {
    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    if fields.len() > 4 {
        return Err(ValidationError::ItemFields {
            raw: raw.to_string(),
        });
    }
    let field = |i: usize| fields.get(i).copied().unwrap_or("");
    let number = |i: usize, default: Decimal| match field(i)
        .trim_start_matches('$')
        .trim()
    {
        "" => Ok(default),
        text => text.parse().map_err(|_| ValidationError::ItemNumber {
            raw: raw.to_string(),
        }),
    };

    Ok(LineItem {
        description: field(0).to_string(),
        detail: match field(1) {
            "" => None,
            detail => Some(detail.to_string()),
        },
        quantity: number(2, Decimal::ONE)?,
        rate: number(3, Decimal::ZERO)?,
    })
}

/// Dollars and cents with thousands separators, always two decimals.
pub fn usd(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    let cents = (rounded * Decimal::ONE_HUNDRED)
        .to_i128()
        .unwrap_or(0)
        .max(0);
    format!(
        "${}.{:02}",
        (cents / 100).to_formatted_string(&Locale::en),
        cents % 100
    )
}
