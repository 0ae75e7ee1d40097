use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use crate::cli::Opts;
use crate::clients::{ClientProfile, ClientStore};
use crate::config::Config;
use crate::counter::CounterStore;
use crate::error::{RenderError, StoreError, ValidationError};
use crate::input;
use crate::invoice::{parse_item, Draft, Invoice, Numbering};
use crate::render;

use chrono::NaiveDate;
use thiserror::Error;

pub fn run(opts: Opts) -> Result<(), RunError> {
    let config = Config::load(&opts.data_dir)?;
    let mut clients = ClientStore::load(&opts.data_dir)?;

    if opts.list_clients {
        return list_clients(&clients);
    }
    if let Some(key) = &opts.delete_client {
        clients.delete(key)?;
        println!("Deleted client: {}", key);
        return Ok(());
    }
    if let Some(key) = &opts.save_client {
        let name = opts.to.clone().ok_or(RunError::SaveClientNeedsName)?;
        let profile = ClientProfile {
            name,
            company: opts.to_company.clone(),
        };
        clients.save(key, profile)?;
        println!("Saved client: {}", key);
        if opts.item.is_empty() {
            return Ok(());
        }
    }

    let mut counter =
        CounterStore::load(&opts.data_dir, &config.invoice_prefix)?;

    let draft = if let Some(path) = &opts.from_json {
        read_draft(path)?
    } else if opts.title.is_some()
        || !opts.item.is_empty()
        || opts.client.is_some()
    {
        draft_from_flags(&opts, &clients)?
    } else {
        input::draft(&config, &clients, &counter.peek_formatted())?
    };
    draft.validate()?;

    let numbering = if opts.no_number {
        Numbering::Skip
    } else if let Some(number) = opts
        .invoice_number
        .clone()
        .or_else(|| draft.invoice_number.clone())
    {
        Numbering::Manual(number)
    } else {
        Numbering::Auto
    };
    let number = numbering.resolve(&mut counter)?;
    let invoice = Invoice::compose(draft, number, &config);

    let bytes = render::render(&invoice, render::load_logo(&opts.logo))?;
    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_filename(&invoice)));
    fs::write(&output, bytes)?;
    match &invoice.number {
        Some(number) => {
            println!("Generated: {} (Invoice #{})", output.display(), number)
        }
        None => println!("Generated: {}", output.display()),
    }

    if let Some(data_path) = &opts.save_json {
        let f = File::create(data_path)?;
        serde_json::to_writer_pretty(f, &invoice.to_draft())
            .map_err(io::Error::from)?;
        println!("Saved data: {}", data_path.display());
    }
    Ok(())
}

fn list_clients(clients: &ClientStore) -> Result<(), RunError> {
    if clients.is_empty() {
        println!("No saved clients.");
        return Ok(());
    }
    println!("Saved clients:");
    for (key, profile) in clients.iter() {
        println!("  {}: {}", key, profile);
    }
    Ok(())
}

fn read_draft(path: &Path) -> Result<Draft, RunError> {
    let reader = BufReader::new(File::open(path)?);
    let draft = serde_json::from_reader(reader)
        .map_err(ValidationError::from)?;
    Ok(draft)
}

fn draft_from_flags(
    opts: &Opts,
    clients: &ClientStore,
) -> Result<Draft, RunError> {
    let profile = match &opts.client {
        Some(key) => Some(clients.get(key)?.clone()),
        None => None,
    };
    let (mut to, mut to_company) = match profile {
        Some(profile) => (profile.name, profile.company),
        None => (String::new(), None),
    };
    if let Some(name) = &opts.to {
        to = name.clone();
    }
    if let Some(company) = &opts.to_company {
        to_company = Some(company.clone());
    }

    let items = opts
        .item
        .iter()
        .map(|raw| parse_item(raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Draft {
        title: opts.title.clone().unwrap_or_default(),
        to,
        to_company,
        items,
        invoice_number: None,
        date: opts.date.as_deref().map(parse_date).transpose()?,
        from_name: opts.from_name.clone(),
        from_email: opts.from_email.clone(),
        payment_method: opts.payment.clone(),
        notes: opts.notes.clone(),
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ValidationError::Date {
            raw: raw.to_string(),
        }
    })
}

fn default_filename(invoice: &Invoice) -> String {
    let safe: String = invoice
        .title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let stem = safe.trim().replace(' ', "-");
    match &invoice.number {
        Some(number) => format!("{}-{}.pdf", number, stem),
        None => format!("{}.pdf", stem),
    }
}


#[derive(Debug, Error)]
pub enum RunError {
    #[error("IO Error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("{source}")]
    Store {
        #[from]
        source: StoreError,
    },

    #[error("{source}")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("{source}")]
    Render {
        #[from]
        source: RenderError,
    },

    #[error("Input Error: {source}")]
    Input {
        #[from]
        source: inquire::error::InquireError,
    },

    #[error("--save-client needs a client name, add --to")]
    SaveClientNeedsName,
}
