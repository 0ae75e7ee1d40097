use inquire::{error::InquireError, CustomType, DateSelect, Select, Text};
use rust_decimal::Decimal;

use crate::clients::{ClientProfile, ClientStore};
use crate::config::Config;
use crate::invoice::{Draft, LineItem};

type InputResult<T> = Result<T, InquireError>;

const NEW_CLIENT: &str = "Enter a new client";

pub fn draft(
    config: &Config,
    clients: &ClientStore,
    next_number: &str,
) -> InputResult<Draft> {
    println!("Next invoice number: {}\n", next_number);

    let title = Text::new("Invoice title:")
        .with_placeholder("March Services")
        .prompt()?;
    let date = DateSelect::new("Invoice date:").prompt()?;
    let from_name = Text::new("From name:")
        .with_default(&config.from_name)
        .prompt()?;
    let from_email = Text::new("From email:")
        .with_default(&config.from_email)
        .prompt()?;
    let (to, to_company) = recipient(clients)?;
    let items = items()?;
    let payment_method = Text::new("Payment method:")
        .with_default(&config.payment_method)
        .prompt()?;
    let notes = Text::new("Notes:")
        .with_help_message("Hit <enter> to leave the notes off")
        .prompt()?;

    Ok(Draft {
        title,
        to,
        to_company,
        items,
        invoice_number: None,
        date: Some(date),
        from_name: Some(from_name),
        from_email: Some(from_email),
        payment_method: Some(payment_method),
        notes: none_if_empty(notes),
    })
}

fn recipient(clients: &ClientStore) -> InputResult<(String, Option<String>)> {
    let saved: Vec<(&str, &ClientProfile)> = clients.iter().collect();
    if !saved.is_empty() {
        let mut options: Vec<String> = saved
            .iter()
            .map(|(key, profile)| format!("{}: {}", key, profile))
            .collect();
        options.push(NEW_CLIENT.to_string());

        let choice = Select::new("Bill to:", options).raw_prompt()?;
        if let Some((_, profile)) = saved.get(choice.index) {
            println!("Using client: {}", profile.name);
            return Ok((profile.name.clone(), profile.company.clone()));
        }
    }

    let name = Text::new("Client name:").prompt()?;
    let company = Text::new("Client company:")
        .with_help_message("Hit <enter> to leave the company off")
        .prompt()?;
    Ok((name, none_if_empty(company)))
}

fn items() -> InputResult<Vec<LineItem>> {
    let mut items: Vec<LineItem> = Vec::new();
    loop {
        let description = Text::new("Service description:")
            .with_help_message("Hit <enter> on an empty line to stop input")
            .prompt()?;
        if description.is_empty() {
            if items.is_empty() {
                println!("Need at least one item.");
                continue;
            }
            break;
        }

        let detail = Text::new("Detail:")
            .with_help_message("Hit <enter> to leave the detail off")
            .prompt()?;
        let quantity: Decimal = CustomType::new("Quantity:")
            .with_default(Decimal::ONE)
            .with_error_message("Please type a valid number")
            .prompt()?;
        let rate: Decimal = CustomType::new("Rate ($):")
            .with_default(Decimal::ZERO)
            .with_error_message("Please type a valid number")
            .prompt()?;

        let item = LineItem {
            description,
            detail: none_if_empty(detail),
            quantity,
            rate,
        };
        println!("Added: {}\n", item);
        items.push(item);
    }
    Ok(items)
}

fn none_if_empty(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
