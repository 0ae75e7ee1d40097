use clap::{Parser, ValueHint};
use std::path::PathBuf;

/* Invocation modes
 *
 * (no generation flags)          interactive prompts
 * --from-json <file>             invoice fields from a JSON file
 * --title/--to/--item ...        invoice fields straight from flags
 * --client <key>                 recipient from a saved profile
 * --list-clients                 print saved profiles
 * --save-client <key> --to ...   store a profile
 * --delete-client <key>          remove a profile
 */

#[derive(Parser)]
pub struct Opts {
    /// Invoice title
    #[clap(short, long)]
    pub title: Option<String>,

    /// Invoice date as YYYY-MM-DD, defaults to today
    #[clap(short, long)]
    pub date: Option<String>,

    /// Client name
    #[clap(long)]
    pub to: Option<String>,

    /// Client company, shown as a second line under the name
    #[clap(long)]
    pub to_company: Option<String>,

    /// Your name
    #[clap(long)]
    pub from_name: Option<String>,

    /// Your email
    #[clap(long)]
    pub from_email: Option<String>,

    /// Line item as 'description,detail,quantity,rate', repeatable
    #[clap(short, long)]
    pub item: Vec<String>,

    /// Payment method line for the footer
    #[clap(short, long)]
    pub payment: Option<String>,

    /// Additional notes for the footer
    #[clap(short, long)]
    pub notes: Option<String>,

    /// Read invoice fields from a JSON file
    #[clap(short = 'j', long, value_hint=ValueHint::FilePath)]
    pub from_json: Option<PathBuf>,

    /// Also write the resolved invoice fields to a JSON file
    #[clap(long, value_hint=ValueHint::FilePath)]
    pub save_json: Option<PathBuf>,

    /// Output filename, defaults to one derived from the title
    #[clap(short, long, value_hint=ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Manual invoice number, used verbatim
    #[clap(long)]
    pub invoice_number: Option<String>,

    /// Leave the invoice number off entirely
    #[clap(long)]
    pub no_number: bool,

    /// Use a saved client profile by key
    #[clap(short, long)]
    pub client: Option<String>,

    /// List saved client profiles
    #[clap(long)]
    pub list_clients: bool,

    /// Save the client given by --to under this key
    #[clap(long, value_name = "KEY")]
    pub save_client: Option<String>,

    /// Delete a saved client profile
    #[clap(long, value_name = "KEY")]
    pub delete_client: Option<String>,

    /// Directory holding the client and counter files
    #[clap(long, default_value = "data", value_hint=ValueHint::DirPath)]
    pub data_dir: PathBuf,

    /// Logo image placed at the top of the invoice when present
    #[clap(long, default_value = "logo.png", value_hint=ValueHint::FilePath)]
    pub logo: PathBuf,
}
