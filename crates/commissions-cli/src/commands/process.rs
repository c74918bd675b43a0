use clap::Args;
use serde_json::Value;

use commissions_core::model::DealRequest;
use commissions_core::pipeline::process_deal;

use crate::input;

/// Arguments for deal processing
#[derive(Args)]
pub struct ProcessDealArgs {
    /// Path to a JSON file with the deal, contract and state
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_process_deal(args: ProcessDealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: DealRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or piped stdin required for deal processing".into());
    };
    let result = process_deal(&request)?;
    Ok(serde_json::to_value(result)?)
}
