use clap::Args;
use serde_json::Value;

use propshare_core::yield_model::YieldModel;

/// Arguments for listing the yield catalog
#[derive(Args)]
pub struct CategoriesArgs {
    /// Show a single category by id
    #[arg(long)]
    pub id: Option<String>,
}

pub fn run(args: CategoriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let model = YieldModel::builtin();
    match args.id {
        Some(id) => Ok(serde_json::to_value(model.get(&id)?)?),
        None => Ok(serde_json::to_value(model.categories())?),
    }
}
