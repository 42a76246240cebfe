use clap::Subcommand;
use prixmq_core::Barcode;

#[derive(Debug, Subcommand)]
pub enum BarcodeCommands {
    /// Verify the check digit and print the lookup form
    Check { code: String },
}

/// # Errors
///
/// Returns the parse error for an invalid barcode.
pub(crate) fn run_barcode(command: &BarcodeCommands) -> anyhow::Result<()> {
    match command {
        BarcodeCommands::Check { code } => {
            let barcode = Barcode::parse(code)?;
            println!("{} {barcode} (lookup key {})", barcode.format(), barcode.normalized());
        }
    }
    Ok(())
}
