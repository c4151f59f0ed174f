use super::CommandContext;
use gqlwatch_core::locator::{ConfigLocator, DEFAULT_MODULE_NAME};

/// Print the config file the session would load
pub fn execute(context: &CommandContext) -> miette::Result<()> {
    let locator = ConfigLocator::new(DEFAULT_MODULE_NAME)?;
    let path = locator.locate(&context.root, context.settings.config_file_path.as_deref())?;
    println!("{}", path.display());
    Ok(())
}
