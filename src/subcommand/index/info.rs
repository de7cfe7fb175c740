use super::*;

#[derive(Debug, Parser)]
pub struct Info {
  #[arg(long, help = "Only print the checkpoint of the configured app.")]
  checkpoint: bool,
}

impl Info {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let index = Index::open(&settings)?;

    if self.checkpoint {
      return Ok(Some(Box::new(index.checkpoint(settings.app_name())?)));
    }

    Ok(Some(Box::new(index.info()?)))
  }
}
