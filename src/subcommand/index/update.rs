use super::*;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub committed: u64,
  pub checkpoint: Option<u64>,
}

pub(crate) fn run(settings: Settings) -> SubcommandResult {
  let index = Index::open(&settings)?;

  let chain = Arc::new(HttpChain::new(&settings)?);

  let updater = Updater::new(&index, Schedule::new(&settings), chain.clone(), chain);

  let committed = updater.update_index()?;

  Ok(Some(Box::new(Output {
    committed,
    checkpoint: index
      .checkpoint(settings.app_name())?
      .map(|checkpoint| checkpoint.height),
  })))
}
