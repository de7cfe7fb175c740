use super::*;

#[derive(Debug, Parser)]
pub struct Get {
  #[arg(value_enum, help = "Read from <COLLECTION>.")]
  collection: Collection,
  #[arg(help = "Print the document stored under <KEY>. Numeric ids are padded automatically.")]
  key: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub collection: String,
  pub key: String,
  pub document: Document,
}

impl Get {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let index = Index::open(&settings)?;

    let key = match self.key.parse::<u64>() {
      Ok(id) if self.collection.numeric_keys() => id_key(id),
      _ => self.key,
    };

    let document = index
      .get(self.collection, &key)?
      .ok_or_else(|| anyhow!("{} `{key}` not found", self.collection))?;

    Ok(Some(Box::new(Output {
      collection: self.collection.to_string(),
      key,
      document,
    })))
  }
}
