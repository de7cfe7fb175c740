use super::*;

/// The last height fully applied for one consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEntry {
  pub app_name: String,
  pub height: u64,
  pub timestamp: DateTime<Utc>,
}

impl Entry for CheckpointEntry {
  const COLLECTION: Collection = Collection::Checkpoints;
}

impl CheckpointEntry {
  pub fn load(wtx: &WriteTransaction, app_name: &str) -> Result<Option<Self>> {
    find(wtx, Self::COLLECTION, app_name)?
      .map(|document| <Self as Entry>::load(app_name, document))
      .transpose()
      .map_err(Error::from)
  }

  /// Moves the checkpoint to `height` inside the transaction that applied
  /// it. Rewriting the current height is allowed so a replayed height can
  /// commit. Heights are never skipped.
  pub fn advance(
    wtx: &WriteTransaction,
    app_name: &str,
    height: u64,
    timestamp: DateTime<Utc>,
  ) -> Result {
    if let Some(current) = Self::load(wtx, app_name)? {
      if current.height > height {
        return Err(
          SnafuError::CheckpointRegression {
            app_name: app_name.to_string(),
            current: current.height,
            height,
          }
          .into(),
        );
      }

      if height - current.height > 1 {
        return Err(
          SnafuError::CheckpointGap {
            app_name: app_name.to_string(),
            current: current.height,
            height,
          }
          .into(),
        );
      }
    }

    let checkpoint = Self {
      app_name: app_name.into(),
      height,
      timestamp,
    };

    put(wtx, Self::COLLECTION, app_name, &checkpoint.store()?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn time() -> DateTime<Utc> {
    "2023-01-01T00:00:00Z".parse().unwrap()
  }

  #[test]
  fn advance_and_read() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let index = Index::open_with_path(&tempdir.path().join("index.redb"), 1 << 20).unwrap();

    assert_eq!(index.checkpoint("explorer").unwrap(), None);

    let wtx = index.begin_write().unwrap();
    CheckpointEntry::advance(&wtx, "explorer", 100, time()).unwrap();
    CheckpointEntry::advance(&wtx, "explorer", 100, time()).unwrap();
    CheckpointEntry::advance(&wtx, "other", 5, time()).unwrap();
    wtx.commit().unwrap();

    assert_eq!(index.checkpoint("explorer").unwrap().unwrap().height, 100);
    assert_eq!(index.checkpoint("other").unwrap().unwrap().height, 5);
  }

  #[test]
  fn regression_is_refused() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let index = Index::open_with_path(&tempdir.path().join("index.redb"), 1 << 20).unwrap();

    let wtx = index.begin_write().unwrap();
    CheckpointEntry::advance(&wtx, "explorer", 100, time()).unwrap();
    wtx.commit().unwrap();

    let wtx = index.begin_write().unwrap();
    let err = CheckpointEntry::advance(&wtx, "explorer", 99, time()).unwrap_err();

    assert_eq!(
      err.to_string(),
      "Checkpoint `explorer` is at height 100, refusing to move it back to 99"
    );
    assert_eq!(classify(&err), ErrorClass::Fatal);
  }

  #[test]
  fn gap_is_refused() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let index = Index::open_with_path(&tempdir.path().join("index.redb"), 1 << 20).unwrap();

    let wtx = index.begin_write().unwrap();
    CheckpointEntry::advance(&wtx, "explorer", 100, time()).unwrap();
    wtx.commit().unwrap();

    let wtx = index.begin_write().unwrap();
    let err = CheckpointEntry::advance(&wtx, "explorer", 102, time()).unwrap_err();

    assert_eq!(
      err.to_string(),
      "Checkpoint `explorer` is at height 100, refusing to skip to 102"
    );
    assert_eq!(classify(&err), ErrorClass::Fatal);

    CheckpointEntry::advance(&wtx, "explorer", 101, time()).unwrap();
    wtx.commit().unwrap();

    assert_eq!(index.checkpoint("explorer").unwrap().unwrap().height, 101);
  }
}
