use quickpin_shared::{
  KeyValueStore,
  StoreError
};
use web_sys::Storage;

/// `window.localStorage`, looked up on every access so that a storage
/// disabled mid-session degrades to logged failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
  fn storage() -> Result<Storage, StoreError> {
    web_sys::window()
      .ok_or_else(|| {
        StoreError::Unavailable(
          "no window".to_string()
        )
      })?
      .local_storage()
      .map_err(|err| {
        StoreError::Unavailable(format!(
          "{err:?}"
        ))
      })?
      .ok_or_else(|| {
        StoreError::Unavailable(
          "localStorage is disabled"
            .to_string()
        )
      })
  }
}

impl KeyValueStore for LocalStore {
  fn get(
    &self,
    key: &str
  ) -> Result<Option<String>, StoreError>
  {
    Self::storage()?
      .get_item(key)
      .map_err(|err| StoreError::Read {
        key:    key.to_string(),
        reason: format!("{err:?}")
      })
  }

  fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> Result<(), StoreError> {
    Self::storage()?
      .set_item(key, value)
      .map_err(|err| StoreError::Write {
        key:    key.to_string(),
        reason: format!("{err:?}")
      })
  }
}
