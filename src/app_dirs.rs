use directories::BaseDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

static BASE_DIRS: OnceLock<BaseDirs> = OnceLock::new();

fn base_dirs() -> &'static BaseDirs {
  BASE_DIRS.get_or_init(|| BaseDirs::new().expect("Failed to get base directories"))
}

pub fn app_name() -> &'static str {
  if cfg!(debug_assertions) {
    "AnDetectDev"
  } else {
    "AnDetect"
  }
}

pub fn data_dir() -> PathBuf {
  #[cfg(test)]
  {
    if let Some(dir) = TEST_DATA_DIR.with(|cell| cell.borrow().clone()) {
      return dir;
    }
  }

  if let Ok(dir) = std::env::var("ANDETECT_DATA_DIR") {
    return PathBuf::from(dir);
  }

  base_dirs().data_local_dir().join(app_name())
}

pub fn profiles_dir() -> PathBuf {
  data_dir().join("profiles")
}

pub fn security_dir() -> PathBuf {
  data_dir().join("security")
}

#[cfg(test)]
thread_local! {
  static TEST_DATA_DIR: std::cell::RefCell<Option<PathBuf>> = const { std::cell::RefCell::new(None) };
}

#[cfg(test)]
pub struct TestDirGuard;

#[cfg(test)]
impl Drop for TestDirGuard {
  fn drop(&mut self) {
    TEST_DATA_DIR.with(|cell| *cell.borrow_mut() = None);
  }
}

#[cfg(test)]
pub fn set_test_data_dir(dir: PathBuf) -> TestDirGuard {
  TEST_DATA_DIR.with(|cell| *cell.borrow_mut() = Some(dir));
  TestDirGuard
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_app_name() {
    let name = app_name();
    assert!(
      name == "AnDetect" || name == "AnDetectDev",
      "app_name should be AnDetect or AnDetectDev, got: {name}"
    );
  }

  #[test]
  fn test_subdirectory_helpers() {
    let _guard = set_test_data_dir(PathBuf::from("/tmp/andetect-test-data"));
    assert!(profiles_dir().ends_with("profiles"));
    assert!(security_dir().ends_with("security"));
  }

  #[test]
  fn test_set_test_data_dir() {
    let tmp = PathBuf::from("/tmp/andetect-test-dirs");
    let _guard = set_test_data_dir(tmp.clone());
    assert_eq!(data_dir(), tmp);
    assert_eq!(profiles_dir(), tmp.join("profiles"));
  }

  #[test]
  fn test_guard_cleanup() {
    let original = data_dir();
    {
      let _guard = set_test_data_dir(PathBuf::from("/tmp/andetect-test-cleanup"));
      assert_eq!(data_dir(), PathBuf::from("/tmp/andetect-test-cleanup"));
    }
    assert_eq!(data_dir(), original);
  }
}
