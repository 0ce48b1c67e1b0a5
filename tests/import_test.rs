mod common;

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use common::{mount_ledger, new_year_service};
use finmon::application::{FilePrompt, ValidationError};
use finmon::storage::SettingsStore;

struct ScriptedPrompt {
    answers: Vec<Option<PathBuf>>,
}

impl FilePrompt for ScriptedPrompt {
    fn choose(&mut self) -> Option<PathBuf> {
        self.answers.pop().flatten()
    }
}

#[test]
fn test_mount_then_current_round_trip() -> Result<()> {
    let (service, temp) = new_year_service()?;
    let path = temp.path().join("ledger.txt");

    service.imports().mount(&path)?;
    assert_eq!(service.imports().current(), Some(path.clone()));

    service.imports().dismount()?;
    assert_eq!(service.imports().current(), None);
    Ok(())
}

#[test]
fn test_mount_is_idempotent() -> Result<()> {
    let (service, temp) = new_year_service()?;
    let path = temp.path().join("ledger.txt");
    fs::write(&path, "1, a, b;\n")?;

    service.imports().mount(&path)?;
    service.imports().mount(&path)?;

    assert_eq!(service.imports().current(), Some(path.clone()));
    assert_eq!(fs::read_to_string(&path)?, "1, a, b;\n");
    Ok(())
}

#[test]
fn test_mount_persists_across_instances() -> Result<()> {
    let (service, temp) = new_year_service()?;
    let path = mount_ledger(&service, &temp, "ledger.txt")?;

    // A second store on the same data dir sees the same record
    let reopened = SettingsStore::in_dir(temp.path());
    assert_eq!(reopened.load().mounted_path(), path.to_str());
    Ok(())
}

#[test]
fn test_dismount_keeps_file_and_record_shape() -> Result<()> {
    let (service, temp) = new_year_service()?;
    let path = mount_ledger(&service, &temp, "ledger.txt")?;
    service.set_timezone("UTC-5")?;

    service.imports().dismount()?;

    assert!(path.exists());
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("settings.json"))?)?;
    assert_eq!(raw["imported_file"], "");
    assert_eq!(raw["time"], "UTC-5");
    Ok(())
}

#[tokio::test]
async fn test_dismount_blocks_submissions() -> Result<()> {
    let (service, temp) = new_year_service()?;
    mount_ledger(&service, &temp, "ledger.txt")?;
    service.imports().dismount()?;

    let err = service.submit("5", "tea", "2024-01-02").await.unwrap_err();

    assert_eq!(err.validation(), Some(&ValidationError::NotMounted));
    Ok(())
}

#[test]
fn test_corrupt_settings_degrade_to_unmounted() -> Result<()> {
    let (service, temp) = new_year_service()?;
    mount_ledger(&service, &temp, "ledger.txt")?;
    fs::write(temp.path().join("settings.json"), "\u{0}\u{1}garbage")?;

    assert_eq!(service.imports().current(), None);

    // Mounting again rewrites a clean record
    let path = mount_ledger(&service, &temp, "ledger.txt")?;
    assert_eq!(service.imports().current(), Some(path));
    Ok(())
}

#[test]
fn test_mount_with_prompt_and_cancel() -> Result<()> {
    let (service, temp) = new_year_service()?;
    let picked = temp.path().join("picked.txt");
    // Answers are popped from the back
    let mut prompt = ScriptedPrompt {
        answers: vec![None, Some(picked.clone())],
    };

    let mounted = service.imports().mount_with(&mut prompt)?;
    assert_eq!(mounted.map(|m| m.path), Some(picked.clone()));
    assert!(picked.exists());

    let cancelled = service.imports().mount_with(&mut prompt)?;
    assert_eq!(cancelled, None);
    assert_eq!(service.imports().current(), Some(picked));
    Ok(())
}
