use std::path::PathBuf;

use tempfile::TempDir;

pub const PLAN_V1: &str = "\
### Phase 1: Setup
- [x] **Scaffold** `[complete]`
- [ ] **Wire CI** `[pending]`

### Phase 2: Build
- [ ] **Parser** `[pending]`
";

pub const TEST_PLAN_V1: &str = "\
## Smoke tests
- [ ] App starts
- [ ] Login works
";

/// Creates a temporary project directory containing one plan file.
pub fn plan_environment(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write plan file");
    (temp_dir, path)
}

/// Polls until `predicate` holds or the timeout elapses.
pub async fn wait_for(predicate: impl Fn() -> bool, timeout_ms: u64) -> bool {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
    while tokio::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }
    predicate()
}
