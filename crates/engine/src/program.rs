use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Write the generated program into its work dir: a `Pulumi.yaml` project
/// marker plus the program itself as `index.ts`.
pub async fn write_program(work_dir: &Path, code: &str) -> Result<()> {
    fs::create_dir_all(work_dir)
        .await
        .with_context(|| format!("create work dir {}", work_dir.display()))?;

    let project = work_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("infra");
    let manifest = format!("name: {project}\nruntime: nodejs\n");
    fs::write(work_dir.join("Pulumi.yaml"), manifest)
        .await
        .context("write Pulumi.yaml")?;
    fs::write(work_dir.join("index.ts"), code)
        .await
        .context("write index.ts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_write_program_lays_out_project_files() {
        let dir = tempdir().unwrap();
        let work_dir = dir.path().join("infra-abc123def0");

        write_program(&work_dir, "const x = 1;").await.unwrap();

        let manifest = std::fs::read_to_string(work_dir.join("Pulumi.yaml")).unwrap();
        assert!(manifest.contains("name: infra-abc123def0"));
        assert!(manifest.contains("runtime: nodejs"));
        assert_eq!(
            std::fs::read_to_string(work_dir.join("index.ts")).unwrap(),
            "const x = 1;"
        );
    }
}
