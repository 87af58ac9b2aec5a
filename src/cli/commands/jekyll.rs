//! Jekyll command implementation

use super::load_schema;
use crate::cli::error::CliError;
use crate::export::{DocgenConfig, SiteWriter};
use crate::storage::filesystem::FileSystemStorageBackend;
use std::path::Path;

/// Handle the jekyll command: write a documentation site for `schema_path`
/// into `output_dir`, optionally with an embeddable ERD
pub async fn handle_jekyll(
    schema_path: &Path,
    output_dir: &Path,
    erd: bool,
    config: DocgenConfig,
) -> Result<(), CliError> {
    println!(
        "Generating Jekyll documentation for {} and writing to {}",
        schema_path.display(),
        output_dir.display()
    );

    let schema = load_schema(schema_path)?;
    let writer = SiteWriter::with_config(FileSystemStorageBackend::new(output_dir), config);

    writer.copy_default_templates().await?;
    writer.write_all_collections(&schema).await?;
    writer.write_all_data(&schema).await?;

    if erd {
        let path = writer.write_erd_include(&schema).await?;
        println!("Generated ERD diagram in {}", output_dir.join(path).display());
        println!(
            "  To include the ERD diagram in your Jekyll site, set 'erd_include: true' in _config.yml"
        );
    }

    println!("✅ Documentation written to {}", output_dir.display());
    Ok(())
}
