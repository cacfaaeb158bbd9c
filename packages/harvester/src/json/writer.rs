//! JSON writer for the broadcast list.
//!
//! The list is written as one compact JSON array of broadcast objects, in
//! the order the catalog listed them.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::Filmliste;

/// Generate the JSON text for a broadcast list.
pub fn generate_json(liste: &Filmliste) -> Result<String> {
    Ok(serde_json::to_string(liste.broadcasts())?)
}

/// Serialize a broadcast list into any writer.
pub fn write_json<W: Write>(liste: &Filmliste, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, liste.broadcasts())?;
    writer.flush()?;
    Ok(())
}

/// Save a broadcast list as a JSON file.
///
/// Uses atomic write pattern: writes to temp file, syncs to disk, then renames.
/// A crash mid-write leaves any previous output intact.
///
/// # Arguments
/// * `liste` - The broadcasts to save
/// * `output` - Target file; missing parent directories are created
///
/// # Returns
/// Path to the saved file
pub fn save_json(liste: &Filmliste, output: &Path) -> Result<PathBuf> {
    let output_dir = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&output_dir)?;

    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::config::DEFAULT_OUTPUT_FILE.to_string());
    let output_file = output_dir.join(&file_name);
    let temp_file = output_dir.join(format!(".{file_name}.tmp"));

    {
        let file = File::create(&temp_file)?;
        write_json(liste, &file)?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if output_file.exists() {
        fs::remove_file(&output_file)?;
    }

    fs::rename(&temp_file, &output_file)?;
    tracing::debug!(path = %output_file.display(), count = liste.len(), "Saved broadcast list");

    Ok(output_file)
}
