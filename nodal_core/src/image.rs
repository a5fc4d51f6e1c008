//! On-disk images of [`MemoryEngine`] files.
//!
//! An image is a JSON document holding one file's object arena:
//!
//! ```json
//! { "version": 1, "name": "data.h5", "file": { "root": 0, ... } }
//! ```
//!
//! Images are written atomically through a temporary file in the target
//! directory.

use crate::error::{Error, Result};
use crate::memory::{FileImage, MemoryEngine, NodeBody, data_size};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Image format version written by this crate.
pub const IMAGE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ImageDocument {
    version: u32,
    name: String,
    file: FileImage,
}

impl MemoryEngine {
    /// Write the file `name` to `path` as a JSON image.
    pub fn save_image(&self, name: &str, path: &Path) -> Result<()> {
        let document = {
            let state = self.lock();
            let file = state
                .files
                .get(name)
                .ok_or_else(|| Error::resource(format!("No file named '{}' to save", name)))?;
            ImageDocument {
                version: IMAGE_VERSION,
                name: name.to_string(),
                file: file.clone(),
            }
        };
        let encoded = serde_json::to_vec_pretty(&document)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(dir)?;
        temp_file.write_all(&encoded)?;
        temp_file.flush()?;
        temp_file.persist(path)?;

        debug!(file = %name, path = %path.display(), "saved image");
        Ok(())
    }

    /// Load a JSON image, replacing any file of the same name.
    ///
    /// Returns the name of the loaded file. Fails if the file is currently
    /// open, since existing handles would point into the replaced arena.
    pub fn load_image(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path)?;
        let document: ImageDocument = serde_json::from_str(&content)?;
        if document.version != IMAGE_VERSION {
            return Err(Error::image(
                path,
                format!(
                    "Unsupported version {} (expected {})",
                    document.version, IMAGE_VERSION
                ),
            ));
        }
        check_arena(path, &document.file)?;

        let mut state = self.lock();
        if state.file_in_use(&document.name) {
            return Err(Error::resource(format!(
                "File '{}' is open and cannot be replaced",
                document.name
            )));
        }
        debug!(file = %document.name, path = %path.display(), "loaded image");
        state.files.insert(document.name.clone(), document.file);
        Ok(document.name)
    }
}

fn check_arena(path: &Path, file: &FileImage) -> Result<()> {
    match file.objects.get(&file.root).map(|o| &o.body) {
        Some(NodeBody::Group(_)) => {}
        Some(_) => return Err(Error::image(path, "Root object is not a group")),
        None => return Err(Error::image(path, "Root object is missing")),
    }
    if let Some((&last, _)) = file.objects.last_key_value()
        && last >= file.next_addr
    {
        return Err(Error::image(
            path,
            format!("Object address {} is beyond next_addr {}", last, file.next_addr),
        ));
    }
    for (addr, object) in &file.objects {
        let mut buffers: Vec<_> = object
            .attributes
            .values()
            .map(|a| (&a.dims, &a.dtype, a.data.len()))
            .collect();
        if let NodeBody::Dataset(dataset) = &object.body {
            buffers.push((&dataset.dims, &dataset.dtype, dataset.data.len()));
        }
        for (dims, dtype, len) in buffers {
            if data_size(dims, dtype).ok() != Some(len) {
                return Err(Error::image(
                    path,
                    format!("Object {} holds {} bytes for dataspace {:?}", addr, len, dims),
                ));
            }
        }
    }
    Ok(())
}
