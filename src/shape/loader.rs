//! Shape loader and in-memory registry
//!
//! - Shapes stored at `<dir>/shapes/<name>.json`
//! - One file per named shape; the file stem must equal the shape name
//! - Names are plain file stems: no separators, no `..`
//! - Malformed files abort loading (FATAL)
//! - Registered names are immutable

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{ShapeError, ShapeResult};
use super::types::{NamedShape, ShapeDescriptor};
use crate::observability::{log_event, log_event_with_fields, Event, Logger};

/// Reads shape files from disk and keeps them by name.
pub struct ShapeLoader {
    /// Directory containing shape files
    shape_dir: PathBuf,
    /// Loaded shapes indexed by name
    shapes: BTreeMap<String, NamedShape>,
}

impl ShapeLoader {
    /// Creates a loader for `<base_dir>/shapes/`.
    pub fn new(base_dir: &Path) -> Self {
        Self {
            shape_dir: base_dir.join("shapes"),
            shapes: BTreeMap::new(),
        }
    }

    pub fn shape_dir(&self) -> &Path {
        &self.shape_dir
    }

    /// Loads every `*.json` file from the shape directory.
    ///
    /// On success the registry is replaced with the directory contents, so
    /// calling this again reloads. On failure the registry is left as it
    /// was. A missing directory is created and yields no shapes.
    pub fn load_all(&mut self) -> ShapeResult<()> {
        if !self.shape_dir.exists() {
            fs::create_dir_all(&self.shape_dir).map_err(|e| {
                ShapeError::malformed_shape(
                    self.shape_dir.display().to_string(),
                    format!("Failed to create shape directory: {}", e),
                )
            })?;
            log_event(Event::ShapeDirCreated);
            self.shapes.clear();
            self.log_loaded();
            return Ok(());
        }

        let entries = fs::read_dir(&self.shape_dir).map_err(|e| {
            ShapeError::malformed_shape(
                self.shape_dir.display().to_string(),
                format!("Failed to read shape directory: {}", e),
            )
        })?;

        // Sorted so that a bad directory fails on the same file every time
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                ShapeError::malformed_shape(
                    self.shape_dir.display().to_string(),
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = BTreeMap::new();
        for path in paths {
            let result = load_shape_file(&path).and_then(|named| insert_new(&mut loaded, named));
            if let Err(e) = result {
                let path_str = path.display().to_string();
                let error = e.to_string();
                log_event_with_fields(
                    Event::ShapeLoadFailed,
                    &[("error", error.as_str()), ("path", path_str.as_str())],
                );
                return Err(e);
            }
        }

        self.shapes = loaded;
        self.log_loaded();
        Ok(())
    }

    fn log_loaded(&self) {
        let count = self.shapes.len().to_string();
        let dir = self.shape_dir.display().to_string();
        log_event_with_fields(
            Event::ShapesLoaded,
            &[("count", count.as_str()), ("dir", dir.as_str())],
        );
    }

    /// Registers a shape directly.
    pub fn register(&mut self, named: NamedShape) -> ShapeResult<()> {
        validate_name(&named.name)?;
        let name = named.name.clone();
        insert_new(&mut self.shapes, named)?;
        log_event_with_fields(Event::ShapeRegistered, &[("name", name.as_str())]);
        Ok(())
    }

    /// Gets a shape's fields by name.
    pub fn get(&self, name: &str) -> Option<&ShapeDescriptor> {
        self.shapes.get(name).map(|n| &n.fields)
    }

    /// Gets the full named entry, description included.
    pub fn get_named(&self, name: &str) -> Option<&NamedShape> {
        self.shapes.get(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    /// Returns all loaded shapes, sorted by name.
    pub fn all_shapes(&self) -> impl Iterator<Item = &NamedShape> {
        self.shapes.values()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Writes a shape to `<name>.json`. Existing files are never replaced.
    pub fn save_shape(&self, named: &NamedShape) -> ShapeResult<PathBuf> {
        validate_name(&named.name)?;
        let path = self.shape_dir.join(format!("{}.json", named.name));

        if path.exists() {
            return Err(ShapeError::shape_exists(&named.name));
        }

        if !self.shape_dir.exists() {
            fs::create_dir_all(&self.shape_dir).map_err(|e| {
                ShapeError::malformed_shape(
                    self.shape_dir.display().to_string(),
                    format!("Failed to create shape directory: {}", e),
                )
            })?;
        }

        let content = serde_json::to_string_pretty(named).map_err(|e| {
            ShapeError::malformed_shape(path.display().to_string(), format!("Failed to serialize shape: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            ShapeError::malformed_shape(path.display().to_string(), format!("Failed to write file: {}", e))
        })?;

        let path_str = path.display().to_string();
        log_event_with_fields(
            Event::ShapeSaved,
            &[("name", named.name.as_str()), ("path", path_str.as_str())],
        );
        Ok(path)
    }
}

/// Parses one shape file and checks its name against the file stem.
fn load_shape_file(path: &Path) -> ShapeResult<NamedShape> {
    let content = fs::read_to_string(path).map_err(|e| {
        ShapeError::malformed_shape(path.display().to_string(), format!("Failed to read file: {}", e))
    })?;

    let named: NamedShape = serde_json::from_str(&content).map_err(|e| {
        ShapeError::malformed_shape(path.display().to_string(), format!("Invalid JSON: {}", e))
    })?;

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    if stem != named.name {
        return Err(ShapeError::malformed_shape(
            path.display().to_string(),
            format!("shape name '{}' does not match file name '{}.json'", named.name, stem),
        ));
    }
    validate_name(&named.name)
        .map_err(|e| ShapeError::malformed_shape(path.display().to_string(), e.to_string()))?;

    let path_str = path.display().to_string();
    Logger::trace(
        Event::ShapeLoaded.as_str(),
        &[("name", named.name.as_str()), ("path", path_str.as_str())],
    );
    Ok(named)
}

fn insert_new(shapes: &mut BTreeMap<String, NamedShape>, named: NamedShape) -> ShapeResult<()> {
    if shapes.contains_key(&named.name) {
        return Err(ShapeError::shape_exists(&named.name));
    }
    shapes.insert(named.name.clone(), named);
    Ok(())
}

/// Checks that a shape name is usable as a file stem inside the shape
/// directory.
fn validate_name(name: &str) -> ShapeResult<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains(['/', '\\']) {
        "name contains a path separator"
    } else if name.contains("..") {
        "name contains '..'"
    } else if name.contains('\0') {
        "name contains a NUL byte"
    } else {
        return Ok(());
    };
    Err(ShapeError::invalid_name(name, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::errors::ShapeErrorCode;
    use crate::shape::types::{FieldDescriptor, TypeTag};
    use tempfile::TempDir;

    fn sample_shape() -> NamedShape {
        let fields = ShapeDescriptor::new(vec![
            FieldDescriptor::required("name", TypeTag::String),
            FieldDescriptor::optional("age", TypeTag::Number),
        ])
        .unwrap();
        NamedShape::new("person", fields).with_description("A person")
    }

    #[test]
    fn test_register_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ShapeLoader::new(temp_dir.path());

        loader.register(sample_shape()).unwrap();

        let shape = loader.get("person").unwrap();
        assert_eq!(shape.len(), 2);
        assert_eq!(
            loader.get_named("person").unwrap().description.as_deref(),
            Some("A person")
        );
    }

    #[test]
    fn test_register_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ShapeLoader::new(temp_dir.path());

        loader.register(sample_shape()).unwrap();

        let result = loader.register(sample_shape());
        assert_eq!(result.unwrap_err().code(), ShapeErrorCode::ShapeExists);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ShapeLoader::new(temp_dir.path());

        let path = loader.save_shape(&sample_shape()).unwrap();
        assert!(path.ends_with("shapes/person.json"));

        let mut reloaded = ShapeLoader::new(temp_dir.path());
        reloaded.load_all().unwrap();

        assert!(reloaded.exists("person"));
        assert_eq!(reloaded.get_named("person"), Some(&sample_shape()));
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ShapeLoader::new(temp_dir.path());

        loader.save_shape(&sample_shape()).unwrap();
        let err = loader.save_shape(&sample_shape()).unwrap_err();
        assert_eq!(err, ShapeError::shape_exists("person"));
    }

    #[test]
    fn test_load_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ShapeLoader::new(temp_dir.path());

        loader.load_all().unwrap();
        assert_eq!(loader.shape_count(), 0);
        assert!(loader.shape_dir().exists());
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ShapeLoader::new(temp_dir.path());
        fs::create_dir_all(loader.shape_dir()).unwrap();
        fs::write(loader.shape_dir().join("broken.json"), "{ not json").unwrap();

        let err = loader.load_all().unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_load_all_twice_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ShapeLoader::new(temp_dir.path());
        loader.save_shape(&sample_shape()).unwrap();

        loader.load_all().unwrap();
        loader.load_all().unwrap();
        assert_eq!(loader.shape_count(), 1);
        assert!(loader.exists("person"));
    }

    #[test]
    fn test_failed_load_keeps_registry_and_can_retry() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ShapeLoader::new(temp_dir.path());
        loader.save_shape(&sample_shape()).unwrap();
        loader.load_all().unwrap();

        // "broken" sorts before "person", so it fails mid-directory
        let broken = loader.shape_dir().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(loader.load_all().is_err());
        assert_eq!(loader.shape_count(), 1);

        fs::remove_file(&broken).unwrap();
        loader.load_all().unwrap();
        assert_eq!(loader.shape_count(), 1);
    }

    #[test]
    fn test_reload_drops_removed_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ShapeLoader::new(temp_dir.path());
        let path = loader.save_shape(&sample_shape()).unwrap();
        loader.load_all().unwrap();

        fs::remove_file(path).unwrap();
        loader.load_all().unwrap();
        assert!(!loader.exists("person"));
    }

    #[test]
    fn test_path_like_names_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ShapeLoader::new(temp_dir.path());

        for name in ["", "../escaped", "a/b", "a\\b", ".."] {
            let named = NamedShape::new(name, ShapeDescriptor::empty());

            let err = loader.save_shape(&named).unwrap_err();
            assert_eq!(err.code(), ShapeErrorCode::InvalidName);
            assert!(!err.is_fatal());

            let err = loader.register(named).unwrap_err();
            assert_eq!(err.code(), ShapeErrorCode::InvalidName);
        }

        assert!(!temp_dir.path().join("escaped.json").exists());
        assert_eq!(loader.shape_count(), 0);
    }

    #[test]
    fn test_file_stem_must_match_name() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ShapeLoader::new(temp_dir.path());
        fs::create_dir_all(loader.shape_dir()).unwrap();
        fs::write(
            loader.shape_dir().join("other.json"),
            r#"{ "name": "person", "fields": [] }"#,
        )
        .unwrap();

        let err = loader.load_all().unwrap_err();
        assert_eq!(err.code(), ShapeErrorCode::MalformedShape);
        assert!(err.to_string().contains("does not match"));

        // The mismatched file does not block saving the real one
        loader.save_shape(&sample_shape()).unwrap();
    }

    #[test]
    fn test_non_json_files_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = ShapeLoader::new(temp_dir.path());
        fs::create_dir_all(loader.shape_dir()).unwrap();
        fs::write(loader.shape_dir().join("README.txt"), "notes").unwrap();

        loader.load_all().unwrap();
        assert_eq!(loader.shape_count(), 0);
    }
}
