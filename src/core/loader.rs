//! Catalog and job loading
//!
//! Reads cabinet types, rate and hardware catalogs and job files from a
//! project. Parse failures are reported as [`YamlSyntaxError`] diagnostics
//! pointing at the offending line.

use miette::Diagnostic;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::estimate::Catalog;
use crate::core::project::Project;
use crate::entities::cabinet::CabinetType;
use crate::entities::hardware::HardwareCatalog;
use crate::entities::job::Job;
use crate::entities::rates::RateCatalog;
use crate::yaml::YamlSyntaxError;

/// Errors from loading catalog or job files
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("failed to read {path:?}: {message}")]
    #[diagnostic(code(cabest::catalog::io))]
    Io { path: PathBuf, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlSyntaxError),

    #[error("cabinet type '{id}' is defined in both {first:?} and {second:?}")]
    #[diagnostic(
        code(cabest::catalog::duplicate),
        help("cabinet ids must be unique across cabinets/")
    )]
    DuplicateCabinet {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Deserialize one YAML file
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_yml::from_str(&content).map_err(|e| {
        YamlSyntaxError::from_serde_error(&e, &content, &path.display().to_string()).into()
    })
}

/// Deserialize a YAML file, or return the default when it does not exist
fn load_optional<T: DeserializeOwned + Default>(path: &Path) -> Result<T, CatalogError> {
    if path.exists() {
        load_yaml(path)
    } else {
        log::warn!("{} not found, using built-in defaults", path.display());
        Ok(T::default())
    }
}

/// Load every cabinet type in the project, keyed by id
pub fn load_cabinets(project: &Project) -> Result<BTreeMap<String, CabinetType>, CatalogError> {
    let mut cabinets = BTreeMap::new();
    let mut sources: BTreeMap<String, PathBuf> = BTreeMap::new();

    for path in project.iter_cabinet_files() {
        let cabinet: CabinetType = load_yaml(&path)?;
        if let Some(first) = sources.get(&cabinet.id) {
            return Err(CatalogError::DuplicateCabinet {
                id: cabinet.id,
                first: first.clone(),
                second: path,
            });
        }
        log::debug!("Loaded cabinet '{}' from {}", cabinet.id, path.display());
        sources.insert(cabinet.id.clone(), path);
        cabinets.insert(cabinet.id.clone(), cabinet);
    }

    Ok(cabinets)
}

/// Load the full catalog of a project
pub fn load_catalog(project: &Project) -> Result<Catalog, CatalogError> {
    let cabinets = load_cabinets(project)?;
    let rates: RateCatalog = load_optional(&project.rates_path())?;
    let hardware: HardwareCatalog = load_optional(&project.hardware_path())?;

    Ok(Catalog {
        cabinets,
        rates,
        hardware,
    })
}

/// Load a job file
pub fn load_job(path: &Path) -> Result<Job, CatalogError> {
    load_yaml(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_sample_catalog() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let catalog = load_catalog(&project).unwrap();
        assert!(catalog.cabinet("base-600").is_some());
        assert!(catalog.cabinet("wall-600").is_some());
        assert_eq!(catalog.rates.materials.get("HMR"), Some(&45.0));
        assert_eq!(catalog.hardware.default_brand.as_deref(), Some("Hettich"));

        let job = load_job(&project.jobs_dir().join("sample.yaml")).unwrap();
        assert_eq!(job.lines.len(), 2);
    }

    #[test]
    fn test_missing_catalog_files_use_defaults() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        fs::remove_file(project.rates_path()).unwrap();
        fs::remove_file(project.hardware_path()).unwrap();

        let catalog = load_catalog(&project).unwrap();
        assert!(catalog.rates.materials.is_empty());
        assert!(catalog.hardware.brands.is_empty());
    }

    #[test]
    fn test_duplicate_cabinet_id() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        fs::copy(
            project.cabinets_dir().join("base-600.yaml"),
            project.cabinets_dir().join("zz-copy.yaml"),
        )
        .unwrap();

        let err = load_catalog(&project).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCabinet { ref id, .. } if id == "base-600"));
    }

    #[test]
    fn test_yaml_error_is_a_diagnostic() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("job.yaml");
        fs::write(&path, "name: Broken\nlines:\n  - quantity: 2\n").unwrap();

        let err = load_job(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Yaml(_)));
        assert!(err.to_string().contains("cabinet"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_job(Path::new("/nonexistent/job.yaml")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
