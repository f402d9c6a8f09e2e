//! Discovery of candidate images and their ground-truth artifacts.
//!
//! A result folder holds candidate images; the ground-truth folder holds an
//! image with the same file name for each of them and, for the external tool,
//! the weight files `<stem>_RWeights.dat` and `<stem>_PWeights.dat`.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{
    config::EvaluationMode,
    error::{BinEvalError, BinEvalResult},
};

/// Extensions recognized as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "tif", "tiff", "bmp"];

/// Stem marker of auxiliary visualization images that are never evaluated.
pub const PSEUDO_IMAGE_MARKER: &str = "pseudo";

pub const RECALL_WEIGHTS_SUFFIX: &str = "_RWeights.dat";
pub const PRECISION_WEIGHTS_SUFFIX: &str = "_PWeights.dat";

/// Weight maps of the pseudo recall and pseudo precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightArtifacts {
    pub recall: PathBuf,
    pub precision: PathBuf,
}

impl WeightArtifacts {
    /// Expected weight file paths for an image stem, whether or not they exist.
    #[must_use]
    pub fn paths_for(dir: &Path, stem: &str) -> Self {
        Self {
            recall: dir.join(format!("{stem}{RECALL_WEIGHTS_SUFFIX}")),
            precision: dir.join(format!("{stem}{PRECISION_WEIGHTS_SUFFIX}")),
        }
    }
}

/// A candidate image with everything needed to evaluate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePair {
    pub candidate: PathBuf,
    pub ground_truth: PathBuf,
    /// Present in [`EvaluationMode::ExternalTool`] runs.
    pub weights: Option<WeightArtifacts>,
}

impl ImagePair {
    /// File name of the candidate image.
    #[must_use]
    pub fn name(&self) -> String {
        file_name(&self.candidate)
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Whether `path` names an image that should be evaluated.
#[must_use]
pub fn is_candidate_image(path: &Path) -> bool {
    let has_image_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        });
    let is_pseudo = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.to_ascii_lowercase().contains(PSEUDO_IMAGE_MARKER));
    has_image_extension && !is_pseudo
}

/// Candidate images directly inside `folder`, sorted by file name.
///
/// # Errors
///
/// - [`BinEvalError::Io`] if the folder cannot be read.
/// - [`BinEvalError::EmptyInput`] if it contains no candidate image.
pub fn discover_images(folder: &Path) -> BinEvalResult<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| BinEvalError::Io {
            path: folder.to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && is_candidate_image(entry.path()) {
            images.push(entry.into_path());
        }
    }

    if images.is_empty() {
        return Err(BinEvalError::EmptyInput {
            path: folder.to_path_buf(),
        });
    }

    images.sort_by_key(|path| path.file_name().map(ToOwned::to_owned));
    Ok(images)
}

/// Immediate subdirectories of `parent`, sorted by name.
///
/// # Errors
///
/// - [`BinEvalError::Io`] if the folder cannot be read.
/// - [`BinEvalError::EmptyInput`] if it has no subdirectory.
pub fn discover_result_folders(parent: &Path) -> BinEvalResult<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for entry in WalkDir::new(parent).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| BinEvalError::Io {
            path: parent.to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_dir() {
            folders.push(entry.into_path());
        }
    }

    if folders.is_empty() {
        return Err(BinEvalError::EmptyInput {
            path: parent.to_path_buf(),
        });
    }
    Ok(folders)
}

/// Resolves the ground truth (and, for the external tool, the weight files)
/// of a candidate image.
///
/// # Errors
///
/// Returns [`BinEvalError::MissingArtifact`] for the first required file
/// that does not exist.
pub fn resolve_pair(
    candidate: &Path,
    ground_truth_dir: &Path,
    mode: &EvaluationMode,
) -> BinEvalResult<ImagePair> {
    let name = candidate.file_name().ok_or_else(|| BinEvalError::MissingArtifact {
        kind: "candidate file name",
        path: candidate.to_path_buf(),
    })?;
    let ground_truth = require(ground_truth_dir.join(name), "ground truth image")?;

    let weights = match mode {
        EvaluationMode::Local => None,
        EvaluationMode::ExternalTool => {
            let stem = candidate
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let expected = WeightArtifacts::paths_for(ground_truth_dir, &stem);
            Some(WeightArtifacts {
                recall: require(expected.recall, "recall weight file")?,
                precision: require(expected.precision, "precision weight file")?,
            })
        }
    };

    Ok(ImagePair {
        candidate: candidate.to_path_buf(),
        ground_truth,
        weights,
    })
}

fn require(path: PathBuf, kind: &'static str) -> BinEvalResult<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(BinEvalError::MissingArtifact { kind, path })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn recognizes_image_extensions_and_skips_pseudo_images() {
        assert!(is_candidate_image(Path::new("a/1.png")));
        assert!(is_candidate_image(Path::new("a/1.TIFF")));
        assert!(is_candidate_image(Path::new("a/1.tif")));
        assert!(!is_candidate_image(Path::new("a/1.jpg")));
        assert!(!is_candidate_image(Path::new("a/1_weights.dat")));
        assert!(!is_candidate_image(Path::new("a/1_Pseudo.png")));
    }

    #[test]
    fn discovery_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.tiff", "c_pseudo.png", "notes.txt"] {
            touch(dir.path(), name);
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let images = discover_images(dir.path()).unwrap();
        let names: Vec<_> = images.iter().map(|p| file_name(p)).collect();

        assert_eq!(names, ["a.tiff", "b.png"]);
    }

    #[test]
    fn empty_folder_is_an_empty_input_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "readme.txt");

        assert!(matches!(
            discover_images(dir.path()),
            Err(BinEvalError::EmptyInput { .. })
        ));
    }

    #[test]
    fn result_folders_are_sorted_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("otsu")).unwrap();
        fs::create_dir(dir.path().join("ace")).unwrap();
        touch(dir.path(), "summary.csv");

        let folders = discover_result_folders(dir.path()).unwrap();
        let names: Vec<_> = folders.iter().map(|p| file_name(p)).collect();

        assert_eq!(names, ["ace", "otsu"]);
    }

    #[test]
    fn external_mode_requires_weight_files() {
        let gt = tempfile::tempdir().unwrap();
        touch(gt.path(), "1.png");
        touch(gt.path(), "1_RWeights.dat");
        let candidate = Path::new("results/1.png");

        assert!(resolve_pair(candidate, gt.path(), &EvaluationMode::Local).is_ok());
        match resolve_pair(candidate, gt.path(), &EvaluationMode::ExternalTool) {
            Err(BinEvalError::MissingArtifact { kind, path }) => {
                assert_eq!(kind, "precision weight file");
                assert!(path.ends_with("1_PWeights.dat"));
            }
            other => panic!("Expected MissingArtifact error, got {other:?}"),
        }

        touch(gt.path(), "1_PWeights.dat");
        let pair = resolve_pair(candidate, gt.path(), &EvaluationMode::ExternalTool).unwrap();
        assert_eq!(pair.weights.unwrap().recall, gt.path().join("1_RWeights.dat"));
    }

    #[test]
    fn missing_ground_truth_is_reported_with_its_path() {
        let gt = tempfile::tempdir().unwrap();

        match resolve_pair(Path::new("r/7.png"), gt.path(), &EvaluationMode::Local) {
            Err(BinEvalError::MissingArtifact { path, .. }) => {
                assert_eq!(path, gt.path().join("7.png"));
            }
            other => panic!("Expected MissingArtifact error, got {other:?}"),
        }
    }
}
