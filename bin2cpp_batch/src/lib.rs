//! Generate a C++ header for every shader file in a folder.
//!
//! A file like `src/graphics/shaders/glsl/basic.glsl` generates
//! `src/graphics/shaders/basic.hpp` declaring `graphics::shader::basic`.
//! Run this before building so the C++ code can include the shaders
//! without reading files at runtime.
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use bin2cpp::{
    encode,
    error::{EncodeFileError, NameError},
    name::is_reserved_word,
    read_source, EncodeOptions, Provenance, QualifiedName,
};
use log::{debug, info, warn};
use rayon::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedFileError {
    #[error("{path:?} has no file name")]
    MissingFileName { path: PathBuf },

    #[error("{path:?} has no parent folder for the generated header")]
    MissingTargetFolder { path: PathBuf },

    #[error("error creating array name: {0}")]
    Name(#[from] NameError),

    #[error("{0}")]
    Read(#[from] EncodeFileError),

    #[error("error writing {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error removing outdated {path:?}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{target:?} would be generated from multiple files {sources:?}")]
    TargetCollision {
        target: PathBuf,
        sources: Vec<PathBuf>,
    },

    #[error("error walking input folder: {0}")]
    Walk(#[from] globwalk::WalkError),
}

#[derive(Debug, Error)]
pub enum EmbedFilesError {
    #[error("invalid namespace: {0}")]
    Namespace(#[from] NameError),

    #[error("invalid glob patterns: {0}")]
    Glob(#[from] globwalk::GlobError),
}

#[derive(Debug, Clone)]
pub struct EmbedOptions {
    /// The namespaces for each array like `graphics::shader`.
    /// Arrays are declared in the global namespace if empty.
    pub namespace: String,
    /// The extension for generated headers without the leading `.`.
    pub extension: String,
    /// Also embed matching files in subfolders of the input folder.
    pub recursive: bool,
    /// Write headers even if the existing contents are identical.
    pub force: bool,
    pub encode: EncodeOptions,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            namespace: "graphics::shader".to_string(),
            extension: "hpp".to_string(),
            recursive: false,
            force: false,
            encode: EncodeOptions::default(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EmbedOutcome {
    Written,
    /// The existing header already had the generated contents.
    Unchanged,
    /// No header was written since the source file contains no bytes.
    /// Any existing header for the file is removed.
    SkippedEmpty,
}

#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub result: Result<EmbedOutcome, EmbedFileError>,
}

/// The result for each file sorted by source path.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &EmbedFileError)> {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().err().map(|e| (f.source.as_path(), e)))
    }

    pub fn count(&self, outcome: EmbedOutcome) -> usize {
        self.files
            .iter()
            .filter(|f| f.result.as_ref().is_ok_and(|o| *o == outcome))
            .count()
    }
}

/// Embed all files in `input_folder` matching any of the glob `patterns`.
///
/// Files are independent, so a failing file does not stop the remaining files.
/// Files that would generate the same header all fail without writing anything.
/// Check [BatchReport::failures] for any errors.
pub fn embed_files<P: AsRef<Path>, S: AsRef<str>>(
    input_folder: P,
    patterns: &[S],
    options: &EmbedOptions,
) -> Result<BatchReport, EmbedFilesError> {
    let input_folder = input_folder.as_ref();

    // Check the namespace once instead of failing every file.
    if !options.namespace.is_empty() {
        QualifiedName::parse(&options.namespace)?;
    }

    let mut builder = globwalk::GlobWalkerBuilder::from_patterns(input_folder, patterns)
        .file_type(globwalk::FileType::FILE);
    if !options.recursive {
        builder = builder.max_depth(1);
    }

    // Find all files first to check for sources sharing a header.
    let mut files = Vec::new();
    let mut sources = Vec::new();
    for entry in builder.build()? {
        match entry {
            Ok(entry) => sources.push(entry.path().to_owned()),
            Err(e) => files.push(FileReport {
                source: e.path().unwrap_or(input_folder).to_owned(),
                result: Err(e.into()),
            }),
        }
    }

    let mut sources_by_target: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for source in &sources {
        if let Ok(target) = target_path(source, &options.extension) {
            sources_by_target
                .entry(target)
                .or_default()
                .push(source.clone());
        }
    }
    for group in sources_by_target.values_mut() {
        group.sort();
    }

    files.par_extend(sources.into_par_iter().map(|source| {
        let shared_target = target_path(&source, &options.extension)
            .ok()
            .and_then(|target| sources_by_target.get_key_value(&target))
            .filter(|(_, group)| group.len() > 1);

        let result = match shared_target {
            Some((target, group)) => Err(EmbedFileError::TargetCollision {
                target: target.clone(),
                sources: group.clone(),
            }),
            None => embed_file(&source, options),
        };
        FileReport { source, result }
    }));

    if files.is_empty() {
        warn!("No files in {input_folder:?} matched the patterns");
    }

    files.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(BatchReport { files })
}

/// Generate the header for `source` next to its parent folder.
pub fn embed_file(source: &Path, options: &EmbedOptions) -> Result<EmbedOutcome, EmbedFileError> {
    let target = target_path(source, &options.extension)?;
    let name = qualified_name(&options.namespace, &identifier_from_path(source)?)?;

    let bytes = read_source(source)?;
    let provenance = Provenance::source(source);
    let Some(text) = encode(&bytes, &name, &provenance, options.encode) else {
        warn!("Skipped {source:?} since it contains no bytes");
        // A header from a previous run would still embed the old bytes.
        remove_outdated_header(&target)?;
        return Ok(EmbedOutcome::SkippedEmpty);
    };

    // Rewriting identical headers would still trigger a rebuild.
    if !options.force && std::fs::read(&target).is_ok_and(|existing| existing == text.as_bytes())
    {
        debug!("{target:?} is up to date");
        return Ok(EmbedOutcome::Unchanged);
    }

    std::fs::write(&target, text).map_err(|e| EmbedFileError::Write {
        path: target.clone(),
        source: e,
    })?;
    info!("Wrote {name} to {target:?}");
    Ok(EmbedOutcome::Written)
}

fn remove_outdated_header(target: &Path) -> Result<(), EmbedFileError> {
    match std::fs::remove_file(target) {
        Ok(()) => {
            warn!("Removed {target:?} since its source is now empty");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(EmbedFileError::Remove {
            path: target.to_owned(),
            source: e,
        }),
    }
}

/// The header path one folder above `source` like
/// `shaders/glsl/basic.glsl` -> `shaders/basic.hpp`.
pub fn target_path(source: &Path, extension: &str) -> Result<PathBuf, EmbedFileError> {
    let stem = source
        .file_stem()
        .ok_or_else(|| EmbedFileError::MissingFileName {
            path: source.to_owned(),
        })?;
    let folder = source
        .parent()
        .and_then(Path::parent)
        .ok_or_else(|| EmbedFileError::MissingTargetFolder {
            path: source.to_owned(),
        })?;

    // Only strip the last extension so "a.b.glsl" becomes "a.b.hpp".
    let mut file_name = stem.to_owned();
    file_name.push(".");
    file_name.push(extension);
    Ok(folder.join(file_name))
}

/// The file name without its extension as a valid C++ identifier.
/// Keywords like `class` get a trailing `_`.
pub fn identifier_from_path(source: &Path) -> Result<String, EmbedFileError> {
    let stem = source
        .file_stem()
        .ok_or_else(|| EmbedFileError::MissingFileName {
            path: source.to_owned(),
        })?;

    let mut identifier: String = stem
        .to_string_lossy()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }
    if is_reserved_word(&identifier) {
        identifier.push('_');
    }
    Ok(identifier)
}

pub fn qualified_name(namespace: &str, identifier: &str) -> Result<QualifiedName, NameError> {
    if namespace.is_empty() {
        QualifiedName::parse(identifier)
    } else {
        QualifiedName::parse(&format!("{namespace}::{identifier}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_path_parent_folder() {
        assert_eq!(
            Path::new("src/graphics/shaders/basic.hpp"),
            target_path(Path::new("src/graphics/shaders/glsl/basic.glsl"), "hpp").unwrap()
        );
    }

    #[test]
    fn target_path_multiple_extensions() {
        assert_eq!(
            Path::new("shaders/basic.vert.h"),
            target_path(Path::new("shaders/glsl/basic.vert.glsl"), "h").unwrap()
        );
    }

    #[test]
    fn target_path_relative_folder() {
        assert_eq!(
            Path::new("basic.hpp"),
            target_path(Path::new("glsl/basic.glsl"), "hpp").unwrap()
        );
    }

    #[test]
    fn target_path_no_parent_folder() {
        assert!(matches!(
            target_path(Path::new("basic.glsl"), "hpp"),
            Err(EmbedFileError::MissingTargetFolder { .. })
        ));
    }

    #[test]
    fn identifier_from_path_valid_name() {
        assert_eq!(
            "basic",
            identifier_from_path(Path::new("glsl/basic.glsl")).unwrap()
        );
    }

    #[test]
    fn identifier_from_path_invalid_characters() {
        assert_eq!(
            "basic_light_v2",
            identifier_from_path(Path::new("glsl/basic-light v2.glsl")).unwrap()
        );
        assert_eq!(
            "_2d_sprite",
            identifier_from_path(Path::new("glsl/2d_sprite.glsl")).unwrap()
        );
    }

    #[test]
    fn identifier_from_path_reserved_words() {
        assert_eq!(
            "class_",
            identifier_from_path(Path::new("glsl/class.glsl")).unwrap()
        );
        assert_eq!(
            "default_",
            identifier_from_path(Path::new("glsl/default.frag")).unwrap()
        );
        assert_eq!(
            "classic",
            identifier_from_path(Path::new("glsl/classic.glsl")).unwrap()
        );
        assert!(qualified_name("graphics::shader", "class_").is_ok());
    }

    #[test]
    fn qualified_name_with_namespace() {
        let name = qualified_name("graphics::shader", "basic").unwrap();
        assert_eq!("graphics::shader::basic", name.to_string());
    }

    #[test]
    fn qualified_name_global_namespace() {
        let name = qualified_name("", "basic").unwrap();
        assert!(name.scopes().is_empty());
        assert_eq!("basic", name.identifier());
    }
}
