use bon::Builder;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    env, fmt, fs,
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, Result},
    paths, Stage,
};

/// Headers that must never reach the system include block of a portable build.
pub const DEFAULT_BLACKLIST: &[&str] = &[
    "Windows.h",
    "cublas_v2.h",
    "cuda/tensor_gpu-inl.cuh",
    "cuda_runtime.h",
    "cudnn.h",
    "cudnn_lrn-inl.h",
    "curand.h",
    "glog/logging.h",
    "io/azure_filesys.h",
    "io/hdfs_filesys.h",
    "io/s3_filesys.h",
    "kvstore_dist.h",
    "mach/clock.h",
    "mach/mach.h",
    "malloc.h",
    "mkl.h",
    "mkl_cblas.h",
    "mkl_vsl.h",
    "mkl_vsl_functions.h",
    "nvml.h",
    "opencv2/opencv.hpp",
    "sys/stat.h",
    "sys/types.h",
    "cuda.h",
    "cuda_fp16.h",
    "omp.h",
];

pub const DEFAULT_SUPPRESSED_SUBSTRINGS: &[&str] = &["mkl", "nnpack"];

/// Generic expression header that is inlined once per instantiation site.
pub const DEFAULT_MULTI_INCLUDE: &[&str] = &["mshadow/mshadow/expr_scalar-inl.h"];

pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Moves every file found under `from` to `to/<file name>`. Both sides are
/// relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

impl PathRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Applies the rewrite to a project-root relative path.
    pub fn apply(&self, rel: &Path) -> Option<PathBuf> {
        let rest = rel.strip_prefix(&self.from).ok()?;
        if rest.as_os_str().is_empty() {
            return None;
        }
        let name = rel.file_name()?;
        Some(Path::new(&self.to).join(name))
    }
}

fn default_rewrites() -> Vec<PathRewrite> {
    vec![PathRewrite::new("nnvm/include/dmlc", "dmlc-core/include/dmlc")]
}

fn default_working_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_blacklist() -> BTreeSet<String> {
    DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect()
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Builder)]
pub struct Config {
    /// Defaults to the parent of `working_dir`.
    pub project_root: Option<PathBuf>,

    #[builder(default = default_working_dir())]
    pub working_dir: PathBuf,

    #[builder(default = default_blacklist())]
    pub blacklist: BTreeSet<String>,

    #[builder(default = owned(DEFAULT_SUPPRESSED_SUBSTRINGS))]
    pub suppressed_substrings: Vec<String>,

    #[builder(default = owned(DEFAULT_MULTI_INCLUDE))]
    pub multi_include: Vec<String>,

    #[builder(default = default_rewrites())]
    pub rewrites: Vec<PathRewrite>,

    #[builder(default = "cc".to_string())]
    pub implementation_extension: String,

    #[builder(default = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    #[builder(default)]
    pub minimum: bool,

    #[builder(default)]
    pub android: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config::builder().build()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ project_root: {:?}, working_dir: {}, blacklist: [{} names], suppressed_substrings: {:?}, multi_include: {:?}, rewrites: {}, implementation_extension: {}, max_depth: {}, minimum: {}, android: {} }}",
            self.project_root,
            self.working_dir.display(),
            self.blacklist.len(),
            self.suppressed_substrings,
            self.multi_include,
            self.rewrites.len(),
            self.implementation_extension,
            self.max_depth,
            self.minimum,
            self.android,
        )
    }
}

/// Absolute, normalised directories every other component works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub working_dir: PathBuf,
    pub project_root: PathBuf,
}

impl Layout {
    /// Working-directory relative form of a project-root relative path.
    pub fn candidate_for(&self, root_rel: &Path) -> String {
        let abs = self.project_root.join(root_rel);
        paths::to_slash(&paths::relative_to(&abs, &self.working_dir))
    }

    /// Prefix every implementation file of `stage` must start with.
    pub fn stage_prefix(&self, stage: Stage) -> String {
        self.candidate_for(Path::new(stage.dir_name()))
    }

    /// Normalises a path given on the command line to its index identity.
    pub fn identity_of(&self, path: &Path) -> String {
        let abs = paths::normalize(&self.working_dir.join(path));
        paths::to_slash(&paths::relative_to(&abs, &self.working_dir))
    }

    pub fn open_path(&self, candidate: &str) -> PathBuf {
        paths::normalize(&self.working_dir.join(candidate))
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.implementation_extension.trim_start_matches('.').is_empty() {
            return Err(Error::InvalidConfig(
                "implementation_extension must not be empty".to_string(),
            ));
        }

        if self.max_depth == 0 {
            return Err(Error::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }

        if self.android && !self.minimum {
            log::warn!("android mode has no effect without minimum mode");
        }

        Ok(())
    }

    pub fn validated(config: Self) -> Result<Self> {
        config.validate()?;
        Ok(config)
    }

    pub fn layout(&self) -> Result<Layout> {
        let working_dir = if self.working_dir.is_absolute() {
            self.working_dir.clone()
        } else {
            env::current_dir()
                .map_err(Error::WorkingDir)?
                .join(&self.working_dir)
        };
        let working_dir = paths::normalize(&working_dir);

        let project_root = match &self.project_root {
            Some(root) => paths::normalize(&working_dir.join(root)),
            None => working_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| working_dir.clone()),
        };

        Ok(Layout {
            working_dir,
            project_root,
        })
    }

    /// Dotted suffix of implementation files, e.g. `.cc`.
    pub fn implementation_suffix(&self) -> String {
        format!(".{}", self.implementation_extension.trim_start_matches('.'))
    }

    pub fn is_multi_include(&self, path: &str) -> bool {
        self.multi_include
            .iter()
            .any(|m| path == m || path.ends_with(&format!("/{m}")))
    }

    /// Whether an unresolved header may be hoisted into the system block.
    pub fn admits_system_header(&self, name: &str) -> bool {
        !self.blacklist.contains(name)
            && !self
                .suppressed_substrings
                .iter()
                .any(|needle| name.contains(needle.as_str()))
    }

    pub fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(blacklist) = overlay.blacklist {
            self.blacklist = blacklist;
        }
        if let Some(substrings) = overlay.suppressed_substrings {
            self.suppressed_substrings = substrings;
        }
        if let Some(multi) = overlay.multi_include {
            self.multi_include = multi;
        }
        if let Some(rewrites) = overlay.rewrites {
            self.rewrites = rewrites;
        }
        if let Some(ext) = overlay.implementation_extension {
            self.implementation_extension = ext;
        }
        if let Some(depth) = overlay.max_depth {
            self.max_depth = depth;
        }
    }
}

/// Partial configuration read from a JSON file. Present keys replace defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverlay {
    pub blacklist: Option<BTreeSet<String>>,
    pub suppressed_substrings: Option<Vec<String>>,
    pub multi_include: Option<Vec<String>>,
    pub rewrites: Option<Vec<PathRewrite>>,
    pub implementation_extension: Option<String>,
    pub max_depth: Option<usize>,
}

impl ConfigOverlay {
    pub fn from_file(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&s)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_portable_build() {
        let config = Config::default();
        assert!(config.blacklist.contains("cuda.h"));
        assert!(config.blacklist.contains("omp.h"));
        assert_eq!(config.implementation_suffix(), ".cc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn system_header_admission() {
        let config = Config::default();
        assert!(config.admits_system_header("stdio.h"));
        assert!(!config.admits_system_header("cudnn.h"));
        assert!(!config.admits_system_header("mkl_service.h"));
        assert!(!config.admits_system_header("nnpack/conv.h"));
    }

    #[test]
    fn multi_include_matches_by_suffix() {
        let config = Config::default();
        assert!(config.is_multi_include("../mshadow/mshadow/expr_scalar-inl.h"));
        assert!(config.is_multi_include("mshadow/mshadow/expr_scalar-inl.h"));
        assert!(!config.is_multi_include("../mshadow/mshadow/expr_engine-inl.h"));
    }

    #[test]
    fn rewrite_preserves_file_name() {
        let rewrite = PathRewrite::new("nnvm/include/dmlc", "dmlc-core/include/dmlc");
        assert_eq!(
            rewrite.apply(Path::new("nnvm/include/dmlc/nested/base.h")),
            Some(PathBuf::from("dmlc-core/include/dmlc/base.h"))
        );
        assert_eq!(rewrite.apply(Path::new("nnvm/include/nnvm/op.h")), None);
    }

    #[test]
    fn layout_defaults_root_to_parent() {
        let config = Config::builder()
            .working_dir(PathBuf::from("/proj/amalgamation"))
            .build();
        let layout = config.layout().unwrap();
        assert_eq!(layout.project_root, PathBuf::from("/proj"));
        assert_eq!(layout.stage_prefix(Stage::Src), "../src");
        assert_eq!(layout.identity_of(Path::new("./mxnet0.cc")), "mxnet0.cc");
    }

    #[test]
    fn overlay_replaces_only_present_keys() {
        let mut config = Config::default();
        let overlay =
            ConfigOverlay::from_json(r#"{ "blacklist": ["foo.h"], "max_depth": 8 }"#).unwrap();
        config.apply_overlay(overlay);
        assert!(config.blacklist.contains("foo.h"));
        assert!(!config.blacklist.contains("cuda.h"));
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.suppressed_substrings, vec!["mkl", "nnpack"]);
    }

    #[test]
    fn rejects_unusable_values() {
        let config = Config::builder().max_depth(0).build();
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        let config = Config::builder()
            .implementation_extension(String::new())
            .build();
        assert!(config.validate().is_err());
    }
}
