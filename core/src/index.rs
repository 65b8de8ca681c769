use std::{
    collections::HashSet,
    fs,
    path::Path,
};

use crate::{
    config::{Layout, PathRewrite},
    error::{Error, Result},
    paths,
};

const LINE_CONTINUATION: &str = "\\";

/// Every file named by a dependency-rule listing that lives under the
/// project root, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct SourceIndex {
    files: Vec<String>,
    members: HashSet<String>,
}

impl SourceIndex {
    pub fn build(rule_file: &Path, layout: &Layout, rewrites: &[PathRewrite]) -> Result<Self> {
        let listing = fs::read_to_string(rule_file).map_err(|e| Error::io(rule_file, e))?;
        let index = Self::from_listing(&listing, layout, rewrites);
        log::debug!(
            "Indexed {} candidate files from {}",
            index.len(),
            rule_file.display()
        );
        Ok(index)
    }

    pub fn from_listing(listing: &str, layout: &Layout, rewrites: &[PathRewrite]) -> Self {
        let mut index = Self::default();
        for token in listing.split_whitespace() {
            if token.ends_with(':') || token == LINE_CONTINUATION {
                continue;
            }
            match candidate_for_token(token, layout, rewrites) {
                Some(candidate) => index.insert(candidate),
                None => log::trace!("Skipping {token}: outside the project root"),
            }
        }
        index
    }

    fn insert(&mut self, candidate: String) {
        if self.members.insert(candidate.clone()) {
            self.files.push(candidate);
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.members.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn candidate_for_token(token: &str, layout: &Layout, rewrites: &[PathRewrite]) -> Option<String> {
    let abs = paths::normalize(&layout.working_dir.join(token));
    let root_rel = abs.strip_prefix(&layout.project_root).ok()?;
    let root_rel = rewrites
        .iter()
        .find_map(|rewrite| rewrite.apply(root_rel))
        .unwrap_or_else(|| root_rel.to_path_buf());
    Some(layout.candidate_for(&root_rel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn layout() -> Layout {
        Layout {
            working_dir: PathBuf::from("/proj/amalgamation"),
            project_root: PathBuf::from("/proj"),
        }
    }

    #[test]
    fn drops_targets_and_continuations() {
        let listing = "build/src/a.o: ../src/a.cc \\\n  ../src/a.h ../src/b.h\n";
        let index = SourceIndex::from_listing(listing, &layout(), &[]);
        let files: Vec<_> = index.iter().collect();
        assert_eq!(files, vec!["../src/a.cc", "../src/a.h", "../src/b.h"]);
    }

    #[test]
    fn first_occurrence_wins() {
        let listing = "x.o: ../src/b.h ../src/a.h\ny.o: ../src/./a.h ../src/b.h\n";
        let index = SourceIndex::from_listing(listing, &layout(), &[]);
        let files: Vec<_> = index.iter().collect();
        assert_eq!(files, vec!["../src/b.h", "../src/a.h"]);
    }

    #[test]
    fn skips_files_outside_the_root() {
        let listing = "x.o: /usr/include/stdio.h ../src/a.cc ../../other/c.h\n";
        let index = SourceIndex::from_listing(listing, &layout(), &[]);
        assert_eq!(index.len(), 1);
        assert!(index.contains("../src/a.cc"));
        assert!(!index.contains("/usr/include/stdio.h"));
    }

    #[test]
    fn applies_legacy_rewrites() {
        let rewrites = vec![PathRewrite::new("nnvm/include/dmlc", "dmlc-core/include/dmlc")];
        let listing = "x.o: ../nnvm/include/dmlc/base.h\n";
        let index = SourceIndex::from_listing(listing, &layout(), &rewrites);
        assert!(index.contains("../dmlc-core/include/dmlc/base.h"));
    }
}
