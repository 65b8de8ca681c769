use crate::{config::Layout, index::SourceIndex, paths, Stage};

/// Chooses among several indexed files sharing a basename.
pub trait TieBreak {
    fn pick<'a>(&self, candidates: &[&'a str], requester: &str) -> Option<&'a str>;
}

/// Prefers the candidate living in the same top-level directory as the
/// requesting file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryAffinity;

impl TieBreak for DirectoryAffinity {
    fn pick<'a>(&self, candidates: &[&'a str], requester: &str) -> Option<&'a str> {
        let wanted = paths::affinity_segment(requester)?;
        candidates
            .iter()
            .copied()
            .find(|c| paths::affinity_segment(c) == Some(wanted))
    }
}

pub struct Resolver<'i> {
    index: &'i SourceIndex,
    stage_prefixes: [(Stage, String); 3],
    implementation_suffix: String,
    tie_breaks: Vec<Box<dyn TieBreak>>,
}

impl<'i> Resolver<'i> {
    pub fn new(index: &'i SourceIndex, layout: &Layout, implementation_suffix: String) -> Self {
        Self {
            index,
            stage_prefixes: Stage::ALL.map(|stage| (stage, layout.stage_prefix(stage))),
            implementation_suffix,
            tie_breaks: vec![Box::new(DirectoryAffinity)],
        }
    }

    /// Replaces the ordered tie-break list. An empty list leaves every
    /// ambiguous name unresolved.
    pub fn with_tie_breaks(mut self, tie_breaks: Vec<Box<dyn TieBreak>>) -> Self {
        self.tie_breaks = tie_breaks;
        self
    }

    fn stage_prefix(&self, stage: Stage) -> &str {
        self.stage_prefixes
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, prefix)| prefix.as_str())
            .unwrap_or_default()
    }

    /// Indexed file satisfying `name` when included from `requester`.
    pub fn resolve(&self, name: &str, requester: &str, stage: Stage) -> Option<&'i str> {
        let suffixed = format!("/{name}");
        let mut candidates: Vec<&'i str> = self
            .index
            .iter()
            .filter(|x| *x == name || x.ends_with(&suffixed))
            .collect();

        if name.ends_with(&self.implementation_suffix) {
            let prefix = self.stage_prefix(stage);
            candidates.retain(|x| x.starts_with(prefix));
        }

        match candidates.as_slice() {
            [] => None,
            [only] => Some(*only),
            _ => {
                let picked = self
                    .tie_breaks
                    .iter()
                    .find_map(|tb| tb.pick(&candidates, requester));
                if picked.is_none() {
                    log::debug!(
                        "Ambiguous include {name} from {requester}: {} candidates, none preferred",
                        candidates.len()
                    );
                }
                picked
            }
        }
    }
}
