mod assemble;
mod config;
mod directive;
mod expand;
mod index;
pub mod paths;
mod resolver;

pub mod error;
pub use assemble::{assemble, Amalgamation};
pub use config::{
    Config, ConfigOverlay, Layout, PathRewrite, DEFAULT_BLACKLIST, DEFAULT_MAX_DEPTH,
};
pub use directive::{classify, Line};
pub use error::{Error, Result};
pub use expand::{ExpansionState, Expander};
pub use index::SourceIndex;
pub use resolver::{DirectoryAffinity, Resolver, TieBreak};

use std::path::{Path, PathBuf};
use strum_macros::Display;

/// One of the three sub-projects expanded as its own root traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    Dmlc,
    Nnvm,
    Src,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Dmlc, Stage::Nnvm, Stage::Src];

    /// Directory under the project root holding the stage's sources.
    pub fn dir_name(self) -> &'static str {
        match self {
            Stage::Dmlc => "dmlc",
            Stage::Nnvm => "nnvm",
            Stage::Src => "src",
        }
    }
}

/// Root file of each stage, expanded in `Stage::ALL` order.
#[derive(Debug, Clone)]
pub struct Roots {
    pub dmlc: PathBuf,
    pub nnvm: PathBuf,
    pub src: PathBuf,
}

impl Roots {
    pub fn get(&self, stage: Stage) -> &Path {
        match stage {
            Stage::Dmlc => &self.dmlc,
            Stage::Nnvm => &self.nnvm,
            Stage::Src => &self.src,
        }
    }
}

/// Indexes `rule_file`, runs the three expansion passes and assembles the result.
pub fn amalgamate(rule_file: &Path, roots: &Roots, config: &Config) -> Result<Amalgamation> {
    config.validate()?;
    let layout = config.layout()?;
    log::debug!(
        "Project root {}, working directory {}",
        layout.project_root.display(),
        layout.working_dir.display()
    );

    let index = SourceIndex::build(rule_file, &layout, &config.rewrites)?;
    let resolver = Resolver::new(&index, &layout, config.implementation_suffix());
    let mut expander = Expander::new(config, &layout, resolver);

    for stage in Stage::ALL {
        let root = layout.identity_of(roots.get(stage));
        log::debug!("Expanding {stage} stage from {root}");
        expander.expand(&root, stage)?;
    }

    let state = expander.into_state();
    log::debug!(
        "Expanded {} files, collected {} system headers",
        state.completed().len(),
        state.sysheaders().len()
    );
    Ok(assemble(state, &index, config))
}
