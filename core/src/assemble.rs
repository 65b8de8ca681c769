use serde::Serialize;
use std::{borrow::Cow, fs, path::Path};

use crate::{
    config::Config,
    error::{Error, Result},
    expand::ExpansionState,
    index::SourceIndex,
};

const STAND_ALONE_DEFINES: &[&str] = &[
    "#define MSHADOW_STAND_ALONE 1",
    "#define MSHADOW_USE_SSE 0",
    "#define MSHADOW_USE_CBLAS 0",
];

const PLATFORM_PREAMBLE: &str = r#"
#if defined(__MACH__)
#include <mach/clock.h>
#include <mach/mach.h>
#endif

#if !defined(__WIN32__)
#include <sys/stat.h>
#include <sys/types.h>

#if !defined(__ANDROID__) && (!defined(MSHADOW_USE_SSE) || MSHADOW_USE_SSE == 1)
#include <emmintrin.h>
#endif

#endif
"#;

const ANDROID_COMPLEX_HEADER: &str = "complex.h";

/// The merged artifact plus what the run learned about the source tree.
#[derive(Debug, Clone, Serialize)]
pub struct Amalgamation {
    #[serde(skip_serializing)]
    pub text: Vec<u8>,
    pub sysheaders: Vec<String>,
    pub expanded: Vec<String>,
    pub unreached: Vec<String>,
}

impl Amalgamation {
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.text).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The artifact as text, with invalid UTF-8 replaced. For display only;
    /// `text` holds the exact bytes.
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    pub fn report_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn assemble(state: ExpansionState, index: &SourceIndex, config: &Config) -> Amalgamation {
    let (history, expanded, mut sysheaders, buffer) = state.into_parts();

    let mut head = String::new();
    if config.minimum {
        for define in STAND_ALONE_DEFINES {
            head.push_str(define);
            head.push('\n');
        }
    }

    head.push_str(PLATFORM_PREAMBLE);
    head.push('\n');

    if config.minimum && config.android && !sysheaders.contains(ANDROID_COMPLEX_HEADER) {
        sysheaders.insert(ANDROID_COMPLEX_HEADER.to_string());
    }

    for header in &sysheaders {
        head.push_str(&format!("#include <{header}>\n"));
    }
    head.push('\n');

    let mut text = head.into_bytes();
    text.extend_from_slice(&buffer);
    text.push(b'\n');

    let unreached: Vec<String> = index
        .iter()
        .filter(|x| !history.contains(*x) && !x.ends_with(".o"))
        .map(str::to_string)
        .collect();
    for x in &unreached {
        log::info!("Not processed: {x}");
    }

    Amalgamation {
        text,
        sysheaders: sysheaders.into_iter().collect(),
        expanded,
        unreached,
    }
}
