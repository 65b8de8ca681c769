use std::{
    collections::{BTreeSet, HashSet},
    fs,
};

use crate::{
    config::{Config, Layout},
    directive::{self, Line},
    error::{Error, Result},
    resolver::Resolver,
    Stage,
};

/// State shared by every expansion pass of one run.
#[derive(Debug, Default)]
pub struct ExpansionState {
    history: HashSet<String>,
    completed: Vec<String>,
    pending: Vec<String>,
    sysheaders: BTreeSet<String>,
    buffer: Vec<u8>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_emitted(&self, path: &str) -> bool {
        self.history.contains(path)
    }

    /// Expanded files, in the order their expansion finished.
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn sysheaders(&self) -> &BTreeSet<String> {
        &self.sysheaders
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub(crate) fn add_sysheader(&mut self, name: &str) -> bool {
        if self.sysheaders.contains(name) {
            return false;
        }
        self.sysheaders.insert(name.to_string())
    }

    pub(crate) fn into_parts(self) -> (HashSet<String>, Vec<String>, BTreeSet<String>, Vec<u8>) {
        (self.history, self.completed, self.sysheaders, self.buffer)
    }
}

pub struct Expander<'a> {
    config: &'a Config,
    layout: &'a Layout,
    resolver: Resolver<'a>,
    state: ExpansionState,
}

impl<'a> Expander<'a> {
    pub fn new(config: &'a Config, layout: &'a Layout, resolver: Resolver<'a>) -> Self {
        Self {
            config,
            layout,
            resolver,
            state: ExpansionState::new(),
        }
    }

    pub fn into_state(self) -> ExpansionState {
        self.state
    }

    /// Inlines `path` and everything it transitively includes into the buffer.
    pub fn expand(&mut self, path: &str, stage: Stage) -> Result<()> {
        if self.state.history.contains(path) && !self.config.is_multi_include(path) {
            return Ok(());
        }

        if self.state.pending.iter().any(|p| p == path) {
            log::debug!("Include cycle broken at {path}");
            return Ok(());
        }

        if self.state.pending.len() >= self.config.max_depth {
            return Err(Error::IncludeDepthExceeded {
                path: path.to_string(),
                depth: self.config.max_depth,
            });
        }

        let file = self.layout.open_path(path);
        let bytes = fs::read(&file).map_err(|e| Error::io(file, e))?;

        self.state
            .buffer
            .extend_from_slice(format!("//===== EXPANDING: {path} =====\n\n").as_bytes());
        self.state.pending.push(path.to_string());

        for line in bytes.split_inclusive(|b| *b == b'\n') {
            match directive::classify(line) {
                Line::Text => self.state.buffer.extend_from_slice(line),
                Line::Guarded => {
                    log::info!("{}: {}", path, String::from_utf8_lossy(line).trim_end());
                    self.state.buffer.extend_from_slice(line);
                }
                Line::Unparsed => {
                    log::warn!(
                        "{}: {} not found",
                        path,
                        String::from_utf8_lossy(line).trim_end()
                    );
                    self.state.buffer.extend_from_slice(line);
                }
                Line::Include(name) => match self.resolver.resolve(name, path, stage) {
                    Some(source) => self.expand(source, stage)?,
                    None => self.collect_system_header(name),
                },
            }
        }

        self.state.pending.pop();
        self.state
            .buffer
            .extend_from_slice(format!("//===== EXPANDED: {path} =====\n\n").as_bytes());

        if self.state.history.insert(path.to_string()) {
            self.state.completed.push(path.to_string());
        }
        Ok(())
    }

    fn collect_system_header(&mut self, name: &str) {
        if self.config.admits_system_header(name) && self.state.add_sysheader(name) {
            log::debug!("System header <{name}>");
        }
    }
}
