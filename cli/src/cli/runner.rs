use std::fs;
use std::time::{Duration, Instant};

use super::args::Cli;
use crate::style;
use amalgam::{
    amalgamate,
    error::{Error, Result},
    Amalgamation, Config, ConfigOverlay, Roots,
};
use log::{debug, info};

pub fn run_cli(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    debug!("{}", config);

    let roots = Roots {
        dmlc: cli.dmlc_root.clone(),
        nnvm: cli.nnvm_root.clone(),
        src: cli.src_root.clone(),
    };

    let start = Instant::now();
    let amalgamation = amalgamate(&cli.rules, &roots, &config)?;
    amalgamation.write_to(&cli.output)?;

    if let Some(report) = &cli.report {
        write_report(&amalgamation, report)?;
    }

    let s = style::theme();
    info!(
        "Amalgamated {} files into {} ({} system headers) in {}",
        s.highlight.apply_to(amalgamation.expanded.len()),
        s.secondary.apply_to(cli.output.display()),
        s.highlight.apply_to(amalgamation.sysheaders.len()),
        s.secondary.apply_to(format_duration(start.elapsed())),
    );
    if !amalgamation.unreached.is_empty() {
        info!(
            "{} indexed files were never reached",
            s.highlight.apply_to(amalgamation.unreached.len())
        );
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::builder()
        .maybe_project_root(cli.project_root.clone())
        .minimum(cli.minimum())
        .android(cli.android())
        .build();

    if let Some(path) = &cli.config {
        config.apply_overlay(ConfigOverlay::from_file(path)?);
    }
    if let Some(depth) = cli.max_depth {
        config.max_depth = depth;
    }

    Config::validated(config)
}

fn write_report(amalgamation: &Amalgamation, path: &std::path::Path) -> Result<()> {
    let json = amalgamation.report_json()?;
    fs::write(path, json).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    let secs = duration.as_secs() as f64 + (duration.subsec_nanos() as f64 / 1_000_000_000.0);

    if duration.as_secs() == 0 && millis > 0 {
        format!("{}ms", millis)
    } else {
        format!("{:.3}s", secs)
    }
}
