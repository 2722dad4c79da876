use std::path::PathBuf;

use clap::{Parser, ValueHint};
use libwhoedited::config::parse_key_list;
use libwhoedited::{
    AttributionConfig, ConfigError, InputFormat, Kind, KindSelection, OutputFormat,
    OutputOptions,
};
use log::{debug, info};
use whoedited_config::Global;

/// Lists the edits other users made to features after the target user edited them
///
/// One file per feature kind is written to OUT_DIR (nodes.csv, ways.csv,
/// relations.csv), each row being `id,version,changeset,timestamp,user,deleted`,
/// sorted by id and version. Nothing is written if the history cannot be read
/// completely.
///
/// # Examples
///
/// Trace every edit made after mine:
///   whoedited trace planet-history.osh.pbf mapper out/
///
/// Only consider features tagged with `highway` or `railway`, skip relations:
///   whoedited trace history.osh.pbf mapper out/ --keylist highway,railway --skiprelations
#[derive(Parser, Debug)]
pub struct Trace {
    /// OSM full-history file (.osh.pbf) or JSON Lines dump (.jsonl)
    #[clap(value_hint = ValueHint::FilePath)]
    history: PathBuf,
    /// User whose edits are traced
    user: String,
    /// Directory the reports are written to; created if missing
    #[clap(value_hint = ValueHint::DirPath)]
    out_dir: PathBuf,
    /// Comma-separated tag keys; only features carrying one of them are considered
    #[clap(long = "keylist", value_name = "KEYS")]
    keylist: Option<String>,
    /// Do not process or output nodes
    #[clap(long = "skipnodes")]
    skip_nodes: bool,
    /// Do not process or output ways
    #[clap(long = "skipways")]
    skip_ways: bool,
    /// Do not process or output relations
    #[clap(long = "skiprelations")]
    skip_relations: bool,
    /// Also list the target user's own revisions
    #[clap(long = "includemine")]
    include_mine: bool,
    /// Remember only the target user's latest revision of each feature
    #[clap(long = "shallow")]
    shallow: bool,
    /// Output format (csv, jsonl)
    #[clap(long = "format", value_name = "FORMAT")]
    format: Option<OutputFormat>,
    /// Write a header row to CSV files
    #[clap(long = "header")]
    header: bool,
    /// Format of the history file, guessed from its extension by default (pbf, jsonl)
    #[clap(long = "input-format", value_name = "FORMAT")]
    input_format: Option<InputFormat>,
    /// Read settings from this configuration file, on top of the global one
    #[clap(long = "config", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,
}

impl Trace {
    pub fn run(self) -> Result<(), anyhow::Error> {
        let settings = self.load_settings()?;
        let config = self.attribution_config(&settings);
        let options = self.output_options(&settings)?;
        debug!("config = {:?}, output = {:?}", config, options);

        let written = libwhoedited::run(
            &self.history,
            self.input_format,
            &config,
            &self.out_dir,
            &options,
        )?;
        info!(
            "traced edits after {:?}: {} report(s) in {:?}",
            config.target_user,
            written.len(),
            self.out_dir
        );
        Ok(())
    }

    fn load_settings(&self) -> Result<Global, libwhoedited::Error> {
        let global = Global::load().map_err(|e| ConfigError::File {
            path: Global::path().unwrap_or_default(),
            message: format!("{:#}", e),
        })?;
        let local = match self.config {
            Some(ref path) => Global::from_file(path).map_err(|e| ConfigError::File {
                path: path.clone(),
                message: format!("{:#}", e),
            })?,
            None => Global::default(),
        };
        Ok(global.merge(local))
    }

    fn attribution_config(&self, settings: &Global) -> AttributionConfig {
        let keys = match self.keylist {
            Some(ref list) => parse_key_list(list),
            None => settings.keys.clone().unwrap_or_default(),
        };
        let mut kinds = KindSelection::default();
        let skipped = [
            (Kind::Node, self.skip_nodes || settings.skip_nodes.unwrap_or(false)),
            (Kind::Way, self.skip_ways || settings.skip_ways.unwrap_or(false)),
            (
                Kind::Relation,
                self.skip_relations || settings.skip_relations.unwrap_or(false),
            ),
        ];
        for (kind, skip) in skipped {
            kinds.set(kind, !skip);
        }
        AttributionConfig::new(self.user.clone())
            .with_keys(keys)
            .with_kinds(kinds)
            .include_mine(self.include_mine || settings.include_mine.unwrap_or(false))
            .shallow(self.shallow || settings.shallow.unwrap_or(false))
    }

    fn output_options(&self, settings: &Global) -> Result<OutputOptions, libwhoedited::Error> {
        let format = match (self.format, settings.output.format.as_deref()) {
            (Some(format), _) => format,
            (None, Some(name)) => name
                .parse()
                .map_err(|e: String| ConfigError::Invalid(format!("output.format: {}", e)))?,
            (None, None) => OutputFormat::default(),
        };
        Ok(OutputOptions {
            format,
            header: self.header || settings.output.header.unwrap_or(false),
        })
    }
}
