use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use strata_core::{ConfigResult, PropertyStore};
use tracing::{debug, warn};

use crate::loader::ParseStage;
use crate::settings::DumpOutput;

/// Sink for the configuration dump
#[derive(Clone)]
pub enum HelpOutput {
    Stdout,
    Stderr,
    Writer(Arc<Mutex<dyn Write + Send>>),
}

impl From<DumpOutput> for HelpOutput {
    fn from(output: DumpOutput) -> Self {
        match output {
            DumpOutput::Stdout => HelpOutput::Stdout,
            DumpOutput::Stderr => HelpOutput::Stderr,
        }
    }
}

impl HelpOutput {
    fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        match self {
            HelpOutput::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(buf)?;
                out.flush()
            }
            HelpOutput::Stderr => io::stderr().lock().write_all(buf),
            HelpOutput::Writer(writer) => {
                let mut writer = writer.lock();
                writer.write_all(buf)?;
                writer.flush()
            }
        }
    }
}

/// Dumps the resolved store as pretty JSON when the help key is present.
///
/// Read-only. A failed write is logged and never fails the pipeline.
pub struct HelpStage {
    key: String,
    output: HelpOutput,
}

impl HelpStage {
    pub fn new(key: impl Into<String>, output: HelpOutput) -> Self {
        Self {
            key: key.into(),
            output,
        }
    }
}

impl ParseStage for HelpStage {
    fn name(&self) -> &str {
        "help"
    }

    fn apply(&self, store: &mut dyn PropertyStore) -> ConfigResult<()> {
        if store.get(&self.key).is_none() {
            return Ok(());
        }
        let Some(root) = store.get("") else {
            return Ok(());
        };

        debug!("'{}' is set, dumping resolved configuration", self.key);
        let mut dump = format!("{:#}", root.to_json());
        dump.push('\n');
        if let Err(e) = self.output.write_all(dump.as_bytes()) {
            warn!("Failed to write configuration dump: {}", e);
        }
        Ok(())
    }
}
