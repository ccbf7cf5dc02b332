use colored::Colorize;

/// For re-throwing after we've logged a list of errors.
#[derive(Debug, thiserror::Error)]
#[error("{0} failed due to {1} errors")]
pub struct AggregatedErrors(pub String, pub usize);

/// Collects errors from several independent checks,
/// so they can all be reported before failing.
pub struct Errors {
    errors: Vec<anyhow::Error>,
}

impl Default for Errors {
    fn default() -> Self {
        Self {
            // we don't mind reallocating if we're already in an error state:
            errors: Vec::with_capacity(0),
        }
    }
}

impl Errors {
    pub fn add_context(&mut self, e: anyhow::Error, msg: String) {
        log::trace!("{msg}: {e:?}");
        self.errors.push(e.context(msg));
    }

    pub fn add(&mut self, e: anyhow::Error) {
        log::trace!("error: {e:?}");
        self.errors.push(e);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Log the full list of errors, fail w/ an aggregated error
    /// if there were one or more errors.
    pub fn recap(self, label: &str) -> Result<(), AggregatedErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            log::error!("Encountered errors while {}:", label.red());
            for e in &self.errors {
                log::error!("{}: {e:#}", "ERROR".red());
            }
            Err(AggregatedErrors(label.to_owned(), self.errors.len()))
        }
    }
}
