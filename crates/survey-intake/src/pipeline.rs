//! Accept-and-derive pipeline for one submission.
//!
//! Order of operations per request:
//! 1. decode and validate the body (nothing is written if this fails)
//! 2. stamp `submittedAt`
//! 3. append the submission to the responses store
//! 4. append whichever of testimonial / lead / early adopter the submission qualifies for
//! 5. rebuild the quote digest from the full testimonials store
//!
//! Every store append is an exclusive read-modify-write. The digest is rendered and
//! published while the testimonials store is held, so a digest can never be replaced by
//! one rendered from an older snapshot.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use intake_common::document::{DocumentSink, FileDocument};
use intake_common::error::CommonError;
use intake_common::file::FileArrayBackend;
#[cfg(test)]
use intake_common::memory::{MemoryArrayBackend, MemoryDocument};
use intake_common::store::JsonStore;

use crate::config::Config;
use crate::derive;
use crate::digest;
use crate::error::AppError;
use crate::model::{EarlyAdopter, Lead, Submission, Testimonial};
use crate::validate;

pub const RESPONSES_FILE: &str = "responses.json";
pub const TESTIMONIALS_FILE: &str = "testimonials.json";
pub const LEADS_FILE: &str = "leads.json";
pub const EARLY_ADOPTERS_FILE: &str = "early_adopters.json";

#[derive(Clone)]
pub struct Stores {
    pub responses: JsonStore<Submission>,
    pub testimonials: JsonStore<Testimonial>,
    pub leads: JsonStore<Lead>,
    pub early_adopters: JsonStore<EarlyAdopter>,
    pub digest: Arc<dyn DocumentSink>,
}

impl Stores {
    /// File-backed stores under `data_dir`.
    pub fn open(data_dir: &Path, digest_file: &str) -> Self {
        let store = |name: &str| Arc::new(FileArrayBackend::new(data_dir.join(name)));
        Self {
            responses: JsonStore::new(store(RESPONSES_FILE)),
            testimonials: JsonStore::new(store(TESTIMONIALS_FILE)),
            leads: JsonStore::new(store(LEADS_FILE)),
            early_adopters: JsonStore::new(store(EARLY_ADOPTERS_FILE)),
            digest: Arc::new(FileDocument::new(data_dir.join(digest_file))),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::open(&config.data_dir, &config.digest_file)
    }

    /// Memory-backed stores. The returned document handle observes published digests.
    #[cfg(test)]
    pub fn in_memory() -> (Self, Arc<MemoryDocument>) {
        let document = Arc::new(MemoryDocument::default());
        let stores = Self {
            responses: JsonStore::new(Arc::new(MemoryArrayBackend::default())),
            testimonials: JsonStore::new(Arc::new(MemoryArrayBackend::default())),
            leads: JsonStore::new(Arc::new(MemoryArrayBackend::default())),
            early_adopters: JsonStore::new(Arc::new(MemoryArrayBackend::default())),
            digest: document.clone(),
        };
        (stores, document)
    }

    /// Create any missing store as an empty array.
    pub fn ensure(&self) -> Result<(), CommonError> {
        self.responses.ensure()?;
        self.testimonials.ensure()?;
        self.leads.ensure()?;
        self.early_adopters.ensure()?;
        Ok(())
    }
}

/// What a successful submission produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Length of the responses store after the append.
    pub responses: usize,
    pub testimonial: bool,
    pub lead: bool,
    pub early_adopter: bool,
}

pub struct Pipeline {
    stores: Stores,
}

impl Pipeline {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn accept(&self, body: &[u8]) -> Result<Outcome, AppError> {
        self.accept_at(body, Utc::now())
    }

    /// Like `accept`, with the acceptance time supplied by the caller.
    pub fn accept_at(&self, body: &[u8], now: DateTime<Utc>) -> Result<Outcome, AppError> {
        let submission = validate::parse_body(body)?;
        validate::validate(&submission)?;
        let submission = submission.stamped(&timestamp(now));
        Ok(self.record(&submission)?)
    }

    /// Persist an already validated and stamped submission and everything derived from it.
    pub fn record(&self, submission: &Submission) -> Result<Outcome, CommonError> {
        self.stores.ensure()?;

        let responses = self.stores.responses.append(submission)?;

        let testimonial = derive::testimonial_for(submission);
        let lead = derive::lead_for(submission);
        let early_adopter = derive::early_adopter_for(submission);

        let outcome = Outcome {
            responses,
            testimonial: testimonial.is_some(),
            lead: lead.is_some(),
            early_adopter: early_adopter.is_some(),
        };

        if let Some(t) = &testimonial {
            self.stores.testimonials.append(t)?;
        }
        if let Some(l) = &lead {
            self.stores.leads.append(l)?;
        }
        if let Some(a) = &early_adopter {
            self.stores.early_adopters.append(a)?;
        }

        self.rebuild_digest()?;

        info!(
            responses = outcome.responses,
            testimonial = outcome.testimonial,
            lead = outcome.lead,
            early_adopter = outcome.early_adopter,
            "submission recorded"
        );
        Ok(outcome)
    }

    /// Re-render the quote digest from every stored testimonial.
    pub fn rebuild_digest(&self) -> Result<usize, CommonError> {
        let sink = Arc::clone(&self.stores.digest);
        self.stores.testimonials.with_snapshot(|testimonials| {
            let html = digest::render_digest(&testimonials);
            sink.publish(&html)?;
            Ok(testimonials.len())
        })
    }
}

/// ISO-8601 with seconds precision and a numeric offset, e.g. `2026-10-18T09:30:00+00:00`.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, false)
}
