//! Deferred reclamation: a priority-ordered stack of pending release requests.
//!
//! Resource owners `submit` retiring handles; each request is scored with the
//! same fuzzy AND as field points (size, reference estimate, pressure). A
//! `cascade` only sweeps once occupancy pressure is high; otherwise it defers
//! and leaves the stack untouched. The stack never owns the resources, it only
//! asks a [`ResourceReleaser`] to release them, and checks liveness first so a
//! handle is released at most once.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ReclaimConfig;
use crate::constants::{LARGE_SIZE_FACTOR, SHARED_REF_FACTOR, SINGLE_REF_FACTOR};
use crate::diagnostics::DiagnosticSink;
use crate::error::{FieldError, Result};

/// Release primitive for externally owned resources.
pub trait ResourceReleaser {
    type Handle;

    /// Whether `handle` still refers to an unreleased resource.
    fn is_live(&self, handle: &Self::Handle) -> bool;

    /// Release a live resource.
    fn release(&mut self, handle: &Self::Handle);
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReclaimRequest<H> {
    pub handle: H,
    pub size: usize,
    pub ref_estimate: u32,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CascadeOutcome {
    /// Pressure below threshold: nothing released, stack untouched.
    Deferred { pending: usize },
    /// Full sweep: stack cleared.
    Swept {
        released: usize,
        double_releases: usize,
    },
}

#[derive(Clone, Debug)]
pub struct ReclamationStack<H> {
    requests: Vec<ReclaimRequest<H>>,
    config: ReclaimConfig,
}

impl<H> Default for ReclamationStack<H> {
    fn default() -> Self {
        Self {
            requests: Vec::new(),
            config: ReclaimConfig::default(),
        }
    }
}

impl<H: fmt::Debug> ReclamationStack<H> {
    pub fn new(config: ReclaimConfig) -> Result<Self> {
        config.validate()?;
        let mut requests = Vec::new();
        requests.try_reserve_exact(config.max_entries).map_err(|e| {
            FieldError::AllocationFailure(format!(
                "reclamation stack ({}): {e}",
                config.max_entries
            ))
        })?;
        Ok(Self { requests, config })
    }

    pub fn config(&self) -> &ReclaimConfig {
        &self.config
    }

    /// Queue `handle` for release. At capacity the request is rejected and
    /// the resource is left alone.
    pub fn submit(&mut self, handle: H, size: usize, ref_estimate: u32) -> Result<()> {
        if self.requests.len() >= self.config.max_entries {
            tracing::warn!(?handle, "reclamation stack full, request rejected");
            return Err(FieldError::CapacityExceeded {
                structure: "reclamation stack",
                capacity: self.config.max_entries,
            });
        }

        let score = self.config.confidence().score(&[
            self.size_factor(size),
            ref_factor(ref_estimate),
            self.pressure(),
        ]);

        // Linear scan: land after every request scoring at least as high.
        let pos = self
            .requests
            .iter()
            .position(|r| r.score < score)
            .unwrap_or(self.requests.len());
        tracing::debug!(?handle, size, ref_estimate, score, pos, "queued release");
        self.requests.insert(
            pos,
            ReclaimRequest {
                handle,
                size,
                ref_estimate,
                score,
            },
        );
        Ok(())
    }

    fn size_factor(&self, size: usize) -> f64 {
        if size > self.config.size_reference {
            LARGE_SIZE_FACTOR
        } else {
            size as f64 / self.config.size_reference as f64
        }
    }

    /// High once occupancy exceeds the pressure threshold, else low.
    pub fn pressure(&self) -> f64 {
        let ratio = self.requests.len() as f64 / self.config.max_entries as f64;
        if ratio > self.config.pressure_threshold {
            self.config.high_pressure
        } else {
            self.config.low_pressure
        }
    }

    pub fn is_high_pressure(&self) -> bool {
        self.pressure() >= self.config.high_pressure
    }

    /// Release every queued handle under high pressure, or defer.
    ///
    /// Handles the releaser reports as dead are reported as
    /// `DoubleReleaseAttempt` and dropped without a second release.
    pub fn cascade<R>(&mut self, releaser: &mut R, sink: &mut impl DiagnosticSink) -> CascadeOutcome
    where
        R: ResourceReleaser<Handle = H>,
    {
        if !self.is_high_pressure() {
            tracing::debug!(pending = self.requests.len(), "low pressure, cascade deferred");
            return CascadeOutcome::Deferred {
                pending: self.requests.len(),
            };
        }

        let mut released = 0;
        let mut double_releases = 0;
        for request in self.requests.drain(..) {
            if releaser.is_live(&request.handle) {
                releaser.release(&request.handle);
                released += 1;
            } else {
                sink.report_error(&FieldError::DoubleReleaseAttempt(format!(
                    "{:?} (size {}) already released",
                    request.handle, request.size
                )));
                double_releases += 1;
            }
        }
        tracing::info!(released, double_releases, "cascade complete");
        CascadeOutcome::Swept {
            released,
            double_releases,
        }
    }

    pub fn requests(&self) -> &[ReclaimRequest<H>] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

fn ref_factor(ref_estimate: u32) -> f64 {
    if ref_estimate > 1 {
        SHARED_REF_FACTOR
    } else {
        SINGLE_REF_FACTOR
    }
}

/// In-memory resource table keyed by random handles.
#[derive(Debug, Default)]
pub struct ResourcePool {
    live: HashMap<Uuid, usize>,
    released: usize,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource of `size` bytes and return its handle.
    pub fn allocate(&mut self, size: usize) -> Uuid {
        let handle = Uuid::new_v4();
        self.live.insert(handle, size);
        handle
    }

    /// Size of a live resource.
    pub fn size_of(&self, handle: &Uuid) -> Option<usize> {
        self.live.get(handle).copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total releases performed through this pool.
    pub fn released_count(&self) -> usize {
        self.released
    }

    /// Release immediately, bypassing any stack. Returns false if already gone.
    pub fn release_now(&mut self, handle: &Uuid) -> bool {
        if self.live.remove(handle).is_some() {
            self.released += 1;
            true
        } else {
            false
        }
    }
}

impl ResourceReleaser for ResourcePool {
    type Handle = Uuid;

    fn is_live(&self, handle: &Uuid) -> bool {
        self.live.contains_key(handle)
    }

    fn release(&mut self, handle: &Uuid) {
        self.release_now(handle);
    }
}
