//! Image dimension probing and quality filtering.
//!
//! A candidate URL says nothing about pixel size, so each survivor of the
//! extension prefilter is probed: a ranged GET fetches only the leading
//! bytes, which is enough for every supported format to decode its header.
//! Probes run concurrently under a semaphore bound; any network or decode
//! failure drops the candidate rather than failing the document.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use image::ImageReader;
use reqwest::header::{HeaderMap, HeaderValue, RANGE, USER_AGENT};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::options::Options;
use crate::url_utils::extension_allowed;

/// Outcome of a single dimension probe.
///
/// Probing never fails the document; an unreadable candidate is reported
/// as `NoDimensions` and dropped downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The image header decoded to a pixel size.
    Dimensions { width: u32, height: u32 },
    /// The bytes could not be fetched or decoded.
    NoDimensions,
}

/// Quality policy check: both sides at least `min_side` and the
/// width/height ratio inside the inclusive aspect window. Zero-sized
/// dimensions never pass.
#[must_use]
pub fn passes_quality(width: u32, height: u32, opts: &Options) -> bool {
    if width == 0 || height == 0 {
        return false;
    }
    if width < opts.min_side || height < opts.min_side {
        return false;
    }
    let aspect = f64::from(width) / f64::from(height);
    (opts.aspect_low..=opts.aspect_high).contains(&aspect)
}

/// Fetches image header bytes and decodes pixel dimensions.
#[derive(Debug, Clone)]
pub struct ImageProber {
    client: reqwest::Client,
    opts: Options,
}

impl ImageProber {
    /// Build a prober with the configured User-Agent and timeout.
    pub fn new(opts: &Options) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let ua = HeaderValue::from_str(&opts.probe_user_agent)
            .map_err(|e| Error::ClientError(format!("invalid probe User-Agent: {e}")))?;
        headers.insert(USER_AGENT, ua);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(opts.probe_timeout_secs))
            .build()
            .map_err(|e| Error::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            opts: opts.clone(),
        })
    }

    /// Probe one URL for pixel dimensions.
    ///
    /// Sends a ranged GET for the first `probe_read_limit` bytes and stops
    /// reading at that cap even when the server ignores the Range header.
    pub async fn probe_dimensions(&self, url: &str) -> ProbeOutcome {
        let range = format!("bytes=0-{}", self.opts.probe_read_limit.saturating_sub(1));
        let mut response = match self.client.get(url).header(RANGE, range).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("probe request failed for {url}: {e}");
                return ProbeOutcome::NoDimensions;
            }
        };

        if !response.status().is_success() {
            debug!("probe got status {} for {url}", response.status());
            return ProbeOutcome::NoDimensions;
        }

        let mut bytes: Vec<u8> = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    bytes.extend_from_slice(&chunk);
                    if bytes.len() >= self.opts.probe_read_limit {
                        bytes.truncate(self.opts.probe_read_limit);
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    // A partial read may still hold enough header bytes.
                    debug!("probe read interrupted for {url}: {e}");
                    break;
                }
            }
        }

        match decode_dimensions(&bytes) {
            Some((width, height)) => ProbeOutcome::Dimensions { width, height },
            None => ProbeOutcome::NoDimensions,
        }
    }

    /// Verify candidates against the quality policy.
    ///
    /// Applies the extension prefilter, probes the survivors concurrently
    /// bounded by `probe_concurrency`, and returns the URLs that pass in
    /// input order.
    pub async fn verify(&self, candidates: Vec<String>) -> Vec<String> {
        let eligible: Vec<String> = candidates
            .into_iter()
            .filter(|url| extension_allowed(url, &self.opts))
            .collect();
        if eligible.is_empty() {
            return Vec::new();
        }

        let shared = Arc::new(self.clone());
        let semaphore = Arc::new(Semaphore::new(self.opts.probe_concurrency.max(1)));

        let mut handles = Vec::with_capacity(eligible.len());
        for url in eligible {
            let prober = Arc::clone(&shared);
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (url, ProbeOutcome::NoDimensions),
                };
                let outcome = prober.probe_dimensions(&url).await;
                (url, outcome)
            }));
        }

        let mut verified = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((url, ProbeOutcome::Dimensions { width, height })) => {
                    if passes_quality(width, height, &self.opts) {
                        verified.push(url);
                    } else {
                        debug!("dropping {url}: {width}x{height} fails quality policy");
                    }
                }
                Ok((url, ProbeOutcome::NoDimensions)) => {
                    debug!("dropping {url}: no dimensions");
                }
                Err(e) => {
                    warn!("probe task failed: {e}");
                }
            }
        }
        verified
    }
}

/// Decode pixel dimensions from image header bytes, any supported format.
fn decode_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
