//! Checking a list of raw inputs in one go.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use thiserror::Error;
use tracing::info;

use crate::classify::{Classifier, EmailCheckResult};
use crate::dns::DnsLookup;
use crate::input::load_emails;
use crate::smtp::MailboxProber;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no email addresses given: pass them as arguments or in a file")]
    NoCandidates,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Number of addresses checked at the same time. `1` is sequential.
    ///
    /// Workers share the classifier's resolver. The blocking trust-dns
    /// `Resolver` drives every query through one internal runtime behind a
    /// mutex, so DNS lookups still run one at a time; only the SMTP probes
    /// overlap.
    pub workers: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

/// Normalises raw inputs and refuses an empty result, before any network
/// activity happens.
pub fn collect_candidates<I, S>(raw_items: I) -> Result<Vec<String>, BatchError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let emails = load_emails(raw_items);
    if emails.is_empty() {
        return Err(BatchError::NoCandidates);
    }
    Ok(emails)
}

/// Classifies every candidate. Results come back in input order whatever the
/// worker count.
pub fn classify_all<R, P>(
    classifier: &Classifier<R, P>,
    emails: &[String],
    options: &BatchOptions,
) -> Vec<EmailCheckResult>
where
    R: DnsLookup + Sync,
    P: MailboxProber + Sync,
{
    let workers = options.workers.clamp(1, emails.len().max(1));
    info!(count = emails.len(), workers, "checking email addresses");
    if workers == 1 {
        return emails.iter().map(|email| classifier.classify(email)).collect();
    }
    classify_parallel(classifier, emails, workers)
}

/// [`collect_candidates`] followed by [`classify_all`].
pub fn check_batch<R, P, I, S>(
    classifier: &Classifier<R, P>,
    raw_items: I,
    options: &BatchOptions,
) -> Result<Vec<EmailCheckResult>, BatchError>
where
    R: DnsLookup + Sync,
    P: MailboxProber + Sync,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let emails = collect_candidates(raw_items)?;
    Ok(classify_all(classifier, &emails, options))
}

fn classify_parallel<R, P>(
    classifier: &Classifier<R, P>,
    emails: &[String],
    workers: usize,
) -> Vec<EmailCheckResult>
where
    R: DnsLookup + Sync,
    P: MailboxProber + Sync,
{
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();
    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || {
                loop {
                    let idx = next.fetch_add(1, Ordering::Relaxed);
                    let Some(email) = emails.get(idx) else { break };
                    if tx.send((idx, classifier.classify(email))).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<EmailCheckResult>> = vec![None; emails.len()];
    for (idx, result) in rx {
        slots[idx] = Some(result);
    }
    slots.into_iter().flatten().collect()
}
