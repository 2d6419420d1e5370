use std::collections::VecDeque;
use std::sync::Arc;

use crate::markov::filter::{Sample, StateCandidate};

/// Sliding window of past state vectors.
///
/// Keeps the last `k` frames and/or the frames within the trailing `ttl`
/// milliseconds; the newest frame always stays. Dropping a frame drops its
/// `Arc`s, which releases every predecessor chain no current candidate
/// still references.
pub struct KState<C, S>
where
    C: StateCandidate,
    S: Sample,
{
    sequence: VecDeque<(Vec<Arc<C>>, S)>,

    /// Maximum number of retained frames.
    k: Option<usize>,
    /// Maximum age of retained frames relative to the newest sample, ms.
    ttl: Option<i64>,
}

impl<C, S> KState<C, S>
where
    C: StateCandidate,
    S: Sample,
{
    pub fn new(k: Option<usize>, ttl: Option<i64>) -> KState<C, S> {
        KState {
            sequence: VecDeque::new(),
            k,
            ttl,
        }
    }

    /// A window that never prunes.
    pub fn unbounded() -> KState<C, S> {
        KState::new(None, None)
    }

    /// Number of retained frames.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The current state vector `S_t`; empty before the first update and
    /// after an HMM break.
    pub fn vector(&self) -> &[Arc<C>] {
        self.sequence
            .back()
            .map_or(&[], |(vector, _)| vector.as_slice())
    }

    /// The sample of the newest frame.
    pub fn sample(&self) -> Option<&S> {
        self.sequence.back().map(|(_, sample)| sample)
    }

    pub fn time(&self) -> Option<i64> {
        self.sample().map(Sample::time)
    }

    /// Appends a new frame and prunes frames that slid out of the window.
    pub fn update(&mut self, vector: Vec<Arc<C>>, sample: S) {
        self.sequence.push_back((vector, sample));

        if let Some(k) = self.k {
            while self.sequence.len() > k.max(1) {
                self.sequence.pop_front();
            }
        }

        if let Some(ttl) = self.ttl {
            let horizon = self.time().unwrap_or(i64::MIN).saturating_sub(ttl);
            while self.sequence.len() > 1
                && self.sequence.front().is_some_and(|(_, s)| s.time() < horizon)
            {
                self.sequence.pop_front();
            }
        }
    }

    /// The current candidate with the highest filter probability; ties
    /// resolve to the smaller ordering key.
    pub fn estimate(&self) -> Option<&Arc<C>> {
        self.vector().iter().fold(None, |best, candidate| match best {
            None => Some(candidate),
            Some(current) => {
                let better = candidate.filtprob() > current.filtprob()
                    || (candidate.filtprob() == current.filtprob()
                        && candidate.ident() < current.ident());
                Some(if better { candidate } else { current })
            }
        })
    }

    /// The most probable candidate sequence, oldest first: the predecessor
    /// chain of the current candidate with the highest sequence
    /// probability.
    pub fn sequence(&self) -> Vec<Arc<C>> {
        let best = self.vector().iter().fold(None, |best, candidate| match best {
            None => Some(candidate),
            Some(current) => {
                let better = candidate.seqprob() > current.seqprob()
                    || (candidate.seqprob() == current.seqprob()
                        && candidate.ident() < current.ident());
                Some(if better { candidate } else { current })
            }
        });

        let mut chain = Vec::new();
        let mut next = best.cloned();

        while let Some(candidate) = next {
            next = candidate.predecessor().cloned();
            chain.push(candidate);
        }

        chain.reverse();
        chain
    }
}
