use std::sync::Arc;

use log::{info, trace};

/// A measurement sample `z_t`.
pub trait Sample {
    /// Measurement time in milliseconds epoch time.
    fn time(&self) -> i64;
}

/// A state transition between two candidates of consecutive steps.
pub trait StateTransition {
    /// Number of edges carried by the inferred route, used for
    /// deterministic tie-breaking between equally probable predecessors.
    fn hops(&self) -> usize;
}

/// A state candidate `s_t`: one hypothesis for the true state at time `t`.
///
/// Candidates form a DAG through their predecessor back-references: shared
/// ownership of the chain, never a cycle. Dropping every `Arc` of a frontier
/// releases the chains only it referenced.
pub trait StateCandidate: Sized {
    type Transition: StateTransition + Clone;
    type Sample: Sample;

    /// Posterior probability at the candidate's time step, normalized over
    /// the state vector.
    fn filtprob(&self) -> f64;
    fn set_filtprob(&mut self, filtprob: f64);

    /// Log10 probability of the most probable sequence ending in this
    /// candidate; `-∞` before any sequence reaches it.
    fn seqprob(&self) -> f64;
    fn set_seqprob(&mut self, seqprob: f64);

    fn time(&self) -> Option<i64>;
    fn set_time(&mut self, time: i64);

    fn predecessor(&self) -> Option<&Arc<Self>>;
    fn set_predecessor(&mut self, predecessor: Option<Arc<Self>>);

    fn transition(&self) -> Option<&Self::Transition>;
    fn set_transition(&mut self, transition: Option<Self::Transition>);

    /// Stable ordering key for deterministic tie-breaking. The map matcher
    /// binds this to the candidate's edge id.
    fn ident(&self) -> i64;
}

/// Hidden Markov Model filter for online inference of states in a
/// stochastic process.
///
/// Implementors supply the emission model ([`Filter::candidates`]) and the
/// transition model ([`Filter::transition`]); the provided
/// [`Filter::execute`] runs one forward step, turning the predecessor state
/// vector `S_t-1` and the sample `z_t` into the state vector `S_t`.
pub trait Filter {
    type Candidate: StateCandidate<Transition = Self::Transition, Sample = Self::Sample>;
    type Transition: StateTransition + Clone;
    type Sample: Sample;

    /// State candidates for the sample, paired with their emission
    /// probabilities. Order must be deterministic.
    fn candidates(
        &self,
        predecessors: &[Arc<Self::Candidate>],
        sample: &Self::Sample,
        radius: Option<f64>,
    ) -> Vec<(Self::Candidate, f64)>;

    /// Transition and transition probability from a predecessor to a
    /// candidate, or `None` if the candidate cannot be reached.
    fn transition(
        &self,
        predecessor: (&Self::Sample, &Arc<Self::Candidate>),
        candidate: (&Self::Sample, &Self::Candidate),
    ) -> Option<(Self::Transition, f64)>;

    /// Transition matrix for all predecessor/candidate pairs, indexed as
    /// `matrix[predecessor][candidate]`.
    ///
    /// Defaults to one [`Filter::transition`] call per pair; implementors
    /// may override it to batch the work (the map matcher issues one
    /// multi-target routing request per predecessor).
    fn transitions(
        &self,
        predecessors: (&Self::Sample, &[Arc<Self::Candidate>]),
        candidates: (&Self::Sample, &[(Self::Candidate, f64)]),
    ) -> Vec<Vec<Option<(Self::Transition, f64)>>> {
        let (previous, predecessors) = predecessors;
        let (sample, candidates) = candidates;

        predecessors
            .iter()
            .map(|predecessor| {
                candidates
                    .iter()
                    .map(|(candidate, _)| {
                        self.transition((previous, predecessor), (sample, candidate))
                    })
                    .collect()
            })
            .collect()
    }

    /// Executes one HMM filter step.
    ///
    /// The predecessor vector may be empty, either in the initial case or
    /// the step after an HMM break. The result carries normalized filter
    /// probabilities and may itself be empty if no candidate emits.
    fn execute(
        &self,
        predecessors: &[Arc<Self::Candidate>],
        previous: Option<&Self::Sample>,
        sample: &Self::Sample,
        radius: Option<f64>,
    ) -> Vec<Arc<Self::Candidate>> {
        let mut candidates = self.candidates(predecessors, sample, radius);
        trace!("{} state candidates at time {}", candidates.len(), sample.time());

        let mut keep = vec![false; candidates.len()];
        let mut normsum = 0.0;

        if let (false, Some(previous)) = (predecessors.is_empty(), previous) {
            let matrix = self.transitions((previous, predecessors), (sample, candidates.as_slice()));

            for (column, (candidate, emission)) in candidates.iter_mut().enumerate() {
                candidate.set_filtprob(0.0);
                candidate.set_seqprob(f64::NEG_INFINITY);

                // Predecessor currently backing the candidate's seqprob.
                let mut best: Option<&Arc<Self::Candidate>> = None;

                for (row, predecessor) in predecessors.iter().enumerate() {
                    let Some((transition, probability)) = &matrix[row][column] else {
                        continue;
                    };
                    if *probability <= 0.0 {
                        continue;
                    }

                    candidate
                        .set_filtprob(candidate.filtprob() + probability * predecessor.filtprob());

                    let seqprob = predecessor.seqprob() + probability.log10() + emission.log10();

                    let take = if seqprob > candidate.seqprob() {
                        true
                    } else if seqprob == candidate.seqprob() {
                        // Deterministic tie-break: fewer route edges first,
                        // then the smaller predecessor ordering key.
                        match candidate.transition().map(StateTransition::hops) {
                            Some(current) if current != transition.hops() => {
                                transition.hops() < current
                            }
                            _ => best.is_none_or(|b| predecessor.ident() < b.ident()),
                        }
                    } else {
                        false
                    };

                    if take {
                        candidate.set_predecessor(Some(Arc::clone(predecessor)));
                        candidate.set_transition(Some(transition.clone()));
                        candidate.set_seqprob(seqprob);
                        best = Some(predecessor);
                    }
                }

                if candidate.filtprob() == 0.0 || candidate.filtprob().is_nan() {
                    continue;
                }

                candidate.set_filtprob(candidate.filtprob() * *emission);
                candidate.set_time(sample.time());
                keep[column] = true;
                normsum += candidate.filtprob();
            }

            if !candidates.is_empty() && !keep.contains(&true) {
                info!("HMM break - no state transitions at time {}", sample.time());
            }
        }

        // Restart case: the initial step, or every candidate was dropped.
        if predecessors.is_empty() || previous.is_none() || !keep.contains(&true) {
            normsum = 0.0;

            for ((candidate, emission), kept) in candidates.iter_mut().zip(keep.iter_mut()) {
                if *emission <= 0.0 {
                    continue;
                }

                candidate.set_filtprob(*emission);
                candidate.set_seqprob(emission.log10());
                candidate.set_time(sample.time());
                *kept = true;
                normsum += *emission;
            }

            if !keep.contains(&true) {
                info!("HMM break - no state emissions at time {}", sample.time());
            }
        }

        // Normalize; a degenerate normsum yields zero probabilities rather
        // than NaN.
        for ((candidate, _), kept) in candidates.iter_mut().zip(&keep) {
            if !kept {
                continue;
            }

            let normalized = candidate.filtprob() / normsum;
            candidate.set_filtprob(if normalized.is_nan() { 0.0 } else { normalized });
        }

        candidates
            .into_iter()
            .zip(keep)
            .filter_map(|((candidate, _), kept)| kept.then(|| Arc::new(candidate)))
            .collect()
    }
}
