#![cfg(test)]

use std::collections::HashMap;
use std::sync::Arc;

use super::filter::{Filter, Sample, StateCandidate, StateTransition};
use super::kstate::KState;

#[derive(Clone, Debug)]
struct Hop {
    hops: usize,
}

impl StateTransition for Hop {
    fn hops(&self) -> usize {
        self.hops
    }
}

struct Tick {
    time: i64,
}

impl Sample for Tick {
    fn time(&self) -> i64 {
        self.time
    }
}

#[derive(Debug)]
struct Mock {
    ident: i64,
    filtprob: f64,
    seqprob: f64,
    time: Option<i64>,
    predecessor: Option<Arc<Mock>>,
    transition: Option<Hop>,
}

impl Mock {
    fn new(ident: i64) -> Mock {
        Mock {
            ident,
            filtprob: 0.0,
            seqprob: f64::NEG_INFINITY,
            time: None,
            predecessor: None,
            transition: None,
        }
    }

    fn predecessor_of(ident: i64, filtprob: f64, seqprob: f64) -> Arc<Mock> {
        Arc::new(Mock {
            filtprob,
            seqprob,
            ..Mock::new(ident)
        })
    }
}

impl StateCandidate for Mock {
    type Transition = Hop;
    type Sample = Tick;

    fn filtprob(&self) -> f64 {
        self.filtprob
    }

    fn set_filtprob(&mut self, filtprob: f64) {
        self.filtprob = filtprob;
    }

    fn seqprob(&self) -> f64 {
        self.seqprob
    }

    fn set_seqprob(&mut self, seqprob: f64) {
        self.seqprob = seqprob;
    }

    fn time(&self) -> Option<i64> {
        self.time
    }

    fn set_time(&mut self, time: i64) {
        self.time = Some(time);
    }

    fn predecessor(&self) -> Option<&Arc<Mock>> {
        self.predecessor.as_ref()
    }

    fn set_predecessor(&mut self, predecessor: Option<Arc<Mock>>) {
        self.predecessor = predecessor;
    }

    fn transition(&self) -> Option<&Hop> {
        self.transition.as_ref()
    }

    fn set_transition(&mut self, transition: Option<Hop>) {
        self.transition = transition;
    }

    fn ident(&self) -> i64 {
        self.ident
    }
}

/// Table-driven filter: fixed emissions per candidate ident, fixed
/// transitions per (predecessor, candidate) ident pair.
struct TableFilter {
    emissions: Vec<(i64, f64)>,
    transitions: HashMap<(i64, i64), (usize, f64)>,
}

impl Filter for TableFilter {
    type Candidate = Mock;
    type Transition = Hop;
    type Sample = Tick;

    fn candidates(
        &self,
        _predecessors: &[Arc<Mock>],
        _sample: &Tick,
        _radius: Option<f64>,
    ) -> Vec<(Mock, f64)> {
        self.emissions
            .iter()
            .map(|(ident, emission)| (Mock::new(*ident), *emission))
            .collect()
    }

    fn transition(
        &self,
        predecessor: (&Tick, &Arc<Mock>),
        candidate: (&Tick, &Mock),
    ) -> Option<(Hop, f64)> {
        self.transitions
            .get(&(predecessor.1.ident, candidate.1.ident))
            .map(|(hops, probability)| (Hop { hops: *hops }, *probability))
    }
}

#[test]
fn empty_predecessors_normalize_emissions() {
    let filter = TableFilter {
        emissions: vec![(1, 0.6), (2, 0.2), (3, 0.2)],
        transitions: HashMap::new(),
    };

    let result = filter.execute(&[], None, &Tick { time: 1000 }, None);
    assert_eq!(result.len(), 3);

    let total = 0.6 + 0.2 + 0.2;
    for (candidate, emission) in result.iter().zip([0.6, 0.2, 0.2]) {
        assert!((candidate.filtprob() - emission / total).abs() < 1e-12);
        assert!((candidate.seqprob() - emission.log10()).abs() < 1e-12);
        assert_eq!(candidate.time(), Some(1000));
        assert!(candidate.predecessor().is_none());
    }
}

#[test]
fn zero_emissions_are_dropped_in_the_initial_step() {
    let filter = TableFilter {
        emissions: vec![(1, 0.0), (2, 0.5)],
        transitions: HashMap::new(),
    };

    let result = filter.execute(&[], None, &Tick { time: 0 }, None);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].ident(), 2);
    assert!((result[0].filtprob() - 1.0).abs() < 1e-12);
}

#[test]
fn forward_pass_accumulates_and_normalizes() {
    let mut transitions = HashMap::new();
    transitions.insert((1, 10), (1, 0.8));
    transitions.insert((2, 10), (1, 0.4));
    transitions.insert((2, 11), (2, 0.6));

    let filter = TableFilter {
        emissions: vec![(10, 0.5), (11, 0.25)],
        transitions,
    };

    let predecessors = vec![
        Mock::predecessor_of(1, 0.5, -1.0),
        Mock::predecessor_of(2, 0.5, -1.0),
    ];

    let result = filter.execute(&predecessors, Some(&Tick { time: 0 }), &Tick { time: 1000 }, None);
    assert_eq!(result.len(), 2);

    // Unnormalized: c10 = (0.8·0.5 + 0.4·0.5)·0.5 = 0.3, c11 = 0.6·0.5·0.25 = 0.075.
    let sum: f64 = result.iter().map(|c| c.filtprob()).sum();
    assert!((sum - 1.0).abs() < 1e-12, "filter probabilities sum to one");
    assert!((result[0].filtprob() - 0.3 / 0.375).abs() < 1e-12);
    assert!((result[1].filtprob() - 0.075 / 0.375).abs() < 1e-12);

    // c10's best sequence runs through p1: -1 + log10(0.8) + log10(0.5).
    let expected = -1.0 + 0.8f64.log10() + 0.5f64.log10();
    assert!((result[0].seqprob() - expected).abs() < 1e-12);
    assert_eq!(result[0].predecessor().unwrap().ident(), 1);
    assert_eq!(result[1].predecessor().unwrap().ident(), 2);
}

#[test]
fn unreachable_candidates_are_dropped() {
    let mut transitions = HashMap::new();
    transitions.insert((1, 10), (1, 0.8));

    let filter = TableFilter {
        emissions: vec![(10, 0.5), (11, 0.5)],
        transitions,
    };

    let predecessors = vec![Mock::predecessor_of(1, 1.0, 0.0)];
    let result = filter.execute(&predecessors, Some(&Tick { time: 0 }), &Tick { time: 1 }, None);

    assert_eq!(result.len(), 1, "candidate without transitions is dropped");
    assert_eq!(result[0].ident(), 10);
    assert!((result[0].filtprob() - 1.0).abs() < 1e-12);
}

#[test]
fn hmm_break_restarts_from_emissions() {
    // No transition reaches any candidate: the step degrades to the
    // initial case.
    let filter = TableFilter {
        emissions: vec![(10, 0.3), (11, 0.1)],
        transitions: HashMap::new(),
    };

    let predecessors = vec![Mock::predecessor_of(1, 1.0, 0.0)];
    let result = filter.execute(&predecessors, Some(&Tick { time: 0 }), &Tick { time: 1 }, None);

    assert_eq!(result.len(), 2);
    assert!((result[0].filtprob() - 0.75).abs() < 1e-12);
    assert!((result[1].filtprob() - 0.25).abs() < 1e-12);
    assert!((result[0].seqprob() - 0.3f64.log10()).abs() < 1e-12);
    assert!(result[0].predecessor().is_none(), "restart breaks the chain");
}

#[test]
fn ties_prefer_shorter_routes_then_smaller_idents() {
    // Identical seqprob contributions from both predecessors; the second
    // carries the shorter route.
    let mut transitions = HashMap::new();
    transitions.insert((1, 10), (3, 0.5));
    transitions.insert((5, 10), (1, 0.5));

    let filter = TableFilter {
        emissions: vec![(10, 0.5)],
        transitions,
    };

    let predecessors = vec![
        Mock::predecessor_of(1, 0.5, -1.0),
        Mock::predecessor_of(5, 0.5, -1.0),
    ];

    let result = filter.execute(&predecessors, Some(&Tick { time: 0 }), &Tick { time: 1 }, None);
    assert_eq!(result[0].predecessor().unwrap().ident(), 5, "fewer edges wins");
    assert_eq!(result[0].transition().unwrap().hops(), 1);

    // Equal route sizes: the smaller ident wins.
    let mut transitions = HashMap::new();
    transitions.insert((1, 10), (2, 0.5));
    transitions.insert((5, 10), (2, 0.5));

    let filter = TableFilter {
        emissions: vec![(10, 0.5)],
        transitions,
    };

    let predecessors = vec![
        Mock::predecessor_of(5, 0.5, -1.0),
        Mock::predecessor_of(1, 0.5, -1.0),
    ];

    let result = filter.execute(&predecessors, Some(&Tick { time: 0 }), &Tick { time: 1 }, None);
    assert_eq!(result[0].predecessor().unwrap().ident(), 1, "smaller ident wins");
}

#[test]
fn repeated_execution_is_deterministic() {
    let mut transitions = HashMap::new();
    transitions.insert((1, 10), (1, 0.7));
    transitions.insert((1, 11), (2, 0.3));
    transitions.insert((2, 10), (2, 0.7));
    transitions.insert((2, 11), (1, 0.3));

    let filter = TableFilter {
        emissions: vec![(10, 0.4), (11, 0.6)],
        transitions,
    };

    let run = || {
        let predecessors = vec![
            Mock::predecessor_of(1, 0.5, -1.0),
            Mock::predecessor_of(2, 0.5, -1.0),
        ];
        filter
            .execute(&predecessors, Some(&Tick { time: 0 }), &Tick { time: 1 }, None)
            .iter()
            .map(|c| (c.ident(), c.filtprob(), c.seqprob(), c.predecessor().unwrap().ident()))
            .collect::<Vec<_>>()
    };

    let first = run();
    for _ in 0..8 {
        assert_eq!(run(), first);
    }
}

#[test]
fn kstate_prunes_by_count_and_age() {
    let mut window: KState<Mock, Tick> = KState::new(Some(2), None);

    for time in [0, 1000, 2000, 3000] {
        window.update(vec![Arc::new(Mock::new(time))], Tick { time });
    }
    assert_eq!(window.len(), 2, "count bound keeps the last two frames");
    assert_eq!(window.time(), Some(3000));

    let mut window: KState<Mock, Tick> = KState::new(None, Some(1500));
    for time in [0, 1000, 2000, 3000] {
        window.update(vec![Arc::new(Mock::new(time))], Tick { time });
    }
    assert_eq!(window.len(), 2, "age bound keeps the trailing 1.5s");
    assert!(window.vector().len() == 1);
}

#[test]
fn kstate_estimates_and_walks_the_sequence() {
    let mut window: KState<Mock, Tick> = KState::unbounded();

    let root = Mock::predecessor_of(1, 1.0, -0.5);
    window.update(vec![Arc::clone(&root)], Tick { time: 0 });

    let mut strong = Mock::new(7);
    strong.set_filtprob(0.7);
    strong.set_seqprob(-1.0);
    strong.set_predecessor(Some(Arc::clone(&root)));

    let mut weak = Mock::new(3);
    weak.set_filtprob(0.3);
    weak.set_seqprob(-2.0);
    weak.set_predecessor(Some(Arc::clone(&root)));

    window.update(vec![Arc::new(weak), Arc::new(strong)], Tick { time: 1000 });

    assert_eq!(window.estimate().unwrap().ident(), 7, "highest filtprob");

    let chain = window.sequence();
    assert_eq!(
        chain.iter().map(|c| c.ident()).collect::<Vec<_>>(),
        vec![1, 7],
        "chain walks from the best seqprob back to the root"
    );
}
