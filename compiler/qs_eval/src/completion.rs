//! Statement completion records.

use qs_ir::Name;
use qs_object::{Thrown, Value};

/// How a statement finished.
///
/// Composite statements look at their children's completion, clear the
/// `Break`/`Continue` aimed at them and pass everything else up.
#[derive(Clone, Debug)]
pub(crate) enum Completion {
    Normal(Value),
    Break(Option<Name>),
    Continue(Option<Name>),
    Return(Value),
    Throw(Value),
}

impl Completion {
    pub(crate) fn empty() -> Self {
        Completion::Normal(Value::Undefined)
    }
}

impl From<Thrown> for Completion {
    fn from(thrown: Thrown) -> Self {
        Completion::Throw(thrown.0)
    }
}

/// Outcome of one loop iteration.
pub(crate) enum LoopStep {
    /// Keep iterating; the body produced this value.
    Next(Option<Value>),
    /// Leave the loop with this completion.
    Exit(Completion),
}

impl LoopStep {
    /// Classify a body completion against the loop's own labels.
    pub(crate) fn classify(completion: Completion, labels: &[Name]) -> Self {
        match completion {
            Completion::Normal(value) => LoopStep::Next(Some(value)),
            Completion::Continue(None) => LoopStep::Next(None),
            Completion::Continue(Some(label)) if labels.contains(&label) => LoopStep::Next(None),
            Completion::Break(None) => LoopStep::Exit(Completion::empty()),
            Completion::Break(Some(label)) if labels.contains(&label) => {
                LoopStep::Exit(Completion::empty())
            }
            other => LoopStep::Exit(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_labels_are_cleared() {
        let outer = Name::from_raw(7);
        let inner = Name::from_raw(8);

        assert!(matches!(
            LoopStep::classify(Completion::Break(Some(outer)), &[outer]),
            LoopStep::Exit(Completion::Normal(Value::Undefined))
        ));
        assert!(matches!(
            LoopStep::classify(Completion::Continue(Some(outer)), &[inner, outer]),
            LoopStep::Next(None)
        ));
    }

    #[test]
    fn foreign_labels_propagate() {
        let outer = Name::from_raw(7);
        let inner = Name::from_raw(8);

        assert!(matches!(
            LoopStep::classify(Completion::Continue(Some(outer)), &[inner]),
            LoopStep::Exit(Completion::Continue(Some(l))) if l == outer
        ));
        assert!(matches!(
            LoopStep::classify(Completion::Return(Value::Null), &[inner]),
            LoopStep::Exit(Completion::Return(Value::Null))
        ));
    }
}
