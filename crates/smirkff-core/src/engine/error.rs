use thiserror::Error;

use crate::core::forcefield::class::InteractionClass;
use crate::core::models::molecule::GraphError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "No {class} rule matches atoms {atoms:?} ({unassigned} {class} site(s) left unassigned in total)"
    )]
    UnassignableSite {
        class: InteractionClass,
        atoms: Vec<usize>,
        unassigned: usize,
    },

    #[error("Malformed molecular graph: {source}")]
    MalformedGraph {
        #[from]
        source: GraphError,
    },

    #[error("Assignment panicked: {message}")]
    Panicked { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassignable_site_message_names_class_and_atoms() {
        let err = EngineError::UnassignableSite {
            class: InteractionClass::Bond,
            atoms: vec![0, 3],
            unassigned: 2,
        };
        let message = err.to_string();
        assert!(message.contains("bonds"));
        assert!(message.contains("[0, 3]"));
        assert!(message.contains("2 bonds site(s)"));
    }

    #[test]
    fn graph_errors_convert_into_malformed_graph() {
        let err: EngineError = GraphError::SelfBond { bond: 0, atom: 1 }.into();
        assert!(matches!(err, EngineError::MalformedGraph { .. }));
    }
}
