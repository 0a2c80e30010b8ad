use super::memory::FleetState;

/// Procedure status log retention policy (Open Question in spec.md §9,
/// decided in DESIGN.md): keep the most recent `max_retained` procedures,
/// evicting the oldest *terminal* procedures first. Non-terminal procedures
/// are never evicted regardless of age.
pub fn evict_if_needed(state: &mut FleetState, max_retained: usize) {
    while state.procedure_order.len() > max_retained {
        let evict_index = state
            .procedure_order
            .iter()
            .position(|id| state.procedures.get(id).map(|p| p.is_terminal()).unwrap_or(false));
        match evict_index {
            Some(idx) => {
                let id = state.procedure_order.remove(idx);
                state.procedures.remove(&id);
            }
            // Nothing terminal left to evict; stop rather than discard
            // in-flight procedures.
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{ProcedureRecord, TerminalState};
    use uuid::Uuid;

    #[test]
    fn evicts_oldest_terminal_first() {
        let mut state = FleetState::default();
        for _ in 0..3 {
            let id = Uuid::new_v4();
            let mut record = ProcedureRecord::new(id, "group.create");
            record.terminal = Some(TerminalState::Complete);
            state.procedures.insert(id, record);
            state.procedure_order.push(id);
        }
        evict_if_needed(&mut state, 1);
        assert_eq!(state.procedure_order.len(), 1);
        assert_eq!(state.procedures.len(), 1);
    }

    #[test]
    fn never_evicts_non_terminal() {
        let mut state = FleetState::default();
        let id = Uuid::new_v4();
        state
            .procedures
            .insert(id, ProcedureRecord::new(id, "group.promote"));
        state.procedure_order.push(id);
        evict_if_needed(&mut state, 0);
        assert_eq!(state.procedure_order.len(), 1);
    }
}
