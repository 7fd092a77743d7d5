//! Data that drives a lazy reparse.
//!
//! A full parse records, per function, the flags it computed and the
//! position of its closing brace. A later parse that only needs one function
//! uses that record to skip every body it does not have to see.

use esfront_ast::{FunctionFlags, FunctionId, ParserState};
use esfront_core::collections::OrderedMap;

/// What a previous parse learned about one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedFunction {
    pub flags: FunctionFlags,
    /// Absent for functions whose body is a single expression.
    pub end_state: Option<ParserState>,
}

/// Function id to recorded data, in the order the functions were finished.
pub type FunctionDataMap = OrderedMap<FunctionId, RecordedFunction>;

/// The function a lazy reparse is meant to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReparsedFunction {
    pub function_id: FunctionId,
    pub flags: FunctionFlags,
    pub end_state: Option<ParserState>,
}

impl ReparsedFunction {
    pub fn from_recorded(data: &FunctionDataMap, function_id: FunctionId) -> Option<Self> {
        data.get(&function_id).map(|recorded| ReparsedFunction {
            function_id,
            flags: recorded.flags,
            end_state: recorded.end_state,
        })
    }
}

/// The target of a lazy reparse together with the data for every function.
#[derive(Debug)]
pub(crate) struct LazyPlan {
    target: ReparsedFunction,
    data: FunctionDataMap,
}

impl LazyPlan {
    pub(crate) fn new(target: ReparsedFunction, data: FunctionDataMap) -> Self {
        Self { target, data }
    }

    pub(crate) fn recorded(&self, id: FunctionId) -> Option<&RecordedFunction> {
        self.data.get(&id)
    }

    /// A body is parsed when it is the target, encloses the target, or lies
    /// inside the target. Any other body with recorded data is skipped.
    pub(crate) fn should_parse_body(&self, id: FunctionId) -> bool {
        let target = self.target.function_id;
        if id == target {
            return true;
        }
        let Some(recorded) = self.data.get(&id) else {
            return true;
        };
        let encloses_target = id < target
            && recorded
                .end_state
                .map_or(false, |state| target.0 < state.position);
        let inside_target = id > target
            && self
                .target
                .end_state
                .map_or(false, |state| id.0 < state.position);
        encloses_target || inside_target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(position: u32) -> Option<ParserState> {
        Some(ParserState {
            position,
            line: 1,
            line_position: 0,
        })
    }

    fn plan() -> LazyPlan {
        // function a() { function b() { function c() {} } }  function d() {}
        let mut data = FunctionDataMap::new();
        for (id, end) in [(0, 40), (15, 38), (30, 36), (45, 60)] {
            data.insert(
                FunctionId(id),
                RecordedFunction {
                    flags: FunctionFlags::empty(),
                    end_state: state(end),
                },
            );
        }
        let target = ReparsedFunction::from_recorded(&data, FunctionId(15)).unwrap();
        LazyPlan::new(target, data)
    }

    #[test]
    fn test_target_ancestor_and_nested_bodies_are_parsed() {
        let plan = plan();
        assert!(plan.should_parse_body(FunctionId(15)));
        assert!(plan.should_parse_body(FunctionId(0)));
        assert!(plan.should_parse_body(FunctionId(30)));
    }

    #[test]
    fn test_sibling_body_is_skipped() {
        let plan = plan();
        assert!(!plan.should_parse_body(FunctionId(45)));
    }

    #[test]
    fn test_unrecorded_body_is_parsed() {
        let plan = plan();
        assert!(plan.should_parse_body(FunctionId(70)));
        assert!(plan.recorded(FunctionId(70)).is_none());
    }
}
