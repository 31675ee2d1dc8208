/// Asserts that every bounded field of the world is finite and in range.
#[macro_export]
macro_rules! assert_fields_bounded {
    ($world:expr) => {
        if let Err(e) = $world.check_invariants() {
            panic!("Field bounds violated at tick {}: {}", $world.tick, e);
        }
    };
}

/// Asserts the number of live agents.
#[macro_export]
macro_rules! assert_agent_count {
    ($world:expr, $count:expr) => {
        assert_eq!($world.agents().len(), $count, "Agent count mismatch");
    };
}
