use kbdesk_core::{update, AppState, Msg};

#[test]
fn tick_leaves_state_untouched() {
    let state = AppState::new("web-user-test");
    let (mut next, effects) = update(state.clone(), Msg::Tick);

    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
    assert_eq!(state, next);
}
