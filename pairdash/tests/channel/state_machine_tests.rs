use pairdash::ReconnectConfig;
use pairdash::channel::state_machine::{Action, ChannelState, Event, Machine};

use crate::helpers::{BTC, ETH, pair};

fn machine() -> Machine {
    Machine::new(ReconnectConfig {
        max_attempts: 5,
        delay_ms: 5000,
    })
}

fn connected(p: &str) -> Machine {
    let (m, _) = machine().handle(Event::ConnectRequested { pair: pair(p) });
    let (m, _) = m.handle(Event::Opened);
    m
}

#[test]
fn connect_from_idle_opens_socket() {
    let (m, actions) = machine().handle(Event::ConnectRequested { pair: pair(BTC) });
    assert_eq!(m.state, ChannelState::Connecting);
    assert_eq!(m.pair, Some(pair(BTC)));
    assert_eq!(
        actions,
        vec![Action::CancelReconnect, Action::OpenSocket { pair: pair(BTC) }]
    );
}

#[test]
fn connect_while_open_closes_prior_socket_first() {
    let (m, actions) = connected(BTC).handle(Event::ConnectRequested { pair: pair(ETH) });
    assert_eq!(m.state, ChannelState::Connecting);
    assert_eq!(
        actions,
        vec![
            Action::CancelReconnect,
            Action::CloseSocket,
            Action::OpenSocket { pair: pair(ETH) },
        ]
    );
}

#[test]
fn drop_schedules_fixed_delay_reconnect() {
    let (m, actions) = connected(BTC).handle(Event::Dropped);
    assert_eq!(m.state, ChannelState::Reconnecting);
    assert_eq!(m.attempt, 1);
    assert_eq!(actions, vec![Action::ScheduleReconnect { delay_ms: 5000 }]);

    let (m, actions) = m.handle(Event::ReconnectTimerFired);
    assert_eq!(m.state, ChannelState::Connecting);
    assert_eq!(actions, vec![Action::OpenSocket { pair: pair(BTC) }]);
}

#[test]
fn fails_after_max_attempts_and_connect_resets() {
    let (mut m, _) = machine().handle(Event::ConnectRequested { pair: pair(BTC) });
    let mut scheduled = 0;
    loop {
        let (next, actions) = m.handle(Event::Dropped);
        m = next;
        if m.state == ChannelState::Failed {
            assert_eq!(actions, vec![Action::CloseSocket]);
            break;
        }
        scheduled += 1;
        let (next, _) = m.handle(Event::ReconnectTimerFired);
        m = next;
    }
    assert_eq!(scheduled, 5);
    assert_eq!(m.attempt, 5);

    // Failed is terminal for automatic events.
    let (m, actions) = m.handle(Event::ReconnectTimerFired);
    assert_eq!(m.state, ChannelState::Failed);
    assert!(actions.is_empty());

    let (m, _) = m.handle(Event::ConnectRequested { pair: pair(BTC) });
    assert_eq!(m.state, ChannelState::Connecting);
    assert_eq!(m.attempt, 0);
}

#[test]
fn successful_open_resets_attempts() {
    let (m, _) = connected(BTC).handle(Event::Dropped);
    let (m, _) = m.handle(Event::ReconnectTimerFired);
    let (m, _) = m.handle(Event::Dropped);
    assert_eq!(m.attempt, 2);
    let (m, _) = m.handle(Event::ReconnectTimerFired);
    let (m, _) = m.handle(Event::Opened);
    assert_eq!(m.state, ChannelState::Open);
    assert_eq!(m.attempt, 0);
}

#[test]
fn disconnect_cancels_timer_from_any_state() {
    let (reconnecting, _) = connected(BTC).handle(Event::Dropped);
    for m in [machine(), connected(BTC), reconnecting] {
        let (m, actions) = m.handle(Event::DisconnectRequested);
        assert_eq!(m.state, ChannelState::Closed);
        assert_eq!(actions, vec![Action::CancelReconnect, Action::CloseSocket]);
    }
}

#[test]
fn stale_events_after_close_are_ignored() {
    let (closed, _) = connected(BTC).handle(Event::DisconnectRequested);
    for ev in [Event::Opened, Event::Dropped, Event::ReconnectTimerFired] {
        let (m, actions) = closed.clone().handle(ev);
        assert_eq!(m.state, ChannelState::Closed);
        assert!(actions.is_empty());
    }
}
