//! Backoff schedule and exhaustion behavior, driven against the pure state
//! machine with explicit instants.

use std::time::{Duration, Instant};

use proptest::prelude::*;
use rochat_client::{
    ChatEvent, ConnectionAction, ConnectionConfig, ConnectionEvent, ConnectionManager,
    ConnectionState,
};
use rochat_moderation::ModerationEngine;
use rochat_proto::ChatMessage;

fn manager() -> ConnectionManager {
    ConnectionManager::new(ConnectionConfig::default(), ModerationEngine::default())
}

fn connected_manager(now: Instant) -> ConnectionManager {
    let mut m = manager();
    m.handle(
        ConnectionEvent::ConnectRequested { address: "chat.example".to_string(), port: 8443 },
        now,
    )
    .expect("connect from Disconnected");
    m.handle(ConnectionEvent::TransportConnected, now).expect("transport connected");
    assert_eq!(m.state(), ConnectionState::Connected);
    m
}

fn reconnect_delay(actions: &[ConnectionAction]) -> Option<(u32, Duration)> {
    actions.iter().find_map(|a| match a {
        ConnectionAction::Notify(ChatEvent::Reconnecting { attempt, delay }) => {
            Some((*attempt, *delay))
        },
        _ => None,
    })
}

#[test]
fn backoff_delays_are_linear_then_failed() {
    let mut now = Instant::now();
    let mut m = connected_manager(now);

    // Five consecutive failed attempts: delays 3000, 6000, 9000, 12000,
    // 15000 ms.
    for attempt in 1..=5u32 {
        let actions = m
            .handle(ConnectionEvent::TransportDisconnected, now)
            .expect("disconnect event");
        assert_eq!(m.state(), ConnectionState::Reconnecting);

        let (got_attempt, delay) = reconnect_delay(&actions).expect("reconnecting notice");
        assert_eq!(got_attempt, attempt);
        assert_eq!(delay, Duration::from_millis(3000) * attempt);

        // Early tick: deadline not reached, nothing fires.
        let early = now + delay - Duration::from_millis(1);
        assert!(m.handle(ConnectionEvent::Tick, early).expect("tick").is_empty());
        assert_eq!(m.state(), ConnectionState::Reconnecting);

        // Deadline tick: re-dials the remembered endpoint.
        now += delay;
        let actions = m.handle(ConnectionEvent::Tick, now).expect("tick");
        assert!(
            actions.iter().any(|a| matches!(
                a,
                ConnectionAction::Dial { address, port: 8443 } if address == "chat.example"
            )),
            "attempt {attempt} should dial"
        );
        assert_eq!(m.state(), ConnectionState::Connecting);
    }

    // The fifth attempt failing exhausts the budget.
    let actions =
        m.handle(ConnectionEvent::TransportDisconnected, now).expect("final disconnect");
    assert_eq!(m.state(), ConnectionState::Failed);
    assert!(actions
        .iter()
        .any(|a| matches!(a, ConnectionAction::Notify(ChatEvent::Failed { attempts: 5 }))));

    // Failed is terminal: no timer is scheduled, ticks do nothing.
    for minutes in 1..=5u64 {
        let later = now + Duration::from_secs(60 * minutes);
        assert!(m.handle(ConnectionEvent::Tick, later).expect("tick").is_empty());
    }
    assert_eq!(m.state(), ConnectionState::Failed);
}

#[test]
fn successful_reconnect_resets_the_counter() {
    let mut now = Instant::now();
    let mut m = connected_manager(now);

    // Two failed attempts...
    for _ in 0..2 {
        let actions =
            m.handle(ConnectionEvent::TransportDisconnected, now).expect("disconnect");
        let (_, delay) = reconnect_delay(&actions).expect("reconnecting notice");
        now += delay;
        m.handle(ConnectionEvent::Tick, now).expect("tick");
    }
    assert_eq!(m.attempts(), 2);

    // ...then one succeeds.
    m.handle(ConnectionEvent::TransportConnected, now).expect("transport connected");
    assert_eq!(m.state(), ConnectionState::Connected);
    assert_eq!(m.attempts(), 0);

    // The next loss starts over at attempt 1 / 3000 ms.
    let actions = m.handle(ConnectionEvent::TransportDisconnected, now).expect("disconnect");
    assert_eq!(reconnect_delay(&actions), Some((1, Duration::from_millis(3000))));
}

#[test]
fn messages_queued_during_outage_flush_on_recovery() {
    let mut now = Instant::now();
    let mut m = connected_manager(now);

    m.handle(ConnectionEvent::TransportDisconnected, now).expect("disconnect");

    for n in 0..4 {
        let msg = ChatMessage::new("alice", format!("outage {n}"), "general");
        m.handle(ConnectionEvent::SendRequested(msg), now).expect("send");
    }
    assert_eq!(m.queued(), 4);

    // Retry fires and succeeds; the backlog flushes in FIFO order.
    now += Duration::from_millis(3000);
    m.handle(ConnectionEvent::Tick, now).expect("tick");
    let actions = m.handle(ConnectionEvent::TransportConnected, now).expect("connected");

    let frames: Vec<&String> = actions
        .iter()
        .filter_map(|a| match a {
            ConnectionAction::Transmit(text) => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(frames.len(), 4);
    for (n, frame) in frames.iter().enumerate() {
        assert!(frame.contains(&format!("outage {n}")), "frame {n} out of order");
    }
    assert_eq!(m.queued(), 0);
}

proptest! {
    /// Zero loss under arbitrary outage patterns: every message submitted
    /// during any mix of outages, failed retries, and exhaustion ends up on
    /// the wire exactly once, in submission order.
    #[test]
    fn messages_survive_arbitrary_outage_patterns(
        rounds in prop::collection::vec((0usize..4, 0u32..6), 1..8),
    ) {
        let mut now = Instant::now();
        let mut m = connected_manager(now);
        let mut expected: Vec<String> = Vec::new();
        let mut flushed: Vec<String> = Vec::new();
        let mut counter = 0usize;

        for (burst, failures) in rounds {
            // Link drops.
            let actions =
                m.handle(ConnectionEvent::TransportDisconnected, now).expect("disconnect");
            let mut delay = reconnect_delay(&actions).map(|(_, d)| d);

            // Messages submitted mid-outage.
            for _ in 0..burst {
                let content = format!("m{counter}");
                counter += 1;
                expected.push(content.clone());
                m.handle(
                    ConnectionEvent::SendRequested(ChatMessage::new(
                        "alice", content, "general",
                    )),
                    now,
                )
                .expect("send");
            }

            // Some retries fail before recovery.
            for _ in 0..failures {
                if m.state() == ConnectionState::Failed {
                    break;
                }
                let d = delay.take().expect("reconnecting carries a delay");
                now += d;
                m.handle(ConnectionEvent::Tick, now).expect("tick dials");
                let actions = m
                    .handle(ConnectionEvent::TransportDisconnected, now)
                    .expect("retry fails");
                delay = reconnect_delay(&actions).map(|(_, d)| d);
            }

            // Recovery: a due retry, or an explicit connect after exhaustion.
            if m.state() == ConnectionState::Failed {
                m.handle(
                    ConnectionEvent::ConnectRequested {
                        address: "chat.example".to_string(),
                        port: 8443,
                    },
                    now,
                )
                .expect("connect from Failed");
            } else {
                let d = delay.take().expect("reconnecting carries a delay");
                now += d;
                m.handle(ConnectionEvent::Tick, now).expect("tick dials");
            }
            prop_assert_eq!(m.state(), ConnectionState::Connecting);

            let actions =
                m.handle(ConnectionEvent::TransportConnected, now).expect("recovered");
            for action in &actions {
                if let ConnectionAction::Transmit(frame) = action {
                    flushed.push(frame.clone());
                }
            }
            prop_assert_eq!(m.state(), ConnectionState::Connected);
            prop_assert_eq!(m.queued(), 0);
        }

        prop_assert_eq!(flushed.len(), expected.len());
        for (frame, content) in flushed.iter().zip(&expected) {
            prop_assert!(
                frame.contains(&format!("\"content\":\"{content}\"")),
                "expected {} in {}", content, frame
            );
        }
    }
}
