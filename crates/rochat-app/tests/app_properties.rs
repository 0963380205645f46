//! Property tests for the application state machine.

use proptest::prelude::*;
use rochat_app::{App, AppEvent, ChatConfig};
use rochat_client::NetworkConfig;
use rochat_proto::ChatMessage;

proptest! {
    /// History never exceeds the cap, and what survives is always the
    /// newest suffix of what arrived.
    #[test]
    fn history_is_bounded_and_newest_wins(
        cap in 1usize..20,
        count in 0usize..60,
    ) {
        let mut app = App::with_config(NetworkConfig::default(), ChatConfig {
            max_history: cap,
            ..ChatConfig::default()
        });

        for n in 0..count {
            app.handle(AppEvent::MessageReceived(ChatMessage::new(
                "bob",
                format!("m{n}"),
                "general",
            )));
        }

        match app.channel("general") {
            None => prop_assert_eq!(count, 0),
            Some(channel) => {
                prop_assert!(channel.messages.len() <= cap);
                prop_assert_eq!(channel.messages.len(), count.min(cap));

                let first_kept = count.saturating_sub(cap);
                for (i, message) in channel.messages.iter().enumerate() {
                    prop_assert_eq!(&message.content, &format!("m{}", first_kept + i));
                }
            },
        }
    }

    /// Boundary validation: only lengths inside [min, max] produce a Send.
    #[test]
    fn submit_respects_length_bounds(length in 0usize..1100) {
        let mut app = App::new(NetworkConfig::default());
        let text = "a".repeat(length);
        let actions = app.submit_message("general", "alice", &text);

        let sent = actions
            .iter()
            .any(|a| matches!(a, rochat_app::AppAction::Send(_)));
        prop_assert_eq!(sent, (1..=1000).contains(&length));
    }
}
