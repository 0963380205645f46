//! Application output actions.

use rochat_proto::ChatMessage;

/// Instructions the App returns for the host to execute.
///
/// Protocol actions map onto the client driver's fire-and-forget handle;
/// `Render` and `Quit` stay with the host.
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Redraw the UI from current state.
    Render,

    /// Ask the client driver to connect.
    Connect {
        /// Server hostname or address.
        address: String,
        /// Server port.
        port: u16,
    },

    /// Ask the client driver to disconnect.
    Disconnect,

    /// Ask the client driver to deliver a message.
    Send(ChatMessage),

    /// Shut the application down.
    Quit,
}
