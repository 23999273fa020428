
pub mod parser;
pub mod text;

/// The protocol version spoken by this client.
pub const PROTOCOL_VERSION: u32 = 1;

/// Separator between a command and its parameters on the wire.
pub const COMMAND_SEPARATOR: &str = ";";

/// A single outgoing protocol line.
///
/// If [`is_last`](Message::is_last) is set, the writer flushes after sending
/// it. Single messages default to last. Empty messages are never written; an
/// empty last message therefore only triggers a flush. This is useful when a
/// message producer does not know whether a created message is the last of a
/// bulk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    msg: String,
    last_message: bool,
}

impl Message {
    pub fn new(msg: impl Into<String>) -> Self {
        Message {
            msg: msg.into(),
            last_message: true,
        }
    }

    /// Literally indicates that "there is more": the writer will not flush
    /// after this message.
    pub fn there_is_more(mut self) -> Self {
        self.last_message = false;
        self
    }

    pub fn text(&self) -> &str {
        &self.msg
    }

    pub fn is_last(&self) -> bool {
        self.last_message
    }

    pub fn is_empty(&self) -> bool {
        self.msg.is_empty()
    }
}

/// Info codes for server errors, chat messages and speed changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoCode {
    /// Internal code, mainly used by the server.
    Ok,
    /// A chat message created by the server itself.
    ServerMessage,
    /// A chat message from one client to all others.
    ClientMessage,
    /// A chat message from one client to one other (whisper).
    ClientWhisper,
    /// A speed change.
    SpeedChange,
    /// The parameter value was incorrect. Mainly used for invalid nicknames.
    WrongParameterValue,
    /// The server is "full".
    TooManyClients,
    /// The nickname is already taken.
    DuplicateNick,
    /// The bot tried to step into a wall.
    WallCrash,
    /// The client sent a move command without waiting for "RDY.".
    ActionWithoutReady,
    /// The client tried to log in while already logged in.
    AlreadyLoggedIn,
    /// The client sent a command without being logged in.
    CommandBeforeLogin,
    /// The login timed out (from the server's perspective).
    LoginTimeout,
    /// The client sent an unparseable command.
    UnknownCommand,
    /// The expected number of parameters was incorrect.
    ParameterCountIncorrect,
    /// Internal code for an unknown error code.
    CompletelyUnknown,
}

impl InfoCode {
    pub fn code(self) -> u32 {
        match self {
            InfoCode::Ok => 0,
            InfoCode::ServerMessage => 200,
            InfoCode::ClientMessage => 201,
            InfoCode::ClientWhisper => 202,
            InfoCode::SpeedChange => 300,
            InfoCode::WrongParameterValue => 450,
            InfoCode::TooManyClients => 451,
            InfoCode::DuplicateNick => 452,
            InfoCode::WallCrash => 453,
            InfoCode::ActionWithoutReady => 454,
            InfoCode::AlreadyLoggedIn => 455,
            InfoCode::CommandBeforeLogin => 456,
            InfoCode::LoginTimeout => 457,
            InfoCode::UnknownCommand => 500,
            InfoCode::ParameterCountIncorrect => 501,
            InfoCode::CompletelyUnknown => 999,
        }
    }

    pub fn from_code(code: u32) -> InfoCode {
        match code {
            0 => InfoCode::Ok,
            200 => InfoCode::ServerMessage,
            201 => InfoCode::ClientMessage,
            202 => InfoCode::ClientWhisper,
            300 => InfoCode::SpeedChange,
            450 => InfoCode::WrongParameterValue,
            451 => InfoCode::TooManyClients,
            452 => InfoCode::DuplicateNick,
            453 => InfoCode::WallCrash,
            454 => InfoCode::ActionWithoutReady,
            455 => InfoCode::AlreadyLoggedIn,
            456 => InfoCode::CommandBeforeLogin,
            457 => InfoCode::LoginTimeout,
            500 => InfoCode::UnknownCommand,
            501 => InfoCode::ParameterCountIncorrect,
            _ => InfoCode::CompletelyUnknown,
        }
    }
}

/// Login request. A blank flavor is left out entirely.
pub fn hello_message(nick: &str, flavor: Option<&str>) -> Message {
    let mut parts = vec!["HELO", nick];
    if let Some(flavor) = flavor {
        if !flavor.trim().is_empty() {
            parts.push(flavor);
        }
    }
    Message::new(parts.join(COMMAND_SEPARATOR))
}

/// Requests the maze data after a successful login.
pub fn request_maze_message() -> Message {
    Message::new("MAZ?")
}

/// Logout request.
pub fn bye_message() -> Message {
    Message::new("BYE!")
}

// Movement
pub fn step_message() -> Message {
    Message::new("STEP")
}

pub fn turn_left_message() -> Message {
    Message::new("TURN;l")
}

pub fn turn_right_message() -> Message {
    Message::new("TURN;r")
}

/// A chat message to all players. The text must already be sanitized.
pub fn chat_message(message: &str) -> Message {
    let code = InfoCode::ClientMessage.code().to_string();
    Message::new(["INFO", code.as_str(), message].join(COMMAND_SEPARATOR))
}

/// A whisper to the player with `receiver_id`. The text must already be
/// sanitized.
pub fn whisper_message(message: &str, receiver_id: i32) -> Message {
    let code = InfoCode::ClientWhisper.code().to_string();
    let receiver = receiver_id.to_string();
    Message::new(["INFO", code.as_str(), message, receiver.as_str()].join(COMMAND_SEPARATOR))
}
