//! Fixed private replies.

use crate::{handlers::private::REMOVE_COMMANDS, kaomoji::KaomojiTable};

/// Every private reply the bot can send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
    TooManyArguments,
    Stored,
    Updated,
    Removed,
    InfoFound,
    NothingOnFile,
    Help,
    Unrecognized,
    /// Sent when a stream message could be rewritten but its author has no key on file.
    SetupPrompt,
    /// The credential store failed for a reason other than duplicate/not-found.
    StoreUnavailable,
}

impl Reply {
    /// Text sent to the user. `Help` includes the command syntax and the keyword table.
    pub fn render(self, command: &str, table: &KaomojiTable) -> String {
        match self {
            Reply::TooManyArguments => {
                "That's too many arguments for me. Send me one word at a time, \
                 or `help` to see what I understand. (・_・;)"
                    .to_string()
            }
            Reply::Stored => {
                "Your API key was successfully stored! Now go use some kaomojis. ＼(＾▽＾)／"
                    .to_string()
            }
            Reply::Updated => "Your API key was successfully updated. (⌒‿⌒)".to_string(),
            Reply::Removed => "Your API key was successfully removed! ＼(≧▽≦)／".to_string(),
            Reply::InfoFound => format!(
                "I have your data! Send me one of the following commands to remove it: `{}` (◕‿◕)",
                REMOVE_COMMANDS.join("`, `")
            ),
            Reply::NothingOnFile => "I don't have your data, so rest assured. (-‿‿-)".to_string(),
            Reply::Help => help_text(command, table),
            Reply::Unrecognized => r"I have no idea what you mean. ¯\_(ツ)_/¯".to_string(),
            Reply::SetupPrompt => format!(
                "I'd love to add kaomojis to your messages, but I need your API key first. \
                 Send it to me in a private message, or send me `help` for details. \
                 (Example usage on a stream: `{command} shrug`) (⌒_⌒;)"
            ),
            Reply::StoreUnavailable => {
                "Something went wrong on my side and I couldn't reach my database. \
                 Please try again later. (╯︵╰,)"
                    .to_string()
            }
        }
    }
}

fn help_text(command: &str, table: &KaomojiTable) -> String {
    format!(
        "Set me up & manage your private API key:\n\
         * Send me your API key so I can edit your comments and include awesome kaomojis! (*^ω^)\n\
         * Send me `info` to check if I have your API key or not. (^_~)\n\
         * Send me one of the following commands to delete your information from my database: `{removes}` ┐(￣ヘ￣;)┌\n\
         * Send me the text `help` to see this message. (⌒_⌒;)\n\
         \n\
         Example usage on a stream: `{command} <keyword>`\n\
         Available keywords & corresponding kaomojis:\n\
         ```\n\
         {table}\n\
         ```",
        removes = REMOVE_COMMANDS.join("`, `"),
        table = table.to_pretty_json(),
    )
}
