use ringmenu::KeyIntent;
use std::str::FromStr;
use thiserror::Error;

/// Normalized input delivered to the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Scroll(i32),
    Select(usize),
    Drag(f64),
    Key(KeyIntent),
    Open(usize),
    Close { immediate: bool },
    ConfigReload,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{command}' expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("invalid argument '{value}' for '{command}'")]
    InvalidArgument { command: &'static str, value: String },
    #[error("unexpected trailing input '{0}'")]
    Trailing(String),
}

fn argument<'a, T: FromStr>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    expected: &'static str,
) -> Result<T, CommandError> {
    let value = words
        .next()
        .ok_or(CommandError::MissingArgument { command, expected })?;
    value.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        value: value.to_string(),
    })
}

/// Parses one line of the socket protocol, e.g. `scroll -2` or `close now`.
impl FromStr for AppEvent {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().ok_or(CommandError::Empty)?;

        let event = match command.to_ascii_lowercase().as_str() {
            "scroll" => Self::Scroll(argument(&mut words, "scroll", "a step count")?),
            "select" => Self::Select(argument(&mut words, "select", "an item index")?),
            "drag" => {
                let radians: f64 = argument(&mut words, "drag", "an angle in radians")?;
                if !radians.is_finite() {
                    return Err(CommandError::InvalidArgument {
                        command: "drag",
                        value: radians.to_string(),
                    });
                }
                Self::Drag(radians)
            }
            "key" => Self::Key(argument(&mut words, "key", "next, previous, activate or back")?),
            "open" => Self::Open(argument(&mut words, "open", "a parent index")?),
            "close" => match words.next() {
                None => Self::Close { immediate: false },
                Some(w) if w.eq_ignore_ascii_case("now") => Self::Close { immediate: true },
                Some(w) => {
                    return Err(CommandError::InvalidArgument {
                        command: "close",
                        value: w.to_string(),
                    });
                }
            },
            "reload" => Self::ConfigReload,
            "quit" => Self::Quit,
            _ => return Err(CommandError::Unknown(command.to_string())),
        };

        match words.next() {
            Some(extra) => Err(CommandError::Trailing(extra.to_string())),
            None => Ok(event),
        }
    }
}
