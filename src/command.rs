//! Commands, their arguments and argument validation.

use std::{io::Write, str::FromStr};

use anyhow;
use thiserror;

/// Handler invoked with the REPL state, the command arguments and the output sink.
pub type Handler<S> = Box<dyn FnMut(&mut S, &Args, &mut dyn Write) -> anyhow::Result<CommandStatus>>;

/// Checks the arguments before the handler runs.
pub type Validator = Box<dyn Fn(&Args) -> Result<(), ArgsError>>;

/// A command that can be registered in [`crate::Repl`].
///
/// Usually created with the [`command!`](crate::command!) macro, which generates the
/// argument signature and the validator from a list of argument types.
pub struct Command<S> {
    pub description: String,
    pub args_info: Vec<String>,
    pub handler: Handler<S>,
    pub validator: Validator,
}

/// Returned by a command handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Continue reading commands.
    Done,
    /// Leave the evaluation loop.
    Quit,
}

/// Error that stops the evaluation loop and is handed back to the caller of [`crate::Repl::run`].
#[derive(Debug, thiserror::Error)]
pub enum CriticalError {
    #[error(transparent)]
    Critical(#[from] anyhow::Error),
}

/// Problems with the arguments passed to a command.
#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    #[error("wrong number of arguments: got {0}, expected {1}")]
    WrongNumberOfArguments(usize, usize),
    #[error("failed to parse argument value '{0}'")]
    WrongArgumentValue(String, #[source] anyhow::Error),
    #[error("missing argument at position {0}")]
    MissingArgument(usize),
}

/// Positional arguments of a command, without the command name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    tokens: Vec<String>,
}

impl Args {
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Args {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Raw token at `index`.
    pub fn get(&self, index: usize) -> Result<&str, ArgsError> {
        self.tokens
            .get(index)
            .map(String::as_str)
            .ok_or(ArgsError::MissingArgument(index))
    }

    /// Token at `index` converted with [`FromStr`].
    pub fn parse<T>(&self, index: usize) -> Result<T, ArgsError>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let token = self.get(index)?;
        token
            .parse::<T>()
            .map_err(|err| ArgsError::WrongArgumentValue(token.into(), err.into()))
    }
}

impl<S> Command<S> {
    /// Validate `args` and call the handler.
    pub fn run(
        &mut self,
        state: &mut S,
        args: &Args,
        out: &mut dyn Write,
    ) -> anyhow::Result<CommandStatus> {
        (self.validator)(args)?;
        (self.handler)(state, args, out)
    }

    /// Argument signature as shown in help and usage messages.
    pub fn signature(&self) -> String {
        self.args_info.join(" ")
    }
}

impl<S> std::fmt::Debug for Command<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("description", &self.description)
            .field("args_info", &self.args_info)
            .finish()
    }
}

/// Takes a list of types and generates a callable that checks if [`Args`]
/// has exactly that many arguments and each of them parses into its type.
/// NOTE: for string arguments use String instead of &str
#[macro_export]
macro_rules! validator {
    // Helper that allows to replace one expression with another (possibly "noop" one)
    (@replace $_old:tt $new:expr) => { $new };
    ($($type:ty),* $(,)?) => {
        |args: &$crate::command::Args| -> std::result::Result<(), $crate::command::ArgsError> {
            // check the number of arguments
            let n_args: usize = <[()]>::len(&[ $( $crate::validator!(@replace $type ()) ),* ]);
            if args.len() != n_args {
                return Err($crate::command::ArgsError::WrongNumberOfArguments(args.len(), n_args));
            }
            #[allow(unused_variables, unused_mut)]
            let mut i = 0;
            #[allow(unused_assignments)]
            {
                $(
                    args.parse::<$type>(i)?;
                    i += 1;
                )*
            }
            Ok(())
        }
    };
}

/// Creates a [`Command`] from a description, a list of argument types and a handler.
///
/// Arguments are written as `name:type` (the name is optional, `:type` is enough) and
/// end up in the signature shown by `help`. The handler is any function or closure
/// with the signature of [`Handler`]; it reads its arguments through [`Args`], which
/// the generated validator has already checked.
///
/// ```rust
/// # use car_repl::{command, Args, CommandStatus};
/// use std::io::Write;
///
/// fn add(total: &mut i64, args: &Args, out: &mut dyn std::io::Write) -> anyhow::Result<CommandStatus> {
///     *total += args.parse::<i64>(0)?;
///     writeln!(out, "{}", total)?;
///     Ok(CommandStatus::Done)
/// }
/// let cmd = command!("Add X to the total"; X:i64 => add);
/// assert_eq!(cmd.args_info, &["X:i64"]);
/// ```
#[macro_export]
macro_rules! command {
    ($description:expr; $($($name:ident)? : $type:ty),* => $handler:expr $(,)?) => {
        $crate::command::Command {
            description: $description.into(),
            args_info: vec![ $(
                concat!($(stringify!($name), )? ":", stringify!($type)).into()
            ),* ],
            validator: std::boxed::Box::new($crate::validator!( $($type),* )),
            handler: std::boxed::Box::new($handler),
        }
    };
}
