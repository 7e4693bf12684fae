//! Main REPL logic.

use std::{collections::HashMap, io::BufRead, io::Write, rc::Rc};

use log::{debug, warn};
use rustyline::{self, error::ReadlineError};
use textwrap;
use thiserror;
use trie_rs::{Trie, TrieBuilder};

use crate::command::{Args, ArgsError, Command, CommandStatus, CriticalError};
use crate::completion::Completion;

/// Reserved command names. These commands are always added to REPL.
pub const RESERVED: &[(&str, &str)] = &[("help", "Show this help message"), ("end", "End the session")];

/// Read-eval-print loop operating on a state of type `S`.
///
/// REPL is meant to be constructed using the builder pattern via [`Repl::builder()`].
/// Commands are added during building and cannot be added/removed/modified after
/// [`Repl`] has been built. The state is borrowed mutably for the lifetime of the
/// [`Repl`] and handed explicitly to every command handler.
///
/// Lines can come from the interactive editor ([`Repl::run`], [`Repl::next`]) or from
/// any buffered reader ([`Repl::run_lines`]).
pub struct Repl<'a, S> {
    description: String,
    prompt: String,
    text_width: usize,
    commands: HashMap<String, Command<S>>,
    state: &'a mut S,
    editor: rustyline::Editor<Completion>,
    out: Box<dyn Write>,
    echo: bool,
}

/// State of the REPL after command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopStatus {
    /// REPL should continue execution.
    Continue,
    /// Should break of evaluation loop (end command or end of input).
    Break,
}

/// Builder pattern implementation for [`Repl`].
///
/// All setter methods take owned `self` so the calls can be chained, for example:
/// ```rust
/// # use car_repl::Repl;
/// let mut state = ();
/// let repl = Repl::builder()
///     .description("My REPL")
///     .prompt("repl> ")
///     .build(&mut state)
///     .expect("Failed to build REPL");
/// ```
pub struct ReplBuilder<S> {
    commands: Vec<(String, Command<S>)>,
    description: String,
    prompt: String,
    text_width: usize,
    editor_config: rustyline::config::Config,
    out: Box<dyn Write>,
    with_hints: bool,
    with_completion: bool,
    echo: bool,
}

/// Error when building REPL.
#[derive(Debug, thiserror::Error)]
pub enum BuilderError {
    /// More than one command have the same name.
    #[error("more than one command with name '{0}' added")]
    DuplicateCommands(String),
    /// Given command name is empty or contains whitespace.
    #[error("name '{0}' cannot be parsed correctly, thus would be impossible to call")]
    InvalidName(String),
    /// Command name is one of [`RESERVED`] names.
    #[error("'{0}' is a reserved command name")]
    ReservedName(String),
}

/// Split a line into the command name and its arguments.
pub(crate) fn split_line(line: &str) -> Option<(&str, Args)> {
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    Some((name, Args::new(tokens)))
}

impl<S> Default for ReplBuilder<S> {
    fn default() -> Self {
        ReplBuilder {
            prompt: "> ".into(),
            text_width: 80,
            description: Default::default(),
            commands: Default::default(),
            out: Box::new(std::io::stderr()),
            editor_config: rustyline::config::Config::builder()
                .output_stream(rustyline::OutputStreamType::Stderr) // NOTE: cannot specify `out`
                .completion_type(rustyline::CompletionType::List)
                .build(),
            with_hints: true,
            with_completion: true,
            echo: false,
        }
    }
}

macro_rules! setters {
    ($( $(#[$meta:meta])* $name:ident: $type:ty )+) => {
        $(
            $(#[$meta])*
            pub fn $name<T: Into<$type>>(mut self, v: T) -> Self {
                self.$name = v.into();
                self
            }
        )+
    };
}

impl<S> ReplBuilder<S> {
    setters! {
        /// Repl description shown in [`Repl::help`]. Defaults to an empty string.
        description: String
        /// Prompt string, defaults to `"> "`.
        prompt: String
        /// Width of the text used when wrapping the help message. Defaults to 80.
        text_width: usize
        /// Configuration for [`rustyline`]. Some sane defaults are used.
        editor_config: rustyline::config::Config
        /// Where to print REPL output. By default [`std::io::Stderr`] is used.
        ///
        /// Command handlers receive this sink as their output. Note that [`rustyline`]
        /// will always use [`std::io::Stderr`] or [`std::io::Stdout`] for the prompt;
        /// these must be configured in [`ReplBuilder::editor_config`].
        out: Box<dyn Write>
        /// Print command hints. Defaults to `true`.
        ///
        /// Hints will show the end of a command if there is only one available.
        /// For example, assuming commands `"drive"` and `"enter"`, in the following position
        /// (`|` indicates the cursor):
        /// ```text
        /// > dr|
        /// ```
        /// a hint will be shown as
        /// ```text
        /// > dr|ive
        /// ```
        with_hints: bool
        /// Use completion. Defaults to `true`.
        with_completion: bool
        /// Write every non-blank input line to the output, prefixed with `$`, before
        /// executing it. Defaults to `false`.
        echo: bool
    }

    /// Add a command with given `name`. Use along with the [`command!`](crate::command!) macro.
    pub fn add(mut self, name: &str, cmd: Command<S>) -> Self {
        self.commands.push((name.into(), cmd));
        self
    }

    /// Finalize the configuration and return the REPL bound to `state`, or error.
    pub fn build(self, state: &mut S) -> Result<Repl<'_, S>, BuilderError> {
        let mut commands = HashMap::new();
        let mut trie = TrieBuilder::new();
        for (name, cmd) in self.commands.into_iter() {
            if name.is_empty() || name.split_whitespace().count() != 1 || name.trim() != name {
                return Err(BuilderError::InvalidName(name));
            } else if RESERVED.iter().any(|&(n, _)| n == name) {
                return Err(BuilderError::ReservedName(name));
            } else if commands.contains_key(&name) {
                return Err(BuilderError::DuplicateCommands(name));
            }
            debug!("registered command '{}' {:?}", name, cmd.args_info);
            trie.push(&name);
            commands.insert(name, cmd);
        }
        for (name, _) in RESERVED.iter() {
            trie.push(name);
        }

        let trie: Rc<Trie<u8>> = Rc::new(trie.build());
        let helper = Completion {
            trie,
            with_hints: self.with_hints,
            with_completion: self.with_completion,
        };
        let mut editor = rustyline::Editor::with_config(self.editor_config);
        editor.set_helper(Some(helper));

        Ok(Repl {
            description: self.description,
            prompt: self.prompt,
            text_width: self.text_width,
            commands,
            state,
            editor,
            out: self.out,
            echo: self.echo,
        })
    }
}

impl<'a, S> Repl<'a, S> {
    /// Start [`ReplBuilder`] with default values.
    pub fn builder() -> ReplBuilder<S> {
        ReplBuilder::default()
    }

    /// Current state.
    pub fn state(&self) -> &S {
        &*self.state
    }

    fn format_help_entries(&self, entries: &[(String, String)]) -> String {
        let width = match entries.iter().map(|(sig, _)| sig.len()).max() {
            Some(width) => width,
            None => return "".into(),
        };
        let indent = " ".repeat(width + 2 + 2);
        entries
            .iter()
            .map(|(sig, desc)| {
                let opts = textwrap::Options::new(self.text_width)
                    .initial_indent("")
                    .subsequent_indent(&indent);
                let line = format!("  {:width$}  {}", sig, desc, width = width);
                textwrap::fill(&line, &opts)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns formatted help message.
    ///
    /// The message depends only on the registered commands, never on the state.
    pub fn help(&self) -> String {
        let mut names: Vec<_> = self.commands.keys().collect();
        names.sort();

        let signature = |name: &String| {
            format!("{} {}", name, self.commands[name].signature())
                .trim_end()
                .to_string()
        };
        let user: Vec<_> = names
            .iter()
            .map(|name| (signature(name), self.commands[name.as_str()].description.clone()))
            .collect();

        let other: Vec<_> = RESERVED
            .iter()
            .map(|(name, desc)| (name.to_string(), desc.to_string()))
            .collect();

        let msg = format!(
            r#"
{}

Available commands:
{}

Other commands:
{}
        "#,
            self.description,
            self.format_help_entries(&user),
            self.format_help_entries(&other)
        );
        msg.trim().into()
    }

    /// Execute a single input line.
    ///
    /// Blank lines are ignored. Errors reported to the output do not stop the loop,
    /// only a [`CriticalError`] or a failure to write the output is returned.
    pub fn process_line(&mut self, line: &str) -> anyhow::Result<LoopStatus> {
        if line.trim().is_empty() {
            return Ok(LoopStatus::Continue);
        }
        if self.echo {
            writeln!(&mut self.out, "${}", line.trim_end())?;
        }
        self.handle_line(line)
    }

    fn handle_line(&mut self, line: &str) -> anyhow::Result<LoopStatus> {
        let (name, args) = match split_line(line) {
            Some(split) => split,
            None => return Ok(LoopStatus::Continue),
        };
        if !self.commands.contains_key(name) && !RESERVED.iter().any(|&(n, _)| n == name) {
            debug!("unknown command '{}'", name);
            writeln!(&mut self.out, "Command not found: {}", name)?;
            writeln!(&mut self.out, "Use 'help' to see available commands.")?;
            return Ok(LoopStatus::Continue);
        }
        debug!("dispatching '{}' with {} argument(s)", name, args.len());
        match self.handle_command(name, &args) {
            Ok(CommandStatus::Done) => Ok(LoopStatus::Continue),
            Ok(CommandStatus::Quit) => Ok(LoopStatus::Break),
            Err(err) if err.downcast_ref::<CriticalError>().is_some() => Err(err),
            Err(err) => {
                // other errors are handled here
                writeln!(&mut self.out, "Error: {}", err)?;
                if err.downcast_ref::<ArgsError>().is_some() {
                    if let Some(cmd) = self.commands.get(name) {
                        let usage = format!("{} {}", name, cmd.signature());
                        writeln!(&mut self.out, "Usage: {}", usage.trim_end())?;
                    }
                }
                Ok(LoopStatus::Continue)
            }
        }
    }

    fn handle_command(&mut self, name: &str, args: &Args) -> anyhow::Result<CommandStatus> {
        match name {
            "help" => {
                let help = self.help();
                writeln!(&mut self.out, "{}", help)?;
                Ok(CommandStatus::Done)
            }
            "end" => Ok(CommandStatus::Quit),
            _ => match self.commands.get_mut(name) {
                Some(cmd) => cmd.run(&mut *self.state, args, &mut *self.out),
                None => Ok(CommandStatus::Done),
            },
        }
    }

    /// Run a single interactive REPL iteration and return whether this is the last one or not.
    pub fn next(&mut self) -> anyhow::Result<LoopStatus> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.trim());
                }
                self.process_line(&line)
            }
            Err(ReadlineError::Interrupted) => {
                writeln!(&mut self.out, "CTRL-C")?;
                Ok(LoopStatus::Break)
            }
            Err(ReadlineError::Eof) => Ok(LoopStatus::Break),
            Err(err) => {
                warn!("line editor error: {}", err);
                writeln!(&mut self.out, "Error: {:?}", err)?;
                Ok(LoopStatus::Continue)
            }
        }
    }

    /// Run the interactive evaluation loop until [`LoopStatus::Break`] is received.
    pub fn run(&mut self) -> anyhow::Result<()> {
        while let LoopStatus::Continue = self.next()? {}
        self.out.flush()?;
        Ok(())
    }

    /// Run the evaluation loop on lines read from `input` instead of the editor.
    ///
    /// Stops on the `end` command or at the end of input. Invalid UTF-8 in a line is
    /// replaced with U+FFFD and the line is executed like any other.
    pub fn run_lines<R: BufRead>(&mut self, input: R) -> anyhow::Result<()> {
        for bytes in input.split(b'\n') {
            let bytes = bytes?;
            let line = String::from_utf8_lossy(&bytes);
            if let LoopStatus::Break = self.process_line(&line)? {
                break;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}
