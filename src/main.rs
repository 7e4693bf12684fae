use std::io::{BufRead, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::{self, Context};
use clap::Parser;
use log::{error, info};

use car_repl::{commands, Car, ReplBuilder};

/// Drive a car from the command line.
///
/// Commands are read from standard input, one per line. Use `help` to list them
/// and `end` to leave.
#[derive(Debug, Parser)]
#[command(name = "car-repl", version, about)]
struct Cli {
    /// Prompt shown before each command.
    #[arg(long, default_value = "> ")]
    prompt: String,

    /// Repeat every command prefixed with `$` before its output.
    #[arg(long)]
    echo: bool,

    /// Passenger capacity of the car.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pass_max: i32,

    /// Fuel capacity of the car.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    gas_max: i32,

    /// Wrap width of the help message.
    #[arg(long, default_value_t = 80)]
    text_width: usize,

    /// Do not hint command names while typing.
    #[arg(long)]
    no_hints: bool,

    /// Disable tab completion of command names.
    #[arg(long)]
    no_completion: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    ExitCode::from(exit_status(try_main(&cli)))
}

fn try_main(cli: &Cli) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        info!("reading commands from the terminal");
        let mut car = Car::new(cli.pass_max, cli.gas_max);
        let mut repl = builder(cli, Box::new(std::io::stdout()))
            .build(&mut car)
            .context("Failed to create repl")?;
        repl.run().context("Critical REPL error")
    } else {
        info!("reading commands from standard input");
        session(cli, stdin.lock(), Box::new(std::io::stdout()))
    }
}

fn builder(cli: &Cli, out: Box<dyn Write>) -> ReplBuilder<Car> {
    commands::builder()
        .prompt(cli.prompt.as_str())
        .text_width(cli.text_width)
        .with_hints(!cli.no_hints)
        .with_completion(!cli.no_completion)
        .echo(cli.echo)
        .out(out)
}

/// Runs a whole session on lines read from `input`.
fn session<R: BufRead>(cli: &Cli, input: R, out: Box<dyn Write>) -> anyhow::Result<()> {
    let mut car = Car::new(cli.pass_max, cli.gas_max);
    let mut repl = builder(cli, out)
        .build(&mut car)
        .context("Failed to create repl")?;
    repl.run_lines(input).context("Critical REPL error")
}

fn exit_status(result: anyhow::Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            error!("{:?}", err);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _data: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn status(args: &[&str], input: &'static str, out: Box<dyn Write>) -> u8 {
        let cli = Cli::parse_from(args.iter().copied());
        exit_status(session(&cli, Cursor::new(input), out))
    }

    #[test]
    fn end_exits_successfully() {
        let out = Box::new(std::io::sink());
        assert_eq!(status(&["car-repl"], "show\nend\nshow\n", out), 0);
    }

    #[test]
    fn end_of_input_exits_successfully() {
        assert_eq!(status(&["car-repl"], "", Box::new(std::io::sink())), 0);
        assert_eq!(status(&["car-repl", "--echo"], "fuel x\nteleport\n", Box::new(std::io::sink())), 0);
    }

    #[test]
    fn critical_error_exits_with_failure() {
        assert_eq!(status(&["car-repl"], "show\n", Box::new(BrokenPipe)), 1);
    }

    #[test]
    fn options_reach_the_car() {
        let cli = Cli::parse_from(["car-repl", "--pass-max", "4", "--gas-max", "-1", "--text-width", "40"]);
        assert_eq!(cli.pass_max, 4);
        assert_eq!(cli.gas_max, -1);
        assert_eq!(cli.text_width, 40);
        assert_eq!(cli.prompt, "> ");
        assert!(!cli.echo);
    }
}
