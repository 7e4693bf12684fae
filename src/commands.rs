//! Commands driving a [`Car`].

use std::io::Write;

use crate::car::Car;
use crate::command::{Args, CommandStatus};
use crate::repl::{Repl, ReplBuilder};
use crate::command;

pub fn show(car: &mut Car, _args: &Args, out: &mut dyn Write) -> anyhow::Result<CommandStatus> {
    writeln!(out, "{}", car)?;
    Ok(CommandStatus::Done)
}

pub fn enter(car: &mut Car, _args: &Args, _out: &mut dyn Write) -> anyhow::Result<CommandStatus> {
    car.enter();
    Ok(CommandStatus::Done)
}

pub fn leave(car: &mut Car, _args: &Args, _out: &mut dyn Write) -> anyhow::Result<CommandStatus> {
    car.leave();
    Ok(CommandStatus::Done)
}

pub fn fuel(car: &mut Car, args: &Args, _out: &mut dyn Write) -> anyhow::Result<CommandStatus> {
    car.fuel(args.parse(0)?);
    Ok(CommandStatus::Done)
}

pub fn drive(car: &mut Car, args: &Args, _out: &mut dyn Write) -> anyhow::Result<CommandStatus> {
    car.drive(args.parse(0)?);
    Ok(CommandStatus::Done)
}

/// [`ReplBuilder`] with every car command registered.
pub fn builder() -> ReplBuilder<Car> {
    Repl::builder()
        .description("Drive a car around: let passengers in and out, fuel it up and hit the road.")
        .add("show", command!("Show passengers, fuel and distance"; => show))
        .add("enter", command!("Let a passenger in"; => enter))
        .add("leave", command!("Let a passenger out"; => leave))
        .add("fuel", command!("Put fuel in the tank"; gas:i32 => fuel))
        .add("drive", command!("Drive the given distance"; km:i32 => drive))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::testing::SharedOutput;

    fn session(car: &mut Car, input: &str) -> String {
        let out = SharedOutput::default();
        let mut repl = builder().out(out.boxed()).build(car).unwrap();
        repl.run_lines(Cursor::new(input.to_string())).unwrap();
        out.contents()
    }

    fn loaded() -> Car {
        Car {
            pass: 2,
            pass_max: 4,
            gas: 30,
            gas_max: 50,
            km: 120,
        }
    }

    #[test]
    fn show_prints_summary() {
        for (pass, gas, km) in [(0, 0, 0), (1, 2, 3), (-1, i32::MAX, i32::MIN)] {
            let mut car = Car {
                pass,
                gas,
                km,
                ..Default::default()
            };
            assert_eq!(
                session(&mut car, "show\n"),
                format!("pass: {}, gas: {}, km: {}\n", pass, gas, km)
            );
        }
    }

    #[test]
    fn help_does_not_depend_on_state() {
        let mut empty = Car::default();
        let mut full = loaded();
        let help = session(&mut empty, "help\n");
        assert_eq!(help, session(&mut full, "help\n"));
        assert_eq!(help, session(&mut full, "fuel 3\ndrive 9\nhelp\n"));
        for name in ["show", "enter", "leave", "fuel gas:i32", "drive km:i32", "end", "help"] {
            assert!(help.contains(name), "help is missing '{}'", name);
        }
    }

    #[test]
    fn stubs_leave_car_unchanged() {
        let mut car = loaded();
        let out = session(&mut car, "enter\nleave\nfuel 10\ndrive 5\n");
        assert_eq!(out, "");
        assert_eq!(car, loaded());
    }

    #[test]
    fn fuel_and_drive_accept_any_integer() {
        let mut car = loaded();
        let out = session(
            &mut car,
            "fuel -10\ndrive -5\nfuel 2147483647\ndrive -2147483648\nfuel 0\n",
        );
        assert_eq!(out, "");
        assert_eq!(car, loaded());
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let mut car = loaded();
        let out = session(&mut car, "fuel ten\ndrive\nfuel 99999999999\nshow\n");
        assert_eq!(
            out,
            "Error: failed to parse argument value 'ten'\nUsage: fuel gas:i32\n\
             Error: wrong number of arguments: got 0, expected 1\nUsage: drive km:i32\n\
             Error: failed to parse argument value '99999999999'\nUsage: fuel gas:i32\n\
             pass: 2, gas: 30, km: 120\n"
        );
        assert_eq!(car, loaded());
    }

    #[test]
    fn unknown_command_keeps_running() {
        let mut car = loaded();
        let out = session(&mut car, "teleport\nshow\n");
        assert_eq!(
            out,
            "Command not found: teleport\nUse 'help' to see available commands.\n\
             pass: 2, gas: 30, km: 120\n"
        );
        assert_eq!(car, loaded());
    }

    #[test]
    fn invalid_utf8_line_does_not_stop_the_session() {
        let out = SharedOutput::default();
        let mut car = loaded();
        {
            let mut repl = builder().out(out.boxed()).build(&mut car).unwrap();
            repl.run_lines(Cursor::new(&b"show\n\xff\xfe\nshow\n"[..])).unwrap();
        }
        assert_eq!(
            out.contents(),
            "pass: 2, gas: 30, km: 120\n\
             Command not found: \u{FFFD}\u{FFFD}\nUse 'help' to see available commands.\n\
             pass: 2, gas: 30, km: 120\n"
        );
        assert_eq!(car, loaded());
    }

    #[test]
    fn end_stops_the_session() {
        let mut car = Car::default();
        let out = session(&mut car, "show\nend\nshow\n");
        assert_eq!(out, "pass: 0, gas: 0, km: 0\n");
    }

    #[test]
    fn end_of_input_stops_the_session() {
        let mut car = Car::default();
        assert_eq!(session(&mut car, ""), "");
        assert_eq!(session(&mut car, "show"), "pass: 0, gas: 0, km: 0\n");
    }

    #[test]
    fn echo_transcript() {
        let out = SharedOutput::default();
        let mut car = Car::new(2, 100);
        let mut repl = builder().echo(true).out(out.boxed()).build(&mut car).unwrap();
        repl.run_lines(Cursor::new("show\nfuel 5\nend\n")).unwrap();
        assert_eq!(
            out.contents(),
            "$show\npass: 0, gas: 0, km: 0\n$fuel 5\n$end\n"
        );
    }
}
