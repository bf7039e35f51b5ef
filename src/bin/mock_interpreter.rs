//! Mock interpreter binary for integration testing
//!
//! Stands in for a real interpreter under test. The script is read line by
//! line and each line is one directive:
//!
//! - `print <text>`   write a line to stdout
//! - `eprint <text>`  write a line to stderr
//! - `sleep <secs>`   sleep (fractional seconds allowed)
//! - `pidfile <path>` write this process's PID to a file
//! - `exit <code>`    exit immediately with the given code
//!
//! Blank lines and `--` comments are skipped. Falling off the end exits 0.

use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: mock_interpreter <script>");
        return ExitCode::from(2);
    };

    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("mock_interpreter: cannot read {path}: {e}");
            return ExitCode::from(2);
        }
    };

    for (index, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("--") {
            continue;
        }

        let (directive, arg) = line.split_once(' ').unwrap_or((line, ""));
        match directive {
            "print" => {
                println!("{arg}");
                let _ = std::io::stdout().flush();
            }
            "eprint" => eprintln!("{arg}"),
            "sleep" => match arg.parse::<f64>() {
                Ok(secs) if secs >= 0.0 => std::thread::sleep(Duration::from_secs_f64(secs)),
                _ => return fail(index, line),
            },
            "pidfile" => {
                if let Err(e) = std::fs::write(arg, std::process::id().to_string()) {
                    eprintln!("mock_interpreter: cannot write pid file {arg}: {e}");
                    return ExitCode::from(2);
                }
            }
            "exit" => match arg.parse::<u8>() {
                Ok(code) => return ExitCode::from(code),
                Err(_) => return fail(index, line),
            },
            _ => return fail(index, line),
        }
    }

    ExitCode::SUCCESS
}

fn fail(index: usize, line: &str) -> ExitCode {
    eprintln!("mock_interpreter: line {}: bad directive '{line}'", index + 1);
    ExitCode::from(2)
}
