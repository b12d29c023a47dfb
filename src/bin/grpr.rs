//! The grep-style command line front end of the `grpr` matching engine.
//!
//! All result formatting lives here; the engine only reports hit lines through
//! the sink. Exit status is 0 when any line matched, 1 when none did, and 2 on
//! hard errors such as a bad pattern. An unreadable input terminates that
//! input's scan only.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use grpr::{LineMatch, LineSink, Matcher, MatcherBuilder};

#[derive(Parser, Debug)]
#[command(
    name = "grpr",
    version,
    about = "Searches inputs for lines matching regular expressions",
    disable_help_flag = true
)]
struct Args {
    /// Print this help text.
    #[arg(long = "help", action = clap::ArgAction::Help)]
    help: Option<bool>,

    /// A pattern to search for. Repeatable; a line matching any pattern is a hit.
    #[arg(short = 'e', value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Read patterns from a file, one per line. Empty lines are ignored.
    #[arg(short = 'f', value_name = "FILE")]
    pattern_file: Option<PathBuf>,

    /// Print only the count of matching lines per input.
    #[arg(short = 'c')]
    count: bool,

    /// Never label printed lines with their file name.
    #[arg(short = 'h')]
    no_filename: bool,

    /// Fold ASCII upper case to lower case in the patterns and the input.
    #[arg(short = 'i')]
    ignore_case: bool,

    /// Print only the names of inputs with matching lines.
    #[arg(short = 'l')]
    files_with_matches: bool,

    /// Print only the names of inputs without matching lines.
    #[arg(short = 'L')]
    files_without_match: bool,

    /// Prefix every printed line with its line number.
    #[arg(short = 'n')]
    line_number: bool,

    /// Print nothing; only the exit status reports the result.
    #[arg(short = 's')]
    silent: bool,

    /// Select the lines that do NOT match.
    #[arg(short = 'v')]
    invert: bool,

    /// Treat the patterns as literal strings.
    #[arg(short = 'F', long = "literal")]
    literal: bool,

    /// The inputs to search; standard input when none are given. When neither
    /// -e nor -f is used, the first operand is the pattern.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("grpr: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> grpr::Result<u8> {
    let mut patterns = args.patterns.clone();
    if let Some(file) = &args.pattern_file {
        let text = std::fs::read_to_string(file)?;
        patterns.extend(text.lines().filter(|l| !l.is_empty()).map(str::to_string));
    }
    let mut files = args.files.clone();
    if patterns.is_empty() {
        if files.is_empty() {
            eprintln!("usage: grpr [-chilLnsvF] [-f file] [-e expr] [file ...]");
            return Ok(2);
        }
        patterns.push(files.remove(0).to_string_lossy().into_owned());
    }

    let mut matcher: Matcher = MatcherBuilder::new()
        .patterns(&patterns)
        .case_insensitive(args.ignore_case)
        .invert_match(args.invert)
        .literal(args.literal)
        .build()?;

    let label = files.len() > 1 && !args.no_filename;
    // Per-line output is suppressed when only an aggregate is wanted, and the
    // scan can stop at the first hit when only existence matters.
    let quiet = args.silent || args.count || args.files_with_matches || args.files_without_match;
    let stop_after_first = args.silent || args.files_with_matches || args.files_without_match;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut any_match = false;
    let mut hard_error = false;

    let inputs: Vec<Option<PathBuf>> = if files.is_empty() {
        vec![None]
    } else {
        files.into_iter().map(Some).collect()
    };
    for input in inputs {
        let name = match &input {
            None => "stdin".to_string(),
            Some(path) => path.display().to_string(),
        };
        let mut sink = PrintSink {
            out: &mut out,
            name: &name,
            label,
            line_number: args.line_number,
            quiet,
            stop_after_first,
            error: None,
        };
        let summary = match &input {
            None => matcher.scan(io::stdin().lock(), &mut sink),
            Some(path) => match File::open(path) {
                Ok(file) => matcher.scan(file, &mut sink),
                Err(e) => {
                    eprintln!("grpr: can't open {}: {}", name, e);
                    hard_error = true;
                    continue;
                }
            },
        };
        if let Some(e) = sink.error.take() {
            return Err(e.into());
        }
        let summary = match summary {
            Ok(summary) => summary,
            Err(e) => {
                eprintln!("grpr: read error on {}: {}", name, e);
                hard_error = true;
                continue;
            }
        };
        if args.count {
            if label {
                write!(out, "{}:", name)?;
            }
            writeln!(out, "{}", summary.matched)?;
        }
        if (args.files_with_matches && summary.is_match())
            || (args.files_without_match && !summary.is_match())
        {
            writeln!(out, "{}", name)?;
        }
        any_match |= summary.is_match();
    }
    out.flush()?;

    Ok(if hard_error {
        2
    } else if any_match {
        0
    } else {
        1
    })
}

/// The line formatter: labels, line numbers, and the bytes of the hit line.
struct PrintSink<'a, W: Write> {
    out: &'a mut W,
    name: &'a str,
    label: bool,
    line_number: bool,
    quiet: bool,
    stop_after_first: bool,
    error: Option<io::Error>,
}

impl<W: Write> PrintSink<'_, W> {
    fn print(&mut self, line: &LineMatch<'_>) -> io::Result<()> {
        if self.label {
            write!(self.out, "{}:", self.name)?;
        }
        if self.line_number {
            write!(self.out, "{}: ", line.line_number())?;
        }
        self.out.write_all(line.as_bytes())?;
        // An unterminated last line is reproduced without a trailing newline.
        if !line.is_unterminated() {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl<W: Write> LineSink for PrintSink<'_, W> {
    fn on_line(&mut self, line: &LineMatch<'_>) -> bool {
        if !self.quiet {
            if let Err(e) = self.print(line) {
                self.error = Some(e);
                return false;
            }
        }
        !self.stop_after_first
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}
