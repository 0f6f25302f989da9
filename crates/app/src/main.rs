use std::fmt;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use drill_core::model::{Mode, Stage, StageFilter};
use services::{DrillServices, SessionHandle, SessionOutcome, SessionRequest};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingWorkbookPath,
    UnknownArg(String),
    InvalidStages { raw: String },
    InvalidMode { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingWorkbookPath => write!(f, "import requires a workbook path"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidStages { raw } => write!(f, "invalid --stages value: {raw}"),
            ArgsError::InvalidMode { raw } => write!(f, "invalid --mode value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- import <workbook.xlsx> [--data-dir <dir>]");
    eprintln!("  cargo run -p app -- saves  [--data-dir <dir>]");
    eprintln!("  cargo run -p app -- drill  [--data-dir <dir>] [--mode <mode>]");
    eprintln!("                             [--stages <1,2,..>] [--random]");
    eprintln!("                             [--review-default] [--save <file>]");
    eprintln!();
    eprintln!("Modes: normal (default), wrong, review, restart");
    eprintln!("Defaults:");
    eprintln!("  --data-dir data");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DRILL_DATA_DIR");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Import,
    Saves,
    Drill,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "import" => Some(Self::Import),
            "saves" => Some(Self::Saves),
            "drill" => Some(Self::Drill),
            _ => None,
        }
    }
}

struct Args {
    data_dir: PathBuf,
    workbook: Option<PathBuf>,
    mode: Mode,
    stages: StageFilter,
    random: bool,
    review_default: bool,
    save_path: Option<PathBuf>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            data_dir: std::env::var("DRILL_DATA_DIR")
                .map_or_else(|_| PathBuf::from("data"), PathBuf::from),
            workbook: None,
            mode: Mode::Normal,
            stages: StageFilter::all(),
            random: false,
            review_default: false,
            save_path: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data-dir" => {
                    parsed.data_dir = PathBuf::from(require_value(args, "--data-dir")?);
                }
                "--mode" => {
                    let value = require_value(args, "--mode")?;
                    parsed.mode = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidMode { raw: value })?;
                }
                "--stages" => {
                    let value = require_value(args, "--stages")?;
                    parsed.stages = parse_stages(&value)?;
                }
                "--random" => parsed.random = true,
                "--review-default" => parsed.review_default = true,
                "--save" => {
                    parsed.save_path = Some(PathBuf::from(require_value(args, "--save")?));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if arg.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ if parsed.workbook.is_none() => {
                    parsed.workbook = Some(PathBuf::from(arg));
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

fn parse_stages(raw: &str) -> Result<StageFilter, ArgsError> {
    let mut filter = StageFilter::none();
    for token in raw.split(',') {
        let code = token.trim();
        let stage = code
            .chars()
            .next()
            .filter(|_| code.len() == 1)
            .and_then(Stage::from_code)
            .ok_or_else(|| ArgsError::InvalidStages {
                raw: raw.to_string(),
            })?;
        filter.insert(stage);
    }
    Ok(filter)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next().as_deref() {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let services = DrillServices::new(&args.data_dir);

    match cmd {
        Command::Import => {
            let workbook = args.workbook.ok_or(ArgsError::MissingWorkbookPath)?;
            let outcome = services.import_workbook(&workbook)?;
            println!(
                "読込み完了！ {}問 (診断 {}件)",
                outcome.bank.total_len(),
                outcome.diagnostics.len()
            );
            Ok(())
        }
        Command::Saves => {
            let entries = services.list_save_files()?;
            if entries.is_empty() {
                println!("セーブデータはありません。");
            }
            for entry in entries {
                println!("{:03} {:7} {}", entry.sequence, entry.mode, entry.path.display());
            }
            Ok(())
        }
        Command::Drill => {
            let request = SessionRequest::new(args.mode)
                .with_stages(args.stages)
                .with_shuffle(args.random)
                .with_default_review(args.review_default);
            let request = match args.save_path {
                Some(path) => request.with_save_path(path),
                None => request,
            };
            let handle = services.start_session(request)?;
            let outcome = run_drill(handle)?;
            println!(
                "保存しました: {} (間違い {}問 / 残り {}問)",
                outcome.save_path.display(),
                outcome.wrong_total,
                outcome.restart_total
            );
            Ok(())
        }
    }
}

/// Interactive question loop on stdin. Every exit path, EOF included,
/// closes the session through the same save-and-flush route.
fn run_drill(mut handle: SessionHandle) -> Result<SessionOutcome, Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let view = handle.current_question();
        println!();
        println!(
            "({}問目 / {}問中) ジャンル: {}",
            view.position, view.total, view.genre
        );
        println!("{}", view.question);
        for (index, choice) in view.choices.iter().enumerate() {
            println!("  #{} {}", index + 1, choice);
        }

        loop {
            let progress = handle.progress();
            let advance_key = if progress.is_last { "f=終了" } else { "n=次へ" };
            print!("[1-4=解答 r=復習リスト {advance_key} q=記録して終了] > ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next() else {
                return Ok(handle.close(false)?);
            };
            let input = line?;
            match input.trim() {
                "1" | "2" | "3" | "4" => {
                    let index = input.trim().parse::<usize>().unwrap_or(1) - 1;
                    let view = handle.current_question();
                    let Some(choice) = view.choices.get(index) else {
                        continue;
                    };
                    match handle.submit_answer(choice) {
                        Ok(feedback) if feedback.is_correct => println!("正解！"),
                        Ok(feedback) => {
                            let position = feedback.answer_index.map_or(0, |i| i + 1);
                            println!("不正解... 正解は #{} {}", position, feedback.answer);
                        }
                        Err(err) => println!("{err}"),
                    }
                }
                "r" => {
                    let flagged = !handle.review_toggle();
                    handle.set_review_toggle(flagged);
                    if flagged {
                        println!("復習リストに追加します。");
                    } else {
                        println!("復習リストから外します。");
                    }
                }
                "n" if !progress.is_last => {
                    handle.next()?;
                    break;
                }
                "f" if progress.is_last => {
                    return Ok(handle.close(true)?);
                }
                "q" => {
                    return Ok(handle.close(false)?);
                }
                _ => {}
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
