use std::path::{Path, PathBuf};
use std::{env, fs, process, thread};

use log::{debug, info, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use rsi::{RsiConfig, RsiEnv, RsiResult, RsiValue, STACK_SIZE, default_env, read_all, read_eval};

const USAGE: &str = "usage: rsi [--debug] [--config <file>] [file…]";

struct Args {
	debug: bool,
	config: Option<PathBuf>,
	files: Vec<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
	let mut res = Args { debug: false, config: None, files: vec![] };
	let mut args = env::args().skip(1);
	while let Some(arg) = args.next() {
		match arg.as_str() {
			"--debug" => res.debug = true,
			"--config" => res.config = Some(args.next().ok_or("--config needs a file")?.into()),
			flag if flag.starts_with("--") => return Err(format!("unknown flag {}", flag)),
			file => res.files.push(PathBuf::from(file)),
		}
	}
	Ok(res)
}

fn print_result((value, res): (Option<RsiValue>, RsiResult<()>)) {
	if let Some(v) = value {
		println!("{}", v);
	}
	if let Err(err) = res {
		println!("Error: {}", err);
	}
}

fn load_file(path: &Path, env: &RsiEnv) {
	let text = match fs::read_to_string(path) {
		Ok(v) => v,
		Err(err) => {
			println!("Error: can't read {}: {}", path.display(), err);
			return
		},
	};
	info!("loading {}", path.display());
	if let (_, Err(err)) = read_eval(&text, env) {
		println!("Error: {}: {}", path.display(), err);
	}
}

fn repl(config: &RsiConfig, env: &RsiEnv) -> Result<(), ReadlineError> {
	let mut rl = DefaultEditor::new()?;
	if let Some(path) = &config.history_file {
		if let Err(err) = rl.load_history(path) {
			debug!("no history from {}: {}", path.display(), err);
		}
	}
	let mut counter = 1;
	let mut buffer = String::new();
	let res = loop {
		let prompt = if buffer.is_empty() {
			format!("{}[{}]-> ", config.prompt, counter)
		} else {
			": ".to_string()
		};
		match rl.readline(&prompt) {
			Ok(line) => {
				if !buffer.is_empty() {
					buffer.push('\n');
				}
				buffer.push_str(&line);
				if buffer.trim().is_empty() {
					buffer.clear();
					continue
				}
				// keep reading until the buffer holds whole expressions and strings
				if let Err(err) = read_all(&buffer) {
					if err.is_incomplete() {
						continue
					}
				}
				if let Err(err) = rl.add_history_entry(buffer.as_str()) {
					warn!("history: {}", err);
				}
				print_result(read_eval(&buffer, env));
				buffer.clear();
				counter += 1;
			},
			Err(ReadlineError::Interrupted) => buffer.clear(),
			Err(ReadlineError::Eof) => {
				println!("bye!");
				break Ok(())
			},
			Err(err) => break Err(err),
		}
	};
	if let Some(path) = &config.history_file {
		if let Err(err) = rl.save_history(path) {
			warn!("can't save history to {}: {}", path.display(), err);
		}
	}
	res
}

fn main() {
	let args = match parse_args() {
		Ok(v) => v,
		Err(msg) => {
			eprintln!("{}\n{}", msg, USAGE);
			process::exit(2)
		},
	};
	let config = match RsiConfig::load(args.config.as_deref()) {
		Ok(v) => v,
		Err(err) => {
			eprintln!("Error: {}", err);
			process::exit(1)
		},
	};
	let level = if args.debug || config.debug {
		log::LevelFilter::Trace
	} else {
		log::LevelFilter::Info
	};
	env_logger::Builder::new()
		.filter_level(log::LevelFilter::Warn)
		.filter_module("rsi", level)
		.init();

	// deep non-tail recursion needs more than the main thread's stack
	let interpreter = thread::Builder::new()
		.name("rsi".to_string())
		.stack_size(STACK_SIZE)
		.spawn(move || {
			let env = default_env();
			for path in config.preload.iter().chain(&args.files) {
				load_file(path, &env);
			}
			repl(&config, &env).map_err(|err| err.to_string())
		});
	let res = match interpreter {
		Ok(handle) => match handle.join() {
			Ok(res) => res,
			Err(_) => process::exit(101),
		},
		Err(err) => {
			eprintln!("Error: can't start the interpreter thread: {}", err);
			process::exit(1)
		},
	};
	if let Err(err) = res {
		eprintln!("Error: {}", err);
		process::exit(1)
	}
}
