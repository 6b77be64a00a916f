use std::{
    fs::{self, File},
    io::{self, BufRead, BufWriter, Write},
    path::Path,
    process,
    rc::Rc,
};

use clap::Parser as ClapParser;
use lumen::{
    compilation::compilation::{Compilation, EvaluationOptions},
    config::{Args, Config},
    evaluator::value::{Value, Variables},
    format_diagnostic,
    parser::parser::SyntaxTree,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SHELL_FILE: &str = "shell";

fn main() {
    let config = Config::from_args(Args::parse());
    init_tracing(&config);

    let code = match &config.file {
        Some(file) => run_file(&config, file),
        None => run_repl(&config),
    };

    process::exit(code);
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}

fn run_file(config: &Config, path: &Path) -> i32 {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) => {
            eprintln!("Error: cannot read {}: {}", path.display(), error);
            return 2;
        }
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let tree = SyntaxTree::parse(&text, Some(file_name));
    if config.show_tree {
        println!("{:#?}", tree.root);
    }

    let compilation = Compilation::new(tree);
    info!(file = %path.display(), "compiled");

    let mut variables = Variables::new();
    match submit(config, &compilation, &mut variables) {
        Ok(Some(value)) => {
            println!("{}", value);
            0
        }
        Ok(None) => 0,
        Err(()) => 1,
    }
}

fn run_repl(config: &Config) -> i32 {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let mut previous: Option<Rc<Compilation>> = None;
    let mut variables = Variables::new();

    loop {
        print!("» ");
        if io::stdout().flush().is_err() {
            return 1;
        }

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(error)) => {
                eprintln!("Error: {}", error);
                return 1;
            }
            None => return 0,
        };

        match line.trim() {
            "" => continue,
            "#exit" => return 0,
            "#reset" => {
                debug!("session reset");
                previous = None;
                variables = Variables::new();
                continue;
            }
            _ => {}
        }

        let tree = SyntaxTree::parse(&line, Some(String::from(SHELL_FILE)));
        if config.show_tree {
            println!("{:#?}", tree.root);
        }

        let compilation = match &previous {
            Some(previous) => previous.continue_with(tree),
            None => Compilation::new(tree),
        };

        match submit(config, &compilation, &mut variables) {
            Ok(value) => {
                if let Some(value) = value {
                    println!("{}", value);
                }
                previous = Some(compilation);
            }
            Err(()) => debug!("submission dropped from session"),
        }
    }
}

/// Reports diagnostics, honors the output flags and evaluates one
/// submission. Returns `Err` when anything was reported.
fn submit(
    config: &Config,
    compilation: &Rc<Compilation>,
    variables: &mut Variables,
) -> Result<Option<Value>, ()> {
    let diagnostics = compilation.diagnostics();
    if !diagnostics.is_empty() {
        for error in &diagnostics {
            eprintln!("{}", format_diagnostic(error, &compilation.syntax_tree.source));
        }
        return Err(());
    }

    if config.show_program {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        if let Err(error) = compilation.emit_tree(&mut writer).and_then(|_| writeln!(writer)) {
            eprintln!("Error: cannot print program: {}", error);
        }
    }

    if let Some(path) = &config.graph {
        if let Err(error) = write_graph(compilation, path) {
            eprintln!("Error: cannot write {}: {}", path.display(), error);
        }
    }

    let options = EvaluationOptions {
        interrupt: None,
        max_loop_iterations: config.max_loop_iterations,
    };
    let result = compilation.evaluate_with(variables, io::stdout(), &options);

    if !result.diagnostics.is_empty() {
        for error in &result.diagnostics {
            eprintln!("{}", format_diagnostic(error, &compilation.syntax_tree.source));
        }
        return Err(());
    }

    Ok(result.value)
}

fn write_graph(compilation: &Compilation, path: &Path) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    compilation.emit_control_flow_graph(&mut writer)?;
    writer.flush()
}
