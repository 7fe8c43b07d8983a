#[macro_use]
extern crate log;
#[macro_use]
extern crate structopt;

use std::fs;
use std::io;
use std::path;
use std::process;

#[derive(Debug, StructOpt)]
#[structopt(name = "lsystems")]
struct Options {
    /// Source file describing the L-system; will use stdin if omitted.
    #[structopt(name = "SOURCE", parse(from_os_str))]
    source: Option<path::PathBuf>,

    /// Seed for stochastic rules; a random seed is used if omitted.
    #[structopt(long = "seed")]
    seed: Option<u64>,

    /// Resolve placeholders in token parameters before printing.
    #[structopt(long = "resolve")]
    resolve: bool,

    /// Print the normalized source code to stderr before running it.
    #[structopt(long = "print-ast")]
    print_ast: bool,

    /// Write a GraphViz rendering of the parsed program to this file.
    #[structopt(long = "graph", parse(from_os_str))]
    graph: Option<path::PathBuf>,
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(error) => {
            for e in error.iter_chain() {
                error!("{}", e);
            }
            drop(error);
            process::exit(1)
        }
    }
}

fn run() -> Result<(), failure::Error> {
    use std::io::Read;
    use structopt::StructOpt;

    pretty_env_logger::init_timed();

    let options = Options::from_args();

    let mut source = String::new();
    let file_name = if let Some(ref path) = options.source {
        let mut file = fs::File::open(path)?;
        file.read_to_string(&mut source)?;
        codespan::FileName::from(path.clone())
    } else {
        let stdin = io::stdin();
        let mut stdin = stdin.lock();
        stdin.read_to_string(&mut source)?;
        codespan::FileName::virtual_("<stdin>")
    };

    let mut lsystems = lsystems::LSystems::new();
    let result = execute(&mut lsystems, file_name, &source, &options);

    if let Err(ref error) = result {
        if let Some(error) = error.downcast_ref::<lsystems::Error>() {
            lsystems::diagnostic::emit_to_stderr(
                codespan_reporting::termcolor::ColorChoice::Auto,
                lsystems.codemap(),
                error,
            )?;
        }
    }

    result
}

fn execute(
    lsystems: &mut lsystems::LSystems,
    file_name: codespan::FileName,
    source: &str,
    options: &Options,
) -> Result<(), failure::Error> {
    let program = lsystems.load(file_name, source)?;

    if options.print_ast {
        eprintln!("{}", program.pretty_print());
    }

    if let Some(ref path) = options.graph {
        write_graph(&program, path)?;
    }

    let random: Box<dyn lsystems::lsystem::random::RandomSource> = match options.seed {
        Some(seed) => Box::new(lsystems::lsystem::random::StdRandom::seeded(seed)),
        None => Box::new(lsystems::lsystem::random::StdRandom::from_entropy()),
    };

    let lsystem = program.run(random)?;
    info!(
        "rewrote {} generations into {} tokens",
        lsystem.recursion_count(),
        lsystem.state().len()
    );

    if options.resolve {
        println!("{}", program.resolve(&lsystem)?);
    } else {
        println!("{}", lsystem.state());
    }

    Ok(())
}

fn write_graph(program: &lsystems::Program, path: &path::Path) -> Result<(), failure::Error> {
    info!("writing AST graph to {}", path.display());
    let mut file = fs::File::create(path)?;
    program.graph().render(&mut file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_write_failures_are_errors() {
        let _ = env_logger::try_init();

        let mut lsystems = lsystems::LSystems::new();
        let program = lsystems
            .load("a.ls", "set axiom = \"F\"\nset recursionCount = 1\n")
            .unwrap();

        let dir = std::env::temp_dir().join("lsystems-graph-test");
        fs::create_dir_all(&dir).unwrap();

        let path = dir.join("ast.dot");
        write_graph(&program, &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("digraph ast {"));

        let missing = dir.join("missing").join("ast.dot");
        assert!(write_graph(&program, &missing).is_err());
    }
}
